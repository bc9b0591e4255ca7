//! Aggregator
//!
//! Combines the text verdict with verdicts for every URL found in the
//! same text.
//!
//! Failure policy differs per entry point:
//! - `analyze_dual`: an unavailable email model yields no email result,
//!   but URL inference errors abort the whole call.
//! - `classify_extension`: never fails once input is non-empty; falls
//!   back to URLs, then to a safe score.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::inference::{infer_email, infer_url, PredictionResult};
use super::registry::ModelRegistry;
use crate::logic::error::{DetectError, DetectResult};

/// `[$-_]` is a character range (`$` through `_`), which is what lets
/// paths, ports and query strings through.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(\\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("valid URL pattern")
});

/// Phishing probability at or above this flags a URL-only score
pub const URL_PHISHING_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Phishing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateVerdict {
    pub overall: Verdict,
    pub email_result: Option<PredictionResult>,
    pub urls_found: Vec<String>,
    /// One per entry of `urls_found`, same order
    pub url_results: Vec<PredictionResult>,
}

/// Single-score shape used by the browser extension
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtensionScore {
    pub label: u8,
    pub phishing_probability: f64,
}

impl ExtensionScore {
    pub const SAFE: ExtensionScore = ExtensionScore { label: 0, phishing_probability: 0.0 };
}

/// Every http(s) URL in `text`, left to right, non-overlapping
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn analyze_dual(text: &str, registry: &ModelRegistry) -> DetectResult<AggregateVerdict> {
    let urls_found = extract_urls(text);

    let email_result = match infer_email(text, registry) {
        Ok(result) => Some(result),
        Err(DetectError::ModelUnavailable(_)) => None,
        Err(e) => return Err(e),
    };

    let url_results = urls_found
        .iter()
        .map(|url| infer_url(url, registry))
        .collect::<DetectResult<Vec<_>>>()?;

    let phishing = url_results.iter().any(PredictionResult::is_phishing)
        || email_result.as_ref().is_some_and(PredictionResult::is_phishing);

    Ok(AggregateVerdict {
        overall: if phishing { Verdict::Phishing } else { Verdict::Safe },
        email_result,
        urls_found,
        url_results,
    })
}

/// Best-effort single score for `text`.
///
/// Only fails on empty (or whitespace-only) input.
pub fn classify_extension(text: &str, registry: &ModelRegistry) -> DetectResult<ExtensionScore> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DetectError::InvalidInput("text is required".to_string()));
    }

    if registry.is_email_ready() {
        match infer_email(text, registry) {
            Ok(result) => {
                return Ok(ExtensionScore {
                    label: u8::from(result.is_phishing()),
                    phishing_probability: result.probabilities.phishing,
                });
            }
            Err(e) => tracing::warn!("Email model error: {}", e),
        }
    }

    let urls = extract_urls(text);
    if registry.is_url_ready() && !urls.is_empty() {
        match max_url_phishing_probability(&urls, registry) {
            Ok(phishing_probability) => {
                return Ok(ExtensionScore {
                    label: u8::from(phishing_probability >= URL_PHISHING_THRESHOLD),
                    phishing_probability,
                });
            }
            Err(e) => tracing::warn!("URL model error: {}", e),
        }
    }

    Ok(ExtensionScore::SAFE)
}

fn max_url_phishing_probability(urls: &[String], registry: &ModelRegistry) -> DetectResult<f64> {
    let mut max = 0.0f64;
    for url in urls {
        max = max.max(infer_url(url, registry)?.probabilities.phishing);
    }
    Ok(max)
}
