//! URL Feature Extractor
//!
//! Six string heuristics, each encoded as `1` (present) or `-1` (absent).
//! Vector positions follow the feature-name list the URL classifier was
//! trained with; order matters, the model sees nothing else.

use ndarray::{Array1, Array2, Axis};
use once_cell::sync::Lazy;
use regex::Regex;

/// Feature names in training order
pub const URL_FEATURE_NAMES: [&str; 6] = [
    "UsingIP",
    "LongURL",
    "ShortURL",
    "Symbol@",
    "HTTPS",
    "Redirecting//",
];

/// URLs strictly longer than this are "long"
const LONG_URL_THRESHOLD: usize = 75;

const SHORTENERS: [&str; 4] = ["bit.ly", "tinyurl", "t.co", "goo.gl"];

/// Dotted quad, octets not range-checked
static IP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid IP pattern")
});

/// Ordered numeric encoding of one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector(Vec<i32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Single-row batch for the classifier
    pub fn to_batch(&self) -> Array2<f32> {
        let row: Array1<f32> = self.as_slice().iter().map(|&v| v as f32).collect();
        row.insert_axis(Axis(0))
    }
}

fn flag(present: bool) -> i32 {
    if present { 1 } else { -1 }
}

/// Compute one named heuristic. `None` for names this extractor does not know.
fn evaluate(name: &str, url: &str) -> Option<i32> {
    let value = match name {
        "UsingIP" => flag(IP_PATTERN.is_match(url)),
        "LongURL" => flag(url.chars().count() > LONG_URL_THRESHOLD),
        "ShortURL" => flag(SHORTENERS.iter().any(|s| url.contains(s))),
        "Symbol@" => flag(url.contains('@')),
        "HTTPS" => flag(url.to_lowercase().starts_with("https")),
        "Redirecting//" => flag(url.matches("//").count() > 1),
        _ => return None,
    };
    Some(value)
}

/// Encode `url` against `feature_names`.
///
/// One slot per name, in the given order. Unknown names stay `0`;
/// known heuristics whose name is not listed are never computed.
pub fn extract_url_features<S: AsRef<str>>(url: &str, feature_names: &[S]) -> FeatureVector {
    let values = feature_names
        .iter()
        .map(|name| evaluate(name.as_ref(), url).unwrap_or(0))
        .collect();
    FeatureVector(values)
}
