//! Prediction payloads

use serde::{Deserialize, Serialize};

use crate::logic::model::{AggregateVerdict, PredictionResult, Verdict};

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

/// Body for every text-based endpoint
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UrlPredictionResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub features_used: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DualResponse {
    pub overall: Verdict,
    pub email: Option<PredictionResult>,
    pub urls_found: Vec<String>,
    pub url_analyses: Vec<UrlPredictionResponse>,
}

impl DualResponse {
    pub fn from_verdict(verdict: AggregateVerdict, features_used: &[String]) -> Self {
        Self {
            overall: verdict.overall,
            email: verdict.email_result,
            urls_found: verdict.urls_found,
            url_analyses: verdict
                .url_results
                .into_iter()
                .map(|result| UrlPredictionResponse {
                    result,
                    features_used: features_used.to_vec(),
                })
                .collect(),
        }
    }
}
