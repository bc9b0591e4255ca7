//! Service status payloads

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SERVICE_NAME: &str = "Dual AI Phishing Detector API";

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub email_model: bool,
    pub url_model: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub email_model: bool,
    pub url_model: bool,
    pub models_loaded_at: DateTime<Utc>,
}
