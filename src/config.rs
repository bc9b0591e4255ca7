//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::logic::artifacts::{ArtifactSource, ArtifactSources};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub models_dir: PathBuf,

    /// Download URL and pinned digest per artifact
    pub sources: ArtifactSources,

    /// Per-artifact download timeout in seconds
    pub download_timeout_secs: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            models_dir: env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("trained_models")),

            sources: ArtifactSources {
                email_model: source_from_env("EMAIL_MODEL"),
                email_vectorizer: source_from_env("EMAIL_VECTORIZER"),
                url_model: source_from_env("URL_MODEL"),
            },

            download_timeout_secs: env::var("DOWNLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// `<PREFIX>_URL` and `<PREFIX>_SHA256`, blank values treated as unset
fn source_from_env(prefix: &str) -> ArtifactSource {
    let read = |suffix: &str| {
        env::var(format!("{}_{}", prefix, suffix))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    ArtifactSource {
        url: read("URL"),
        sha256: read("SHA256"),
    }
}
