//! Detection errors

use thiserror::Error;

/// Model family, used to say which side of the detector is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Email,
    Url,
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelFamily::Email => write!(f, "Email"),
            ModelFamily::Url => write!(f, "URL"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    /// A required classifier or vectorizer was not loaded
    #[error("{0} model not available")]
    ModelUnavailable(ModelFamily),

    /// Feature-name list was never installed (startup ordering bug)
    #[error("URL feature names not initialized")]
    FeatureSchemaUnset,

    #[error("{0}")]
    InvalidInput(String),

    /// Failure inside a model call
    #[error("inference failed: {0}")]
    Inference(String),

    /// Artifact could not be read or parsed
    #[error("artifact error: {0}")]
    Artifact(String),
}

pub type DetectResult<T> = Result<T, DetectError>;
