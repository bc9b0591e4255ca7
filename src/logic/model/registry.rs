//! Model Registry
//!
//! Holds the deserialized artifacts for the life of the process.
//! Built once at startup, then shared read-only behind an `Arc`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classifier::{Classifier, OnnxClassifier};
use crate::logic::artifacts::{ArtifactKind, ArtifactSources, ArtifactStore};
use crate::logic::error::{DetectError, DetectResult, ModelFamily};
use crate::logic::features::URL_FEATURE_NAMES;
use crate::logic::text::TfidfVectorizer;

/// Readiness snapshot for health endpoints
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub email_model: bool,
    pub url_model: bool,
    pub loaded_at: DateTime<Utc>,
}

pub struct ModelRegistry {
    email_model: Option<Box<dyn Classifier>>,
    email_vectorizer: Option<TfidfVectorizer>,
    url_model: Option<Box<dyn Classifier>>,
    feature_names: Option<Vec<String>>,
    loaded_at: DateTime<Utc>,
}

impl ModelRegistry {
    /// Registry with nothing loaded
    pub fn empty() -> Self {
        Self {
            email_model: None,
            email_vectorizer: None,
            url_model: None,
            feature_names: None,
            loaded_at: Utc::now(),
        }
    }

    /// Load every artifact the store can provide.
    ///
    /// Each artifact is independent; a missing or broken one only leaves
    /// its own slot empty.
    pub fn load(store: &ArtifactStore, sources: &ArtifactSources) -> Self {
        let mut registry = Self::empty();

        if let Some(model) = load_artifact(store, sources, ArtifactKind::EmailModel, OnnxClassifier::load) {
            registry = registry.with_email_model(model);
        }
        if let Some(vectorizer) =
            load_artifact(store, sources, ArtifactKind::EmailVectorizer, TfidfVectorizer::from_file)
        {
            registry = registry.with_email_vectorizer(vectorizer);
        }

        if let Some(model) = load_artifact(store, sources, ArtifactKind::UrlModel, OnnxClassifier::load) {
            registry = registry.with_url_model(model);
        }

        if registry.is_email_ready() {
            tracing::info!("✓ Email model loaded");
        } else {
            tracing::warn!("Email model unavailable");
        }
        if registry.is_url_ready() {
            tracing::info!("✓ URL model loaded");
        } else {
            tracing::warn!("URL model unavailable");
        }

        registry
    }

    pub fn with_email_model(mut self, model: impl Classifier + 'static) -> Self {
        self.email_model = Some(Box::new(model));
        self
    }

    pub fn with_email_vectorizer(mut self, vectorizer: TfidfVectorizer) -> Self {
        self.email_vectorizer = Some(vectorizer);
        self
    }

    /// Install the URL classifier together with its training feature order
    pub fn with_url_model(mut self, model: impl Classifier + 'static) -> Self {
        self.url_model = Some(Box::new(model));
        self.feature_names = Some(URL_FEATURE_NAMES.iter().map(|n| n.to_string()).collect());
        self
    }

    #[cfg(test)]
    pub fn with_feature_names(mut self, names: Option<Vec<String>>) -> Self {
        self.feature_names = names;
        self
    }

    pub fn is_email_ready(&self) -> bool {
        self.email_model.is_some() && self.email_vectorizer.is_some()
    }

    pub fn is_url_ready(&self) -> bool {
        self.url_model.is_some()
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            email_model: self.is_email_ready(),
            url_model: self.is_url_ready(),
            loaded_at: self.loaded_at,
        }
    }

    pub fn email_parts(&self) -> DetectResult<(&dyn Classifier, &TfidfVectorizer)> {
        match (&self.email_model, &self.email_vectorizer) {
            (Some(model), Some(vectorizer)) => Ok((model.as_ref(), vectorizer)),
            _ => Err(DetectError::ModelUnavailable(ModelFamily::Email)),
        }
    }

    pub fn url_model(&self) -> DetectResult<&dyn Classifier> {
        self.url_model
            .as_deref()
            .ok_or(DetectError::ModelUnavailable(ModelFamily::Url))
    }

    pub fn feature_names(&self) -> DetectResult<&[String]> {
        self.feature_names.as_deref().ok_or(DetectError::FeatureSchemaUnset)
    }
}

fn load_artifact<T>(
    store: &ArtifactStore,
    sources: &ArtifactSources,
    kind: ArtifactKind,
    loader: impl FnOnce(&Path) -> DetectResult<T>,
) -> Option<T> {
    let Some(path) = store.verified(kind, sources.get(kind)) else {
        tracing::info!("{} not found in {}", kind.file_name(), store.dir().display());
        return None;
    };

    match loader(&path) {
        Ok(artifact) => {
            tracing::info!(
                "Loaded {} (sha256 {})",
                kind.file_name(),
                store.digest(kind).unwrap_or_default()
            );
            Some(artifact)
        }
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", kind.file_name(), e);
            None
        }
    }
}
