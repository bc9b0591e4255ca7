//! Feature Extraction
//!
//! Turns raw input into model-ready numeric vectors.

pub mod url;

pub use url::{extract_url_features, URL_FEATURE_NAMES};
