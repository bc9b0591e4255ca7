//! Detection Core
//!
//! Artifact loading, feature extraction and model inference.
//! HTTP-agnostic: handlers only translate requests into calls here.

pub mod artifacts;
pub mod error;
pub mod features;
pub mod model;
pub mod text;

pub use error::DetectError;
