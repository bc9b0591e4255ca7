//! Model Module - classifiers, registry, inference

pub mod aggregator;
pub mod classifier;
pub mod inference;
pub mod registry;

pub use aggregator::{analyze_dual, classify_extension, AggregateVerdict, ExtensionScore, Verdict};
pub use inference::{infer_email, infer_url, PredictionResult};
pub use registry::ModelRegistry;
