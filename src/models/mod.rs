//! Request / response payloads

pub mod predict;
pub mod service;
pub mod stats;

pub use predict::*;
pub use service::*;
pub use stats::*;
