//! Classifier backends
//!
//! Both model families share one contract: a batch of feature rows in,
//! one class label plus per-class probabilities per row out.

use std::path::Path;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::error::{DetectError, DetectResult};

/// Raw classifier output for a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    /// Predicted class index per row
    pub labels: Vec<i64>,
    /// `[rows, classes]`, columns in class-index order
    pub probabilities: Array2<f32>,
}

impl ClassifierOutput {
    /// Label and probability row for the first (only) row of a single-row batch
    pub fn first(&self) -> DetectResult<(i64, Vec<f32>)> {
        let label = *self.labels.first()
            .ok_or_else(|| DetectError::Inference("Empty label output".to_string()))?;
        if self.probabilities.nrows() == 0 {
            return Err(DetectError::Inference("Empty probability output".to_string()));
        }
        Ok((label, self.probabilities.row(0).to_vec()))
    }
}

/// Classifier backend (ONNX in production, stubs in tests)
pub trait Classifier: Send + Sync {
    fn classify(&self, batch: Array2<f32>) -> DetectResult<ClassifierOutput>;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Classifier exported to ONNX with outputs `[label, probabilities]`
pub struct OnnxClassifier {
    session: Mutex<Session>,
    label_output: String,
    proba_output: String,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> DetectResult<Self> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        let session = Session::builder()
            .map_err(|e| DetectError::Artifact(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectError::Artifact(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| DetectError::Artifact(format!("Failed to load model: {}", e)))?;

        if session.outputs().len() < 2 {
            return Err(DetectError::Artifact(format!(
                "Expected label and probability outputs, model has {}",
                session.outputs().len()
            )));
        }
        let label_output = session.outputs()[0].name().to_string();
        let proba_output = session.outputs()[1].name().to_string();

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            proba_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, batch: Array2<f32>) -> DetectResult<ClassifierOutput> {
        let rows = batch.nrows();

        let input_tensor = Value::from_array(batch)
            .map_err(|e| DetectError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| DetectError::Inference(format!("Inference failed: {}", e)))?;

        let labels = outputs.get(&self.label_output)
            .ok_or_else(|| DetectError::Inference("No label output".to_string()))?
            .try_extract_tensor::<i64>()
            .map_err(|e| DetectError::Inference(format!("Extract label error: {}", e)))?
            .1
            .to_vec();

        let proba = outputs.get(&self.proba_output)
            .ok_or_else(|| DetectError::Inference("No probability output".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectError::Inference(format!("Extract probability error: {}", e)))?
            .1
            .to_vec();

        if rows == 0 || proba.len() % rows != 0 {
            return Err(DetectError::Inference(format!(
                "Probability output of {} values does not fit {} rows", proba.len(), rows
            )));
        }
        let classes = proba.len() / rows;
        let probabilities = Array2::from_shape_vec((rows, classes), proba)
            .map_err(|e| DetectError::Inference(format!("Array error: {}", e)))?;

        Ok(ClassifierOutput { labels, probabilities })
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubClassifier;
    use super::*;

    #[test]
    fn test_first_row() {
        let out = StubClassifier::new(1, 0.2, 0.8)
            .classify(Array2::zeros((1, 6)))
            .unwrap();
        let (label, proba) = out.first().unwrap();
        assert_eq!(label, 1);
        assert_eq!(proba, vec![0.2, 0.8]);
    }

    #[test]
    fn test_first_on_empty_output() {
        let out = ClassifierOutput { labels: vec![], probabilities: Array2::zeros((0, 2)) };
        assert!(matches!(out.first(), Err(DetectError::Inference(_))));
    }
}
