//! Inference Engine
//!
//! One entry point per model family. Each prepares its own input,
//! runs the classifier on a single-row batch and normalises the raw
//! output into a `PredictionResult`.
//!
//! The two families disagree on label polarity and on probability key
//! order; both are part of the public response shape and kept as-is.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::registry::ModelRegistry;
use crate::logic::error::{DetectError, DetectResult};
use crate::logic::features::extract_url_features;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Phishing,
}

/// Order in which probability keys are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    PhishingFirst,
    LegitimateFirst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub phishing: f64,
    pub legitimate: f64,
    order: KeyOrder,
}

impl ClassProbabilities {
    pub fn new(phishing: f64, legitimate: f64, order: KeyOrder) -> Self {
        Self { phishing, legitimate, order }
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self.order {
            KeyOrder::PhishingFirst => {
                map.serialize_entry("phishing", &self.phishing)?;
                map.serialize_entry("legitimate", &self.legitimate)?;
            }
            KeyOrder::LegitimateFirst => {
                map.serialize_entry("legitimate", &self.legitimate)?;
                map.serialize_entry("phishing", &self.phishing)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PredictionResult {
    pub prediction: Label,
    pub probabilities: ClassProbabilities,
}

impl PredictionResult {
    pub fn is_phishing(&self) -> bool {
        self.prediction == Label::Phishing
    }
}

/// Classify one URL with the tabular model.
///
/// Class `1` means legitimate for this model.
pub fn infer_url(url: &str, registry: &ModelRegistry) -> DetectResult<PredictionResult> {
    let model = registry.url_model()?;
    let feature_names = registry.feature_names()?;

    let features = extract_url_features(url, feature_names);
    let (label, proba) = model.classify(features.to_batch())?.first()?;
    let (p0, p1) = class_pair(&proba)?;

    Ok(PredictionResult {
        prediction: if label == 1 { Label::Legitimate } else { Label::Phishing },
        probabilities: ClassProbabilities::new(p0, p1, KeyOrder::PhishingFirst),
    })
}

/// Classify free text with the vectorizer + text model.
///
/// Class `1` means phishing for this model.
pub fn infer_email(text: &str, registry: &ModelRegistry) -> DetectResult<PredictionResult> {
    let (model, vectorizer) = registry.email_parts()?;

    let batch = vectorizer.transform(text);
    let (label, proba) = model.classify(batch)?.first()?;
    let (p0, p1) = class_pair(&proba)?;

    Ok(PredictionResult {
        prediction: if label == 1 { Label::Phishing } else { Label::Legitimate },
        probabilities: ClassProbabilities::new(p1, p0, KeyOrder::LegitimateFirst),
    })
}

fn class_pair(proba: &[f32]) -> DetectResult<(f64, f64)> {
    match proba {
        [p0, p1] => Ok((f64::from(*p0), f64::from(*p1))),
        other => Err(DetectError::Inference(format!(
            "Expected 2 class probabilities, got {}", other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::error::ModelFamily;
    use crate::logic::model::classifier::stub::StubClassifier;
    use crate::logic::text::TfidfVectorizer;

    fn vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::from_json(br#"{"vocabulary": {"verify": 0, "account": 1}, "idf": [1.0, 1.0]}"#)
            .unwrap()
    }

    #[test]
    fn test_url_label_polarity() {
        let registry = ModelRegistry::empty().with_url_model(StubClassifier::new(1, 0.2, 0.8));
        let result = infer_url("https://example.com", &registry).unwrap();

        assert_eq!(result.prediction, Label::Legitimate);
        assert!((result.probabilities.phishing - 0.2).abs() < 1e-6);
        assert!((result.probabilities.legitimate - 0.8).abs() < 1e-6);

        let registry = ModelRegistry::empty().with_url_model(StubClassifier::new(0, 0.7, 0.3));
        assert_eq!(infer_url("http://1.2.3.4", &registry).unwrap().prediction, Label::Phishing);
    }

    #[test]
    fn test_url_non_binary_label_is_phishing() {
        let registry = ModelRegistry::empty().with_url_model(StubClassifier::new(-1, 0.6, 0.4));
        assert_eq!(infer_url("http://x.io", &registry).unwrap().prediction, Label::Phishing);
    }

    #[test]
    fn test_email_label_polarity() {
        let registry = ModelRegistry::empty()
            .with_email_model(StubClassifier::new(1, 0.1, 0.9))
            .with_email_vectorizer(vectorizer());
        let result = infer_email("verify your account", &registry).unwrap();

        assert_eq!(result.prediction, Label::Phishing);
        assert!((result.probabilities.legitimate - 0.1).abs() < 1e-6);
        assert!((result.probabilities.phishing - 0.9).abs() < 1e-6);

        let registry = ModelRegistry::empty()
            .with_email_model(StubClassifier::new(0, 0.95, 0.05))
            .with_email_vectorizer(vectorizer());
        assert_eq!(infer_email("lunch?", &registry).unwrap().prediction, Label::Legitimate);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let registry = ModelRegistry::empty()
            .with_email_model(StubClassifier::new(1, 0.3, 0.7))
            .with_email_vectorizer(vectorizer())
            .with_url_model(StubClassifier::new(1, 0.25, 0.75));

        for result in [
            infer_email("verify", &registry).unwrap(),
            infer_url("https://a.b", &registry).unwrap(),
        ] {
            let sum = result.probabilities.phishing + result.probabilities.legitimate;
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unavailable() {
        let registry = ModelRegistry::empty().with_email_vectorizer(vectorizer());

        assert!(matches!(
            infer_email("hi", &registry),
            Err(DetectError::ModelUnavailable(ModelFamily::Email))
        ));
        assert!(matches!(
            infer_url("https://a.b", &registry),
            Err(DetectError::ModelUnavailable(ModelFamily::Url))
        ));
    }

    #[test]
    fn test_url_without_feature_schema() {
        let registry = ModelRegistry::empty()
            .with_url_model(StubClassifier::new(1, 0.1, 0.9))
            .with_feature_names(None);
        assert!(matches!(infer_url("https://a.b", &registry), Err(DetectError::FeatureSchemaUnset)));
    }

    #[test]
    fn test_probability_key_order() {
        let url = serde_json::to_string(&ClassProbabilities::new(0.25, 0.75, KeyOrder::PhishingFirst)).unwrap();
        assert_eq!(url, r#"{"phishing":0.25,"legitimate":0.75}"#);

        let email = serde_json::to_string(&ClassProbabilities::new(0.25, 0.75, KeyOrder::LegitimateFirst)).unwrap();
        assert_eq!(email, r#"{"legitimate":0.75,"phishing":0.25}"#);
    }

    #[test]
    fn test_prediction_serialization() {
        let result = PredictionResult {
            prediction: Label::Phishing,
            probabilities: ClassProbabilities::new(0.5, 0.5, KeyOrder::LegitimateFirst),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["prediction"], "phishing");
        assert_eq!(json["probabilities"]["phishing"], 0.5);
    }
}
