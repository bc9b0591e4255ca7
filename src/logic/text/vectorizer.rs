//! TF-IDF Vectorizer
//!
//! Native transform for the exported email vectorizer. Reproduces the
//! word-analyzer path of the training-side vectorizer: `\b\w\w+\b`
//! tokens, optional lowercasing, stop words, word n-grams, raw or
//! sublinear term frequency, idf weighting, row normalisation.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::logic::error::{DetectError, DetectResult};

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// On-disk vectorizer description
#[derive(Debug, Deserialize)]
struct VectorizerSpec {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default)]
    stop_words: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    lowercase: bool,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    pub fn from_json(bytes: &[u8]) -> DetectResult<Self> {
        let spec: VectorizerSpec = serde_json::from_slice(bytes)
            .map_err(|e| DetectError::Artifact(format!("Invalid vectorizer JSON: {}", e)))?;
        Self::from_spec(spec)
    }

    pub fn from_file(path: &Path) -> DetectResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| DetectError::Artifact(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&bytes)
    }

    fn from_spec(spec: VectorizerSpec) -> DetectResult<Self> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(DetectError::Artifact(format!(
                "Invalid ngram_range ({}, {})", min_n, max_n
            )));
        }
        if let Some((term, col)) = spec.vocabulary.iter().find(|(_, col)| **col >= spec.idf.len()) {
            return Err(DetectError::Artifact(format!(
                "Vocabulary term '{}' maps to column {} but idf has {} entries",
                term, col, spec.idf.len()
            )));
        }

        Ok(Self {
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            lowercase: spec.lowercase,
            ngram_range: spec.ngram_range,
            sublinear_tf: spec.sublinear_tf,
            norm: spec.norm,
            stop_words: spec.stop_words.into_iter().collect(),
        })
    }

    /// Number of output columns
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };

        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Vectorize one document into a single-row batch
    pub fn transform(&self, text: &str) -> Array2<f32> {
        let mut row = vec![0.0f32; self.dimension()];

        for term in self.analyze(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                row[col] += 1.0;
            }
        }

        for (col, value) in row.iter_mut().enumerate() {
            if *value > 0.0 {
                let tf = if self.sublinear_tf { 1.0 + value.ln() } else { *value };
                *value = tf * self.idf[col];
            }
        }

        let norm = match self.norm {
            Some(Norm::L2) => row.iter().map(|v| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => row.iter().map(|v| v.abs()).sum::<f32>(),
            None => 0.0,
        };
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }

        let width = row.len();
        Array2::from_shape_vec((1, width), row).unwrap_or_else(|_| Array2::zeros((1, width)))
    }
}
