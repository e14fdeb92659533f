//! Frozen linear-model inference and the model bundle
//!
//! The five cascade classifiers are multinomial logistic regressions trained
//! offline and exported as JSON artifacts (`classes`/`coef`/`intercept`).
//! Only inference lives here; training is out of scope.

use crate::types::ClassifyError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// A frozen logistic-regression classifier. `coef` holds one row per class,
/// or a single row for binary models (scikit-learn convention: a positive
/// decision value selects the second class).
#[derive(Debug, Clone, Deserialize)]
pub struct LinearClassifier {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f32>>,
    pub intercept: Vec<f32>,
}

impl LinearClassifier {
    pub fn new(classes: Vec<String>, coef: Vec<Vec<f32>>, intercept: Vec<f32>) -> Self {
        Self {
            classes,
            coef,
            intercept,
        }
    }

    /// Input dimensionality this model was trained against.
    pub fn input_dim(&self) -> usize {
        self.coef.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Predict the class label for one feature vector. A wrong-dimension
    /// input is a `FeatureShape` error, fatal to the call.
    pub fn predict(&self, x: &[f32]) -> Result<&str, ClassifyError> {
        if self.classes.is_empty() || self.coef.is_empty() {
            return Err(ClassifyError::EmptyModel);
        }
        let expected = self.input_dim();
        if x.len() != expected {
            return Err(ClassifyError::FeatureShape {
                expected,
                got: x.len(),
            });
        }

        if self.classes.len() == 2 && self.coef.len() == 1 {
            let score = self.decision(0, x);
            let idx = if score > 0.0 { 1 } else { 0 };
            return Ok(&self.classes[idx]);
        }

        let mut best = 0;
        let mut best_score = f32::MIN;
        for row in 0..self.coef.len() {
            let score = self.decision(row, x);
            if score > best_score {
                best_score = score;
                best = row;
            }
        }
        Ok(&self.classes[best])
    }

    fn decision(&self, row: usize, x: &[f32]) -> f32 {
        let dot: f32 = self.coef[row].iter().zip(x.iter()).map(|(w, v)| w * v).sum();
        dot + self.intercept.get(row).copied().unwrap_or(0.0)
    }
}

/// Per-feature standardization applied to the Open-branch count vector
/// before classification.
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl Scaler {
    /// No-op scaler, used by tests.
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            scale: vec![1.0; dim],
        }
    }

    pub fn transform(&self, x: &[f32]) -> Result<Vec<f32>, ClassifyError> {
        if x.len() != self.mean.len() {
            return Err(ClassifyError::FeatureShape {
                expected: self.mean.len(),
                got: x.len(),
            });
        }
        Ok(x.iter()
            .enumerate()
            .map(|(i, v)| {
                let s = self.scale[i];
                // Zero-variance features stay centered only.
                if s.abs() < f32::EPSILON {
                    v - self.mean[i]
                } else {
                    (v - self.mean[i]) / s
                }
            })
            .collect())
    }
}

/// The five frozen classifiers plus the Open-branch scaler. Constructed
/// once at startup and never mutated; loading failure is fatal.
#[derive(Debug)]
pub struct ModelBundle {
    /// Embedding -> top-level branch.
    pub top_level: LinearClassifier,
    /// Embedding -> full sustain sub-tag.
    pub sustain: LinearClassifier,
    /// Embedding -> track code `1`..`5`.
    pub track: LinearClassifier,
    /// concat(current, previous) embedding -> reply label.
    pub reply: LinearClassifier,
    /// concat(current, previous) embedding -> respond label.
    pub respond: LinearClassifier,
    /// Scaled count vector -> `0` (Fact) / `1` (Opinion).
    pub fact_opinion: LinearClassifier,
    pub scaler: Scaler,
}

impl ModelBundle {
    /// Load all artifacts from a directory. Expects `top_level.json`,
    /// `sustain.json`, `track.json`, `reply.json`, `respond.json`,
    /// `fact_opinion.json` and `scaler.json`.
    pub fn load(dir: &Path) -> Result<Self> {
        let bundle = Self {
            top_level: load_classifier(dir, "top_level")?,
            sustain: load_classifier(dir, "sustain")?,
            track: load_classifier(dir, "track")?,
            reply: load_classifier(dir, "reply")?,
            respond: load_classifier(dir, "respond")?,
            fact_opinion: load_classifier(dir, "fact_opinion")?,
            scaler: load_scaler(dir)?,
        };
        info!(
            "Loaded model bundle from {}: embedding dim {}",
            dir.display(),
            bundle.embedding_dim()
        );
        Ok(bundle)
    }

    /// The embedding dimensionality the bundle was trained against.
    pub fn embedding_dim(&self) -> usize {
        self.top_level.input_dim()
    }
}

fn load_classifier(dir: &Path, name: &str) -> Result<LinearClassifier> {
    let path = dir.join(format!("{name}.json"));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read model artifact {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse model artifact {}", path.display()))
}

fn load_scaler(dir: &Path) -> Result<Scaler> {
    let path = dir.join("scaler.json");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read scaler artifact {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse scaler artifact {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiclass_argmax() {
        let model = LinearClassifier::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            vec![0.0, 0.0, 0.0],
        );
        assert_eq!(model.predict(&[0.0, 1.0, 0.0]).unwrap(), "b");
        assert_eq!(model.predict(&[0.0, 0.0, 2.0]).unwrap(), "c");
    }

    #[test]
    fn binary_single_row() {
        let model = LinearClassifier::new(
            vec!["0".into(), "1".into()],
            vec![vec![1.0, -1.0]],
            vec![0.0],
        );
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), "1");
        assert_eq!(model.predict(&[0.0, 1.0]).unwrap(), "0");
    }

    #[test]
    fn wrong_dimension_is_feature_shape_error() {
        let model = LinearClassifier::new(
            vec!["0".into(), "1".into()],
            vec![vec![1.0, -1.0]],
            vec![0.0],
        );
        match model.predict(&[1.0]) {
            Err(ClassifyError::FeatureShape { expected: 2, got: 1 }) => {}
            other => panic!("expected FeatureShape, got {other:?}"),
        }
    }

    #[test]
    fn scaler_standardizes() {
        let scaler = Scaler {
            mean: vec![1.0, 0.0],
            scale: vec![2.0, 0.0],
        };
        let out = scaler.transform(&[3.0, 5.0]).unwrap();
        assert_eq!(out, vec![1.0, 5.0]);
    }

    #[test]
    fn scaler_shape_checked() {
        let scaler = Scaler::identity(3);
        assert!(scaler.transform(&[1.0]).is_err());
    }
}
