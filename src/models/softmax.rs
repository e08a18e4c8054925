//! Multinomial linear model: `argmax(W · x + bias)`.
//!
//! Only the argmax matters for a hard label, so the softmax normalization
//! itself is never computed.

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

use crate::domain::{FEATURE_LEN, Label};

/// On-disk layout: one weight row per class.
#[derive(Debug, Clone, Deserialize)]
struct SoftmaxSpec {
    classes: Vec<i64>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Linear scoring model with validated shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SoftmaxSpec")]
pub struct SoftmaxModel {
    classes: Vec<i64>,
    /// `classes × FEATURE_LEN`
    weights: DMatrix<f64>,
    bias: DVector<f64>,
}

impl TryFrom<SoftmaxSpec> for SoftmaxModel {
    type Error = String;

    fn try_from(spec: SoftmaxSpec) -> Result<Self, Self::Error> {
        let n = spec.classes.len();
        if n == 0 {
            return Err("softmax model has no classes".to_string());
        }
        if spec.weights.len() != n || spec.bias.len() != n {
            return Err(format!(
                "softmax model has {n} classes but {} weight rows and {} bias terms",
                spec.weights.len(),
                spec.bias.len()
            ));
        }
        if let Some((i, row)) = spec.weights.iter().enumerate().find(|(_, r)| r.len() != FEATURE_LEN) {
            return Err(format!(
                "weight row {i} has {} entries, expected {FEATURE_LEN}",
                row.len()
            ));
        }

        let flat: Vec<f64> = spec.weights.into_iter().flatten().collect();
        Ok(Self {
            classes: spec.classes,
            weights: DMatrix::from_row_slice(n, FEATURE_LEN, &flat),
            bias: DVector::from_vec(spec.bias),
        })
    }
}

impl SoftmaxModel {
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Label of the highest score. NaN scores never win; if every score is
    /// NaN the first class is returned.
    pub fn predict(&self, features: &[f64]) -> Label {
        let x = DVector::from_column_slice(features);
        let scores = &self.weights * x + &self.bias;

        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, &score) in scores.iter().enumerate() {
            if score > best_score {
                best = i;
                best_score = score;
            }
        }
        Label(self.classes[best])
    }
}
