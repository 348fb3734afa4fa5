//! Logistic regression classifier.
//!
//! Scores a row as `sigmoid(intercept + Σ wᵢ·xᵢ)`, where `x` is optionally
//! standardized with per-column mean and scale first.

use ndarray::{Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::error::{ModelError, Result};

/// Per-column standardization `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Column means.
    pub mean: Vec<f64>,
    /// Column scales (standard deviations).
    pub scale: Vec<f64>,
}

/// Logistic regression over a fixed set of columns.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    columns: Vec<String>,
    coefficients: Array1<f64>,
    intercept: f64,
    threshold: f64,
    scaler: Option<(Array1<f64>, Array1<f64>)>,
}

impl LogisticModel {
    /// Create a model with the default 0.5 threshold and no scaler.
    pub fn new(columns: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if coefficients.len() != columns.len() {
            return Err(ModelError::DimensionMismatch {
                what: "coefficients",
                expected: columns.len(),
                actual: coefficients.len(),
            });
        }
        if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::InvalidParameter(
                "coefficients and intercept must be finite".to_string(),
            ));
        }

        Ok(Self {
            columns,
            coefficients: Array1::from(coefficients),
            intercept,
            threshold: 0.5,
            scaler: None,
        })
    }

    /// Set the decision threshold, which must lie strictly between 0 and 1.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "threshold {threshold} must be between 0 and 1"
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    /// Standardize inputs before scoring.
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Result<Self> {
        let n = self.columns.len();
        for (what, values) in [("scaler mean", &scaler.mean), ("scaler scale", &scaler.scale)] {
            if values.len() != n {
                return Err(ModelError::DimensionMismatch {
                    what,
                    expected: n,
                    actual: values.len(),
                });
            }
        }
        if let Some(i) = scaler.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ModelError::InvalidParameter(format!(
                "scale for column '{}' must be finite and non-zero",
                self.columns[i]
            )));
        }

        self.scaler = Some((Array1::from(scaler.mean), Array1::from(scaler.scale)));
        Ok(self)
    }

    /// Fitted coefficients, in column order.
    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice().unwrap_or_default()
    }

    /// Fitted intercept.
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Scaler parameters, if the model standardizes its input.
    pub fn scaler(&self) -> Option<StandardScaler> {
        self.scaler.as_ref().map(|(mean, scale)| StandardScaler {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn probabilities(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        self.check_width(&features)?;

        let logits = match &self.scaler {
            Some((mean, scale)) => {
                let standardized = (&features - &mean.view().insert_axis(Axis(0)))
                    / &scale.view().insert_axis(Axis(0));
                standardized.dot(&self.coefficients)
            }
            None => features.dot(&self.coefficients),
        };

        Ok(logits.mapv(|z| sigmoid(z + self.intercept)))
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn columns(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("x{i}")).collect()
    }

    #[test]
    fn test_probabilities_match_formula() {
        let model = LogisticModel::new(columns(2), vec![0.5, -1.0], 0.25).unwrap();
        let x = array![[1.0, 2.0], [0.0, 0.0]];

        let p = model.probabilities(x.view()).unwrap();

        assert_relative_eq!(p[0], sigmoid(0.5 - 2.0 + 0.25), epsilon = 1e-12);
        assert_relative_eq!(p[1], sigmoid(0.25), epsilon = 1e-12);
    }

    #[test]
    fn test_scaler_is_applied() {
        let model = LogisticModel::new(columns(2), vec![1.0, 1.0], 0.0)
            .unwrap()
            .with_scaler(StandardScaler {
                mean: vec![10.0, 100.0],
                scale: vec![2.0, 50.0],
            })
            .unwrap();
        let x = array![[12.0, 150.0]];

        let p = model.probabilities(x.view()).unwrap();

        assert_relative_eq!(p[0], sigmoid(1.0 + 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_predict_uses_threshold() {
        let model = LogisticModel::new(columns(1), vec![1.0], 0.0)
            .unwrap()
            .with_threshold(0.8)
            .unwrap();
        // sigmoid(1) ≈ 0.731, sigmoid(2) ≈ 0.881
        let labels = model.predict(array![[1.0], [2.0]].view()).unwrap();
        assert_eq!(
            labels,
            vec![
                crate::IncomeBracket::AtOrBelow,
                crate::IncomeBracket::Above
            ]
        );
    }

    #[test]
    fn test_rejects_wrong_width() {
        let model = LogisticModel::new(columns(3), vec![1.0, 1.0, 1.0], 0.0).unwrap();
        let err = model.probabilities(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCount {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_rejects_mismatched_coefficients() {
        assert!(matches!(
            LogisticModel::new(columns(2), vec![1.0], 0.0),
            Err(ModelError::DimensionMismatch {
                what: "coefficients",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let model = LogisticModel::new(columns(1), vec![1.0], 0.0).unwrap();
        assert!(model.clone().with_threshold(0.0).is_err());
        assert!(model.clone().with_threshold(1.0).is_err());
        assert!(model.with_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_zero_scale() {
        let model = LogisticModel::new(columns(2), vec![1.0, 1.0], 0.0).unwrap();
        let err = model
            .with_scaler(StandardScaler {
                mean: vec![0.0, 0.0],
                scale: vec![1.0, 0.0],
            })
            .unwrap_err();
        assert!(err.to_string().contains("x1"));
    }

    #[test]
    fn test_empty_batch() {
        let model = LogisticModel::new(columns(2), vec![1.0, 1.0], 0.0).unwrap();
        let x = ndarray::Array2::<f64>::zeros((0, 2));
        assert!(model.predict(x.view()).unwrap().is_empty());
    }
}
