//! Classifier trait implemented by every loadable model.

use ndarray::{Array1, ArrayView2};
use std::fmt;

use crate::error::{ModelError, Result};
use crate::label::IncomeBracket;

/// A trained binary income classifier.
///
/// Rows of the feature matrix are records, columns follow
/// [`Classifier::columns`].
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Short model type name, for logs.
    fn name(&self) -> &str;

    /// Column names the model was trained on, in order.
    fn columns(&self) -> &[String];

    /// Probability of [`IncomeBracket::Above`] for each row.
    fn probabilities(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>>;

    /// Probability at or above which a row is classified as above.
    fn threshold(&self) -> f64 {
        0.5
    }

    /// Predicted bracket for each row.
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<IncomeBracket>> {
        let threshold = self.threshold();
        Ok(self
            .probabilities(features)?
            .iter()
            .map(|p| IncomeBracket::from_probability(*p, threshold))
            .collect())
    }

    /// Check that a matrix has one column per trained feature.
    fn check_width(&self, features: &ArrayView2<'_, f64>) -> Result<()> {
        let expected = self.columns().len();
        if features.ncols() == expected {
            Ok(())
        } else {
            Err(ModelError::FeatureCount {
                expected,
                actual: features.ncols(),
            })
        }
    }
}
