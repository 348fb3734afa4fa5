//! Predicted income bracket.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Binary class produced by the classifier.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeBracket {
    /// Income at or below the threshold.
    #[display("<=50K")]
    #[serde(rename = "<=50K")]
    AtOrBelow,

    /// Income above the threshold.
    #[display(">50K")]
    #[serde(rename = ">50K")]
    Above,
}

impl IncomeBracket {
    /// Class for a probability of `Above`, given a decision threshold.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Self::Above
        } else {
            Self::AtOrBelow
        }
    }
}
