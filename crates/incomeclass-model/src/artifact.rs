//! Serialized model artifacts.
//!
//! An artifact is a JSON document tagged with `model_type`. It is read once
//! at startup and turned into a boxed [`Classifier`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::classifier::Classifier;
use crate::error::{ModelError, Result};
use crate::logistic::{LogisticModel, StandardScaler};

/// Latest artifact format version this build can read.
pub const FORMAT_VERSION: u32 = 1;

const fn default_threshold() -> f64 {
    0.5
}

/// On-disk model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Logistic regression with an optional standard scaler.
    LogisticRegression {
        /// Artifact format version.
        format_version: u32,
        /// Training column names, in order.
        columns: Vec<String>,
        /// One coefficient per column.
        coefficients: Vec<f64>,
        /// Intercept term.
        intercept: f64,
        /// Decision threshold on the positive-class probability.
        #[serde(default = "default_threshold")]
        threshold: f64,
        /// Input standardization.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scaler: Option<StandardScaler>,
    },
}

impl ModelArtifact {
    /// Parse an artifact from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the artifact as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the artifact and build the classifier it describes.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>> {
        match self {
            Self::LogisticRegression {
                format_version,
                columns,
                coefficients,
                intercept,
                threshold,
                scaler,
            } => {
                check_format(format_version)?;
                let mut model =
                    LogisticModel::new(columns, coefficients, intercept)?.with_threshold(threshold)?;
                if let Some(scaler) = scaler {
                    model = model.with_scaler(scaler)?;
                }
                Ok(Box::new(model))
            }
        }
    }
}

impl From<&LogisticModel> for ModelArtifact {
    fn from(model: &LogisticModel) -> Self {
        Self::LogisticRegression {
            format_version: FORMAT_VERSION,
            columns: model.columns().to_vec(),
            coefficients: model.coefficients().to_vec(),
            intercept: model.intercept(),
            threshold: model.threshold(),
            scaler: model.scaler(),
        }
    }
}

const fn check_format(found: u32) -> Result<()> {
    if found == 0 || found > FORMAT_VERSION {
        Err(ModelError::UnsupportedFormat {
            found,
            supported: FORMAT_VERSION,
        })
    } else {
        Ok(())
    }
}

/// Load a classifier from an artifact file.
pub fn load_model(path: impl AsRef<Path>) -> Result<Box<dyn Classifier>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let model = ModelArtifact::from_json(&json)?.into_classifier()?;
    info!(
        path = %path.display(),
        model = model.name(),
        columns = model.columns().len(),
        "Loaded model artifact"
    );
    Ok(model)
}
