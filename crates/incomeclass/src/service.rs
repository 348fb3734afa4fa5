//! Prediction service.
//!
//! Holds the encoder and the loaded model for the lifetime of the process.
//! Both are immutable after construction, so one instance can be shared by
//! every request handler.

use incomeclass_model::{Classifier, IncomeBracket, ModelError, load_model};
use incomeclass_output::{BatchTable, PredictedTable, PredictionReport};
use incomeclass_schema::{
    EncodedRecord, EncodingSchema, FeatureEncoder, FeatureRecord, UnknownLabelPolicy,
    feature_column_names,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Result, ServiceError};

/// Where to find the artifacts the service is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Model artifact path.
    pub model_path: PathBuf,

    /// Encoding schema path; the built-in schema is used when unset.
    pub schema_path: Option<PathBuf>,

    /// Handling of categorical labels missing from the schema.
    pub unknown_labels: UnknownLabelPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best_model.json"),
            schema_path: None,
            unknown_labels: UnknownLabelPolicy::Reject,
        }
    }
}

/// Result of predicting one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Record as passed to the model.
    pub encoded: EncodedRecord,
    /// Predicted bracket.
    pub bracket: IncomeBracket,
    /// Model probability of [`IncomeBracket::Above`].
    pub probability: f64,
}

/// Encoder and model, built once and shared.
#[derive(Debug)]
pub struct PredictionService {
    encoder: FeatureEncoder,
    model: Box<dyn Classifier>,
}

impl PredictionService {
    /// Combine an encoder and a model.
    ///
    /// Fails if the model was trained on columns other than the feature
    /// columns, in order.
    pub fn new(encoder: FeatureEncoder, model: Box<dyn Classifier>) -> Result<Self> {
        let expected = feature_column_names();
        if model.columns().iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(ServiceError::ColumnMismatch {
                expected: expected.iter().map(|s| s.to_string()).collect(),
                found: model.columns().to_vec(),
            });
        }

        Ok(Self { encoder, model })
    }

    /// Load the schema and model named by `config`.
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        let schema = match &config.schema_path {
            Some(path) => {
                let schema = EncodingSchema::from_path(path)?;
                info!(path = %path.display(), version = schema.version, "Loaded encoding schema");
                schema
            }
            None => EncodingSchema::builtin(),
        };
        let encoder = FeatureEncoder::new(schema).with_policy(config.unknown_labels);
        let model = load_model(&config.model_path)?;

        Self::new(encoder, model)
    }

    /// Encoder used for every request.
    pub const fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Encoding schema in use.
    pub const fn schema(&self) -> &EncodingSchema {
        self.encoder.schema()
    }

    /// Loaded model.
    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// Predict one record.
    pub fn predict(&self, record: &FeatureRecord) -> Result<Prediction> {
        let encoded = self.encoder.encode(record)?;
        // infer returns exactly one prediction per record
        Ok(self.infer(vec![encoded])?.remove(0))
    }

    /// Predict one record and describe the outcome.
    pub fn report(&self, record: FeatureRecord) -> Result<PredictionReport> {
        let prediction = self.predict(&record)?;
        Ok(PredictionReport::new(
            record,
            prediction.encoded,
            prediction.bracket,
            prediction.probability,
        ))
    }

    /// Predict many records in one model call.
    ///
    /// Encoding stops at the first record with an unknown label; the error
    /// carries its 1-based position.
    pub fn predict_records(&self, records: &[FeatureRecord]) -> Result<Vec<Prediction>> {
        let encoded = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                self.encoder
                    .encode(record)
                    .map_err(|source| ServiceError::EncodeRow { row: i + 1, source })
            })
            .collect::<Result<Vec<_>>>()?;

        self.infer(encoded)
    }

    /// Predict every row of an uploaded table and append the results.
    pub fn predict_table(&self, table: BatchTable) -> Result<PredictedTable> {
        let records = table.feature_records()?;
        let predictions = self.predict_records(&records)?;
        info!(rows = predictions.len(), "Batch prediction complete");

        Ok(table.with_predictions(predictions.iter().map(|p| p.bracket))?)
    }

    fn infer(&self, encoded: Vec<EncodedRecord>) -> Result<Vec<Prediction>> {
        let rows: Vec<[f64; 13]> = encoded.iter().map(EncodedRecord::to_features).collect();
        let features = Array2::from_shape_fn((rows.len(), 13), |(i, j)| rows[i][j]);

        let probabilities = self.model.probabilities(features.view())?;
        if probabilities.len() != rows.len() {
            return Err(ModelError::DimensionMismatch {
                what: "probabilities",
                expected: rows.len(),
                actual: probabilities.len(),
            }
            .into());
        }
        let threshold = self.model.threshold();
        debug!(rows = rows.len(), model = self.model.name(), "Ran inference");

        Ok(encoded
            .into_iter()
            .zip(probabilities)
            .map(|(encoded, probability)| Prediction {
                encoded,
                bracket: IncomeBracket::from_probability(probability, threshold),
                probability,
            })
            .collect())
    }
}
