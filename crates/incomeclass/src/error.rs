//! Error types for the prediction service.

use incomeclass_model::ModelError;
use incomeclass_output::BatchError;
use incomeclass_schema::{EncodeError, SchemaError};
use thiserror::Error;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while building or using the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The encoding schema could not be loaded
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The model could not be loaded or failed during inference
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A record could not be encoded
    #[error("{0}")]
    Encode(#[from] EncodeError),

    /// A record of a batch could not be encoded
    #[error("Row {row}: {source}")]
    EncodeRow {
        /// Data row number, starting at 1
        row: usize,
        /// Underlying encoding error
        source: EncodeError,
    },

    /// A batch table could not be read or written
    #[error("{0}")]
    Batch(#[from] BatchError),

    /// The model was trained on different columns than the encoder produces
    #[error("Model columns {found:?} do not match feature columns {expected:?}")]
    ColumnMismatch {
        /// Feature columns produced by the encoder
        expected: Vec<String>,
        /// Columns declared by the model
        found: Vec<String>,
    },
}

impl ServiceError {
    /// Whether the error was caused by the caller's input rather than the
    /// service itself.
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Encode(_) | Self::EncodeRow { .. } | Self::Batch(_)
        )
    }
}
