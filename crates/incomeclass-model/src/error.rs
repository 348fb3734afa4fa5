//! Error types for model loading and inference.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while loading or running a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The artifact could not be read
    #[error("IO error reading model artifact: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact is not valid JSON for any known model type
    #[error("Model artifact parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact format version is not supported
    #[error("Unsupported model format version {found} (supported: {supported})")]
    UnsupportedFormat {
        /// Version in the artifact
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// Parameter vector lengths disagree
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which parameter is wrong
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A parameter has an invalid value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input matrix has the wrong number of columns
    #[error("Expected {expected} feature columns, got {actual}")]
    FeatureCount {
        /// Columns the model was trained on
        expected: usize,
        /// Columns supplied
        actual: usize,
    },
}
