//! Error types for schema loading and encoding.

use thiserror::Error;

use crate::field::CategoricalField;

/// Errors raised while loading or validating an encoding schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The schema file is not valid JSON for the schema layout.
    #[error("Schema parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema version is not one this build understands.
    #[error("Unsupported schema version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the artifact
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// A categorical field has no table.
    #[error("Schema has no table for field '{0}'")]
    MissingField(CategoricalField),

    /// A categorical field table has no entries.
    #[error("Table for field '{0}' is empty")]
    EmptyTable(CategoricalField),

    /// A label appears twice in a table.
    #[error("Duplicate label '{label}' in table for field '{field}'")]
    DuplicateLabel {
        /// Field whose table is invalid
        field: CategoricalField,
        /// Repeated label
        label: String,
    },

    /// Two labels share a code in a table.
    #[error("Duplicate code {code} in table for field '{field}'")]
    DuplicateCode {
        /// Field whose table is invalid
        field: CategoricalField,
        /// Repeated code
        code: u32,
    },

    /// The declared fallback label has no entry in its table.
    #[error("Fallback label '{label}' is not in the table for field '{field}'")]
    InvalidFallback {
        /// Field whose table is invalid
        field: CategoricalField,
        /// Fallback label
        label: String,
    },

    /// A field name does not name a categorical column.
    #[error("Unknown categorical field: {0}")]
    UnknownField(String),
}

/// Errors raised while encoding a feature record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A categorical label has no code in its table.
    #[error("Unknown {field} label '{label}'")]
    UnknownLabel {
        /// Field being encoded
        field: CategoricalField,
        /// Label that was not found
        label: String,
    },
}
