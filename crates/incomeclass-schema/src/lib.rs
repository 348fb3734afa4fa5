#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/incomeclass/incomeclass/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod encoder;
pub mod error;
pub mod field;
pub mod record;
pub mod schema;

pub use encoder::{FeatureEncoder, UnknownLabelPolicy};
pub use error::{EncodeError, SchemaError};
pub use field::{
    CategoricalField, FEATURE_COLUMNS, FeatureColumn, NumericBounds, NumericField,
    feature_column_names,
};
pub use record::{EncodedRecord, FeatureRecord};
pub use schema::{CategoryEntry, CategoryTable, EncodingSchema, SCHEMA_VERSION};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
