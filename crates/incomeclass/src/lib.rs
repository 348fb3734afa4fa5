#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/incomeclass/incomeclass/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod service;

// Re-export main types from sub-crates
pub use incomeclass_model as model;
pub use incomeclass_output as output;
pub use incomeclass_schema as schema;

pub use error::{Result, ServiceError};
pub use service::{Prediction, PredictionService, ServiceConfig};

// Re-export common types
pub use incomeclass_model::{Classifier, IncomeBracket};
pub use incomeclass_output::{BatchTable, PredictedTable, PredictionReport};
pub use incomeclass_schema::{
    CategoricalField, EncodedRecord, EncodingSchema, FeatureEncoder, FeatureRecord, NumericField,
    UnknownLabelPolicy,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
