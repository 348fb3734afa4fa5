#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/incomeclass/incomeclass/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod classifier;
pub mod error;
pub mod label;
pub mod logistic;

pub use artifact::{ModelArtifact, load_model};
pub use classifier::Classifier;
pub use error::{ModelError, Result};
pub use label::IncomeBracket;
pub use logistic::{LogisticModel, StandardScaler};
