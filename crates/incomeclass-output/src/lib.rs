#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/incomeclass/incomeclass/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod report;

pub use batch::{BatchError, BatchTable, DOWNLOAD_FILE_NAME, PREDICTION_COLUMN, PredictedTable};
pub use report::{PredictionReport, ReportError, ReportFormat};
