//! Batch prediction tables.
//!
//! An uploaded table must carry exactly the model's training columns, in
//! order. Cells are kept verbatim so the augmented output reproduces the
//! upload with one extra column.

use csv::{ReaderBuilder, StringRecord, Writer};
use incomeclass_schema::{FEATURE_COLUMNS, FeatureColumn, FeatureRecord, feature_column_names};
use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Name of the column appended to batch output.
pub const PREDICTION_COLUMN: &str = "PredictedClass";

/// File name offered for the augmented table.
pub const DOWNLOAD_FILE_NAME: &str = "predicted_classes.csv";

/// Result type for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Errors that can occur while reading or writing batch tables.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The upload is not well-formed CSV.
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header does not match the model columns.
    #[error("Uploaded columns do not match the model schema: {detail}")]
    SchemaMismatch {
        /// Columns the model expects, in order
        expected: Vec<String>,
        /// Columns found in the upload
        found: Vec<String>,
        /// First difference, phrased for the user
        detail: String,
    },

    /// A numeric cell is not an integer.
    #[error("Row {row}: column '{column}' must be an integer, got '{value}'")]
    InvalidNumber {
        /// Data row number, starting at 1
        row: usize,
        /// Column name
        column: &'static str,
        /// Cell contents
        value: String,
    },

    /// The number of predictions differs from the number of rows.
    #[error("Got {actual} predictions for {expected} rows")]
    PredictionCount {
        /// Rows in the table
        expected: usize,
        /// Predictions supplied
        actual: usize,
    },
}

fn check_header(headers: &StringRecord) -> Result<()> {
    let expected = feature_column_names();
    let found: Vec<&str> = headers.iter().collect();
    if found == expected {
        return Ok(());
    }

    let detail = match expected.iter().zip(&found).position(|(e, f)| e != f) {
        Some(i) => format!(
            "column {} is '{}', expected '{}'",
            i + 1,
            found[i],
            expected[i]
        ),
        None if found.len() < expected.len() => format!(
            "missing column '{}' (expected {} columns, found {})",
            expected[found.len()],
            expected.len(),
            found.len()
        ),
        None => format!(
            "unexpected extra column '{}' (expected {} columns, found {})",
            found[expected.len()],
            expected.len(),
            found.len()
        ),
    };

    Err(BatchError::SchemaMismatch {
        expected: expected.iter().map(|s| s.to_string()).collect(),
        found: found.iter().map(|s| s.to_string()).collect(),
        detail,
    })
}

/// An uploaded table whose header matches the model columns.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl BatchTable {
    /// Read a table from CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader.headers()?.clone();
        check_header(&headers)?;

        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    /// Read a table from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Header row.
    pub const fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Data rows, verbatim.
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse every row into a feature record.
    ///
    /// Numeric cells must be integers. Categorical cells are trimmed of
    /// surrounding whitespace; the stored cells are left untouched.
    pub fn feature_records(&self) -> Result<Vec<FeatureRecord>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(i + 1, row))
            .collect()
    }

    /// Append one prediction per row.
    pub fn with_predictions<I, T>(self, predictions: I) -> Result<PredictedTable>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let predictions: Vec<String> = predictions.into_iter().map(|p| p.to_string()).collect();
        if predictions.len() != self.rows.len() {
            return Err(BatchError::PredictionCount {
                expected: self.rows.len(),
                actual: predictions.len(),
            });
        }

        let mut headers = self.headers;
        headers.push_field(PREDICTION_COLUMN);

        let rows = self
            .rows
            .into_iter()
            .zip(predictions)
            .map(|(mut row, prediction)| {
                row.push_field(&prediction);
                row
            })
            .collect();

        Ok(PredictedTable { headers, rows })
    }
}

fn parse_row(row_number: usize, row: &StringRecord) -> Result<FeatureRecord> {
    let mut record = FeatureRecord::default();

    for (i, column) in FEATURE_COLUMNS.iter().enumerate() {
        let cell = row.get(i).unwrap_or_default();
        match column {
            FeatureColumn::Numeric(field) => {
                let value = cell.trim().parse::<i64>().map_err(|_| BatchError::InvalidNumber {
                    row: row_number,
                    column: field.column(),
                    value: cell.to_string(),
                })?;
                *record.numeric_mut(*field) = value;
            }
            FeatureColumn::Categorical(field) => {
                *record.label_mut(*field) = cell.trim().to_string();
            }
        }
    }

    Ok(record)
}

/// A batch table with a prediction column appended.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl PredictedTable {
    /// Header row, ending with [`PREDICTION_COLUMN`].
    pub const fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Data rows, each ending with its prediction.
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV with a header row.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The table as UTF-8 CSV bytes.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Write the table to a CSV file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_to(File::create(path)?)
    }
}
