//! Reports for single predictions.

use chrono::{DateTime, Utc};
use incomeclass_model::IncomeBracket;
use incomeclass_schema::{CategoricalField, EncodedRecord, FeatureRecord, NumericField};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during report rendering.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Formatting error.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Invalid format name.
    #[error("Invalid format: {0} (expected text, json or pretty-json)")]
    InvalidFormat(String),
}

/// Report output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text.
    #[default]
    Text,

    /// Compact JSON.
    Json,

    /// Pretty-printed JSON.
    PrettyJson,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "pretty-json" => Ok(Self::PrettyJson),
            other => Err(ReportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Outcome of one interactive prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Record as entered.
    pub input: FeatureRecord,

    /// Record as passed to the model.
    pub encoded: EncodedRecord,

    /// Predicted bracket.
    pub prediction: IncomeBracket,

    /// Model probability of the above-threshold bracket.
    pub probability: f64,
}

impl PredictionReport {
    /// Create a new report stamped with the current time.
    pub fn new(
        input: FeatureRecord,
        encoded: EncodedRecord,
        prediction: IncomeBracket,
        probability: f64,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            input,
            encoded,
            prediction,
            probability,
        }
    }

    /// Render the report in the given format.
    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => self.to_text(),
            ReportFormat::Json => Ok(serde_json::to_string(self)?),
            ReportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn to_text(&self) -> Result<String, ReportError> {
        let mut out = String::new();
        writeln!(out, "Input Data")?;
        writeln!(out, "{}", "─".repeat(44))?;

        let input = &self.input;
        let encoded = &self.encoded;
        for field in NumericField::all() {
            writeln!(out, "{:<24} {:>19}", field.caption(), input.numeric(field))?;
        }
        for field in CategoricalField::all() {
            let shown = format!("{} ({})", input.label(field), encoded.code(field));
            writeln!(out, "{:<24} {:>19}", field.caption(), shown)?;
        }

        writeln!(out, "{}", "─".repeat(44))?;
        writeln!(
            out,
            "Prediction: {} (p(>50K) = {:.3})",
            self.prediction, self.probability
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incomeclass_schema::FeatureEncoder;

    fn report() -> PredictionReport {
        let input = FeatureRecord::default();
        let encoded = FeatureEncoder::default().encode(&input).unwrap();
        PredictionReport::new(input, encoded, IncomeBracket::AtOrBelow, 0.105)
    }

    #[test]
    fn test_text_report() {
        let text = report().render(ReportFormat::Text).unwrap();
        assert!(text.contains("Prediction: <=50K (p(>50K) = 0.105)"));
        assert!(text.contains("Private (4)"));
        assert!(text.contains("United-States (39)"));
    }

    #[test]
    fn test_json_report() {
        let json = report().render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["prediction"], "<=50K");
        assert_eq!(value["input"]["workclass"], "Private");
        assert_eq!(value["encoded"]["workclass"], 4);
        assert_eq!(value["encoded"]["hours-per-week"], 40);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!(
            "pretty-json".parse::<ReportFormat>().unwrap(),
            ReportFormat::PrettyJson
        );
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
