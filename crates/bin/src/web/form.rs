//! Decoding and checking interactive input.

use incomeclass::{CategoricalField, FeatureRecord, NumericField};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum FormError {
    #[error("Form body is not valid form data: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),
}

/// A submitted form, possibly with problems to show next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Submission {
    pub(crate) record: FeatureRecord,
    pub(crate) problems: Vec<String>,
}

/// Messages for numeric values outside their interactive bounds.
pub(crate) fn check_bounds(record: &FeatureRecord) -> Vec<String> {
    record
        .out_of_bounds()
        .into_iter()
        .map(|(field, value)| {
            let bounds = field.bounds();
            format!(
                "{} must be between {} and {}, got {}",
                field.caption(),
                bounds.min,
                bounds.max,
                value
            )
        })
        .collect()
}

/// Decode an `application/x-www-form-urlencoded` body.
///
/// Fields missing from the body keep their form defaults and unknown keys
/// are ignored. Entered values are kept even when they are invalid so the
/// form can be shown again as the user filled it in.
pub(crate) fn parse_submission(body: &[u8]) -> Result<Submission, FormError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;

    let mut record = FeatureRecord::default();
    let mut problems = Vec::new();

    for (key, value) in pairs {
        if let Some(field) = NumericField::all().into_iter().find(|f| f.column() == key) {
            match value.trim().parse() {
                Ok(number) => *record.numeric_mut(field) = number,
                Err(_) => problems.push(format!(
                    "{} must be a whole number, got '{}'",
                    field.caption(),
                    value
                )),
            }
        } else if let Ok(field) = key.parse::<CategoricalField>() {
            *record.label_mut(field) = value;
        }
    }

    problems.extend(check_bounds(&record));

    Ok(Submission { record, problems })
}
