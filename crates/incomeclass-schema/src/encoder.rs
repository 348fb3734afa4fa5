//! Feature encoder.
//!
//! Replaces every categorical label of a [`FeatureRecord`] with the code the
//! model was trained on. Numeric fields pass through untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::EncodeError;
use crate::field::CategoricalField;
use crate::record::{EncodedRecord, FeatureRecord};
use crate::schema::EncodingSchema;

/// What to do with a label that has no code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownLabelPolicy {
    /// Fail with [`EncodeError::UnknownLabel`].
    #[default]
    Reject,

    /// Use the field's fallback label; fields without one still fail.
    Fallback,
}

impl FromStr for UnknownLabelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "fallback" => Ok(Self::Fallback),
            other => Err(format!(
                "unknown policy '{other}' (expected 'reject' or 'fallback')"
            )),
        }
    }
}

impl fmt::Display for UnknownLabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Encodes feature records against an [`EncodingSchema`].
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: EncodingSchema,
    lookup: HashMap<CategoricalField, HashMap<String, u32>>,
    policy: UnknownLabelPolicy,
}

impl FeatureEncoder {
    /// Create an encoder that rejects unknown labels.
    pub fn new(schema: EncodingSchema) -> Self {
        let lookup = CategoricalField::all()
            .into_iter()
            .map(|field| {
                let codes = schema
                    .table(field)
                    .map(|table| {
                        table
                            .entries
                            .iter()
                            .map(|entry| (entry.label.clone(), entry.code))
                            .collect()
                    })
                    .unwrap_or_default();
                (field, codes)
            })
            .collect();

        Self {
            schema,
            lookup,
            policy: UnknownLabelPolicy::default(),
        }
    }

    /// Set the unknown-label policy.
    pub const fn with_policy(mut self, policy: UnknownLabelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Schema the encoder was built from.
    pub const fn schema(&self) -> &EncodingSchema {
        &self.schema
    }

    /// Active unknown-label policy.
    pub const fn policy(&self) -> UnknownLabelPolicy {
        self.policy
    }

    /// Code for one label, applying the unknown-label policy.
    pub fn code(&self, field: CategoricalField, label: &str) -> Result<u32, EncodeError> {
        let codes = &self.lookup[&field];
        if let Some(code) = codes.get(label) {
            return Ok(*code);
        }

        if self.policy == UnknownLabelPolicy::Fallback
            && let Some(code) = self
                .schema
                .fallback(field)
                .and_then(|fallback| codes.get(fallback))
        {
            return Ok(*code);
        }

        Err(EncodeError::UnknownLabel {
            field,
            label: label.to_string(),
        })
    }

    /// Encode a record.
    ///
    /// Fails on the first categorical field, in column order, whose label
    /// cannot be encoded.
    pub fn encode(&self, record: &FeatureRecord) -> Result<EncodedRecord, EncodeError> {
        let code = |field| self.code(field, record.label(field));

        Ok(EncodedRecord {
            age: record.age,
            workclass: code(CategoricalField::Workclass)?,
            fnlwgt: record.fnlwgt,
            educational_num: record.educational_num,
            marital_status: code(CategoricalField::MaritalStatus)?,
            occupation: code(CategoricalField::Occupation)?,
            relationship: code(CategoricalField::Relationship)?,
            race: code(CategoricalField::Race)?,
            gender: code(CategoricalField::Gender)?,
            capital_gain: record.capital_gain,
            capital_loss: record.capital_loss,
            hours_per_week: record.hours_per_week,
            native_country: code(CategoricalField::NativeCountry)?,
        })
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(EncodingSchema::builtin())
    }
}
