//! Feature column definitions.
//!
//! The trained model consumes thirteen columns in a fixed order. Six are
//! integers passed through unchanged, seven are categorical labels that must
//! be replaced by their training-time codes.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SchemaError;

/// Categorical feature columns.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CategoricalField {
    /// Employer type.
    #[display("workclass")]
    Workclass,

    /// Marital status.
    #[display("marital-status")]
    MaritalStatus,

    /// Job role.
    #[display("occupation")]
    Occupation,

    /// Relationship within the household.
    #[display("relationship")]
    Relationship,

    /// Race.
    #[display("race")]
    Race,

    /// Gender.
    #[display("gender")]
    Gender,

    /// Country of origin.
    #[display("native-country")]
    NativeCountry,
}

impl CategoricalField {
    /// Returns all categorical fields in training column order.
    pub const fn all() -> [Self; 7] {
        [
            Self::Workclass,
            Self::MaritalStatus,
            Self::Occupation,
            Self::Relationship,
            Self::Race,
            Self::Gender,
            Self::NativeCountry,
        ]
    }

    /// Column name used in the training data.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Workclass => "workclass",
            Self::MaritalStatus => "marital-status",
            Self::Occupation => "occupation",
            Self::Relationship => "relationship",
            Self::Race => "race",
            Self::Gender => "gender",
            Self::NativeCountry => "native-country",
        }
    }

    /// Human-readable caption for form controls.
    pub const fn caption(&self) -> &'static str {
        match self {
            Self::Workclass => "Workclass",
            Self::MaritalStatus => "Marital Status",
            Self::Occupation => "Job Role",
            Self::Relationship => "Relationship",
            Self::Race => "Race",
            Self::Gender => "Gender",
            Self::NativeCountry => "Native Country",
        }
    }
}

impl FromStr for CategoricalField {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| SchemaError::UnknownField(s.to_string()))
    }
}

/// Inclusive bounds and default for an interactively entered number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericBounds {
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
    /// Value preselected in the form.
    pub default: i64,
}

impl NumericBounds {
    /// Whether `value` lies within the bounds.
    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Numeric feature columns.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumericField {
    /// Age in years.
    #[display("age")]
    Age,

    /// Census final weight.
    #[display("fnlwgt")]
    Fnlwgt,

    /// Education level as a number.
    #[display("educational-num")]
    EducationalNum,

    /// Capital gain.
    #[display("capital-gain")]
    CapitalGain,

    /// Capital loss.
    #[display("capital-loss")]
    CapitalLoss,

    /// Hours worked per week.
    #[display("hours-per-week")]
    HoursPerWeek,
}

impl NumericField {
    /// Returns all numeric fields in training column order.
    pub const fn all() -> [Self; 6] {
        [
            Self::Age,
            Self::Fnlwgt,
            Self::EducationalNum,
            Self::CapitalGain,
            Self::CapitalLoss,
            Self::HoursPerWeek,
        ]
    }

    /// Column name used in the training data.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Fnlwgt => "fnlwgt",
            Self::EducationalNum => "educational-num",
            Self::CapitalGain => "capital-gain",
            Self::CapitalLoss => "capital-loss",
            Self::HoursPerWeek => "hours-per-week",
        }
    }

    /// Human-readable caption for form controls.
    pub const fn caption(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Fnlwgt => "Final Weight (fnlwgt)",
            Self::EducationalNum => "Educational Number",
            Self::CapitalGain => "Capital Gain",
            Self::CapitalLoss => "Capital Loss",
            Self::HoursPerWeek => "Hours per week",
        }
    }

    /// Accepted range and default for interactive input.
    pub const fn bounds(&self) -> NumericBounds {
        let (min, max, default) = match self {
            Self::Age => (18, 65, 30),
            Self::Fnlwgt => (10_000, 1_000_000, 50_000),
            Self::EducationalNum => (1, 16, 10),
            Self::CapitalGain => (0, 100_000, 0),
            Self::CapitalLoss => (0, 5_000, 0),
            Self::HoursPerWeek => (1, 80, 40),
        };
        NumericBounds { min, max, default }
    }
}

/// One column of the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    /// Integer passthrough column.
    Numeric(NumericField),
    /// Label column replaced by a code.
    Categorical(CategoricalField),
}

impl FeatureColumn {
    /// Column name used in the training data.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Numeric(field) => field.column(),
            Self::Categorical(field) => field.column(),
        }
    }
}

/// Model input columns, in training order.
pub const FEATURE_COLUMNS: [FeatureColumn; 13] = [
    FeatureColumn::Numeric(NumericField::Age),
    FeatureColumn::Categorical(CategoricalField::Workclass),
    FeatureColumn::Numeric(NumericField::Fnlwgt),
    FeatureColumn::Numeric(NumericField::EducationalNum),
    FeatureColumn::Categorical(CategoricalField::MaritalStatus),
    FeatureColumn::Categorical(CategoricalField::Occupation),
    FeatureColumn::Categorical(CategoricalField::Relationship),
    FeatureColumn::Categorical(CategoricalField::Race),
    FeatureColumn::Categorical(CategoricalField::Gender),
    FeatureColumn::Numeric(NumericField::CapitalGain),
    FeatureColumn::Numeric(NumericField::CapitalLoss),
    FeatureColumn::Numeric(NumericField::HoursPerWeek),
    FeatureColumn::Categorical(CategoricalField::NativeCountry),
];

/// Names of [`FEATURE_COLUMNS`], in order.
pub fn feature_column_names() -> Vec<&'static str> {
    FEATURE_COLUMNS.iter().map(FeatureColumn::name).collect()
}
