//! Feature records before and after encoding.

use serde::{Deserialize, Serialize};

use crate::field::{CategoricalField, FEATURE_COLUMNS, FeatureColumn, NumericField};

/// One employee's attributes with human-readable categorical labels.
///
/// Field names serialize to the training column names
/// (`educational-num`, `hours-per-week`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureRecord {
    /// Age in years.
    pub age: i64,
    /// Employer type label.
    pub workclass: String,
    /// Census final weight.
    pub fnlwgt: i64,
    /// Education level as a number.
    pub educational_num: i64,
    /// Marital status label.
    pub marital_status: String,
    /// Job role label.
    pub occupation: String,
    /// Household relationship label.
    pub relationship: String,
    /// Race label.
    pub race: String,
    /// Gender label.
    pub gender: String,
    /// Capital gain.
    pub capital_gain: i64,
    /// Capital loss.
    pub capital_loss: i64,
    /// Hours worked per week.
    pub hours_per_week: i64,
    /// Country of origin label.
    pub native_country: String,
}

impl FeatureRecord {
    /// Label held in a categorical field.
    pub fn label(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Workclass => &self.workclass,
            CategoricalField::MaritalStatus => &self.marital_status,
            CategoricalField::Occupation => &self.occupation,
            CategoricalField::Relationship => &self.relationship,
            CategoricalField::Race => &self.race,
            CategoricalField::Gender => &self.gender,
            CategoricalField::NativeCountry => &self.native_country,
        }
    }

    /// Mutable access to a categorical label.
    pub const fn label_mut(&mut self, field: CategoricalField) -> &mut String {
        match field {
            CategoricalField::Workclass => &mut self.workclass,
            CategoricalField::MaritalStatus => &mut self.marital_status,
            CategoricalField::Occupation => &mut self.occupation,
            CategoricalField::Relationship => &mut self.relationship,
            CategoricalField::Race => &mut self.race,
            CategoricalField::Gender => &mut self.gender,
            CategoricalField::NativeCountry => &mut self.native_country,
        }
    }

    /// Value held in a numeric field.
    pub const fn numeric(&self, field: NumericField) -> i64 {
        match field {
            NumericField::Age => self.age,
            NumericField::Fnlwgt => self.fnlwgt,
            NumericField::EducationalNum => self.educational_num,
            NumericField::CapitalGain => self.capital_gain,
            NumericField::CapitalLoss => self.capital_loss,
            NumericField::HoursPerWeek => self.hours_per_week,
        }
    }

    /// Mutable access to a numeric value.
    pub const fn numeric_mut(&mut self, field: NumericField) -> &mut i64 {
        match field {
            NumericField::Age => &mut self.age,
            NumericField::Fnlwgt => &mut self.fnlwgt,
            NumericField::EducationalNum => &mut self.educational_num,
            NumericField::CapitalGain => &mut self.capital_gain,
            NumericField::CapitalLoss => &mut self.capital_loss,
            NumericField::HoursPerWeek => &mut self.hours_per_week,
        }
    }

    /// Values as strings, in training column order.
    pub fn to_row(&self) -> Vec<String> {
        FEATURE_COLUMNS
            .iter()
            .map(|column| match column {
                FeatureColumn::Numeric(field) => self.numeric(*field).to_string(),
                FeatureColumn::Categorical(field) => self.label(*field).to_string(),
            })
            .collect()
    }

    /// Numeric fields that fall outside their interactive bounds.
    pub fn out_of_bounds(&self) -> Vec<(NumericField, i64)> {
        NumericField::all()
            .into_iter()
            .map(|field| (field, self.numeric(field)))
            .filter(|(field, value)| !field.bounds().contains(*value))
            .collect()
    }
}

impl Default for FeatureRecord {
    /// The values preselected in the interactive form.
    fn default() -> Self {
        Self {
            age: NumericField::Age.bounds().default,
            workclass: "Private".to_string(),
            fnlwgt: NumericField::Fnlwgt.bounds().default,
            educational_num: NumericField::EducationalNum.bounds().default,
            marital_status: "Never-married".to_string(),
            occupation: "Tech-support".to_string(),
            relationship: "Wife".to_string(),
            race: "White".to_string(),
            gender: "Male".to_string(),
            capital_gain: NumericField::CapitalGain.bounds().default,
            capital_loss: NumericField::CapitalLoss.bounds().default,
            hours_per_week: NumericField::HoursPerWeek.bounds().default,
            native_country: "United-States".to_string(),
        }
    }
}

/// A feature record with every categorical label replaced by its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EncodedRecord {
    /// Age in years.
    pub age: i64,
    /// Employer type code.
    pub workclass: u32,
    /// Census final weight.
    pub fnlwgt: i64,
    /// Education level as a number.
    pub educational_num: i64,
    /// Marital status code.
    pub marital_status: u32,
    /// Job role code.
    pub occupation: u32,
    /// Household relationship code.
    pub relationship: u32,
    /// Race code.
    pub race: u32,
    /// Gender code.
    pub gender: u32,
    /// Capital gain.
    pub capital_gain: i64,
    /// Capital loss.
    pub capital_loss: i64,
    /// Hours worked per week.
    pub hours_per_week: i64,
    /// Country of origin code.
    pub native_country: u32,
}

impl EncodedRecord {
    /// Code held in a categorical field.
    pub const fn code(&self, field: CategoricalField) -> u32 {
        match field {
            CategoricalField::Workclass => self.workclass,
            CategoricalField::MaritalStatus => self.marital_status,
            CategoricalField::Occupation => self.occupation,
            CategoricalField::Relationship => self.relationship,
            CategoricalField::Race => self.race,
            CategoricalField::Gender => self.gender,
            CategoricalField::NativeCountry => self.native_country,
        }
    }

    /// Value held in a numeric field.
    pub const fn numeric(&self, field: NumericField) -> i64 {
        match field {
            NumericField::Age => self.age,
            NumericField::Fnlwgt => self.fnlwgt,
            NumericField::EducationalNum => self.educational_num,
            NumericField::CapitalGain => self.capital_gain,
            NumericField::CapitalLoss => self.capital_loss,
            NumericField::HoursPerWeek => self.hours_per_week,
        }
    }

    /// Model input vector, in training column order.
    pub fn to_features(&self) -> [f64; 13] {
        FEATURE_COLUMNS.map(|column| match column {
            FeatureColumn::Numeric(field) => self.numeric(field) as f64,
            FeatureColumn::Categorical(field) => f64::from(self.code(field)),
        })
    }
}
