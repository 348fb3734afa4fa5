//! Versioned categorical encoding schema.
//!
//! The label → code tables were fixed when the model was trained. They are
//! kept in one [`EncodingSchema`] value that can be serialized as a JSON
//! artifact and shared with the training pipeline, instead of living as
//! literals next to every call site.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::SchemaError;
use crate::field::CategoricalField;

/// Latest schema version this build can read.
pub const SCHEMA_VERSION: u32 = 1;

/// One label and the code the model was trained with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Human-readable label.
    pub label: String,
    /// Training-time code.
    pub code: u32,
}

impl CategoryEntry {
    /// Create a new entry.
    pub fn new(label: impl Into<String>, code: u32) -> Self {
        Self {
            label: label.into(),
            code,
        }
    }
}

/// Label → code table for one categorical field.
///
/// Entries keep their display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Entries in display order.
    pub entries: Vec<CategoryEntry>,

    /// Label substituted for unknown input when fallback is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl CategoryTable {
    fn from_pairs(pairs: &[(&str, u32)], fallback: Option<&str>) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(label, code)| CategoryEntry::new(*label, *code))
                .collect(),
            fallback: fallback.map(str::to_string),
        }
    }

    /// Code for a label.
    pub fn code(&self, label: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.code)
    }

    /// Label for a code.
    pub fn label(&self, code: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.label.as_str())
    }

    /// Labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.label.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validate(&self, field: CategoricalField) -> Result<(), SchemaError> {
        if self.entries.is_empty() {
            return Err(SchemaError::EmptyTable(field));
        }

        let mut labels = HashSet::new();
        let mut codes = HashSet::new();
        for entry in &self.entries {
            if !labels.insert(entry.label.as_str()) {
                return Err(SchemaError::DuplicateLabel {
                    field,
                    label: entry.label.clone(),
                });
            }
            if !codes.insert(entry.code) {
                return Err(SchemaError::DuplicateCode {
                    field,
                    code: entry.code,
                });
            }
        }

        if let Some(fallback) = &self.fallback
            && !labels.contains(fallback.as_str())
        {
            return Err(SchemaError::InvalidFallback {
                field,
                label: fallback.clone(),
            });
        }

        Ok(())
    }
}

/// All categorical tables, tagged with a version.
///
/// Deserializing validates the tables, so every value has passed the same
/// checks as [`EncodingSchema::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingSchema {
    /// Schema version.
    pub version: u32,
    fields: BTreeMap<CategoricalField, CategoryTable>,
}

/// Wire form of [`EncodingSchema`] before validation.
#[derive(Deserialize)]
struct RawEncodingSchema {
    version: u32,
    fields: BTreeMap<CategoricalField, CategoryTable>,
}

impl<'de> Deserialize<'de> for EncodingSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEncodingSchema::deserialize(deserializer)?;
        Self::new(raw.version, raw.fields).map_err(serde::de::Error::custom)
    }
}

impl EncodingSchema {
    /// Build a schema from tables, validating them.
    pub fn new(
        version: u32,
        fields: BTreeMap<CategoricalField, CategoryTable>,
    ) -> Result<Self, SchemaError> {
        let schema = Self { version, fields };
        schema.validate()?;
        Ok(schema)
    }

    /// The version 1 tables the bundled model was trained with.
    pub fn builtin() -> Self {
        let mut fields = BTreeMap::new();

        fields.insert(
            CategoricalField::Workclass,
            CategoryTable::from_pairs(
                &[
                    ("Private", 4),
                    ("Self-emp-not-inc", 5),
                    ("Self-emp-inc", 3),
                    ("Federal-gov", 0),
                    ("Local-gov", 1),
                    ("State-gov", 6),
                    ("Without-pay", 7),
                    ("Never-worked", 2),
                    ("Others", 8),
                ],
                Some("Others"),
            ),
        );
        fields.insert(
            CategoricalField::Gender,
            CategoryTable::from_pairs(&[("Male", 1), ("Female", 0)], None),
        );
        fields.insert(
            CategoricalField::Race,
            CategoryTable::from_pairs(
                &[
                    ("White", 4),
                    ("Black", 0),
                    ("Asian-Pac-Islander", 1),
                    ("Amer-Indian-Eskimo", 2),
                    ("Other", 3),
                ],
                Some("Other"),
            ),
        );
        fields.insert(
            CategoricalField::Relationship,
            CategoryTable::from_pairs(
                &[
                    ("Wife", 5),
                    ("Own-child", 1),
                    ("Husband", 2),
                    ("Not-in-family", 3),
                    ("Other-relative", 4),
                    ("Unmarried", 0),
                ],
                None,
            ),
        );
        fields.insert(
            CategoricalField::MaritalStatus,
            CategoryTable::from_pairs(
                &[
                    ("Never-married", 2),
                    ("Married-civ-spouse", 1),
                    ("Divorced", 0),
                    ("Separated", 3),
                    ("Widowed", 5),
                    ("Married-spouse-absent", 4),
                    ("Married-AF-spouse", 6),
                ],
                None,
            ),
        );
        fields.insert(
            CategoricalField::Occupation,
            CategoryTable::from_pairs(
                &[
                    ("Tech-support", 12),
                    ("Craft-repair", 4),
                    ("Other-service", 10),
                    ("Sales", 11),
                    ("Exec-managerial", 5),
                    ("Prof-specialty", 9),
                    ("Handlers-cleaners", 6),
                    ("Machine-op-inspct", 7),
                    ("Adm-clerical", 0),
                    ("Farming-fishing", 3),
                    ("Transport-moving", 13),
                    ("Priv-house-serv", 8),
                    ("Protective-serv", 14),
                    ("Armed-Forces", 1),
                ],
                None,
            ),
        );
        // "Other" is 100, outside the range of the named countries.
        fields.insert(
            CategoricalField::NativeCountry,
            CategoryTable::from_pairs(
                &[
                    ("United-States", 39),
                    ("Mexico", 24),
                    ("Philippines", 28),
                    ("Germany", 12),
                    ("Canada", 6),
                    ("India", 17),
                    ("England", 9),
                    ("China", 7),
                    ("Cuba", 8),
                    ("Iran", 18),
                    ("Jamaica", 19),
                    ("Vietnam", 38),
                    ("Italy", 20),
                    ("Poland", 27),
                    ("France", 13),
                    ("Japan", 21),
                    ("Greece", 16),
                    ("South", 35),
                    ("Puerto-Rico", 30),
                    ("Other", 100),
                ],
                Some("Other"),
            ),
        );

        Self {
            version: SCHEMA_VERSION,
            fields,
        }
    }

    /// Parse and validate a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: RawEncodingSchema = serde_json::from_str(json)?;
        Self::new(raw.version, raw.fields)
    }

    /// Read and validate a schema artifact from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize the schema as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Table for a field.
    ///
    /// Every field has a table once the schema is validated.
    pub fn table(&self, field: CategoricalField) -> Option<&CategoryTable> {
        self.fields.get(&field)
    }

    /// Code for a label in a field's table.
    pub fn code(&self, field: CategoricalField, label: &str) -> Option<u32> {
        self.table(field)?.code(label)
    }

    /// Label for a code in a field's table.
    pub fn label_for_code(&self, field: CategoricalField, code: u32) -> Option<&str> {
        self.table(field)?.label(code)
    }

    /// Labels of a field in display order.
    pub fn labels(&self, field: CategoricalField) -> Vec<&str> {
        self.table(field)
            .map(|table| table.labels().collect())
            .unwrap_or_default()
    }

    /// Fallback label of a field, if it declares one.
    pub fn fallback(&self, field: CategoricalField) -> Option<&str> {
        self.table(field)?.fallback.as_deref()
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.version == 0 || self.version > SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: self.version,
                supported: SCHEMA_VERSION,
            });
        }

        for field in CategoricalField::all() {
            self.table(field)
                .ok_or(SchemaError::MissingField(field))?
                .validate(field)?;
        }

        Ok(())
    }
}

impl Default for EncodingSchema {
    fn default() -> Self {
        Self::builtin()
    }
}
