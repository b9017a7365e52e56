//! Form schemas: the authoritative list of expected fields.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::FormLanguage;
use crate::{Error, Result};

/// Output keys that no schema field may use.
pub const RESERVED_KEYS: [&str; 3] = [
    "validation",
    "source_language_detected",
    "processing_warnings",
];

/// Expected type of a form field, which selects its format rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    String,
    /// National identity number.
    IdNumber,
    /// Telephone number.
    Phone,
    /// Calendar date.
    Date,
    /// One of a fixed set of choices.
    EnumChoice {
        /// Allowed values.
        choices: Vec<String>,
    },
}

impl FieldType {
    /// Short name used in prompts and warnings.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::IdNumber => "id-number",
            Self::Phone => "phone",
            Self::Date => "date",
            Self::EnumChoice { .. } => "enum-choice",
        }
    }

    /// Allowed values of an enum-choice field.
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            Self::EnumChoice { choices } => Some(choices),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Specification of a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique field name, used as the output key.
    pub name: String,
    /// Expected type.
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether the field counts towards completeness.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Creates a field spec.
    pub fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
        }
    }

    /// Creates a required field.
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, true)
    }

    /// Creates an optional field.
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, false)
    }
}

/// Expected fields of one form language variant.
///
/// Read-only once constructed; shared between pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    language: FormLanguage,
    fields: Vec<FieldSpec>,
    expects_regions: bool,
}

#[derive(Deserialize)]
struct RawSchema {
    language: FormLanguage,
    fields: Vec<FieldSpec>,
    #[serde(default)]
    expects_regions: bool,
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawSchema::deserialize(deserializer)?;
        Schema::new(raw.language, raw.fields)
            .map(|schema| schema.with_expected_regions(raw.expects_regions))
            .map_err(serde::de::Error::custom)
    }
}

impl Schema {
    /// Creates a schema, validating field names and choice sets.
    pub fn new(language: FormLanguage, fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::invalid_input().with_message("schema has no fields"));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            let name = field.name.trim();
            if name.is_empty() {
                return Err(Error::invalid_input().with_message("schema field with empty name"));
            }
            if RESERVED_KEYS.contains(&name) {
                return Err(Error::invalid_input()
                    .with_message(format!("field name '{}' is reserved", name)));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::invalid_input()
                    .with_message(format!("duplicate field name '{}'", field.name)));
            }
            if field.field_type.choices().is_some_and(|c| c.is_empty()) {
                return Err(Error::invalid_input()
                    .with_message(format!("enum field '{}' has no choices", field.name)));
            }
        }

        Ok(Self {
            language,
            fields,
            expects_regions: false,
        })
    }

    /// Marks whether the form is expected to yield tables or checkboxes.
    pub fn with_expected_regions(mut self, expects_regions: bool) -> Self {
        self.expects_regions = expects_regions;
        self
    }

    /// Language variant of this schema.
    pub fn language(&self) -> FormLanguage {
        self.language
    }

    /// Fields in schema order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Whether OCR output must contain tables or checkboxes to be accepted.
    pub fn expects_regions(&self) -> bool {
        self.expects_regions
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if the schema declares a field with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Required fields in schema order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicates() {
        let fields = vec![
            FieldSpec::required("idNumber", FieldType::IdNumber),
            FieldSpec::optional("idNumber", FieldType::String),
        ];
        assert!(Schema::new(FormLanguage::English, fields).is_err());
    }

    #[test]
    fn test_rejects_reserved_and_empty() {
        let reserved = vec![FieldSpec::required("validation", FieldType::String)];
        assert!(Schema::new(FormLanguage::English, reserved).is_err());
        assert!(Schema::new(FormLanguage::English, Vec::new()).is_err());

        let no_choices = vec![FieldSpec::required(
            "gender",
            FieldType::EnumChoice { choices: vec![] },
        )];
        assert!(Schema::new(FormLanguage::English, no_choices).is_err());
    }

    #[test]
    fn test_deserialize_schema_file() {
        let json = r#"{
            "language": "hebrew",
            "expects_regions": true,
            "fields": [
                {"name": "מספר זהות", "type": "id_number", "required": true},
                {"name": "מין", "type": "enum_choice", "choices": ["זכר", "נקבה"]}
            ]
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.language(), FormLanguage::Hebrew);
        assert!(schema.expects_regions());
        assert_eq!(schema.required_fields().count(), 1);
        assert_eq!(
            schema.field("מין").unwrap().field_type.choices().unwrap().len(),
            2
        );
    }

    #[test]
    fn test_deserialize_invalid_schema_file() {
        let json = r#"{"language": "english", "fields": []}"#;
        assert!(serde_json::from_str::<Schema>(json).is_err());
    }
}
