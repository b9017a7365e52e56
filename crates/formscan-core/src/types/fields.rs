//! Extracted field values.

use serde::{Deserialize, Serialize};

use super::Schema;

/// Value extracted for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Extracted value; `None` when the field was not filled.
    pub value: Option<String>,
    /// OCR confidence of the region the value was read from, when attributable.
    pub confidence: Option<f64>,
}

impl FieldValue {
    /// Creates a value without confidence information.
    pub fn new(value: Option<String>) -> Self {
        Self {
            value,
            confidence: None,
        }
    }

    /// Returns the value if it is present and not blank.
    pub fn filled(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Returns true if the value is null or blank.
    pub fn is_empty(&self) -> bool {
        self.filled().is_none()
    }
}

/// Mapping from field name to extracted value, in schema order.
///
/// A mapping built with [`FieldMapping::for_schema`] always contains exactly
/// the schema's field names: absent values are stored as `None`, never
/// omitted, and unknown names cannot be inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMapping {
    /// Creates a mapping with every schema field set to null.
    pub fn for_schema(schema: &Schema) -> Self {
        Self {
            entries: schema
                .field_names()
                .map(|name| (name.to_owned(), FieldValue::default()))
                .collect(),
        }
    }

    /// Builds a mapping from raw entries, keeping their order.
    ///
    /// Used when restoring serialized results; no schema check is made.
    pub fn from_entries(entries: Vec<(String, FieldValue)>) -> Self {
        Self { entries }
    }

    /// Returns the entry for `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns a mutable entry for `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns the non-blank value of `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::filled)
    }

    /// Sets the value of an existing field; returns false for unknown names.
    pub fn set(&mut self, name: &str, value: Option<String>) -> bool {
        match self.get_mut(name) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    /// Iterates over `(name, value)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterates mutably over `(name, value)` in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut FieldValue)> {
        self.entries.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the key set equals the schema's field-name set.
    pub fn matches_schema(&self, schema: &Schema) -> bool {
        self.len() == schema.fields().len() && schema.field_names().all(|n| self.get(n).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldSpec, FieldType, FormLanguage};

    fn schema() -> Schema {
        Schema::new(
            FormLanguage::English,
            vec![
                FieldSpec::required("firstName", FieldType::String),
                FieldSpec::optional("poBox", FieldType::String),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_for_schema_is_all_null() {
        let schema = schema();
        let mapping = FieldMapping::for_schema(&schema);
        assert!(mapping.matches_schema(&schema));
        assert!(mapping.iter().all(|(_, v)| v.value.is_none()));
    }

    #[test]
    fn test_set_rejects_unknown_names() {
        let schema = schema();
        let mut mapping = FieldMapping::for_schema(&schema);
        assert!(mapping.set("firstName", Some("Dana".into())));
        assert!(!mapping.set("nickname", Some("D".into())));
        assert_eq!(mapping.value("firstName"), Some("Dana"));
        assert!(mapping.matches_schema(&schema));
    }

    #[test]
    fn test_blank_values_are_empty() {
        let value = FieldValue::new(Some("   ".into()));
        assert!(value.is_empty());
        assert!(FieldValue::default().is_empty());
    }
}
