//! Schema registry: the expected field set per form language.

mod builtin;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use formscan_core::types::{FormLanguage, LanguageSelector, Schema};

use crate::{Error, Result, TRACING_TARGET_SCHEMA};

const BUILTIN_ORIGIN: &str = "builtin";

/// Where schemas are loaded from.
#[derive(Debug, Clone)]
enum SchemaSource {
    Builtin,
    Directory(PathBuf),
}

/// Loads and serves one read-only schema per form language.
///
/// Each schema is loaded at most once, on first use. Concurrent first uses
/// may both load, but loading is deterministic and only one result is kept.
#[derive(Debug)]
pub struct SchemaRegistry {
    source: SchemaSource,
    english: OnceLock<Arc<Schema>>,
    hebrew: OnceLock<Arc<Schema>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaRegistry {
    /// Serves the built-in form 283 schemas.
    pub fn builtin() -> Self {
        Self::with_source(SchemaSource::Builtin)
    }

    /// Serves `schema_english.json` and `schema_hebrew.json` from `dir`,
    /// falling back to the built-in schema for a missing file.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::with_source(SchemaSource::Directory(dir.into()))
    }

    fn with_source(source: SchemaSource) -> Self {
        Self {
            source,
            english: OnceLock::new(),
            hebrew: OnceLock::new(),
        }
    }

    /// File name of the schema for `language` inside a schema directory.
    pub fn file_name(language: FormLanguage) -> &'static str {
        match language {
            FormLanguage::English => "schema_english.json",
            FormLanguage::Hebrew => "schema_hebrew.json",
        }
    }

    /// Returns the schema for `language`, loading it on first use.
    pub fn get(&self, language: FormLanguage) -> Result<Arc<Schema>> {
        let cell = match language {
            FormLanguage::English => &self.english,
            FormLanguage::Hebrew => &self.hebrew,
        };

        if let Some(schema) = cell.get() {
            return Ok(schema.clone());
        }

        let loaded = Arc::new(self.load(language)?);
        Ok(cell.get_or_init(|| loaded).clone())
    }

    /// Loads every schema now so that broken schema files surface early.
    pub fn preload(&self) -> Result<()> {
        for language in FormLanguage::ALL {
            self.get(language)?;
        }
        Ok(())
    }

    /// Whether OCR output must contain tables or checkboxes for `selector`.
    ///
    /// Under [`LanguageSelector::Auto`] regions are required if any loadable
    /// schema expects them. A schema that fails to load is skipped here and
    /// only reported if its language is the one detected; the call fails
    /// when no schema loads at all.
    pub fn expects_regions(&self, selector: LanguageSelector) -> Result<bool> {
        if let Some(language) = selector.explicit() {
            return Ok(self.get(language)?.expects_regions());
        }

        let mut expects = false;
        let mut loaded = false;
        let mut first_error = None;
        for language in FormLanguage::ALL {
            match self.get(language) {
                Ok(schema) => {
                    loaded = true;
                    expects |= schema.expects_regions();
                }
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_SCHEMA,
                        language = %language,
                        error = %error,
                        "Skipping unloadable schema"
                    );
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) if !loaded => Err(error),
            _ => Ok(expects),
        }
    }

    fn load(&self, language: FormLanguage) -> Result<Schema> {
        match &self.source {
            SchemaSource::Builtin => Self::load_builtin(language),
            SchemaSource::Directory(dir) => {
                let path = dir.join(Self::file_name(language));
                if path.is_file() {
                    Self::load_file(language, &path)
                } else {
                    tracing::debug!(
                        target: TRACING_TARGET_SCHEMA,
                        language = %language,
                        path = %path.display(),
                        "Schema file not found, using built-in schema"
                    );
                    Self::load_builtin(language)
                }
            }
        }
    }

    fn load_builtin(language: FormLanguage) -> Result<Schema> {
        Schema::new(language, builtin::fields(language))
            .map(|schema| schema.with_expected_regions(true))
            .map_err(|e| Error::schema(BUILTIN_ORIGIN, e.to_string()))
    }

    fn load_file(language: FormLanguage, path: &Path) -> Result<Schema> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| Error::schema(&origin, e.to_string()))?;
        let schema: Schema =
            serde_json::from_str(&json).map_err(|e| Error::schema(&origin, e.to_string()))?;

        if schema.language() != language {
            return Err(Error::schema(
                origin,
                format!(
                    "declares language '{}' but is registered for '{}'",
                    schema.language(),
                    language
                ),
            ));
        }

        tracing::info!(
            target: TRACING_TARGET_SCHEMA,
            language = %language,
            path = %origin,
            fields = schema.fields().len(),
            "Loaded schema file"
        );

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use formscan_core::types::FieldType;

    use super::*;

    #[test]
    fn test_builtin_schemas() {
        let registry = SchemaRegistry::builtin();
        registry.preload().unwrap();

        let english = registry.get(FormLanguage::English).unwrap();
        let hebrew = registry.get(FormLanguage::Hebrew).unwrap();
        assert_eq!(english.fields().len(), hebrew.fields().len());
        assert!(english.contains("address.city"));
        assert!(hebrew.contains("טלפון נייד"));
        assert_eq!(
            english.field("idNumber").map(|f| &f.field_type),
            Some(&FieldType::IdNumber)
        );
        assert!(english.expects_regions());
    }

    #[test]
    fn test_get_returns_shared_instance() {
        let registry = SchemaRegistry::builtin();
        let first = registry.get(FormLanguage::Hebrew).unwrap();
        let second = registry.get(FormLanguage::Hebrew).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_from_dir_overrides_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("schema_english.json"),
            r#"{"language": "english", "expects_regions": false,
                "fields": [{"name": "fullName", "type": "string", "required": true}]}"#,
        )
        .unwrap();

        let registry = SchemaRegistry::from_dir(dir.path());
        let english = registry.get(FormLanguage::English).unwrap();
        assert_eq!(english.field_names().collect::<Vec<_>>(), ["fullName"]);
        assert!(!english.expects_regions());

        let hebrew = registry.get(FormLanguage::Hebrew).unwrap();
        assert!(hebrew.contains("שם פרטי"));

        assert!(!registry.expects_regions(LanguageSelector::English).unwrap());
        assert!(registry.expects_regions(LanguageSelector::Auto).unwrap());
    }

    #[test]
    fn test_from_dir_rejects_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("schema_hebrew.json"), r#"{"language": "english", "fields": [{"name": "a", "type": "string"}]}"#).unwrap();
        std::fs::write(dir.path().join("schema_english.json"), "not json").unwrap();

        let registry = SchemaRegistry::from_dir(dir.path());
        assert!(matches!(
            registry.get(FormLanguage::Hebrew),
            Err(Error::Schema { .. })
        ));
        assert!(matches!(registry.preload(), Err(Error::Schema { .. })));
        assert!(matches!(
            registry.expects_regions(LanguageSelector::Auto),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_auto_regions_skip_unloadable_schema() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("schema_hebrew.json"), "{").unwrap();

        let registry = SchemaRegistry::from_dir(dir.path());
        assert!(registry.expects_regions(LanguageSelector::Auto).unwrap());
        assert!(registry.expects_regions(LanguageSelector::Hebrew).is_err());
    }
}
