//! The declarative mapping document.
//!
//! A mapping document is a JSON object:
//!
//! ```json
//! {
//!   "table_name": "person",
//!   "transformations": "extra_transforms.toml",
//!   "mappings": [
//!     { "csv_index": 0, "column_name": "name", "transform": "trim" },
//!     { "csv_index": "email", "key": "fk" }
//!   ]
//! }
//! ```
//!
//! Every field is optional. Unknown fields are ignored.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::enums::{DataType, KeyRole};
use crate::error::ConfigError;

/// Reference to an input column, either by position or by header text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Index(index) => write!(f, "#{index}"),
            SourceRef::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// One entry of the `mappings` list, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMapping {
    /// Source column. When absent, `column_name` is looked up in the header row.
    #[serde(default)]
    pub csv_index: Option<SourceRef>,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub key: Option<KeyRole>,
    /// Name of a registered scalar transform.
    #[serde(default)]
    pub transform: Option<String>,
}

impl RawMapping {
    /// Mapping that copies the column at `index` unchanged.
    pub fn pass_through(index: usize) -> Self {
        Self {
            csv_index: Some(SourceRef::Index(index)),
            ..Self::default()
        }
    }

    /// Explicit column name, ignoring blank strings.
    pub fn explicit_column_name(&self) -> Option<&str> {
        self.column_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn key_role(&self) -> KeyRole {
        self.key.unwrap_or_default()
    }
}

/// Parsed mapping document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    /// Target table. Defaults to a name derived from the input file.
    #[serde(default)]
    pub table_name: Option<String>,
    /// Path of a transform extension file, relative to the document.
    #[serde(default)]
    pub transformations: Option<PathBuf>,
    #[serde(default)]
    pub mappings: Vec<RawMapping>,
}

impl MappingDocument {
    /// Load and parse a mapping document from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::from_io(path, err))?;
        Self::parse(path, &contents)
    }

    /// Parse a document; `path` is only used for error reporting.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|err| ConfigError::from_json(path, &err))
    }

    /// Resolve the `transformations` path against the document's directory.
    pub fn transformations_path(&self, document_path: &Path) -> Option<PathBuf> {
        let relative = self.transformations.as_ref()?;
        if relative.is_absolute() {
            return Some(relative.clone());
        }
        let base = document_path.parent().unwrap_or_else(|| Path::new(""));
        Some(base.join(relative))
    }

    /// Table name declared in the document, ignoring blank strings.
    pub fn declared_table_name(&self) -> Option<&str> {
        self.table_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_index_and_name_references() {
        let doc = MappingDocument::parse(
            Path::new("mapping.json"),
            r#"{
                "table_name": "person",
                "mappings": [
                    { "csv_index": 0, "column_name": "name", "data_type": "VARCHAR(-1)" },
                    { "csv_index": "email", "key": "fk", "transform": "lower" }
                ]
            }"#,
        )
        .expect("parse document");

        assert_eq!(doc.declared_table_name(), Some("person"));
        assert_eq!(doc.mappings.len(), 2);
        assert_eq!(doc.mappings[0].csv_index, Some(SourceRef::Index(0)));
        assert_eq!(doc.mappings[0].data_type, Some(DataType::Text));
        assert_eq!(
            doc.mappings[1].csv_index,
            Some(SourceRef::Name("email".to_string()))
        );
        assert_eq!(doc.mappings[1].key_role(), KeyRole::Foreign);
        assert_eq!(doc.mappings[1].transform.as_deref(), Some("lower"));
    }

    #[test]
    fn empty_document_is_valid() {
        let doc = MappingDocument::parse(Path::new("m.json"), "{}").expect("parse");
        assert!(doc.mappings.is_empty());
        assert!(doc.declared_table_name().is_none());
    }

    #[test]
    fn syntax_errors_report_position() {
        let err = MappingDocument::parse(Path::new("m.json"), "{\n  \"mappings\": [,]\n}")
            .expect_err("invalid json");
        match err {
            ConfigError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shapes_are_invalid() {
        let err = MappingDocument::parse(
            Path::new("m.json"),
            r#"{ "mappings": [ { "data_type": "blob" } ] }"#,
        )
        .expect_err("unknown type");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn transformations_resolve_relative_to_document() {
        let doc = MappingDocument {
            transformations: Some(PathBuf::from("extra.toml")),
            ..MappingDocument::default()
        };
        assert_eq!(
            doc.transformations_path(Path::new("/cfg/mapping.json")),
            Some(PathBuf::from("/cfg/extra.toml"))
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = MappingDocument::load(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
