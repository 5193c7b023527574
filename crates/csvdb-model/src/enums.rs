//! Closed enumerations used throughout inference, schema and materialization.
//!
//! These enums replace the free-form type markers found in mapping documents
//! with compile-time checked variants.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Storage type of an output column.
///
/// Variants are ordered from most to least restrictive so that
/// `Integer < Real < Text`. Unifying two types is taking their maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// Signed 64-bit integer.
    Integer,
    /// Double precision floating point.
    Real,
    /// Variable-length text.
    Text,
}

impl DataType {
    /// Returns the SQL type name used in table definitions.
    pub fn as_sql(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Text => "TEXT",
        }
    }

    /// Returns the least restrictive of the two types.
    #[must_use]
    pub fn unify(self, other: DataType) -> DataType {
        self.max(other)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Parse a type name as written in mapping documents (case-insensitive).
    ///
    /// A parenthesized length suffix such as `VARCHAR(-1)` is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        let base = match normalized.find('(') {
            Some(pos) if normalized.ends_with(')') => normalized[..pos].trim_end(),
            _ => normalized.as_str(),
        };
        match base {
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" => Ok(DataType::Integer),
            "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" | "DECIMAL" => Ok(DataType::Real),
            "TEXT" | "VARCHAR" | "CHAR" | "STRING" | "STR" => Ok(DataType::Text),
            _ => Err(format!("unknown data type: {s}")),
        }
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_sql())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Key role of a mapped column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyRole {
    /// Plain column.
    #[default]
    #[serde(rename = "none")]
    None,
    /// The column is the table's primary key.
    #[serde(rename = "pk")]
    Primary,
    /// Values are normalized into a satellite table and replaced by surrogate ids.
    #[serde(rename = "fk")]
    Foreign,
}

impl KeyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyRole::None => "none",
            KeyRole::Primary => "pk",
            KeyRole::Foreign => "fk",
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with input columns that no mapping references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultMappingAction {
    /// Synthesize a pass-through mapping for every unreferenced column.
    Import,
    /// Drop unreferenced columns.
    #[default]
    Ignore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_aliases() {
        assert_eq!("int".parse::<DataType>(), Ok(DataType::Integer));
        assert_eq!(" Float ".parse::<DataType>(), Ok(DataType::Real));
        assert_eq!("VARCHAR(-1)".parse::<DataType>(), Ok(DataType::Text));
        assert_eq!("str".parse::<DataType>(), Ok(DataType::Text));
        assert!("blob".parse::<DataType>().is_err());
    }

    #[test]
    fn unify_takes_least_restrictive() {
        assert_eq!(DataType::Integer.unify(DataType::Real), DataType::Real);
        assert_eq!(DataType::Text.unify(DataType::Integer), DataType::Text);
        assert_eq!(DataType::Integer.unify(DataType::Integer), DataType::Integer);
    }

    #[test]
    fn key_role_uses_short_names() {
        let role: KeyRole = serde_json::from_str("\"fk\"").expect("parse fk");
        assert_eq!(role, KeyRole::Foreign);
        let role: KeyRole = serde_json::from_str("\"pk\"").expect("parse pk");
        assert_eq!(role, KeyRole::Primary);
        assert!(serde_json::from_str::<KeyRole>("\"primary\"").is_err());
    }
}
