//! Cell values flowing from raw input rows to the table store.

use serde::Serialize;
use std::fmt;

use crate::enums::DataType;

/// A single cell value.
///
/// Raw input cells enter the pipeline as [`Value::Text`]; foreign-key
/// substitution produces [`Value::Integer`]; [`Value::coerce`] applies the
/// column's storage affinity right before insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Name of the value's runtime type, as reported by `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is parsed when it looks numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Real(value) => Some(*value),
            Value::Text(text) => parse_real(text),
            Value::Null => None,
        }
    }

    /// Convert the value toward `data_type` using storage affinity rules.
    ///
    /// Numeric-looking text becomes a number, blank text in a numeric column
    /// becomes `Null`, and text that does not parse is kept unchanged.
    #[must_use]
    pub fn coerce(self, data_type: DataType) -> Value {
        match (data_type, self) {
            (_, Value::Null) => Value::Null,
            (DataType::Text, Value::Text(text)) => Value::Text(text),
            (DataType::Text, other) => Value::Text(other.to_string()),
            (DataType::Integer, Value::Integer(value)) => Value::Integer(value),
            (DataType::Integer, Value::Real(value)) => real_to_integer(value)
                .map(Value::Integer)
                .unwrap_or(Value::Real(value)),
            (DataType::Integer, Value::Text(text)) => {
                if text.trim().is_empty() {
                    Value::Null
                } else if let Some(value) = parse_integer(&text) {
                    Value::Integer(value)
                } else if let Some(value) = parse_real(&text).and_then(real_to_integer) {
                    Value::Integer(value)
                } else {
                    Value::Text(text)
                }
            }
            (DataType::Real, Value::Real(value)) => Value::Real(positive_zero(value)),
            (DataType::Real, Value::Integer(value)) => Value::Real(value as f64),
            (DataType::Real, Value::Text(text)) => {
                if text.trim().is_empty() {
                    Value::Null
                } else {
                    parse_real(&text)
                        .map(|value| Value::Real(positive_zero(value)))
                        .unwrap_or(Value::Text(text))
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Real(value) => write!(f, "{value}"),
            Value::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn parse_real(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// SQLite stores `-0.0` as `0.0`; fold it here so stored and in-memory
/// values render alike.
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn real_to_integer(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
