//! Scalar Transform Registry.
//!
//! Transforms are pure functions from one [`Value`] to another, looked up by
//! name from mapping documents. The registry is populated once before
//! resolution (builtins plus any extension file) and only read afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use csvdb_model::Value;
use tracing::warn;

use crate::error::{MappingError, TransformError};

/// Shared transform function.
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

/// Name used for mappings that declare no transform.
pub const IDENTITY: &str = "identity";

/// Prefix under which every builtin is also registered, so mapping documents
/// may write `sqlite_upper` for `upper`.
pub const BUILTIN_ALIAS_PREFIX: &str = "sqlite_";

/// A resolved transform: a name plus the function it refers to.
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: TransformFn,
}

impl Transform {
    pub fn new(name: impl Into<String>, func: TransformFn) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// The no-op transform.
    pub fn identity() -> Self {
        Self::new(
            IDENTITY,
            Arc::new(|value: Value| -> Result<Value, TransformError> { Ok(value) }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_identity(&self) -> bool {
        self.name == IDENTITY
    }

    pub fn apply(&self, value: Value) -> Result<Value, TransformError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// Name → function registry.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    entries: BTreeMap<String, TransformFn>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the builtin transforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            IDENTITY,
            Arc::new(|value: Value| -> Result<Value, TransformError> { Ok(value) }),
        );
        registry.register("upper", map_text(|text| text.to_uppercase()));
        registry.register("lower", map_text(|text| text.to_lowercase()));
        registry.register("ltrim", trim_with(|text| text.trim_start()));
        registry.register("rtrim", trim_with(|text| text.trim_end()));
        registry.register("trim", trim_with(str::trim));
        registry.register("abs", Arc::new(abs));
        registry.register("round", Arc::new(round));
        registry.register("length", Arc::new(length));
        registry.register(
            "typeof",
            Arc::new(|value: Value| -> Result<Value, TransformError> {
                Ok(Value::Text(value.type_name().to_string()))
            }),
        );
        let aliases: Vec<(String, TransformFn)> = registry
            .entries
            .iter()
            .filter(|(name, _)| name.as_str() != IDENTITY)
            .map(|(name, func)| (format!("{BUILTIN_ALIAS_PREFIX}{name}"), Arc::clone(func)))
            .collect();
        registry.entries.extend(aliases);
        registry
    }

    /// Register `func` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, func: TransformFn) {
        let name = name.into();
        if self.entries.insert(name.clone(), func).is_some() {
            warn!(transform = %name, "transform registration replaced an existing entry");
        }
    }

    /// Look up a transform by name.
    pub fn lookup(&self, name: &str) -> Result<Transform, MappingError> {
        self.entries
            .get(name)
            .map(|func| Transform::new(name, Arc::clone(func)))
            .ok_or_else(|| MappingError::UnknownTransform {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn map_text<F>(f: F) -> TransformFn
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Arc::new(move |value: Value| -> Result<Value, TransformError> {
        match value {
            Value::Text(text) => Ok(Value::Text(f(&text))),
            other => Ok(other),
        }
    })
}

fn trim_with<F>(f: F) -> TransformFn
where
    F: Fn(&str) -> &str + Send + Sync + 'static,
{
    Arc::new(move |value: Value| -> Result<Value, TransformError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => Ok(Value::Text(f(&text).to_string())),
            other => Ok(Value::Text(f(&other.to_string()).to_string())),
        }
    })
}

fn not_numeric(transform: &str, value: &Value) -> TransformError {
    TransformError::NotNumeric {
        transform: transform.to_string(),
        value: value.to_string(),
    }
}

fn abs(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(number) => number
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| TransformError::Overflow {
                transform: "abs".to_string(),
                value: number.to_string(),
            }),
        Value::Real(number) => Ok(Value::Real(number.abs())),
        Value::Text(ref text) => {
            if let Ok(number) = text.trim().parse::<i64>() {
                return abs(Value::Integer(number));
            }
            value
                .as_f64()
                .map(|number| Value::Real(number.abs()))
                .ok_or_else(|| not_numeric("abs", &value))
        }
    }
}

fn round(value: Value) -> Result<Value, TransformError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    value
        .as_f64()
        .map(|number| Value::Real(number.round()))
        .ok_or_else(|| not_numeric("round", &value))
}

fn length(value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Text(text) => Ok(Value::Integer(text.chars().count() as i64)),
        other => Ok(Value::Integer(other.to_string().chars().count() as i64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, value: impl Into<Value>) -> Result<Value, TransformError> {
        TransformRegistry::with_builtins()
            .lookup(name)
            .expect("builtin exists")
            .apply(value.into())
    }

    #[test]
    fn text_transforms() {
        assert_eq!(apply("upper", "MiXed"), Ok(Value::from("MIXED")));
        assert_eq!(apply("lower", "MiXed"), Ok(Value::from("mixed")));
        assert_eq!(apply("trim", "  pad  "), Ok(Value::from("pad")));
        assert_eq!(apply("ltrim", "  pad  "), Ok(Value::from("pad  ")));
        assert_eq!(apply("rtrim", "  pad  "), Ok(Value::from("  pad")));
        assert_eq!(apply("upper", 3_i64), Ok(Value::Integer(3)));
        assert_eq!(apply("trim", 3_i64), Ok(Value::from("3")));
    }

    #[test]
    fn numeric_transforms() {
        assert_eq!(apply("abs", "-12"), Ok(Value::Integer(12)));
        assert_eq!(apply("abs", "-1.5"), Ok(Value::Real(1.5)));
        assert_eq!(apply("round", "2.6"), Ok(Value::Real(3.0)));
        assert_eq!(apply("round", 4_i64), Ok(Value::Real(4.0)));
        assert!(matches!(
            apply("abs", "abc"),
            Err(TransformError::NotNumeric { .. })
        ));
        assert!(matches!(
            apply("abs", i64::MIN),
            Err(TransformError::Overflow { .. })
        ));
    }

    #[test]
    fn length_and_typeof() {
        assert_eq!(apply("length", "héllo"), Ok(Value::Integer(5)));
        assert_eq!(apply("length", 1234_i64), Ok(Value::Integer(4)));
        assert_eq!(apply("typeof", "x"), Ok(Value::from("text")));
        assert_eq!(apply("typeof", 1.5), Ok(Value::from("real")));
        assert_eq!(apply("typeof", Value::Null), Ok(Value::from("null")));
    }

    #[test]
    fn builtins_answer_to_prefixed_names() {
        assert_eq!(apply("sqlite_upper", "MiXed"), Ok(Value::from("MIXED")));
        assert_eq!(apply("sqlite_trim", " pad "), Ok(Value::from("pad")));
        assert_eq!(apply("sqlite_typeof", 2_i64), Ok(Value::from("integer")));
        let registry = TransformRegistry::with_builtins();
        assert_eq!(
            registry.lookup("sqlite_round").expect("alias").name(),
            "sqlite_round"
        );
        assert!(!registry.contains("sqlite_identity"));
    }

    #[test]
    fn null_passes_through() {
        for name in ["upper", "lower", "trim", "abs", "round", "length"] {
            assert_eq!(apply(name, Value::Null), Ok(Value::Null), "{name}");
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = TransformRegistry::with_builtins()
            .lookup("shout")
            .expect_err("not registered");
        assert!(matches!(err, MappingError::UnknownTransform { name } if name == "shout"));
    }

    #[test]
    fn register_extends_the_registry() {
        let mut registry = TransformRegistry::new();
        assert!(registry.is_empty());
        registry.register(
            "double",
            Arc::new(|value: Value| -> Result<Value, TransformError> {
                Ok(value
                    .as_f64()
                    .map_or(Value::Null, |number| Value::Real(number * 2.0)))
            }),
        );
        let transform = registry.lookup("double").expect("registered");
        assert_eq!(transform.name(), "double");
        assert_eq!(transform.apply(Value::from("2")), Ok(Value::Real(4.0)));
    }

    #[test]
    fn identity_keeps_value() {
        let identity = Transform::identity();
        assert!(identity.is_identity());
        assert_eq!(identity.apply(Value::from("x")), Ok(Value::from("x")));
        let named = TransformRegistry::with_builtins()
            .lookup(IDENTITY)
            .expect("identity is registered");
        assert!(named.is_identity());
    }
}
