//! Error types for mapping resolution and scalar transforms.

use csvdb_model::{ConfigError, SourceRef};
use thiserror::Error;

/// Errors from resolving a mapping document against an input table.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A mapping references a column by name but the input has no header row.
    #[error("mapping #{position} references column {source_ref} but the input has no header row")]
    NoHeaderRow {
        position: usize,
        source_ref: SourceRef,
    },

    /// A named column is absent from the header row.
    #[error("mapping #{position}: column '{name}' not found in header row")]
    ColumnNotFound { position: usize, name: String },

    /// A positional reference points past the last input column.
    #[error("mapping #{position}: column index {index} is out of range (input has {width} columns)")]
    IndexOutOfRange {
        position: usize,
        index: usize,
        width: usize,
    },

    /// A mapping names neither a source column nor an output column.
    #[error("mapping #{position} has neither csv_index nor column_name")]
    MissingSource { position: usize },

    /// A transform name is not registered.
    #[error("unknown transform '{name}'")]
    UnknownTransform { name: String },

    /// An extension transform chains a step that never becomes available.
    #[error("transform '{name}' references '{step}', which is unknown or part of a cycle")]
    UnresolvedExtension { name: String, step: String },

    /// Type inference was asked to classify a column with no values.
    #[error("cannot infer a type for column {index}: the input has no values for it")]
    EmptySample { index: usize },

    /// More than one mapping is declared as primary key.
    #[error("more than one primary key mapping: '{first}' and '{second}'")]
    MultiplePrimaryKeys { first: String, second: String },

    /// Two mappings end up with the same stored column name.
    #[error("duplicate stored column '{name}'")]
    DuplicateColumn { name: String },

    /// The resolved mapping set is empty.
    #[error(
        "no columns to import: declare mappings or use the 'import' default mapping action"
    )]
    NoColumns,
}

/// Errors raised by a scalar transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The transform needs a number.
    #[error("'{transform}' expects a numeric value, got '{value}'")]
    NotNumeric { transform: String, value: String },

    /// The result does not fit the value domain.
    #[error("'{transform}' overflowed on '{value}'")]
    Overflow { transform: String, value: String },
}
