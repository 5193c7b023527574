//! The storage interface consumed by the import pipeline.

use csvdb_model::{DataType, Value};

use crate::error::Result;

/// One row read back from a table, in the requested field order.
pub type Record = Vec<Value>;

/// Constraint attached to a single column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnConstraint {
    #[default]
    None,
    PrimaryKey,
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`; ids are never reused.
    AutoIncrementPrimaryKey,
    Unique,
    References {
        table: String,
        column: String,
    },
}

/// Structured column definition handed to [`TableStore::create_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    pub constraint: ColumnConstraint,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraint: ColumnConstraint::None,
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// The synthetic `INTEGER PRIMARY KEY AUTOINCREMENT` column.
    pub fn surrogate(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Integer).with_constraint(ColumnConstraint::AutoIncrementPrimaryKey)
    }
}

/// A relational table store.
///
/// Methods that write take `&mut self`; one store handle serves one import
/// at a time.
pub trait TableStore {
    fn table_exists(&self, name: &str) -> Result<bool>;

    /// Create `name` with `columns`. Returns `false` if it already existed.
    fn create_table(&mut self, name: &str, columns: &[ColumnSpec]) -> Result<bool>;

    /// Column names of an existing table, in declaration order.
    fn table_columns(&self, name: &str) -> Result<Vec<String>>;

    /// Add a column to an existing table. Returns `false` if a column of that
    /// name is already present.
    fn add_column(&mut self, table: &str, column: &ColumnSpec) -> Result<bool>;

    /// Insert one row. Returns `false` if a constraint rejected it.
    fn insert_one(&mut self, table: &str, fields: &[(&str, Value)]) -> Result<bool>;

    /// Insert all rows as a single batch. Returns `false`, with nothing
    /// written, if any row was rejected by a constraint.
    fn insert_many(&mut self, table: &str, fields: &[String], rows: &[Vec<Value>]) -> Result<bool>;

    /// Every row of `table`, projected onto `fields`, in insertion order.
    fn select_all(&self, table: &str, fields: &[&str]) -> Result<Vec<Record>>;

    fn count(&self, table: &str) -> Result<u64>;
}
