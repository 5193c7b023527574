//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a table store.
///
/// Constraint violations on insert are not errors; see [`crate::TableStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The directory that should hold the database file does not exist.
    #[error("output directory does not exist: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The database file could not be opened or created.
    #[error("failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("table '{table}' does not exist")]
    UnknownTable { table: String },

    /// Primary keys can only be declared when a table is created.
    #[error("cannot add {constraint} column '{column}' to existing table '{table}'")]
    UnsupportedAlter {
        table: String,
        column: String,
        constraint: &'static str,
    },

    #[error("row {row} of insert into '{table}' has {found} values, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
