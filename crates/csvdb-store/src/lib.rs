//! Table storage for csvdb imports.
//!
//! The import pipeline talks to storage only through the [`TableStore`]
//! trait: structured column specs and [`Value`](csvdb_model::Value) rows go
//! in, records come out. SQL construction and identifier quoting live in the
//! backend.
//!
//! Insert constraint violations (duplicate keys, unique values) are reported
//! as `Ok(false)` so callers can decide whether a rejected row is benign.

#![deny(unsafe_code)]

pub mod error;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;
pub use store::{ColumnConstraint, ColumnSpec, Record, TableStore};
