//! The csvdb import engine.
//!
//! [`prepare`] loads the input and mapping document and resolves the
//! mappings; [`execute`] writes the resolved plan into a [`TableStore`]:
//! satellite tables first ([`reconcile`]), then the fact table rows
//! ([`materialize`]).
//!
//! [`TableStore`]: csvdb_store::TableStore

#![deny(unsafe_code)]

pub mod error;
pub mod keys;
pub mod materialize;
pub mod pipeline;
pub mod schema;

pub use error::{ErrorCategory, ImportError, Result};
pub use keys::{Reconciliation, SatelliteStats, Substitutions, reconcile};
pub use materialize::materialize;
pub use pipeline::{ImportPlan, ImportReport, ImportRequest, execute, prepare};
