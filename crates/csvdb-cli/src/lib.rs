//! CLI library components for csvdb.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
