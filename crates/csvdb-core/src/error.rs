//! Import error types and their user-facing categories.

use std::fmt;

use csvdb_ingest::IngestError;
use csvdb_map::{MappingError, TransformError};
use csvdb_model::ConfigError;
use csvdb_store::StoreError;
use thiserror::Error;

/// Any failure that aborts an import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A foreign-key value has no row in its satellite table.
    #[error("value '{value}' has no entry in satellite table '{table}'")]
    UnmatchedForeignKey { table: String, value: String },

    /// A transform failed on one cell.
    #[error("row {row}, column '{column}': {source}")]
    Transform {
        row: usize,
        column: String,
        #[source]
        source: TransformError,
    },

    /// A satellite table holds an id that is not an integer.
    #[error("satellite table '{table}' holds a non-integer id")]
    InvalidSurrogate { table: String },

    /// A foreign key's satellite table would be the import target itself.
    #[error("foreign key '{table}' uses the same name as the target table")]
    TableNameConflict { table: String },
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// Coarse classification printed ahead of every fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    FileNotFound,
    PermissionDenied,
    MalformedConfig,
    Configuration,
    Data,
    Store,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::FileNotFound => "file not found",
            ErrorCategory::PermissionDenied => "permission denied",
            ErrorCategory::MalformedConfig => "malformed configuration document",
            ErrorCategory::Configuration => "configuration error",
            ErrorCategory::Data => "data error",
            ErrorCategory::Store => "store error",
            ErrorCategory::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::Config(err) | ImportError::Mapping(MappingError::Config(err)) => {
                config_category(err)
            }
            ImportError::Ingest(err) => match err {
                IngestError::FileNotFound { .. } => ErrorCategory::FileNotFound,
                IngestError::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
                IngestError::Parse { .. } => ErrorCategory::Data,
                IngestError::FileRead { .. } => ErrorCategory::Unknown,
            },
            ImportError::Mapping(MappingError::EmptySample { .. }) => ErrorCategory::Data,
            ImportError::Mapping(_) | ImportError::TableNameConflict { .. } => {
                ErrorCategory::Configuration
            }
            ImportError::Store(StoreError::DirectoryNotFound { .. }) => ErrorCategory::FileNotFound,
            ImportError::Store(_) | ImportError::InvalidSurrogate { .. } => ErrorCategory::Store,
            ImportError::UnmatchedForeignKey { .. } | ImportError::Transform { .. } => {
                ErrorCategory::Data
            }
        }
    }
}

fn config_category(err: &ConfigError) -> ErrorCategory {
    match err {
        ConfigError::NotFound { .. } => ErrorCategory::FileNotFound,
        ConfigError::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
        ConfigError::Syntax { .. } | ConfigError::Invalid { .. } => ErrorCategory::MalformedConfig,
        ConfigError::Read { .. } => ErrorCategory::Unknown,
    }
}
