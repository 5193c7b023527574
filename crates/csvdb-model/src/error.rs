//! Errors raised while loading configuration documents.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from reading or parsing a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document does not exist.
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// The document exists but cannot be read.
    #[error("permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not syntactically valid.
    #[error("syntax error in {path} at line {line}, column {column}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The document parses but does not have the expected shape.
    #[error("invalid configuration in {path} at line {line}, column {column}: {message}")]
    Invalid {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
}

impl ConfigError {
    /// Classify an I/O error raised while opening `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Read { path, source },
        }
    }

    pub(crate) fn from_json(path: &Path, err: &serde_json::Error) -> Self {
        let path = path.to_path_buf();
        let line = err.line();
        let column = err.column();
        let message = err.to_string();
        match err.classify() {
            serde_json::error::Category::Data => Self::Invalid {
                path,
                line,
                column,
                message,
            },
            serde_json::error::Category::Io => Self::Read {
                source: io::Error::other(message),
                path,
            },
            serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
                Self::Syntax {
                    path,
                    line,
                    column,
                    message,
                }
            }
        }
    }
}

/// Convert a byte offset into a 1-based `(line, column)` pair.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let prefix = source.get(..offset).unwrap_or(source);
    let line = prefix.matches('\n').count() + 1;
    let column = match prefix.rfind('\n') {
        Some(pos) => prefix[pos + 1..].chars().count() + 1,
        None => prefix.chars().count() + 1,
    };
    (line, column)
}
