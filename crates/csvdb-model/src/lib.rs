//! Shared types for the csvdb import pipeline.

pub mod config;
pub mod enums;
pub mod error;
pub mod value;

pub use config::{MappingDocument, RawMapping, SourceRef};
pub use enums::{DataType, DefaultMappingAction, KeyRole};
pub use error::ConfigError;
pub use value::Value;
