#![deny(unsafe_code)]

pub mod error;
pub mod extensions;
pub mod inference;
pub mod naming;
pub mod resolver;
pub mod transforms;
pub mod types;

pub use error::{MappingError, TransformError};
pub use extensions::load_extensions;
pub use inference::{SAMPLE_LIMIT, classify, infer};
pub use naming::{NameAllocator, derive_table_name, sanitize_identifier, synthesized_column_name};
pub use resolver::{ResolveInput, resolve};
pub use transforms::{Transform, TransformFn, TransformRegistry};
pub use types::{ColumnMapping, ResolvedMappings};
