//! Transform extensions loaded from a TOML file.
//!
//! ```toml
//! [transforms]
//! shout = ["trim", "upper"]
//! tidy = ["shout", "rtrim"]
//! ```
//!
//! Each entry becomes a named transform applying its steps left to right.
//! Steps may name builtins, previously registered transforms or other
//! entries of the same file, in any order.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use csvdb_model::error::line_col;
use csvdb_model::{ConfigError, Value};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{MappingError, TransformError};
use crate::transforms::{Transform, TransformRegistry};

#[derive(Debug, Default, Deserialize)]
struct ExtensionFile {
    #[serde(default)]
    transforms: BTreeMap<String, Vec<String>>,
}

/// Register every transform declared in the file at `path`.
///
/// Returns the number of transforms registered.
pub fn load_extensions(
    registry: &mut TransformRegistry,
    path: &Path,
) -> Result<usize, MappingError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::from_io(path, err))?;
    let file: ExtensionFile = toml::from_str(&contents).map_err(|err| {
        let (line, column) = err
            .span()
            .map_or((1, 1), |span| line_col(&contents, span.start));
        ConfigError::Syntax {
            path: path.to_path_buf(),
            line,
            column,
            message: err.message().to_string(),
        }
    })?;
    let count = register_chains(registry, file.transforms)?;
    info!(path = %path.display(), count, "loaded transform extensions");
    Ok(count)
}

/// Register each chain once all of its steps are available.
fn register_chains(
    registry: &mut TransformRegistry,
    mut pending: BTreeMap<String, Vec<String>>,
) -> Result<usize, MappingError> {
    let mut registered = 0;
    while !pending.is_empty() {
        let ready: Vec<String> = pending
            .iter()
            .filter(|(_, steps)| {
                steps
                    .iter()
                    .all(|step| !pending.contains_key(step) && registry.contains(step))
            })
            .map(|(name, _)| name.clone())
            .collect();
        if ready.is_empty() {
            return Err(first_unresolved(registry, &pending));
        }
        for name in ready {
            let Some(steps) = pending.remove(&name) else {
                continue;
            };
            let chain = steps
                .iter()
                .map(|step| registry.lookup(step))
                .collect::<Result<Vec<Transform>, _>>()?;
            debug!(transform = %name, steps = ?steps, "registering transform chain");
            registry.register(
                name,
                Arc::new(move |value: Value| -> Result<Value, TransformError> {
                    chain
                        .iter()
                        .try_fold(value, |current, transform| transform.apply(current))
                }),
            );
            registered += 1;
        }
    }
    Ok(registered)
}

fn first_unresolved(
    registry: &TransformRegistry,
    pending: &BTreeMap<String, Vec<String>>,
) -> MappingError {
    // Every pending entry has at least one blocked step when nothing is ready.
    let (name, step) = pending
        .iter()
        .find_map(|(name, steps)| {
            steps
                .iter()
                .find(|step| pending.contains_key(*step) || !registry.contains(step))
                .map(|step| (name.clone(), step.clone()))
        })
        .unwrap_or_default();
    MappingError::UnresolvedExtension { name, step }
}
