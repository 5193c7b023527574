//! Mapping Resolver.
//!
//! Merges the declared mappings with inferred defaults and produces a
//! [`ResolvedMappings`] in which every column has a concrete source index,
//! a unique non-empty name, a concrete data type and a resolved transform.
//!
//! # Steps
//!
//! 1. Resolve each declared source (`csv_index` number or header name).
//! 2. With [`DefaultMappingAction::Import`], append a pass-through mapping for
//!    every input column no declared mapping references, in column order.
//! 3. Infer missing data types from the first [`SAMPLE_LIMIT`] values.
//! 4. Default missing column names from the sanitized header, or
//!    `column_<index>` when there is no usable header.
//! 5. Deduplicate names in mapping order.
//! 6. Look up transforms; mappings without one get the identity transform.
//!
//! Step 1 runs ahead of the others because both unreferenced-column detection
//! and inference need concrete indices. The result is a pure function of the
//! inputs, so resolving twice yields identical mappings.
//!
//! [`SAMPLE_LIMIT`]: crate::inference::SAMPLE_LIMIT

use std::collections::BTreeSet;

use csvdb_model::{DataType, DefaultMappingAction, KeyRole, RawMapping, SourceRef};
use tracing::debug;

use crate::error::MappingError;
use crate::inference::infer;
use crate::naming::{NameAllocator, sanitize_identifier, synthesized_column_name};
use crate::transforms::{Transform, TransformRegistry};
use crate::types::{ColumnMapping, ResolvedMappings, SURROGATE_KEY};

/// Everything the resolver reads.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    /// Declared mappings, in document order.
    pub mappings: &'a [RawMapping],
    /// Header row, when the input has one.
    pub headers: Option<&'a [String]>,
    /// Raw data rows (header excluded).
    pub rows: &'a [Vec<String>],
    pub default_action: DefaultMappingAction,
}

impl ResolveInput<'_> {
    /// Number of input columns, counting data cells past the header row.
    fn width(&self) -> usize {
        let widest_row = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        self.headers
            .map_or(widest_row, |headers| headers.len().max(widest_row))
    }

    fn header(&self, index: usize) -> Option<&str> {
        self.headers
            .and_then(|headers| headers.get(index))
            .map(String::as_str)
    }
}

/// A mapping part way through resolution.
struct Draft<'a> {
    source_index: usize,
    column_name: Option<&'a str>,
    data_type: Option<DataType>,
    key_role: KeyRole,
    transform: Option<&'a str>,
}

/// Resolve declared mappings against an input table.
pub fn resolve(
    input: &ResolveInput<'_>,
    registry: &TransformRegistry,
) -> Result<ResolvedMappings, MappingError> {
    let width = input.width();

    let mut drafts = Vec::with_capacity(input.mappings.len());
    for (offset, raw) in input.mappings.iter().enumerate() {
        let source_index = resolve_source(offset + 1, raw, input.headers, width)?;
        drafts.push(Draft {
            source_index,
            column_name: raw.explicit_column_name(),
            data_type: raw.data_type,
            key_role: raw.key_role(),
            transform: raw.transform.as_deref(),
        });
    }

    if input.default_action == DefaultMappingAction::Import {
        let referenced: BTreeSet<usize> = drafts.iter().map(|draft| draft.source_index).collect();
        for index in (0..width).filter(|index| !referenced.contains(index)) {
            debug!(source_index = index, "auto-mapping unreferenced column");
            drafts.push(Draft {
                source_index: index,
                column_name: None,
                data_type: None,
                key_role: KeyRole::None,
                transform: None,
            });
        }
    }

    let mut types = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let data_type = match draft.data_type {
            Some(data_type) => data_type,
            None => {
                let sample = input
                    .rows
                    .iter()
                    .filter_map(|row| row.get(draft.source_index))
                    .map(String::as_str);
                let inferred = infer(sample).ok_or(MappingError::EmptySample {
                    index: draft.source_index,
                })?;
                debug!(
                    source_index = draft.source_index,
                    data_type = %inferred,
                    "inferred column type"
                );
                inferred
            }
        };
        types.push(data_type);
    }

    let base_names: Vec<String> = drafts
        .iter()
        .map(|draft| default_column_name(draft, input))
        .collect();
    let mut primary: Option<&String> = None;
    for (draft, base) in drafts.iter().zip(&base_names) {
        if draft.key_role != KeyRole::Primary {
            continue;
        }
        if let Some(first) = primary {
            return Err(MappingError::MultiplePrimaryKeys {
                first: first.clone(),
                second: base.clone(),
            });
        }
        primary = Some(base);
    }

    let mut names = NameAllocator::new();
    if primary.is_none() {
        names.reserve(SURROGATE_KEY);
    }
    let column_names: Vec<String> = base_names.iter().map(|base| names.allocate(base)).collect();

    let mut columns = Vec::with_capacity(drafts.len());
    for ((draft, column_name), data_type) in drafts.iter().zip(column_names).zip(types) {
        let transform = match draft.transform {
            Some(name) => registry.lookup(name)?,
            None => Transform::identity(),
        };
        debug!(
            source_index = draft.source_index,
            column_name = %column_name,
            data_type = %data_type,
            key = %draft.key_role,
            transform = transform.name(),
            "resolved mapping"
        );
        columns.push(ColumnMapping {
            source_index: draft.source_index,
            column_name,
            data_type,
            key_role: draft.key_role,
            transform,
        });
    }

    let resolved = ResolvedMappings::new(columns);
    check_stored_names(&resolved)?;
    Ok(resolved)
}

fn resolve_source(
    position: usize,
    raw: &RawMapping,
    headers: Option<&[String]>,
    width: usize,
) -> Result<usize, MappingError> {
    let index = match (&raw.csv_index, raw.explicit_column_name()) {
        (Some(SourceRef::Index(index)), _) => *index,
        (Some(SourceRef::Name(name)), _) => lookup_header(position, name, headers)?,
        (None, Some(name)) => lookup_header(position, name, headers)?,
        (None, None) => return Err(MappingError::MissingSource { position }),
    };
    if index >= width {
        return Err(MappingError::IndexOutOfRange {
            position,
            index,
            width,
        });
    }
    Ok(index)
}

fn lookup_header(
    position: usize,
    name: &str,
    headers: Option<&[String]>,
) -> Result<usize, MappingError> {
    let Some(headers) = headers else {
        return Err(MappingError::NoHeaderRow {
            position,
            source_ref: SourceRef::Name(name.to_string()),
        });
    };
    let wanted = name.split_whitespace().collect::<Vec<_>>().join(" ");
    headers
        .iter()
        .position(|header| *header == wanted)
        .ok_or_else(|| MappingError::ColumnNotFound {
            position,
            name: name.to_string(),
        })
}

fn default_column_name(draft: &Draft<'_>, input: &ResolveInput<'_>) -> String {
    if let Some(name) = draft.column_name {
        return name.to_string();
    }
    let from_header = input
        .header(draft.source_index)
        .map(sanitize_identifier)
        .filter(|name| !name.is_empty());
    from_header.unwrap_or_else(|| synthesized_column_name(draft.source_index))
}

fn check_stored_names(resolved: &ResolvedMappings) -> Result<(), MappingError> {
    let mut seen = BTreeSet::new();
    if resolved.needs_surrogate_key() {
        seen.insert(SURROGATE_KEY.to_string());
    }
    for name in resolved.stored_names() {
        if !seen.insert(name.clone()) {
            return Err(MappingError::DuplicateColumn { name });
        }
    }
    Ok(())
}
