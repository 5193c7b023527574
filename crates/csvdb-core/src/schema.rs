//! Table definitions derived from resolved mappings.

use csvdb_map::types::SURROGATE_KEY;
use csvdb_map::{ColumnMapping, ResolvedMappings};
use csvdb_model::DataType;
use csvdb_store::{ColumnConstraint, ColumnSpec, TableStore};
use tracing::{info, warn};

use crate::error::Result;

/// Column of a satellite table holding the foreign-key value.
pub const SATELLITE_VALUE: &str = "value";

/// Columns of the fact table, in insertion order.
///
/// The synthetic `id` key comes first when no mapping is a primary key.
pub fn fact_columns(mappings: &ResolvedMappings) -> Vec<ColumnSpec> {
    let mut columns = Vec::with_capacity(mappings.len() + 1);
    if mappings.needs_surrogate_key() {
        columns.push(ColumnSpec::surrogate(SURROGATE_KEY));
    }
    columns.extend(mappings.iter().map(mapping_column));
    columns
}

fn mapping_column(mapping: &ColumnMapping) -> ColumnSpec {
    let spec = ColumnSpec::new(mapping.stored_name(), mapping.stored_type());
    match mapping.satellite_table() {
        Some(table) => spec.with_constraint(ColumnConstraint::References {
            table: table.to_string(),
            column: SURROGATE_KEY.to_string(),
        }),
        None if mapping.is_primary_key() => spec.with_constraint(ColumnConstraint::PrimaryKey),
        None => spec,
    }
}

/// Columns of a satellite table whose values have type `data_type`.
pub fn satellite_columns(data_type: DataType) -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::surrogate(SURROGATE_KEY),
        ColumnSpec::new(SATELLITE_VALUE, data_type).with_constraint(ColumnConstraint::Unique),
    ]
}

/// Create the fact table, or add the mapped columns an existing one lacks.
///
/// Returns `true` when the table was created.
pub fn ensure_fact_table<S: TableStore + ?Sized>(
    store: &mut S,
    table: &str,
    mappings: &ResolvedMappings,
) -> Result<bool> {
    let columns = fact_columns(mappings);
    if store.create_table(table, &columns)? {
        info!(table, columns = columns.len(), "created table");
        return Ok(true);
    }

    let existing = store.table_columns(table)?;
    for column in mappings.iter().map(mapping_column) {
        if existing.contains(&column.name) {
            continue;
        }
        warn!(table, column = %column.name, "adding column to existing table");
        store.add_column(table, &column)?;
    }
    Ok(false)
}
