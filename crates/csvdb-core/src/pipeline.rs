//! Import pipeline: prepare a plan from files, then execute it against a store.

use std::path::PathBuf;
use std::time::Instant;

use csvdb_ingest::{CsvTable, IngestOptions, read_csv_table};
use csvdb_map::{
    MappingError, ResolveInput, ResolvedMappings, TransformRegistry, derive_table_name,
    load_extensions, resolve,
};
use csvdb_model::{DefaultMappingAction, MappingDocument, Value};
use csvdb_store::TableStore;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::error::{ImportError, Result};
use crate::keys::{SatelliteStats, reconcile};
use crate::materialize::materialize;
use crate::schema::ensure_fact_table;

/// What to import and how.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub input: PathBuf,
    /// Mapping document; without one every column is handled by
    /// `default_action`.
    pub mapping: Option<PathBuf>,
    pub has_header_row: bool,
    pub default_action: DefaultMappingAction,
    pub delimiter: u8,
}

impl ImportRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            mapping: None,
            has_header_row: false,
            default_action: DefaultMappingAction::default(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: impl Into<PathBuf>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    #[must_use]
    pub fn with_header_row(mut self, enable: bool) -> Self {
        self.has_header_row = enable;
        self
    }

    #[must_use]
    pub fn with_default_action(mut self, action: DefaultMappingAction) -> Self {
        self.default_action = action;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// A resolved import, ready to be written.
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub table_name: String,
    pub table: CsvTable,
    pub mappings: ResolvedMappings,
}

/// Outcome of [`execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub table_name: String,
    pub created_table: bool,
    pub input_rows: usize,
    pub inserted_rows: usize,
    /// Rows a constraint rejected, such as a duplicate primary key.
    pub rejected_rows: usize,
    pub satellites: Vec<SatelliteStats>,
}

/// Load the input and mapping document, extend `registry` with any
/// transform extensions, and resolve the mappings.
pub fn prepare(request: &ImportRequest, registry: &mut TransformRegistry) -> Result<ImportPlan> {
    let span = info_span!("prepare", input = %request.input.display());
    let _guard = span.enter();

    let start = Instant::now();
    let options = IngestOptions::default()
        .with_header_row(request.has_header_row)
        .with_delimiter(request.delimiter);
    let table = read_csv_table(&request.input, &options)?;
    info!(
        rows = table.rows.len(),
        columns = table.width(),
        duration_ms = start.elapsed().as_millis(),
        "input loaded"
    );

    let document = match &request.mapping {
        Some(path) => {
            let document = MappingDocument::load(path)?;
            if let Some(extensions) = document.transformations_path(path) {
                load_extensions(registry, &extensions)?;
            }
            document
        }
        None => MappingDocument::default(),
    };

    let start = Instant::now();
    let input = ResolveInput {
        mappings: &document.mappings,
        headers: table.headers(),
        rows: &table.rows,
        default_action: request.default_action,
    };
    let mappings = resolve(&input, registry)?;
    if mappings.is_empty() {
        return Err(MappingError::NoColumns.into());
    }
    let table_name = document
        .declared_table_name()
        .map_or_else(|| derive_table_name(&request.input), str::to_string);
    info!(
        table = %table_name,
        columns = mappings.len(),
        foreign_keys = mappings.foreign_keys().count(),
        duration_ms = start.elapsed().as_millis(),
        "mappings resolved"
    );

    Ok(ImportPlan {
        table_name,
        table,
        mappings,
    })
}

/// Write `plan` into `store`.
///
/// Satellite tables are populated before the fact table. A fact batch
/// rejected by a constraint is retried row by row; rows rejected again are
/// counted, not fatal. Nothing is rolled back on failure.
pub fn execute<S: TableStore + ?Sized>(store: &mut S, plan: &ImportPlan) -> Result<ImportReport> {
    let span = info_span!("import", table = %plan.table_name);
    let _guard = span.enter();

    if let Some((_, mapping)) = plan
        .mappings
        .foreign_keys()
        .find(|(_, mapping)| mapping.column_name == plan.table_name)
    {
        return Err(ImportError::TableNameConflict {
            table: mapping.column_name.clone(),
        });
    }

    let start = Instant::now();
    let reconciliation = reconcile(store, &plan.table.rows, &plan.mappings)?;
    info!(
        satellites = reconciliation.satellites.len(),
        new_values = reconciliation
            .satellites
            .iter()
            .map(|stats| stats.new_values)
            .sum::<usize>(),
        duration_ms = start.elapsed().as_millis(),
        "foreign keys reconciled"
    );

    let created_table = ensure_fact_table(store, &plan.table_name, &plan.mappings)?;

    let start = Instant::now();
    let rows = materialize(&plan.table.rows, &plan.mappings, &reconciliation.substitutions)?;
    let fields = plan.mappings.stored_names();
    let inserted_rows = insert_rows(store, &plan.table_name, &fields, &rows)?;
    let rejected_rows = rows.len() - inserted_rows;
    info!(
        input_rows = plan.table.rows.len(),
        inserted_rows,
        rejected_rows,
        duration_ms = start.elapsed().as_millis(),
        "rows inserted"
    );

    Ok(ImportReport {
        table_name: plan.table_name.clone(),
        created_table,
        input_rows: plan.table.rows.len(),
        inserted_rows,
        rejected_rows,
        satellites: reconciliation.satellites,
    })
}

fn insert_rows<S: TableStore + ?Sized>(
    store: &mut S,
    table: &str,
    fields: &[String],
    rows: &[Vec<Value>],
) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    if store.insert_many(table, fields, rows)? {
        return Ok(rows.len());
    }
    warn!(table, rows = rows.len(), "batch insert rejected, retrying row by row");
    let mut inserted = 0;
    for row in rows {
        let values: Vec<(&str, Value)> = fields
            .iter()
            .map(String::as_str)
            .zip(row.iter().cloned())
            .collect();
        if store.insert_one(table, &values)? {
            inserted += 1;
        }
    }
    Ok(inserted)
}
