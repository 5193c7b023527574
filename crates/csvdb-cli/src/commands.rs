use std::time::Instant;

use anyhow::Result;
use csvdb_core::{ErrorCategory, ImportError, ImportPlan, ImportReport, ImportRequest, execute, prepare};
use csvdb_map::TransformRegistry;
use csvdb_store::SqliteStore;
use tracing::{info, info_span, trace};

use crate::cli::ImportArgs;
use crate::logging::redact_value;

/// Result of a successful run.
#[derive(Debug)]
pub enum Outcome {
    /// Rows were written to the database.
    Imported(ImportReport),
    /// `--dry-run`: mappings were resolved but nothing was written.
    Planned(ImportPlan),
}

pub fn build_request(args: &ImportArgs) -> ImportRequest {
    let mut request = ImportRequest::new(&args.input)
        .with_header_row(args.has_header_row)
        .with_default_action(args.default_mapping_action.into())
        .with_delimiter(args.delimiter);
    if let Some(mapping) = &args.mapping {
        request = request.with_mapping(mapping);
    }
    request
}

pub fn run_import(args: &ImportArgs) -> Result<Outcome> {
    let span = info_span!("import", input = %args.input.display(), output = %args.output.display());
    let _guard = span.enter();
    let start = Instant::now();

    let request = build_request(args);
    let mut registry = TransformRegistry::with_builtins();
    let plan = prepare(&request, &mut registry)?;
    if let Some(first) = plan.table.rows.first() {
        for mapping in &plan.mappings {
            let sample = first.get(mapping.source_index).map_or("", String::as_str);
            trace!(column = %mapping.column_name, sample = redact_value(sample), "first row value");
        }
    }
    if args.dry_run {
        info!(table = %plan.table_name, "dry run, database not opened");
        return Ok(Outcome::Planned(plan));
    }

    let mut store = SqliteStore::open(&args.output).map_err(ImportError::from)?;
    let report = execute(&mut store, &plan)?;
    info!(
        table = %report.table_name,
        inserted_rows = report.inserted_rows,
        duration_ms = start.elapsed().as_millis(),
        "import complete"
    );
    Ok(Outcome::Imported(report))
}

/// Category of a fatal error, as printed before its message.
pub fn error_category(error: &anyhow::Error) -> ErrorCategory {
    error
        .downcast_ref::<ImportError>()
        .map_or(ErrorCategory::Unknown, ImportError::category)
}

/// The single line printed for a fatal error.
pub fn error_line(error: &anyhow::Error) -> String {
    format!("error: {}: {error}", error_category(error))
}
