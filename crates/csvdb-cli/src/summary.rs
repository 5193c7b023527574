use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use csvdb_core::{ImportPlan, ImportReport};
use csvdb_map::types::SURROGATE_KEY;

pub fn print_report(report: &ImportReport, output: &Path) {
    println!("Database: {}", output.display());
    println!("{}", report_table(report));
}

pub fn print_plan(plan: &ImportPlan) {
    println!(
        "Table: {} ({} rows read, nothing written)",
        plan.table_name,
        plan.table.rows.len()
    );
    println!("{}", plan_table(plan));
}

pub fn report_table(report: &ImportReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Kind"),
        header_cell("Status"),
        header_cell("Inserted"),
        header_cell("Rejected"),
        header_cell("Total"),
    ]);
    apply_table_style(&mut table);
    for index in 3..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(&report.table_name).add_attribute(Attribute::Bold),
        Cell::new("fact"),
        status_cell(report.created_table),
        Cell::new(report.inserted_rows),
        count_cell(report.rejected_rows, Color::Yellow),
        dim_cell("-"),
    ]);
    for satellite in &report.satellites {
        table.add_row(vec![
            Cell::new(format!("  -> {}", satellite.table)),
            dim_cell("satellite"),
            status_cell(satellite.created),
            Cell::new(satellite.new_values),
            dim_cell("-"),
            Cell::new(satellite.total_values),
        ]);
    }
    table
}

pub fn plan_table(plan: &ImportPlan) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Header"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Key"),
        header_cell("Transform"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    if plan.mappings.needs_surrogate_key() {
        table.add_row(vec![
            dim_cell("-"),
            dim_cell("-"),
            Cell::new(SURROGATE_KEY),
            Cell::new("INTEGER"),
            Cell::new("pk (auto)"),
            dim_cell("-"),
        ]);
    }
    for mapping in &plan.mappings {
        let header = plan
            .table
            .headers()
            .and_then(|headers| headers.get(mapping.source_index))
            .map_or_else(|| dim_cell("-"), Cell::new);
        let transform = if mapping.transform.is_identity() {
            dim_cell("-")
        } else {
            Cell::new(mapping.transform.name())
        };
        table.add_row(vec![
            Cell::new(mapping.source_index),
            header,
            Cell::new(mapping.stored_name()),
            Cell::new(mapping.stored_type()),
            key_cell(mapping.key_role.as_str()),
            transform,
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn status_cell(created: bool) -> Cell {
    if created {
        Cell::new("created").fg(Color::Green)
    } else {
        dim_cell("existing")
    }
}

fn key_cell(role: &str) -> Cell {
    match role {
        "none" => dim_cell("-"),
        other => Cell::new(other).fg(Color::Cyan),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
