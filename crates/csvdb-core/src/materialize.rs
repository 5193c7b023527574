//! Row Materializer.

use csvdb_map::ResolvedMappings;
use csvdb_model::Value;

use crate::error::{ImportError, Result};
use crate::keys::{Substitutions, domain_value, raw_cell};

/// Turn raw rows into storage rows, one value per mapping in mapping order.
///
/// For each mapping the raw cell is read at `source_index`; foreign keys are
/// replaced by their surrogate id; the transform is applied; the result is
/// coerced to the stored column type. A failing transform aborts with the
/// 1-based row number and the column name.
pub fn materialize(
    rows: &[Vec<String>],
    mappings: &ResolvedMappings,
    substitutions: &Substitutions,
) -> Result<Vec<Vec<Value>>> {
    let mut output = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let mut record = Vec::with_capacity(mappings.len());
        for (position, mapping) in mappings.iter().enumerate() {
            let value = if mapping.is_foreign_key() {
                substitutions.surrogate(position, mapping, &domain_value(row, mapping))?
            } else {
                raw_cell(row, mapping.source_index)
            };
            let value = mapping
                .transform
                .apply(value)
                .map_err(|source| ImportError::Transform {
                    row: row_index + 1,
                    column: mapping.column_name.clone(),
                    source,
                })?;
            record.push(value.coerce(mapping.stored_type()));
        }
        output.push(record);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use csvdb_map::{ColumnMapping, Transform, TransformRegistry};
    use csvdb_model::{DataType, KeyRole};

    use super::*;

    fn column(name: &str, source_index: usize, data_type: DataType, transform: &str) -> ColumnMapping {
        ColumnMapping {
            source_index,
            column_name: name.to_string(),
            data_type,
            key_role: KeyRole::None,
            transform: TransformRegistry::with_builtins()
                .lookup(transform)
                .expect("builtin"),
        }
    }

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect()
    }

    #[test]
    fn values_follow_mapping_order() {
        let mappings = ResolvedMappings::new(vec![
            column("score", 2, DataType::Integer, "round"),
            column("name", 0, DataType::Text, "upper"),
        ]);
        let data = rows(&[&["ada", "x", "2.6"], &["alan"]]);

        let output = materialize(&data, &mappings, &Substitutions::default()).expect("materialize");

        assert_eq!(
            output,
            vec![
                vec![Value::Integer(3), Value::from("ADA")],
                vec![Value::Null, Value::from("ALAN")],
            ]
        );
    }

    #[test]
    fn transform_failure_names_row_and_column() {
        let mappings = ResolvedMappings::new(vec![column("amount", 0, DataType::Real, "abs")]);
        let data = rows(&[&["-1.5"], &["n/a"]]);

        let err = materialize(&data, &mappings, &Substitutions::default()).expect_err("bad value");

        assert!(matches!(
            err,
            ImportError::Transform { row: 2, ref column, .. } if column == "amount"
        ));
    }

    #[test]
    fn foreign_key_without_substitution_table_fails() {
        let mappings = ResolvedMappings::new(vec![ColumnMapping {
            key_role: KeyRole::Foreign,
            transform: Transform::identity(),
            ..column("email", 0, DataType::Text, "trim")
        }]);
        let data = rows(&[&["a@x"]]);

        let err = materialize(&data, &mappings, &Substitutions::default()).expect_err("unmatched");
        assert!(matches!(err, ImportError::UnmatchedForeignKey { .. }));
    }
}
