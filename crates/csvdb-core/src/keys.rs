//! Key Reconciliation Engine.
//!
//! Every foreign-key mapping owns a satellite table `<column_name>` with an
//! autoincrement `id` and a unique `value`. Reconciliation runs before any
//! fact row is written:
//!
//! 1. collect the distinct values of each foreign-key column over all rows,
//! 2. insert the values the satellite table does not hold yet,
//! 3. read the satellite table back into a value → id lookup.
//!
//! Existing values are never inserted again, so importing the same data twice
//! leaves the satellite tables unchanged.

use std::collections::{BTreeMap, HashMap, HashSet};

use csvdb_map::types::SURROGATE_KEY;
use csvdb_map::{ColumnMapping, ResolvedMappings};
use csvdb_model::{DataType, Value};
use csvdb_store::TableStore;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ImportError, Result};
use crate::schema::{SATELLITE_VALUE, satellite_columns};

/// Raw cell at `index`, or `Null` when the row is too short.
pub(crate) fn raw_cell(row: &[String], index: usize) -> Value {
    row.get(index)
        .map_or(Value::Null, |cell| Value::Text(cell.clone()))
}

/// Lookup key of a domain value.
fn domain_key(value: &Value) -> String {
    value.to_string()
}

/// Distinct values of one foreign-key column, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDomain {
    /// Position of the mapping in the resolved mapping order.
    pub position: usize,
    pub table: String,
    pub data_type: DataType,
    pub values: Vec<Value>,
}

/// Collect the value domain of every foreign-key mapping.
///
/// Values are coerced to the mapping's type first; `Null` (a missing cell or
/// a blank numeric cell) is not part of any domain.
pub fn collect_domains(rows: &[Vec<String>], mappings: &ResolvedMappings) -> Vec<ForeignKeyDomain> {
    mappings
        .foreign_keys()
        .map(|(position, mapping)| {
            let mut seen = HashSet::new();
            let values = rows
                .iter()
                .map(|row| domain_value(row, mapping))
                .filter(|value| !value.is_null() && seen.insert(domain_key(value)))
                .collect();
            ForeignKeyDomain {
                position,
                table: mapping.column_name.clone(),
                data_type: mapping.data_type,
                values,
            }
        })
        .collect()
}

pub(crate) fn domain_value(row: &[String], mapping: &ColumnMapping) -> Value {
    raw_cell(row, mapping.source_index).coerce(mapping.data_type)
}

/// Value → surrogate id lookup for one satellite table.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    table: String,
    ids: HashMap<String, i64>,
}

impl SubstitutionTable {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn contains(&self, value: &Value) -> bool {
        self.ids.contains_key(&domain_key(value))
    }

    /// Surrogate id for `value`. `Null` maps to `Null`; any other value
    /// without an entry is an error.
    pub fn surrogate(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.ids
            .get(&domain_key(value))
            .map(|id| Value::Integer(*id))
            .ok_or_else(|| ImportError::UnmatchedForeignKey {
                table: self.table.clone(),
                value: value.to_string(),
            })
    }
}

/// Substitution tables keyed by mapping position.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    tables: BTreeMap<usize, SubstitutionTable>,
}

impl Substitutions {
    /// Substitute the foreign-key value of the mapping at `position`.
    pub fn surrogate(&self, position: usize, mapping: &ColumnMapping, value: &Value) -> Result<Value> {
        match self.tables.get(&position) {
            Some(table) => table.surrogate(value),
            None if value.is_null() => Ok(Value::Null),
            None => Err(ImportError::UnmatchedForeignKey {
                table: mapping.column_name.clone(),
                value: value.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Per-satellite outcome of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SatelliteStats {
    pub table: String,
    pub created: bool,
    /// Values inserted by this run.
    pub new_values: usize,
    /// Values held after this run.
    pub total_values: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub substitutions: Substitutions,
    pub satellites: Vec<SatelliteStats>,
}

/// Persist every foreign-key domain and build the substitution tables.
pub fn reconcile<S: TableStore + ?Sized>(
    store: &mut S,
    rows: &[Vec<String>],
    mappings: &ResolvedMappings,
) -> Result<Reconciliation> {
    let mut reconciliation = Reconciliation::default();
    for domain in collect_domains(rows, mappings) {
        let created = store.create_table(&domain.table, &satellite_columns(domain.data_type))?;
        let existing = read_substitutions(store, &domain.table)?;
        let missing: Vec<Value> = domain
            .values
            .iter()
            .filter(|value| !existing.contains(value))
            .cloned()
            .collect();
        debug!(
            table = %domain.table,
            distinct = domain.values.len(),
            persisted = existing.len(),
            missing = missing.len(),
            "reconciling foreign-key domain"
        );

        let new_values = insert_values(store, &domain.table, missing)?;
        let table = read_substitutions(store, &domain.table)?;
        reconciliation.satellites.push(SatelliteStats {
            table: domain.table.clone(),
            created,
            new_values,
            total_values: table.len(),
        });
        reconciliation
            .substitutions
            .tables
            .insert(domain.position, table);
    }
    Ok(reconciliation)
}

/// Insert `values` as one batch, falling back to single inserts when a
/// constraint rejects the batch. Returns the number of rows written.
fn insert_values<S: TableStore + ?Sized>(
    store: &mut S,
    table: &str,
    values: Vec<Value>,
) -> Result<usize> {
    if values.is_empty() {
        return Ok(0);
    }
    let fields = [SATELLITE_VALUE.to_string()];
    let rows: Vec<Vec<Value>> = values.into_iter().map(|value| vec![value]).collect();
    if store.insert_many(table, &fields, &rows)? {
        return Ok(rows.len());
    }
    warn!(table, "satellite batch rejected, inserting values one at a time");
    let mut inserted = 0;
    for row in rows {
        for value in row {
            if store.insert_one(table, &[(SATELLITE_VALUE, value)])? {
                inserted += 1;
            }
        }
    }
    Ok(inserted)
}

fn read_substitutions<S: TableStore + ?Sized>(store: &S, table: &str) -> Result<SubstitutionTable> {
    let records = store.select_all(table, &[SURROGATE_KEY, SATELLITE_VALUE])?;
    let mut ids = HashMap::with_capacity(records.len());
    for record in records {
        let (Some(id), Some(value)) = (record.first(), record.get(1)) else {
            continue;
        };
        let id = id.as_integer().ok_or_else(|| ImportError::InvalidSurrogate {
            table: table.to_string(),
        })?;
        if !value.is_null() {
            ids.insert(domain_key(value), id);
        }
    }
    Ok(SubstitutionTable {
        table: table.to_string(),
        ids,
    })
}

#[cfg(test)]
mod tests {
    use csvdb_map::Transform;
    use csvdb_model::KeyRole;
    use csvdb_store::SqliteStore;

    use super::*;

    fn fk(name: &str, source_index: usize, data_type: DataType) -> ColumnMapping {
        ColumnMapping {
            source_index,
            column_name: name.to_string(),
            data_type,
            key_role: KeyRole::Foreign,
            transform: Transform::identity(),
        }
    }

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect()
    }

    #[test]
    fn domains_are_distinct_in_first_seen_order() {
        let mappings = ResolvedMappings::new(vec![fk("animal", 1, DataType::Text)]);
        let data = rows(&[&["1", "dog"], &["2", "cat"], &["3", "dog"], &["4"]]);

        let domains = collect_domains(&data, &mappings);

        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].values, vec![Value::from("dog"), Value::from("cat")]);
    }

    #[test]
    fn numeric_domains_compare_coerced_values() {
        let mappings = ResolvedMappings::new(vec![fk("code", 0, DataType::Integer)]);
        let data = rows(&[&["7"], &[" 7 "], &[""], &["8"]]);

        let domains = collect_domains(&data, &mappings);

        assert_eq!(domains[0].values, vec![Value::Integer(7), Value::Integer(8)]);
    }

    #[test]
    fn reconcile_twice_adds_nothing() {
        let mut store = SqliteStore::open_in_memory().expect("open");
        let mappings = ResolvedMappings::new(vec![fk("animal", 0, DataType::Text)]);
        let data = rows(&[&["dog"], &["cat"], &["dog"]]);

        let first = reconcile(&mut store, &data, &mappings).expect("first");
        let second = reconcile(&mut store, &data, &mappings).expect("second");

        assert_eq!(first.satellites[0].new_values, 2);
        assert!(first.satellites[0].created);
        assert_eq!(second.satellites[0].new_values, 0);
        assert!(!second.satellites[0].created);
        assert_eq!(second.satellites[0].total_values, 2);
        assert_eq!(store.count("animal").expect("count"), 2);
    }

    #[test]
    fn signed_zeros_share_one_domain_value() {
        let mut store = SqliteStore::open_in_memory().expect("open");
        let mappings = ResolvedMappings::new(vec![fk("v", 0, DataType::Real)]);
        let data = rows(&[&["0.0"], &["-0.0"], &["1.5"]]);

        let reconciliation = reconcile(&mut store, &data, &mappings).expect("reconcile");

        assert_eq!(reconciliation.satellites[0].new_values, 2);
        let mapping = fk("v", 0, DataType::Real);
        let negative_zero = domain_value(&data[1], &mapping);
        assert_eq!(
            reconciliation
                .substitutions
                .surrogate(0, &mapping, &negative_zero)
                .ok(),
            Some(Value::Integer(1))
        );
    }

    #[test]
    fn unmatched_value_fails_loudly() {
        let table = SubstitutionTable {
            table: "animal".to_string(),
            ids: HashMap::from([("dog".to_string(), 1)]),
        };
        assert_eq!(table.surrogate(&Value::from("dog")).ok(), Some(Value::Integer(1)));
        assert_eq!(table.surrogate(&Value::Null).ok(), Some(Value::Null));
        let err = table.surrogate(&Value::from("cow")).expect_err("unmatched");
        assert!(matches!(err, ImportError::UnmatchedForeignKey { value, .. } if value == "cow"));
    }
}
