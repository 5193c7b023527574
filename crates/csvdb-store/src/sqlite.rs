//! SQLite backend.

use std::path::Path;

use csvdb_model::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, ErrorCode, params_from_iter};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::store::{ColumnConstraint, ColumnSpec, Record, TableStore};

/// A [`TableStore`] backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty())
            && !parent.is_dir()
        {
            return Err(StoreError::DirectoryNotFound {
                path: parent.to_path_buf(),
            });
        }
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }
}

impl TableStore for SqliteStore {
    fn table_exists(&self, name: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [name],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    fn create_table(&mut self, name: &str, columns: &[ColumnSpec]) -> Result<bool> {
        if self.table_exists(name)? {
            return Ok(false);
        }
        let definitions: Vec<String> = columns.iter().map(column_definition).collect();
        let sql = format!(
            "CREATE TABLE {} ({})",
            quote_identifier(name),
            definitions.join(", ")
        );
        debug!(sql = %sql, "creating table");
        self.conn.execute(&sql, [])?;
        Ok(true)
    }

    fn table_columns(&self, name: &str) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(name));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Err(StoreError::UnknownTable {
                table: name.to_string(),
            });
        }
        Ok(columns)
    }

    fn add_column(&mut self, table: &str, column: &ColumnSpec) -> Result<bool> {
        let unsupported = match column.constraint {
            ColumnConstraint::PrimaryKey | ColumnConstraint::AutoIncrementPrimaryKey => {
                Some("primary key")
            }
            ColumnConstraint::Unique => Some("unique"),
            ColumnConstraint::None | ColumnConstraint::References { .. } => None,
        };
        if let Some(constraint) = unsupported {
            return Err(StoreError::UnsupportedAlter {
                table: table.to_string(),
                column: column.name.clone(),
                constraint,
            });
        }
        if self.table_columns(table)?.contains(&column.name) {
            return Ok(false);
        }
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_identifier(table),
            column_definition(column)
        );
        debug!(sql = %sql, "adding column");
        self.conn.execute(&sql, [])?;
        Ok(true)
    }

    fn insert_one(&mut self, table: &str, fields: &[(&str, Value)]) -> Result<bool> {
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        let sql = insert_statement(table, &names);
        let params = params_from_iter(fields.iter().map(|(_, value)| to_sql(value)));
        match self.conn.execute(&sql, params) {
            Ok(_) => Ok(true),
            Err(err) if is_constraint_violation(&err) => {
                debug!(table, error = %err, "insert rejected by constraint");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn insert_many(&mut self, table: &str, fields: &[String], rows: &[Vec<Value>]) -> Result<bool> {
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        let sql = insert_statement(table, &names);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (index, row) in rows.iter().enumerate() {
                if row.len() != fields.len() {
                    return Err(StoreError::RowWidth {
                        table: table.to_string(),
                        row: index + 1,
                        expected: fields.len(),
                        found: row.len(),
                    });
                }
                match stmt.execute(params_from_iter(row.iter().map(to_sql))) {
                    Ok(_) => {}
                    Err(err) if is_constraint_violation(&err) => {
                        warn!(table, row = index + 1, error = %err, "batch insert rejected, rolling back");
                        return Ok(false);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        tx.commit()?;
        Ok(true)
    }

    fn select_all(&self, table: &str, fields: &[&str]) -> Result<Vec<Record>> {
        let projection = if fields.is_empty() {
            "*".to_string()
        } else {
            fields
                .iter()
                .map(|field| quote_identifier(field))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let sql = format!(
            "SELECT {projection} FROM {} ORDER BY rowid",
            quote_identifier(table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let width = stmt.column_count();
        let records = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|index| row.get_ref(index).map(from_sql))
                    .collect::<rusqlite::Result<Record>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn count(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count = self.conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Double-quote an identifier, doubling embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_definition(column: &ColumnSpec) -> String {
    let name = quote_identifier(&column.name);
    let sql_type = column.data_type.as_sql();
    match &column.constraint {
        ColumnConstraint::None => format!("{name} {sql_type}"),
        ColumnConstraint::PrimaryKey => format!("{name} {sql_type} PRIMARY KEY"),
        ColumnConstraint::AutoIncrementPrimaryKey => {
            format!("{name} INTEGER PRIMARY KEY AUTOINCREMENT")
        }
        ColumnConstraint::Unique => format!("{name} {sql_type} UNIQUE"),
        ColumnConstraint::References { table, column } => format!(
            "{name} {sql_type} REFERENCES {}({})",
            quote_identifier(table),
            quote_identifier(column)
        ),
    }
}

fn insert_statement(table: &str, fields: &[&str]) -> String {
    if fields.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_identifier(table));
    }
    let columns: Vec<String> = fields.iter().map(|field| quote_identifier(field)).collect();
    let placeholders: Vec<String> = (1..=fields.len()).map(|index| format!("?{index}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(number) => SqlValue::Integer(*number),
        Value::Real(number) => SqlValue::Real(*number),
        Value::Text(text) => SqlValue::Text(text.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::Integer(number),
        ValueRef::Real(number) => Value::Real(number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
