pub mod csv_table;
pub mod error;

pub use csv_table::{CsvTable, IngestOptions, read_csv_table, read_csv_table_from_reader};
pub use error::{IngestError, Result};
