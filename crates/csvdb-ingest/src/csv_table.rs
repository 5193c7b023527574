use std::io;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Options controlling how an input file is tokenized.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// The first record holds column titles rather than data.
    pub has_header_row: bool,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            has_header_row: false,
            delimiter: b',',
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_header_row(mut self, enable: bool) -> Self {
        self.has_header_row = enable;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// A fully materialized input file.
///
/// Rows keep their raw text and their original width; ragged rows are not
/// padded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Number of input columns: the wider of the header row and the widest
    /// data row.
    pub fn width(&self) -> usize {
        let widest_row = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        self.headers
            .as_ref()
            .map_or(widest_row, |headers| headers.len().max(widest_row))
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

pub fn read_csv_table(path: &Path, options: &IngestOptions) -> Result<CsvTable> {
    let file = std::fs::File::open(path).map_err(|err| IngestError::from_io(path, err))?;
    let table = read_csv_table_from_reader(file, path, options)?;
    debug!(
        path = %path.display(),
        rows = table.rows.len(),
        width = table.width(),
        "loaded input file"
    );
    Ok(table)
}

/// Read delimited text from any reader. `source` is only used in errors.
pub fn read_csv_table_from_reader<R: io::Read>(
    reader: R,
    source: &Path,
    options: &IngestOptions,
) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IngestError::from_csv(source, err))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if rows.is_empty()
            && let Some(first) = row.first_mut()
        {
            *first = strip_bom(first).to_string();
        }
        rows.push(row);
    }
    if !options.has_header_row || rows.is_empty() {
        let headers = options.has_header_row.then(Vec::new);
        return Ok(CsvTable { headers, rows });
    }
    let header_row = rows.remove(0);
    let headers = header_row
        .iter()
        .map(|value| normalize_header(value))
        .collect();
    Ok(CsvTable {
        headers: Some(headers),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str, options: IngestOptions) -> CsvTable {
        read_csv_table_from_reader(contents.as_bytes(), Path::new("test.csv"), &options)
            .expect("parse csv")
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("\u{feff} First   Name "), "First Name");
    }

    #[test]
    fn splits_header_row() {
        let table = parse(
            "name,email\nada,ada@example.com\n",
            IngestOptions::default().with_header_row(true),
        );
        assert_eq!(
            table.headers,
            Some(vec!["name".to_string(), "email".to_string()])
        );
        assert_eq!(table.rows, vec![vec!["ada", "ada@example.com"]]);
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn width_without_headers_uses_widest_row() {
        let table = parse("1,2\n3,4,5\n", IngestOptions::default());
        assert!(table.headers.is_none());
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn width_counts_cells_past_the_header() {
        let table = parse(
            "a,b\n1,2,3\n4,5,6\n",
            IngestOptions::default().with_header_row(true),
        );
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn keeps_empty_records_and_cell_text() {
        let table = parse("a, b \n,\n\n c ,d\n", IngestOptions::default());
        assert_eq!(
            table.rows,
            vec![vec!["a", " b "], vec!["", ""], vec![" c ", "d"]]
        );
    }

    #[test]
    fn honors_delimiter() {
        let table = parse(
            "x;y\n1;2\n",
            IngestOptions::default()
                .with_header_row(true)
                .with_delimiter(b';'),
        );
        assert_eq!(table.headers, Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }
}
