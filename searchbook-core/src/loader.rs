//! CSV loading into all-text tables

use crate::cell_ref::column_letter;
use crate::error::{BuildError, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// An in-memory table; every cell is kept as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn data_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of a 1-based column, one per data row
    pub fn column(&self, col: u16) -> impl Iterator<Item = &str> {
        let idx = usize::from(col).saturating_sub(1);
        self.rows
            .iter()
            .filter_map(move |row| row.get(idx).map(String::as_str))
    }

    /// Occupied area once written with its header in row 1
    pub fn extent(&self) -> SheetExtent {
        SheetExtent {
            last_row: self.data_rows() as u32 + 1,
            last_col: self.column_count() as u16,
        }
    }
}

/// Last occupied row and column of a written table (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetExtent {
    pub last_row: u32,
    pub last_col: u16,
}

impl SheetExtent {
    pub fn last_col_letter(&self) -> String {
        column_letter(self.last_col)
    }
}

/// Read a CSV file with a header row into a [`Table`]
pub fn load_table(path: &Path) -> Result<Table> {
    let csv_error = |source: csv::Error| BuildError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    if headers.is_empty() {
        return Err(BuildError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.len() != headers.len() {
            return Err(BuildError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = headers.len(),
        "Loaded CSV"
    );

    Ok(Table::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_keeps_text_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "\u{feff}npi,zip,amount\n0012345678,02134,1.50\n42,,7\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.headers, vec!["npi", "zip", "amount"]);
        assert_eq!(table.rows[0], vec!["0012345678", "02134", "1.50"]);
        assert_eq!(table.rows[1], vec!["42", "", "7"]);
        assert_eq!(table.extent(), SheetExtent { last_row: 3, last_col: 3 });
        assert_eq!(table.extent().last_col_letter(), "C");
    }

    #[test]
    fn test_quoted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.csv");
        fs::write(&path, "a,b\n\"x, y\",\"say \"\"hi\"\"\"\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0], vec!["x, y", "say \"hi\""]);
    }

    #[test]
    fn test_ragged_row_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        match load_table(&path) {
            Err(BuildError::RaggedRow {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected ragged row error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_table(&dir.path().join("absent.csv")),
            Err(BuildError::Csv { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        fs::write(&path, "").unwrap();
        assert!(matches!(load_table(&path), Err(BuildError::EmptyCsv { .. })));
    }

    #[test]
    fn test_header_only_extent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "npi\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.data_rows(), 0);
        assert_eq!(table.extent(), SheetExtent { last_row: 1, last_col: 1 });
    }

    #[test]
    fn test_column_access() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "x".into()], vec!["2".into(), "y".into()]],
        );
        assert_eq!(table.column(2).collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(table.column(3).count(), 0);
    }
}
