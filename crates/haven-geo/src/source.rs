//! Tabular source reading and writing

use std::io::ErrorKind;
use std::path::Path;

use haven_core::{Error, Result};

/// A raw table as read from a source: header names and string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Trim whitespace around every header name
    pub fn normalize_headers(&mut self) {
        for header in &mut self.headers {
            *header = header.trim().to_string();
        }
    }

    /// Index of the first header matching any of `names`, case-insensitively
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| names.iter().any(|name| header.eq_ignore_ascii_case(name)))
    }

    /// Trimmed cell value; missing cells of short rows read as empty
    pub fn cell<'a>(&self, row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|index| row.get(index))
            .map(|value| value.trim())
            .unwrap_or("")
    }

    /// Append a column, padding existing rows with empty cells
    pub fn add_column(&mut self, name: &str) -> usize {
        self.headers.push(name.to_string());
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        width - 1
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trait for tabular sources
///
/// `read` reports a missing source as [`Error::Io`] with
/// [`ErrorKind::NotFound`] so callers can tell "absent" from "unreadable".
pub trait SourceReader: Send + Sync {
    /// Read a whole table
    fn read(&self, source: &str) -> Result<SourceTable>;

    /// Replace a whole table
    fn write(&self, source: &str, table: &SourceTable) -> Result<()>;
}

/// Comma-separated files addressed by path
#[derive(Debug, Clone, Default)]
pub struct CsvSourceReader;

impl CsvSourceReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for CsvSourceReader {
    fn read(&self, source: &str) -> Result<SourceTable> {
        let path = Path::new(source);
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("source file not found: {}", source),
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Load(format!("{}: {}", source, e)))?;

        let headers = reader
            .headers()
            .map_err(|e| Error::Load(format!("{}: {}", source, e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = SourceTable::new(headers);
        for record in reader.records() {
            let record = record.map_err(|e| Error::Load(format!("{}: {}", source, e)))?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(table)
    }

    fn write(&self, source: &str, table: &SourceTable) -> Result<()> {
        let path = Path::new(source);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Serialization(format!("{}: {}", source, e)))?;

        writer
            .write_record(&table.headers)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        for row in &table.rows {
            writer
                .write_record(row)
                .map_err(|e| Error::Serialization(e.to_string()))?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_keeps_raw_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bunkers.csv");
        std::fs::write(&path, " lat , lon ,type\n32.1,34.8,bunker\n").unwrap();

        let mut table = CsvSourceReader::new().read(path.to_str().unwrap()).unwrap();
        assert_eq!(table.headers, vec![" lat ", " lon ", "type"]);

        table.normalize_headers();
        assert_eq!(table.column(&["lat"]), Some(0));
        assert_eq!(table.column(&["kind", "type"]), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = CsvSourceReader::new().read("/definitely/not/here.csv").unwrap_err();
        match err {
            Error::Io(io) => assert_eq!(io.kind(), ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("heat.csv");
        let source = path.to_str().unwrap();

        let mut table = SourceTable::new(vec!["lat".into(), "lon".into(), "type".into()]);
        table.rows.push(vec!["31.7".into(), "35.2".into(), "explosion".into()]);

        let reader = CsvSourceReader::new();
        reader.write(source, &table).unwrap();
        assert_eq!(reader.read(source).unwrap(), table);
    }

    #[test]
    fn test_short_rows_and_added_columns() {
        let mut table = SourceTable::new(vec!["lat".into(), "lon".into()]);
        table.rows.push(vec!["1.0".into()]);

        let row = table.rows[0].clone();
        assert_eq!(table.cell(&row, Some(1)), "");

        let index = table.add_column("desc");
        assert_eq!(index, 2);
        assert_eq!(table.rows[0].len(), 3);
    }
}
