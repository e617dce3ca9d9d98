//! Ingestion Module - decodes uploaded delimited text into rows

pub mod csv_reader;

pub use csv_reader::{read_csv, read_csv_file};

/// Parsed file contents: the header line plus one cell vector per data line.
///
/// `read_csv` only produces rows with exactly `headers.len()` cells; the
/// importer rejects any dataset built by hand that breaks this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
