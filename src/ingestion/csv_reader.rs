//! CSV Reader - header line + records, all cells kept as text

use crate::error::Result;
use crate::ingestion::Dataset;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse comma-separated text with a header line.
///
/// Cells are kept verbatim (no trimming, no type coercion). A record whose
/// field count differs from the header is a parse error.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Dataset::new(headers, rows))
}

pub fn read_csv_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv(file)
}
