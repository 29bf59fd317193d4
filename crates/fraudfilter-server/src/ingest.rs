//! CSV upload parsing

use fraudfilter_classifiers::{FieldValue, Table};
use tracing::debug;

const UTF8_BOM: char = '\u{feff}';

/// Upload could not be read as a table
#[derive(Debug, thiserror::Error)]
#[error("malformed CSV: {0}")]
pub struct CsvError(#[from] csv::Error);

/// Parse an uploaded CSV body into a [`Table`]
///
/// The first record is the header row. Invalid UTF-8 is replaced with
/// U+FFFD so the affected rows fail individually downstream instead of
/// rejecting the whole file. Ragged rows reject the file.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let header = String::from_utf8_lossy(h);
            if i == 0 {
                header.trim_start_matches(UTF8_BOM).to_string()
            } else {
                header.into_owned()
            }
        })
        .collect();

    let mut table = Table::new(headers);
    for record in reader.byte_records() {
        let record = record?;
        let row = record
            .iter()
            .map(|cell| FieldValue::from(String::from_utf8_lossy(cell).as_ref()))
            .collect();
        table.push_row(row);
    }

    debug!(
        "Parsed CSV upload: {} columns, {} rows",
        table.headers.len(),
        table.len()
    );
    Ok(table)
}
