//! Row decoding for uploaded tables.

use ragchat_core::row_text;

/// Decodes a CSV upload (header row first) into one text per data row.
///
/// Any column set is accepted. Rows whose field count differs from the header
/// and non-UTF-8 content are errors.
///
/// # Errors
/// Returns the first decoding error encountered.
pub fn parse_row_texts(data: &[u8]) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(data);
    reader
        .records()
        .map(|record| record.map(|r| row_text(&r.iter().collect::<Vec<_>>())))
        .collect()
}
