//! Cleaned artifact encoding
//!
//! Cleaned records are written as a single-sheet xlsx workbook: one bold
//! header row in canonical order, then one row per record. Every cell is a
//! string cell so postal codes and phone numbers keep their leading zeros.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::models::{canonical_headers, CanonicalRecord};

use super::loader::{self, Table};
use super::{PipelineError, SpreadsheetFormat};

/// Worksheet name of cleaned artifacts
pub const SHEET_NAME: &str = "census";

/// Encode `records` as xlsx bytes
pub fn encode_xlsx(records: &[CanonicalRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in canonical_headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in record.values().iter().enumerate() {
            // Empty cells are left unwritten
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    workbook.save_to_buffer()
}

/// Decode a cleaned artifact back into a table
pub fn decode_xlsx(bytes: &[u8]) -> Result<Table, PipelineError> {
    loader::load(bytes, SpreadsheetFormat::ModernSheet)
}

/// Number of data rows in an encoded artifact (header excluded)
pub fn count_xlsx_rows(bytes: &[u8]) -> Result<usize, PipelineError> {
    decode_xlsx(bytes).map(|table| table.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalField;

    fn record(first: &str, zip: &str) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();
        record.set(CanonicalField::FirstName, first);
        record.set(CanonicalField::ZipCode, zip);
        record
    }

    #[test]
    fn test_encoded_workbook_has_canonical_header_and_rows() {
        let records = vec![record("Ann", "02134"), record("Bob", "")];

        let bytes = encode_xlsx(&records).unwrap();
        let table = decode_xlsx(&bytes).unwrap();

        assert_eq!(table.headers, canonical_headers());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][CanonicalField::FirstName.index()], "Ann");
        assert_eq!(table.rows[0][CanonicalField::ZipCode.index()], "02134");
        assert_eq!(table.rows[1][CanonicalField::ZipCode.index()], "");
    }

    #[test]
    fn test_count_matches_record_count() {
        for count in [0usize, 1, 17] {
            let records: Vec<_> = (0..count).map(|i| record(&format!("P{}", i), "")).collect();
            let bytes = encode_xlsx(&records).unwrap();
            assert_eq!(count_xlsx_rows(&bytes).unwrap(), count);
        }
    }

    #[test]
    fn test_decode_rejects_non_workbook_bytes() {
        assert!(matches!(
            count_xlsx_rows(b"first,last\n"),
            Err(PipelineError::MalformedInput(_))
        ));
    }
}
