//! Spreadsheet loader
//!
//! Parses submitted bytes into a header row plus data rows. Pure: no I/O
//! beyond the in-memory buffer.

use std::io::{Cursor, Read, Seek};

use calamine::{Data, DataType, Reader, Xls, Xlsx};

use super::{PipelineError, SpreadsheetFormat};

/// Longest text a worksheet cell can hold, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

/// Loaded spreadsheet: one header row, data rows padded to header width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows
    ///
    /// Blank rows are skipped; the first remaining row is the header. Data
    /// rows are padded or truncated to the header width. A data cell longer
    /// than [`MAX_CELL_CHARS`] cannot be re-encoded and rejects the table.
    pub fn from_rows<I>(rows: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));

        let headers = rows
            .next()
            .ok_or_else(|| PipelineError::MalformedInput("no header row found".to_string()))?;
        let width = headers.len();

        let rows: Vec<Vec<String>> = rows
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        for (index, row) in rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                let chars = cell.chars().count();
                if chars > MAX_CELL_CHARS {
                    return Err(PipelineError::MalformedInput(format!(
                        "row {} column '{}' holds {} characters (limit {})",
                        index + 1,
                        headers[col],
                        chars,
                        MAX_CELL_CHARS
                    )));
                }
            }
        }

        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse `bytes` as `format`
pub fn load(bytes: &[u8], format: SpreadsheetFormat) -> Result<Table, PipelineError> {
    match format {
        SpreadsheetFormat::DelimitedText => load_delimited(bytes),
        SpreadsheetFormat::LegacySheet => {
            let workbook: Xls<_> = Xls::new(Cursor::new(bytes))
                .map_err(|e| PipelineError::MalformedInput(format!("unreadable xls: {}", e)))?;
            load_first_sheet(workbook)
        }
        SpreadsheetFormat::ModernSheet => {
            let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| PipelineError::MalformedInput(format!("unreadable xlsx: {}", e)))?;
            load_first_sheet(workbook)
        }
    }
}

fn load_delimited(bytes: &[u8]) -> Result<Table, PipelineError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| PipelineError::MalformedInput(format!("text is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| PipelineError::MalformedInput(format!("delimited text: {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Table::from_rows(rows)
}

/// Tab when the header line is tab-separated and has no commas, else comma
fn sniff_delimiter(text: &str) -> u8 {
    let header_line = text.lines().next().unwrap_or("");
    if header_line.contains('\t') && !header_line.contains(',') {
        b'\t'
    } else {
        b','
    }
}

fn load_first_sheet<RS, R>(mut workbook: R) -> Result<Table, PipelineError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::MalformedInput("workbook has no worksheets".to_string()))?
        .map_err(|e| PipelineError::MalformedInput(format!("worksheet: {}", e)))?;

    Table::from_rows(
        range
            .rows()
            .map(|row| row.iter().map(render_cell).collect::<Vec<_>>()),
    )
}

/// Render a spreadsheet cell as text
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Bool(value) => value.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DurationIso(value) => value.clone(),
    }
}
