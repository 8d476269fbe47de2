//! Workbook ingestion: first sheet of an Excel file into JSON row objects.
//!
//! Each data row becomes a JSON object keyed by the header row. No trade
//! semantics here; numeric coercion and derived columns happen in
//! [`crate::transform`].

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Value};

use crate::error::{SheetError, SheetResult};

/// Result of ingesting the first sheet of a workbook.
#[derive(Debug, Clone)]
pub struct SheetData {
    /// Name of the sheet that was read.
    pub sheet_name: String,
    /// Column headers in sheet order.
    pub headers: Vec<String>,
    /// Data rows as JSON objects. Blank cells are omitted from the object.
    pub records: Vec<Map<String, Value>>,
}

impl SheetData {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

/// Ingest the first sheet of a workbook file (xlsx, xls, xlsb, ods).
pub fn parse_workbook_file<P: AsRef<Path>>(path: P) -> SheetResult<SheetData> {
    let mut workbook = open_workbook_auto(path.as_ref())
        .map_err(|e| SheetError::InvalidWorkbook(e.to_string()))?;
    first_sheet(&mut workbook)
}

/// Ingest the first sheet of a workbook from an in-memory byte stream,
/// as received from a browser upload.
pub fn parse_workbook_bytes(bytes: &[u8]) -> SheetResult<SheetData> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetError::InvalidWorkbook(e.to_string()))?;
    first_sheet(&mut workbook)
}

fn first_sheet<RS: std::io::Read + std::io::Seek>(
    workbook: &mut calamine::Sheets<RS>,
) -> SheetResult<SheetData> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SheetError::InvalidWorkbook(e.to_string()))?;
    build_sheet(&sheet_name, range.rows())
}

/// Build a [`SheetData`] from an iterator of cell rows. The first row is the
/// header row; rows with no non-blank cell are skipped.
fn build_sheet<'a>(
    sheet_name: &str,
    mut rows: impl Iterator<Item = &'a [Data]>,
) -> SheetResult<SheetData> {
    let header_row = rows.next().ok_or(SheetError::EmptySheet)?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(cell, i))
        .collect();

    if headers.is_empty() {
        return Err(SheetError::EmptySheet);
    }

    let mut records = Vec::new();
    for row in rows {
        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row.get(i).map(cell_to_value).unwrap_or(Value::Null);
            if !value.is_null() {
                obj.insert(header.clone(), value);
            }
        }
        if !obj.is_empty() {
            records.push(obj);
        }
    }

    Ok(SheetData {
        sheet_name: sheet_name.to_string(),
        headers,
        records,
    })
}

/// Header cell to column name. Blank headers get a positional fallback so
/// downstream lookups stay unambiguous.
fn header_name(cell: &Data, index: usize) -> String {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() {
        format!("Column {}", index + 1)
    } else {
        text
    }
}

/// Map a workbook cell onto a JSON value. Blank and error cells become null,
/// which downstream stages treat as missing.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Data::Float(f) => Value::from(*f),
        Data::Int(i) => Value::from(*i),
        Data::Bool(b) => Value::from(*b),
        Data::DateTime(dt) => Value::from(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<Data>>) -> SheetResult<SheetData> {
        build_sheet("Sheet1", rows.iter().map(|r| r.as_slice()))
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn test_header_row_and_records() {
        let data = sheet(vec![
            vec![s("Product Name"), s("Quantity")],
            vec![s("PARACETAMOL TABLET"), Data::Float(100.0)],
            vec![s("AMOXYCILLIN CAPSULE"), Data::Int(50)],
        ])
        .unwrap();

        assert_eq!(data.headers, vec!["Product Name", "Quantity"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.records[0]["Product Name"], "PARACETAMOL TABLET");
        assert_eq!(data.records[0]["Quantity"], 100.0);
        assert_eq!(data.records[1]["Quantity"], 50);
    }

    #[test]
    fn test_blank_cells_omitted() {
        let data = sheet(vec![
            vec![s("Product Name"), s("Foreign Company")],
            vec![Data::Empty, s("ACME")],
        ])
        .unwrap();

        assert!(data.records[0].get("Product Name").is_none());
        assert_eq!(data.records[0]["Foreign Company"], "ACME");
    }

    #[test]
    fn test_whitespace_string_is_missing() {
        let data = sheet(vec![
            vec![s("Product Name")],
            vec![s("   ")],
            vec![s("REAL SYRUP")],
        ])
        .unwrap();

        // The all-blank row is dropped entirely.
        assert_eq!(data.row_count(), 1);
        assert_eq!(data.records[0]["Product Name"], "REAL SYRUP");
    }

    #[test]
    fn test_short_rows_tolerated() {
        let data = sheet(vec![
            vec![s("A"), s("B"), s("C")],
            vec![s("1")],
        ])
        .unwrap();

        assert_eq!(data.records[0]["A"], "1");
        assert!(data.records[0].get("B").is_none());
    }

    #[test]
    fn test_blank_header_gets_positional_name() {
        let data = sheet(vec![
            vec![s("Product Name"), Data::Empty],
            vec![s("X TABLET"), s("extra")],
        ])
        .unwrap();

        assert_eq!(data.headers[1], "Column 2");
        assert_eq!(data.records[0]["Column 2"], "extra");
    }

    #[test]
    fn test_empty_sheet_is_an_error() {
        let result = sheet(vec![]);
        assert!(matches!(result, Err(SheetError::EmptySheet)));
    }

    #[test]
    fn test_error_cells_become_missing() {
        let data = sheet(vec![
            vec![s("Quantity")],
            vec![Data::Error(calamine::CellErrorType::Div0)],
        ])
        .unwrap();

        // A row with only an error cell carries no values at all.
        assert_eq!(data.row_count(), 0);
    }
}
