//! CSV export of the filtered trade table.
//!
//! Serializes every original column in sheet order plus the derived `API`
//! and `FOB (USD)` columns, with standard CSV escaping only. The artifact is
//! offered for download as `humanuse_data.csv`.

use crate::error::ExportResult;
use crate::models::TradeTable;

/// Download filename for the exported table.
pub const EXPORT_FILE_NAME: &str = "humanuse_data.csv";

/// MIME type of the exported artifact.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize the table to CSV text.
pub fn to_csv(table: &TradeTable) -> ExportResult<String> {
    let headers = table.layout.export_headers();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    for record in &table.records {
        let row: Vec<String> = headers.iter().map(|h| record.export_field(h)).collect();
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SheetData;
    use crate::transform::stages::build_table;
    use serde_json::json;

    fn human_table() -> TradeTable {
        let sheet = SheetData {
            sheet_name: "Trade".to_string(),
            headers: vec![
                "Product Name".to_string(),
                "Foreign Company".to_string(),
                "Quantity".to_string(),
                "FOB (INR)".to_string(),
                "Port".to_string(),
            ],
            records: vec![
                json!({
                    "Product Name": "PARACETAMOL-500MG TABLET",
                    "Foreign Company": "ACME",
                    "Quantity": "100",
                    "FOB (INR)": "1000",
                    "Port": "NHAVA SHEVA"
                })
                .as_object()
                .unwrap()
                .clone(),
                json!({
                    "Product Name": "CEFIXIME SYRUP, 50ML",
                    "Foreign Company": "BETA",
                    "Quantity": 40,
                    "FOB (INR)": 2500
                })
                .as_object()
                .unwrap()
                .clone(),
            ],
        };
        build_table(sheet, 0.012)
    }

    #[test]
    fn test_header_row_order() {
        let csv_text = to_csv(&human_table()).unwrap();
        let first_line = csv_text.lines().next().unwrap();
        assert_eq!(
            first_line,
            "Product Name,Foreign Company,Quantity,FOB (INR),Port,API,FOB (USD)"
        );
    }

    #[test]
    fn test_values_escaped_and_derived() {
        let csv_text = to_csv(&human_table()).unwrap();
        // The comma inside the product name forces quoting.
        assert!(csv_text.contains("\"CEFIXIME SYRUP, 50ML\""));
        assert!(csv_text.contains("PARACETAMOL-500MG TABLET,ACME,100,1000,NHAVA SHEVA,PARACETAMOL,12"));
    }

    #[test]
    fn test_round_trip() {
        let table = human_table();
        let csv_text = to_csv(&table).unwrap();

        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), table.len());

        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        for (row, record) in rows.iter().zip(&table.records) {
            assert_eq!(
                row.get(col("Product Name")).unwrap(),
                record.product_name.as_deref().unwrap_or("")
            );
            assert_eq!(
                row.get(col("Foreign Company")).unwrap(),
                record.foreign_company.as_deref().unwrap_or("")
            );
            assert_eq!(row.get(col("API")).unwrap(), record.api);
            assert_eq!(
                row.get(col("Quantity")).unwrap().parse::<f64>().unwrap(),
                record.quantity
            );
            assert_eq!(
                row.get(col("FOB (USD)")).unwrap().parse::<f64>().unwrap(),
                record.fob_usd
            );
        }
    }

    #[test]
    fn test_written_file_reparses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);

        let table = human_table();
        std::fs::write(&path, to_csv(&table).unwrap()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), table.len());
    }

    #[test]
    fn test_empty_table_exports_headers_only() {
        let mut table = human_table();
        table.records.clear();
        let csv_text = to_csv(&table).unwrap();
        assert_eq!(csv_text.lines().count(), 1);
    }
}
