//! REST API types for frontend integration.
//!
//! Responses are camelCase JSON. Report values are shipped both raw (for
//! client-side sorting) and pre-formatted (currency with two decimals and
//! thousands separators, quantities as grouped integers).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transform::aggregate::{format_count, format_usd, RankRow, TradeReport};
use crate::transform::filter::FilterChoices;
use crate::transform::pipeline::SheetInfo;

/// Response sent after a workbook upload: the new session id, the widget
/// option lists, the initial (unfiltered) report, and sheet metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Session id to pass to `/api/report` and `/api/export`.
    pub session_id: Uuid,

    /// Status: "ready" or "empty" (no human-use rows).
    pub status: String,

    /// Selectable widget values from the human-use table.
    pub filters: FilterChoices,

    /// The five rankings over the full human-use table.
    pub report: ReportTables,

    /// Metadata about the ingested sheet.
    pub metadata: UploadMetadata,
}

/// Sheet and filtering statistics for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub sheet_name: String,
    pub columns: Vec<String>,
    /// Rows parsed from the sheet.
    pub row_count: usize,
    /// Rows retained by the human-use filter.
    pub human_use_rows: usize,
}

impl UploadMetadata {
    pub fn new(sheet: &SheetInfo, human_use_rows: usize) -> Self {
        Self {
            sheet_name: sheet.sheet_name.clone(),
            columns: sheet.headers.clone(),
            row_count: sheet.row_count,
            human_use_rows,
        }
    }
}

/// Response for a report request against a cached session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub session_id: Uuid,
    /// Rows in the selected (customer/ingredient filtered) table.
    pub row_count: usize,
    pub report: ReportTables,
}

/// Query parameters shared by the report and export endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionQuery {
    pub session: Uuid,
    /// Exact customer, or "All"/absent for no filter.
    pub customer: Option<String>,
    /// Exact ingredient, or "All"/absent for no filter.
    pub api: Option<String>,
}

// =============================================================================
// Report Rendering
// =============================================================================

/// One ranked entry with its display string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub key: String,
    pub total: f64,
    /// Pre-formatted total: currency or grouped integer.
    pub display: String,
}

/// The five rankings, formatted for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTables {
    pub top_products_by_value: Vec<RankEntry>,
    pub top_products_by_quantity: Vec<RankEntry>,
    pub top_ingredients_by_value: Vec<RankEntry>,
    pub top_ingredients_by_quantity: Vec<RankEntry>,
    pub top_customers_by_value: Vec<RankEntry>,
}

impl From<&TradeReport> for ReportTables {
    fn from(report: &TradeReport) -> Self {
        Self {
            top_products_by_value: currency_entries(&report.products_by_value),
            top_products_by_quantity: count_entries(&report.products_by_quantity),
            top_ingredients_by_value: currency_entries(&report.ingredients_by_value),
            top_ingredients_by_quantity: count_entries(&report.ingredients_by_quantity),
            top_customers_by_value: currency_entries(&report.customers_by_value),
        }
    }
}

fn currency_entries(rows: &[RankRow]) -> Vec<RankEntry> {
    rows.iter()
        .map(|r| RankEntry {
            key: r.key.clone(),
            total: r.total,
            display: format_usd(r.total),
        })
        .collect()
}

fn count_entries(rows: &[RankRow]) -> Vec<RankEntry> {
    rows.iter()
        .map(|r| RankEntry {
            key: r.key.clone(),
            total: r.total,
            display: format_count(r.total),
        })
        .collect()
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tables_formatting() {
        let report = TradeReport {
            products_by_value: vec![RankRow {
                key: "A TABLET".to_string(),
                total: 1234.5,
            }],
            products_by_quantity: vec![RankRow {
                key: "A TABLET".to_string(),
                total: 5000.0,
            }],
            ingredients_by_value: vec![],
            ingredients_by_quantity: vec![],
            customers_by_value: vec![],
        };

        let tables = ReportTables::from(&report);
        assert_eq!(tables.top_products_by_value[0].display, "$1,234.50");
        assert_eq!(tables.top_products_by_quantity[0].display, "5,000");
    }

    #[test]
    fn test_camel_case_serialization() {
        let report = TradeReport {
            products_by_value: vec![],
            products_by_quantity: vec![],
            ingredients_by_value: vec![],
            ingredients_by_quantity: vec![],
            customers_by_value: vec![],
        };
        let response = ReportResponse {
            session_id: Uuid::nil(),
            row_count: 0,
            report: ReportTables::from(&report),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("sessionId"));
        assert!(json.contains("rowCount"));
        assert!(json.contains("topProductsByValue"));
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("boom");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "boom");
    }
}
