//! Domain models for the Pharmex reporting pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`TradeRecord`] - One trade row with typed fields and raw passthrough cells
//! - [`TradeTable`] - The in-memory table for one upload-to-export cycle
//! - [`ColumnLayout`] - Column presence, resolved once at table construction
//!
//! It also holds the named vocabularies the filter and extraction stages are
//! parameterized with, so tests can substitute alternates.

use serde::Serialize;
use serde_json::{Map, Value};

// =============================================================================
// Vocabularies and Constants
// =============================================================================

/// Dosage-form keywords that mark a product as human-use.
///
/// Matched as case-insensitive substrings of the product name, not as whole
/// words: "EXTABLETX" matches TABLET. That is the documented heuristic.
pub const HUMAN_USE_KEYWORDS: [&str; 7] = [
    "TABLET",
    "CAPSULE",
    "INJECTION",
    "SYRUP",
    "CREAM",
    "OINTMENT",
    "DROPS",
];

/// Delimiter set splitting the active ingredient off the product name.
/// Regex character class: hyphen, plus, slash, parens, space.
pub const INGREDIENT_DELIMITERS: &str = r"[-+/() ]";

/// Fixed INR to USD conversion rate. Not fetched live; injected into the
/// derivation stage through [`crate::transform::pipeline::PipelineOptions`].
pub const DEFAULT_INR_USD_RATE: f64 = 0.012;

/// Ingredient token substituted when the product name is missing.
pub const MISSING_NAME_TOKEN: &str = "NAN";

/// Sentinel value meaning "no filter" for the interactive selections.
pub const ALL_SENTINEL: &str = "All";

/// Well-known column headers of a trade record sheet.
pub mod columns {
    pub const PRODUCT_NAME: &str = "Product Name";
    pub const FOREIGN_COMPANY: &str = "Foreign Company";
    pub const QUANTITY: &str = "Quantity";
    pub const FOB_INR: &str = "FOB (INR)";
    pub const FOB_USD: &str = "FOB (USD)";
    pub const ITEM_RATE_INR: &str = "Item Rate(INR)";
    pub const API: &str = "API";
}

// =============================================================================
// Column Layout
// =============================================================================

/// Which optional columns the uploaded sheet actually carries.
///
/// Resolved once when the table is built, so downstream stages never probe
/// for column presence again.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnLayout {
    /// Headers in original sheet order.
    pub headers: Vec<String>,
    pub has_quantity: bool,
    pub has_fob_inr: bool,
    pub has_fob_usd: bool,
    pub has_item_rate: bool,
}

impl ColumnLayout {
    /// Resolve column presence from the sheet's header row.
    pub fn resolve(headers: Vec<String>) -> Self {
        let has = |name: &str| headers.iter().any(|h| h == name);
        Self {
            has_quantity: has(columns::QUANTITY),
            has_fob_inr: has(columns::FOB_INR),
            has_fob_usd: has(columns::FOB_USD),
            has_item_rate: has(columns::ITEM_RATE_INR),
            headers,
        }
    }

    /// Headers for export: original sheet order, with the derived `API` and
    /// `FOB (USD)` columns appended when the sheet did not already have them.
    pub fn export_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        if !headers.iter().any(|h| h == columns::API) {
            headers.push(columns::API.to_string());
        }
        if !self.has_fob_usd {
            headers.push(columns::FOB_USD.to_string());
        }
        headers
    }
}

// =============================================================================
// Trade Record
// =============================================================================

/// One row of the trade table after normalization and derivation.
///
/// Numeric fields are always finite numbers (unparseable cells coerced to
/// zero, absent columns defaulted to zero). `api` is always set, worst case
/// to [`MISSING_NAME_TOKEN`]. `raw` keeps every original cell for export
/// passthrough of columns the pipeline does not interpret.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub product_name: Option<String>,
    pub foreign_company: Option<String>,
    pub quantity: f64,
    pub fob_inr: f64,
    pub item_rate_inr: f64,
    /// Always present after derivation: computed from INR, kept from the
    /// sheet, or defaulted to zero.
    pub fob_usd: f64,
    /// Derived active-ingredient token (uppercased leading word).
    pub api: String,
    /// Original cells keyed by header, for export passthrough.
    pub raw: Map<String, Value>,
}

impl TradeRecord {
    /// Render the cell for `header` as CSV text.
    ///
    /// Interpreted columns come from the typed (coerced/derived) fields;
    /// everything else passes through from the raw cells.
    pub fn export_field(&self, header: &str) -> String {
        match header {
            columns::API => self.api.clone(),
            columns::FOB_USD => format_number(self.fob_usd),
            columns::QUANTITY => format_number(self.quantity),
            columns::FOB_INR => format_number(self.fob_inr),
            columns::ITEM_RATE_INR => format_number(self.item_rate_inr),
            _ => self.raw.get(header).map(value_to_text).unwrap_or_default(),
        }
    }
}

/// Render a cell value as plain text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Render a numeric cell without a trailing `.0` for whole values.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

// =============================================================================
// Trade Table
// =============================================================================

/// The in-memory trade table.
///
/// Created fresh from each upload, narrowed (never mutated) by the filtering
/// stages, and discarded when the session ends or a new file is uploaded.
#[derive(Debug, Clone, Serialize)]
pub struct TradeTable {
    /// Name of the workbook sheet the table was read from.
    pub sheet_name: String,
    pub layout: ColumnLayout,
    pub records: Vec<TradeRecord>,
}

impl TradeTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
