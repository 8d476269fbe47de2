//! In-place transform stages: numeric normalization, ingredient extraction,
//! and USD derivation.
//!
//! Together these turn parsed sheet rows into [`TradeRecord`]s. All three are
//! best-effort by design: trade sheets routinely contain blanks and stray
//! text, so unparseable numbers coerce to zero and a missing product name
//! falls back to the literal [`MISSING_NAME_TOKEN`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{
    columns, ColumnLayout, TradeRecord, TradeTable, INGREDIENT_DELIMITERS, MISSING_NAME_TOKEN,
};
use crate::parser::SheetData;

static INGREDIENT_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(INGREDIENT_DELIMITERS).expect("delimiter class must compile"));

/// Coerce a cell to a number. Missing, blank, and unparseable cells all
/// become zero; no error is ever raised for malformed numeric data.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => {
            let f = n.as_f64().unwrap_or(0.0);
            if f.is_finite() {
                f
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Derive the active-ingredient token from a product name.
///
/// The name is uppercased and split on the delimiter set; the leading token
/// is kept. This assumes the ingredient is the first word before any
/// dosage/strength qualifier. A name with no delimiter yields the whole
/// uppercased string; a missing name yields `NAN`.
pub fn extract_ingredient(product_name: Option<&str>) -> String {
    let Some(name) = product_name else {
        return MISSING_NAME_TOKEN.to_string();
    };
    let upper = name.to_uppercase();
    INGREDIENT_SPLIT
        .splitn(&upper, 2)
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Compute the USD value for one record.
///
/// An INR column takes precedence and overwrites any USD column the sheet
/// already had; with no INR column the sheet's own USD value is kept; with
/// neither, the value defaults to zero.
pub fn derive_usd(layout: &ColumnLayout, fob_inr: f64, sheet_usd: f64, rate: f64) -> f64 {
    if layout.has_fob_inr {
        fob_inr * rate
    } else if layout.has_fob_usd {
        sheet_usd
    } else {
        0.0
    }
}

/// Build the trade table from a parsed sheet: resolve the column layout once,
/// then run normalization, extraction, and derivation over every row.
pub fn build_table(sheet: SheetData, rate: f64) -> TradeTable {
    let layout = ColumnLayout::resolve(sheet.headers);

    let records = sheet
        .records
        .into_iter()
        .map(|raw| build_record(raw, &layout, rate))
        .collect();

    TradeTable {
        sheet_name: sheet.sheet_name,
        layout,
        records,
    }
}

fn build_record(raw: Map<String, Value>, layout: &ColumnLayout, rate: f64) -> TradeRecord {
    let product_name = text_field(&raw, columns::PRODUCT_NAME);
    let foreign_company = text_field(&raw, columns::FOREIGN_COMPANY);

    let quantity = coerce_number(raw.get(columns::QUANTITY));
    let fob_inr = coerce_number(raw.get(columns::FOB_INR));
    let item_rate_inr = coerce_number(raw.get(columns::ITEM_RATE_INR));
    let sheet_usd = coerce_number(raw.get(columns::FOB_USD));

    let fob_usd = derive_usd(layout, fob_inr, sheet_usd, rate);
    let api = extract_ingredient(product_name.as_deref());

    TradeRecord {
        product_name,
        foreign_company,
        quantity,
        fob_inr,
        item_rate_inr,
        fob_usd,
        api,
        raw,
    }
}

/// Read a cell as free text. Numbers are rendered to text; anything else is
/// treated as missing.
fn text_field(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
