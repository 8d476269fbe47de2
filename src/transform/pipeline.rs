//! High-level pipeline API: workbook bytes to a human-use trade table.
//!
//! Combines the stages in order: ingestion, numeric normalization,
//! ingredient extraction, USD derivation, human-use filtering. Interactive
//! selection and aggregation run afterwards, per request, against the
//! pipeline's output table.
//!
//! # Example
//!
//! ```rust,ignore
//! use pharmex::transform::pipeline::{run_file, PipelineOptions};
//!
//! let outcome = run_file("trade.xlsx", &PipelineOptions::default())?;
//! println!("{} human-use rows", outcome.table.len());
//! ```

use std::path::Path;

use serde::Serialize;

use crate::api::logs::{log_info, log_success};
use crate::error::PipelineResult;
use crate::models::{TradeTable, DEFAULT_INR_USD_RATE};
use crate::parser::{parse_workbook_bytes, parse_workbook_file, SheetData};
use crate::transform::filter::human_use;
use crate::transform::stages::build_table;

/// Options for the transformation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// INR to USD conversion rate applied by the derivation stage.
    /// Fixed by default; injectable so tests can substitute a rate.
    pub inr_usd_rate: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            inr_usd_rate: DEFAULT_INR_USD_RATE,
        }
    }
}

/// Metadata about the ingested sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub sheet_name: String,
    pub headers: Vec<String>,
    /// Data rows parsed from the sheet, before any filtering.
    pub row_count: usize,
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The human-use table: normalized, derived, keyword-filtered.
    pub table: TradeTable,
    /// Sheet metadata for display.
    pub sheet: SheetInfo,
}

/// Run the pipeline on a workbook file.
pub fn run_file<P: AsRef<Path>>(
    path: P,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutcome> {
    let sheet = parse_workbook_file(path)?;
    Ok(run_sheet(sheet, options))
}

/// Run the pipeline on uploaded workbook bytes.
pub fn run_bytes(bytes: &[u8], options: &PipelineOptions) -> PipelineResult<PipelineOutcome> {
    let sheet = parse_workbook_bytes(bytes)?;
    Ok(run_sheet(sheet, options))
}

/// Run the pipeline on an already-parsed sheet. Cannot fail: every stage
/// after ingestion degrades to defaults instead of erroring.
pub fn run_sheet(sheet: SheetData, options: &PipelineOptions) -> PipelineOutcome {
    log_info(format!(
        "Read sheet '{}': {} rows, {} columns",
        sheet.sheet_name,
        sheet.row_count(),
        sheet.headers.len()
    ));

    let info = SheetInfo {
        sheet_name: sheet.sheet_name.clone(),
        headers: sheet.headers.clone(),
        row_count: sheet.row_count(),
    };

    log_info("Normalizing numeric columns and extracting ingredients...");
    let table = build_table(sheet, options.inr_usd_rate);

    log_info("Filtering to human-use dosage forms...");
    let human = human_use(&table);
    log_success(format!(
        "{} of {} rows are human-use",
        human.len(),
        table.len()
    ));

    PipelineOutcome {
        table: human,
        sheet: info,
    }
}
