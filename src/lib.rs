//! # Pharmex - Pharmaceutical trade extraction and reporting
//!
//! Pharmex ingests pharmaceutical trade workbooks, filters them to human-use
//! products, derives an active-ingredient column from the product name, and
//! serves top-N rankings plus a CSV export.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Workbook   │────▶│   Parser    │────▶│  Transform  │────▶│   Reports   │
//! │ (first sht) │     │ (calamine)  │     │ (5 stages)  │     │  + CSV out  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pharmex::{run_file, PipelineOptions, TradeReport};
//!
//! let outcome = run_file("trade.xlsx", &PipelineOptions::default())?;
//! let report = TradeReport::build(&outcome.table);
//! println!("Top product: {:?}", report.products_by_value.first());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (TradeRecord, TradeTable, vocabularies)
//! - [`parser`] - Workbook ingestion (first sheet to row objects)
//! - [`transform`] - Stages, filters, aggregation, and pipeline
//! - [`session`] - In-memory per-upload table cache
//! - [`export`] - CSV export of the filtered table
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Session cache
pub mod session;

// Export
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExportError, PipelineError, ServerError, SessionError, SheetError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    columns, ColumnLayout, TradeRecord, TradeTable, ALL_SENTINEL, DEFAULT_INR_USD_RATE,
    HUMAN_USE_KEYWORDS, INGREDIENT_DELIMITERS, MISSING_NAME_TOKEN,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{parse_workbook_bytes, parse_workbook_file, SheetData};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::aggregate::{format_count, format_usd, top_n, RankRow, TradeReport};
pub use transform::filter::{human_use, is_human_use, FilterChoices, Selection};
pub use transform::pipeline::{
    run_bytes, run_file, run_sheet, PipelineOptions, PipelineOutcome, SheetInfo,
};
pub use transform::stages::{build_table, coerce_number, extract_ingredient};

// =============================================================================
// Re-exports - Session store
// =============================================================================

pub use session::{Session, SessionStore, SESSIONS};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{to_csv, EXPORT_FILE_NAME, EXPORT_MIME};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ReportResponse, ReportTables, UploadResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
