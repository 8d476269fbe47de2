//! Error types for the Pharmex reporting pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`SheetError`] - Workbook ingestion errors
//! - [`ExportError`] - CSV export errors
//! - [`SessionError`] - Session store errors
//! - [`PipelineError`] - Top-level pipeline orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Workbook Ingestion Errors
// =============================================================================

/// Errors during workbook ingestion.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The byte stream is not a readable spreadsheet.
    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),

    /// The workbook contains no sheets.
    #[error("Workbook has no sheets")]
    NoSheets,

    /// The first sheet has no header row.
    #[error("First sheet is empty (no header row)")]
    EmptySheet,
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors during CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying writer error surfaced when the CSV buffer is flushed.
    #[error("CSV flush error: {0}")]
    Io(#[from] std::io::Error),

    /// Written bytes were not valid UTF-8.
    #[error("Export encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors from the in-memory session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No table is cached under the given session id.
    #[error("Session not found: {0}")]
    NotFound(Uuid),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_bytes`].
/// Once ingestion succeeds the pipeline cannot fail: unparseable numeric
/// cells coerce to zero and missing columns fall back to defaults.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Workbook ingestion error.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingestion operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
