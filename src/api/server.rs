//! HTTP server for the Pharmex API.
//!
//! The browser uploads a workbook once; every widget interaction afterwards
//! re-reads the cached session table with different query parameters.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                                 |
//! |--------|---------------|---------------------------------------------|
//! | GET    | `/health`     | Health check                                |
//! | POST   | `/api/upload` | Upload workbook, returns session + report   |
//! | GET    | `/api/report` | Rankings for a session, optionally filtered |
//! | GET    | `/api/export` | CSV download of the filtered table          |
//! | GET    | `/api/logs`   | SSE stream for real-time pipeline logs      |

use axum::{
    extract::{Multipart, Query},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{
    error_response, ReportResponse, ReportTables, SelectionQuery, UploadMetadata, UploadResponse,
};
use crate::export::{to_csv, EXPORT_FILE_NAME, EXPORT_MIME};
use crate::models::TradeTable;
use crate::session::SESSIONS;
use crate::transform::aggregate::TradeReport;
use crate::transform::filter::{FilterChoices, Selection};
use crate::transform::pipeline::{run_bytes, PipelineOptions};

type ApiError = (StatusCode, Json<Value>);

/// Start the HTTP server.
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_workbook))
        .route("/api/report", get(report))
        .route("/api/export", get(export_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Pharmex server running on http://localhost:{}", port);
    println!("   POST /api/upload - Upload trade workbook");
    println!("   GET  /api/report - Rankings for a session");
    println!("   GET  /api/export - Download filtered CSV");
    println!("   GET  /api/logs   - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pharmex",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "report": "GET /api/report",
            "export": "GET /api/export",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming.
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: run the pipeline and cache the human-use table.
async fn upload_workbook(mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(format!("Multipart error: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request("No file provided".to_string()))?;

    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    );

    let outcome = run_bytes(&bytes, &PipelineOptions::default()).map_err(|e| {
        eprintln!("❌ Ingestion error: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(error_response(&e.to_string())),
        )
    })?;

    let filters = FilterChoices::from_table(&outcome.table);
    let report = ReportTables::from(&TradeReport::build(&outcome.table));
    let metadata = UploadMetadata::new(&outcome.sheet, outcome.table.len());
    let status = if outcome.table.is_empty() { "empty" } else { "ready" };

    let session_id = SESSIONS.insert(outcome.table, outcome.sheet);

    Ok(Json(UploadResponse {
        session_id,
        status: status.to_string(),
        filters,
        report,
        metadata,
    }))
}

/// Report endpoint: rankings over the (optionally filtered) session table.
async fn report(Query(query): Query<SelectionQuery>) -> Result<Json<ReportResponse>, ApiError> {
    let selected = select(&query)?;

    Ok(Json(ReportResponse {
        session_id: query.session,
        row_count: selected.len(),
        report: ReportTables::from(&TradeReport::build(&selected)),
    }))
}

/// Export endpoint: the filtered table as a CSV download.
async fn export_csv(Query(query): Query<SelectionQuery>) -> Result<impl IntoResponse, ApiError> {
    let selected = select(&query)?;

    let csv_text = to_csv(&selected).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&e.to_string())),
        )
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        csv_text,
    ))
}

/// Fetch the session table and apply the selection filters from the query.
fn select(query: &SelectionQuery) -> Result<TradeTable, ApiError> {
    let session = SESSIONS.get(&query.session).map_err(|e| {
        (StatusCode::NOT_FOUND, Json(error_response(&e.to_string())))
    })?;

    let selection = Selection::from_widgets(query.customer.clone(), query.api.clone());
    Ok(selection.apply(&session.table))
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(&message)))
}
