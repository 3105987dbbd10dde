//! API Server Module
//!
//! This module implements the HTTP server for the export batch monitor.
//! It provides a read-only endpoint that validates the query parameters,
//! lists the matching export batches and streams the report back.

use crate::{
    batch::ExportMonitor,
    config::Config,
    error::MonitorError,
    report::ReportRenderer,
    validation::{BatchQueryParams, QueryValidator},
};
use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

/// Path of the batch report endpoint
pub const EXPORT_BATCH_PATH: &str = "/monitor/export/batch";

/// Shared application state that is accessible across all request handlers
///
/// Holds no per-request data; every handler works on its own query.
/// - `validator`: Turns query parameters into a typed batch query
/// - `monitor`: Lists export batches from the task store
/// - `renderer`: Output format of the report
#[derive(Clone)]
pub struct AppState {
    validator: QueryValidator,
    monitor: ExportMonitor,
    renderer: Arc<dyn ReportRenderer>,
}

/// The main API server struct
///
/// Encapsulates the server configuration and application state.
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port, etc.)
    /// * `monitor` - Export batch query service
    /// * `renderer` - Report output format
    pub fn new(config: Config, monitor: ExportMonitor, renderer: Arc<dyn ReportRenderer>) -> Self {
        let state = AppState {
            validator: QueryValidator::new(),
            monitor,
            renderer,
        };

        Self { config, state }
    }

    /// Builds the router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            .route(EXPORT_BATCH_PATH, get(list_export_batches))
            .route("/health", get(health))
            .with_state(self.state.clone())
    }

    /// Starts the API server and begins listening for incoming requests
    ///
    /// # Returns
    /// `Ok(())` once the server shuts down, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

        Ok(())
    }
}

/// `GET /monitor/export/batch`
///
/// Validation happens before the store is queried; a bad parameter never
/// starts any aggregation work. The report body is streamed batch by batch.
async fn list_export_batches(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    uri: Uri,
    Query(params): Query<BatchQueryParams>,
) -> Result<Response, MonitorError> {
    info!("Process GET {} from {}", uri, remote_host(connect_info.as_ref()));

    let query = state.validator.validate(&params)?;
    let batches = state.monitor.list_export_batches(&query).await?;
    info!("Listing {} export batches", batches.len());

    let body = Body::from_stream(state.renderer.render(batches));
    Ok((
        [
            (header::CONTENT_TYPE, state.renderer.content_type()),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// Remote peer address for request logging; absent when the router is
/// served without connect info
fn remote_host(connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    connect_info.map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string())
}

/// Liveness check
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        // Only a store failure is worth retrying; everything else is the caller's fault.
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            status,
            [(header::CACHE_CONTROL, "no-cache")],
            Json(json!({ "errorMessage": self.to_string() })),
        )
            .into_response()
    }
}
