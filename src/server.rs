//! HTTP server for the dashboard.
//!
//! Provides the following endpoints:
//! - `GET /` - The dashboard page
//! - `GET /api/figures/{stage}` - Figures for a stage's control state
//! - `GET /health` - Liveness probe (always returns 200 OK)
//! - `GET /metrics` - Prometheus-formatted metrics

use crate::catalog::Catalog;
use crate::data::DataSource;
use crate::error::Error;
use crate::layout::{self, PageMode};
use crate::metrics;
use crate::plots::{self, Rendered, Selection, StageId};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the dashboard server.
pub struct ServerConfig {
    /// Address to bind to. Port 0 picks a free port.
    pub listen: SocketAddr,
    /// Directory holding the results files.
    pub data_dir: PathBuf,
    pub catalog: Catalog,
}

struct AppState {
    source: DataSource,
    catalog: Catalog,
    page: String,
}

/// Handle returned by [`start`] for shutdown coordination.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    join_handle: std::thread::JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal the server to shut down and wait for it to finish.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.join_handle.join();
    }
}

/// Bind the listener and serve from a dedicated thread with a
/// single-threaded Tokio runtime.
///
/// The listener is bound before this returns, so requests can be sent as
/// soon as the handle is available.
pub fn start(config: ServerConfig) -> std::io::Result<ServerHandle> {
    let listener = std::net::TcpListener::bind(config.listen)?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let app = router(config.data_dir, config.catalog);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let join_handle = std::thread::Builder::new()
        .name("dashboard".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to register listener");
                        return;
                    }
                };

                tracing::info!(address = %local_addr, "dashboard listening");

                let result = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;

                if let Err(e) = result {
                    tracing::error!(error = %e, "dashboard server error");
                }

                tracing::debug!("dashboard stopped");
            });
        })?;

    Ok(ServerHandle {
        local_addr,
        shutdown_tx,
        join_handle,
    })
}

/// Serve until Ctrl-C is received.
pub fn run(config: ServerConfig) -> std::io::Result<()> {
    let handle = start(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
    });

    tracing::info!("shutting down");
    handle.shutdown();
    Ok(())
}

/// Build the router over a data directory and catalog.
pub fn router(data_dir: PathBuf, catalog: Catalog) -> Router {
    let page = layout::render_page(&catalog, &PageMode::Live);
    let state = Arc::new(AppState {
        source: DataSource::new(data_dir),
        catalog,
        page,
    });

    Router::new()
        .route("/", get(index_handler))
        .route("/api/figures/{stage}", get(figures_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

/// Render one stage. File reads happen on the blocking pool.
async fn figures_handler(
    State(state): State<Arc<AppState>>,
    Path(stage): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Rendered>, ApiError> {
    metrics::HTTP_REQUESTS.increment();

    let stage: StageId = stage.parse()?;
    let selection = Selection::from_query(stage, &params, &state.catalog)?;

    let rendered = tokio::task::spawn_blocking(move || {
        plots::render(&selection, &state.source, &state.catalog)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(rendered))
}

/// Health check handler (liveness probe).
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Metrics handler (Prometheus format).
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics::prometheus_output(),
    )
}

/// Error returned to the dashboard as `{"error": "..."}`.
#[derive(Debug)]
enum ApiError {
    Data(Error),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Data(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Data(e) => match e {
                Error::FileNotFound(_) => StatusCode::NOT_FOUND,
                Error::InvalidMetric(_) | Error::InvalidSelection(_) => StatusCode::BAD_REQUEST,
                Error::Csv { .. }
                | Error::MissingColumn { .. }
                | Error::InvalidValue { .. }
                | Error::DivisionByZero { .. }
                | Error::EmptyOutcomes(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Error::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Data(e) => e.to_string(),
            ApiError::Internal(e) => e.clone(),
        };

        tracing::warn!(status = status.as_u16(), error = %message, "figure request failed");

        (status, Json(json!({ "error": message }))).into_response()
    }
}
