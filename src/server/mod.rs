//! HTTP interface for Page Analyzer
//!
//! Exposes the analyzer over a small JSON API:
//! - `GET /analyze?url=<url>` - analyze one page
//! - `GET /health` - liveness probe
//!
//! # Status Mapping
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Report | 200 |
//! | Missing or invalid `url` | 400 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | RateLimited | 429 |
//! | RemoteServerError | 502 |
//! | Unreachable | 400 |
//! | UnclassifiedHttpError, FetchFailed | 500 |

use crate::analyzer::Analyzer;
use crate::config::ServerConfig;
use crate::{AnalyzerError, ClassifiedError, ErrorKind};
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Message returned when the `url` query parameter is absent or blank
pub const MISSING_URL_MESSAGE: &str = "Missing 'url' query parameter\n\
Please provide a valid URL like\n\
https://www.example.com\n\
or\n\
http://www.example.com";

/// Query string of `GET /analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub url: Option<String>,
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: ErrorKind,
}

/// Maps an error kind to the response status code
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RemoteServerError => StatusCode::BAD_GATEWAY,
        ErrorKind::Unreachable => StatusCode::BAD_REQUEST,
        ErrorKind::UnclassifiedHttpError | ErrorKind::FetchFailed => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind);
        let body = ErrorBody {
            message: self.message,
            kind: self.kind,
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the application router around a shared analyzer
pub fn router(analyzer: Analyzer) -> Router {
    // The browser frontend is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/analyze", get(analyze_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(analyzer)
}

async fn analyze_handler(
    State(analyzer): State<Analyzer>,
    Query(params): Query<AnalyzeParams>,
) -> Response {
    let Some(url) = params.url.filter(|url| !url.trim().is_empty()) else {
        tracing::info!("Rejected request without a url parameter");
        let body = ErrorBody {
            message: MISSING_URL_MESSAGE.to_string(),
            kind: ErrorKind::InvalidInput,
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    match analyzer.analyze(&url).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => {
            tracing::warn!("Error analyzing URL {}: {} ({})", url, err, err.kind);
            err.into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Binds the configured address and serves until Ctrl-C
///
/// # Returns
///
/// * `Ok(())` - Server shut down gracefully
/// * `Err(AnalyzerError)` - Failed to bind or serve
pub async fn serve(config: &ServerConfig, analyzer: Analyzer) -> Result<(), AnalyzerError> {
    let listener = tokio::net::TcpListener::bind((config.address.as_str(), config.port))
        .await
        .map_err(|e| {
            AnalyzerError::Server(format!(
                "couldn't bind {}:{}: {}",
                config.address, config.port, e
            ))
        })?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(analyzer))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
