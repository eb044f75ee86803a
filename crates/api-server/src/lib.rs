//! HTTP front for the fundamentals dashboard: JSON endpoints under `/api`
//! and the static front-end for everything else.

pub mod company_routes;
pub mod config;
pub mod financials_routes;
pub mod request_id;
pub mod security_headers;


use anyhow::Context;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use yahoo_client::{TimeseriesSource, YahooClient};

use company_routes::company_routes;
use config::ServerConfig;
use financials_routes::financials_routes;

pub const UPSTREAM_ERROR_MESSAGE: &str = "Failed to fetch financial data from Yahoo Finance.";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TimeseriesSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn TimeseriesSource>) -> Self {
        Self { source }
    }
}

/// JSON error body. `details` is only sent for upstream failures.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Per-request failure, rendered as a JSON error response.
#[derive(Debug)]
pub enum AppError {
    /// Ticker is not in the tracked company list.
    UnknownTicker,
    /// Upstream fetch, decode or data conversion failed.
    Upstream(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::UnknownTicker => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Unknown ticker".to_string(),
                    details: None,
                },
            ),
            AppError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: UPSTREAM_ERROR_MESSAGE.to_string(),
                    details: Some(format!("{err:#}")),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::Upstream(err.into())
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Fundamentals Dashboard API"),
    paths(
        company_routes::list_companies,
        financials_routes::get_financials,
        health,
    ),
    components(schemas(
        company_routes::CompanySummary,
        financials_routes::FinancialsResponse,
        ErrorBody,
    )),
    tags((name = "Fundamentals", description = "Ten-year company fundamentals"))
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up")),
    tag = "Fundamentals"
)]
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full router: API routes, static front-end fallback and middleware.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty
        )
    });

    Router::new()
        .merge(company_routes())
        .merge(financials_routes())
        .route("/api/health", get(health))
        .route("/api/openapi.json", get(openapi_json))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api_server=info,yahoo_client=info,tower_http=info".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    tracing::info!("Starting fundamentals dashboard server");
    tracing::info!("  Upstream: {} (timeout {:?})", config.yahoo.base_url, config.yahoo.timeout);
    tracing::info!("  Static files: {}", config.static_dir.display());

    let source: Arc<dyn TimeseriesSource> = Arc::new(YahooClient::new(config.yahoo.clone()));
    let app = build_router(AppState::new(source), &config.static_dir);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
