//! Financials API Routes
//!
//! Fetches the annual fundamentals series for a tracked company and returns
//! the nine aligned metrics over the latest ten report dates.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use metrics_core::{align_metrics, all_identifiers, extract_series, find_company, MetricMatrix};
use serde::Serialize;

use crate::request_id::RequestId;
use crate::{AppError, AppState, ErrorBody};

#[derive(Serialize, utoipa::ToSchema)]
pub struct FinancialsResponse {
    pub ticker: String,
    /// Fiscal year of each report date, oldest first.
    pub years: Vec<String>,
    /// Metric label to one value (or null) per year.
    #[schema(value_type = Object)]
    pub metrics: MetricMatrix,
}

/// Everything below `/api/financials/` is handled here; the last path
/// segment is the ticker, so a trailing slash means an empty ticker.
pub fn financials_routes() -> Router<AppState> {
    Router::new()
        .route("/api/financials/", get(missing_ticker))
        .route("/api/financials/*ticker", get(get_financials))
}

async fn missing_ticker() -> AppError {
    AppError::UnknownTicker
}

#[utoipa::path(
    get,
    path = "/api/financials/{ticker}",
    params(("ticker" = String, Path, description = "Tracked ticker symbol, case-insensitive")),
    responses(
        (status = 200, description = "Aligned yearly metrics", body = FinancialsResponse),
        (status = 404, description = "Ticker is not tracked", body = ErrorBody),
        (status = 502, description = "Upstream fetch or decode failed", body = ErrorBody)
    ),
    tag = "Fundamentals"
)]
pub(crate) async fn get_financials(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Path(path): Path<String>,
) -> Result<Json<FinancialsResponse>, AppError> {
    let ticker = path.rsplit('/').next().unwrap_or_default().to_uppercase();
    let company = find_company(&ticker).ok_or(AppError::UnknownTicker)?;
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();

    let identifiers = all_identifiers();
    let payload = state
        .source
        .fetch_timeseries(company.ticker, &identifiers)
        .await
        .map_err(|e| {
            let err = anyhow::Error::from(e);
            tracing::warn!(
                request_id = %request_id,
                "Fetching {} from {} failed: {:#}",
                company.ticker,
                state.source.source_name(),
                err
            );
            AppError::Upstream(err)
        })?;

    let series = extract_series(&payload).map_err(|e| {
        tracing::warn!(request_id = %request_id, "Bad time series data for {}: {}", company.ticker, e);
        e
    })?;
    let aligned = align_metrics(&series);

    tracing::debug!(
        "{}: {} series, {} report dates",
        company.ticker,
        series.len(),
        aligned.window.len()
    );

    Ok(Json(FinancialsResponse {
        ticker: company.ticker.to_string(),
        years: aligned.years(),
        metrics: aligned.metrics,
    }))
}
