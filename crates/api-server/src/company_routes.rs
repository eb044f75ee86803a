//! Company list API Routes

use axum::{routing::get, Json, Router};
use metrics_core::COMPANIES;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanySummary {
    pub ticker: String,
    pub name: String,
}

pub fn company_routes() -> Router<AppState> {
    Router::new().route("/api/companies", get(list_companies))
}

#[utoipa::path(
    get,
    path = "/api/companies",
    responses((status = 200, description = "Tracked companies in display order", body = [CompanySummary])),
    tag = "Fundamentals"
)]
pub(crate) async fn list_companies() -> Json<Vec<CompanySummary>> {
    Json(
        COMPANIES
            .iter()
            .map(|c| CompanySummary {
                ticker: c.ticker.to_string(),
                name: c.name.to_string(),
            })
            .collect(),
    )
}
