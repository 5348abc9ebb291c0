//! Dashboard and AI summary panel

use agritrack_common::aggregate::{self, DashboardData};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::services::summary::refresh_summary;
use crate::AppState;

/// Dashboard snapshot plus the summary panel text
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub dashboard: DashboardData,
    pub summary: String,
}

/// GET /api/dashboard
///
/// Totals and both groupings are recomputed from the current snapshot on
/// every call.
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let store = state.store.read().await;
    let view = state.view.read().await;

    Json(DashboardResponse {
        dashboard: aggregate::dashboard(store.records()),
        summary: view.summary_text().to_string(),
    })
}

/// POST /api/summary/refresh
///
/// Starts a refresh in the background; the new text arrives as a
/// `SummaryUpdated` event.
pub async fn refresh_summary_now(State(state): State<AppState>) -> StatusCode {
    tokio::spawn(async move {
        refresh_summary(&state).await;
    });
    StatusCode::ACCEPTED
}

/// Build dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/summary/refresh", post(refresh_summary_now))
}
