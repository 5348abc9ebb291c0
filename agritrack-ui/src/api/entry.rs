//! Log-entry surface: manual form and AI smart entry

use agritrack_common::view::EntryFailure;
use agritrack_common::{Record, RecordInput};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{ApiError, ApiResult, AppState};

/// Manual form: the three fields the form collects
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryRequest {
    pub person: String,
    pub vehicle: String,
    pub amount_tons: f64,
}

/// Smart entry: one line of free text
#[derive(Debug, Deserialize)]
pub struct SmartEntryRequest {
    pub text: String,
}

/// POST /api/entry/manual
///
/// Crop, source and destination take their defaults.
pub async fn manual_entry(
    State(state): State<AppState>,
    Json(req): Json<ManualEntryRequest>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let input = RecordInput::manual(req.person, req.vehicle, req.amount_tons);

    let mut store = state.store.write().await;
    let mut view = state.view.write().await;
    let record = view.submit_entry(&mut store, input)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/entry/smart
///
/// **Errors:**
/// - 400 blank text
/// - 422 parser answered with something unusable
/// - 502 parser missing or unreachable
pub async fn smart_entry(
    State(state): State<AppState>,
    Json(req): Json<SmartEntryRequest>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Entry text cannot be empty".to_string()));
    }

    // No lock is held while the parser is out on the network
    let parsed = state.parser.parse_entry(text).await.map_err(|e| {
        warn!("Smart entry parse failed: {}", e);
        EntryFailure::from(&e)
    });
    debug!(ok = parsed.is_ok(), "Smart entry parsed");

    let mut store = state.store.write().await;
    let mut view = state.view.write().await;
    let record = view.submit_parse_result(&mut store, parsed)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Build entry routes
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/api/entry/manual", post(manual_entry))
        .route("/api/entry/smart", post(smart_entry))
}
