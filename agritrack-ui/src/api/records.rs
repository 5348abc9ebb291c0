//! Record store endpoints

use agritrack_common::{Record, RecordId, RecordInput};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::{ApiError, ApiResult, AppState};

/// GET /api/records
///
/// All records, newest first.
pub async fn list_records(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.store.read().await.list())
}

/// POST /api/records
///
/// Full input through the entry surface. Success switches the view to the
/// dashboard; a validation failure leaves it alone.
pub async fn create_record(
    State(state): State<AppState>,
    Json(input): Json<RecordInput>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let mut store = state.store.write().await;
    let mut view = state.view.write().await;
    let record = view.submit_entry(&mut store, input)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/records/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(record): Json<Record>,
) -> ApiResult<Json<Record>> {
    if record.id != id {
        return Err(ApiError::BadRequest(format!(
            "path id {} does not match body id {}",
            id, record.id
        )));
    }

    state.store.write().await.update(record.clone())?;
    Ok(Json(record))
}

/// Build record routes
///
/// There is no DELETE here: removal goes through the confirmation flow in
/// `api::view`.
pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/api/records", get(list_records).post(create_record))
        .route("/api/records/:id", put(update_record))
}
