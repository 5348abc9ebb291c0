//! View controller endpoints: active view, row edit session, delete
//! confirmation

use agritrack_common::view::{EditField, EditSession, ViewState};
use agritrack_common::{Record, RecordId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiError, ApiResult, AppState};

/// Open edit session as the browser sees it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSessionInfo {
    pub target_id: RecordId,
    pub scratch: Record,
}

/// Presentation state snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub view: ViewState,
    pub entry_error: Option<String>,
    pub edit: Option<EditSessionInfo>,
    pub pending_delete: Option<RecordId>,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct SwitchViewRequest {
    pub view: ViewState,
}

#[derive(Debug, Serialize)]
pub struct ConfirmDeleteResponse {
    pub removed: bool,
}

async fn snapshot(state: &AppState) -> ViewResponse {
    let view = state.view.read().await;
    let edit = match view.edit_session() {
        EditSession::Editing { target_id, scratch } => Some(EditSessionInfo {
            target_id: *target_id,
            scratch: scratch.clone(),
        }),
        EditSession::Idle => None,
    };

    ViewResponse {
        view: view.active_view(),
        entry_error: view.entry_error().map(str::to_string),
        edit,
        pending_delete: view.pending_delete(),
        summary: view.summary_text().to_string(),
    }
}

/// GET /api/view
pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    Json(snapshot(&state).await)
}

/// PUT /api/view
///
/// Leaving the entry surface clears its inline error.
pub async fn switch_view(
    State(state): State<AppState>,
    Json(req): Json<SwitchViewRequest>,
) -> Json<ViewResponse> {
    {
        let mut view = state.view.write().await;
        if req.view != ViewState::LogEntry {
            view.clear_entry_error();
        }
        view.switch_view(req.view);
    }
    Json(snapshot(&state).await)
}

/// POST /api/edit/:id
///
/// Returns the scratch copy; any edit already open is discarded.
pub async fn begin_edit(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<Record>> {
    let store = state.store.read().await;
    let mut view = state.view.write().await;
    let scratch = view.begin_edit(&store, id)?;
    debug!(record_id = %id, "Edit started");
    Ok(Json(scratch))
}

/// PATCH /api/edit
///
/// Body: `{"field": "amountTons", "value": 9.5}`. Nothing is validated until
/// save.
pub async fn change_field(
    State(state): State<AppState>,
    Json(change): Json<EditField>,
) -> ApiResult<Json<Record>> {
    let mut view = state.view.write().await;
    view.apply_edit(change)?;
    let scratch = view
        .scratch_mut()
        .cloned()
        .ok_or_else(|| ApiError::NotFound("no edit in progress".to_string()))?;
    Ok(Json(scratch))
}

/// POST /api/edit/save
///
/// A rejected save keeps the session open with the scratch intact.
pub async fn save_edit(State(state): State<AppState>) -> ApiResult<Json<Record>> {
    let mut store = state.store.write().await;
    let mut view = state.view.write().await;
    let record = view.save_edit(&mut store)?;
    Ok(Json(record))
}

/// DELETE /api/edit
pub async fn cancel_edit(State(state): State<AppState>) -> StatusCode {
    state.view.write().await.cancel_edit();
    StatusCode::NO_CONTENT
}

/// POST /api/delete-request/:id
pub async fn request_delete(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Json<ViewResponse> {
    state.view.write().await.request_delete(id);
    Json(snapshot(&state).await)
}

/// POST /api/delete-request/confirm
pub async fn confirm_delete(State(state): State<AppState>) -> ApiResult<Json<ConfirmDeleteResponse>> {
    let mut store = state.store.write().await;
    let mut view = state.view.write().await;
    let removed = view
        .confirm_delete(&mut store)
        .ok_or_else(|| ApiError::NotFound("no delete awaiting confirmation".to_string()))?;
    Ok(Json(ConfirmDeleteResponse { removed }))
}

/// DELETE /api/delete-request
pub async fn dismiss_delete(State(state): State<AppState>) -> StatusCode {
    state.view.write().await.dismiss_delete();
    StatusCode::NO_CONTENT
}

/// Build view controller routes
pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route("/api/view", get(get_view).put(switch_view))
        .route("/api/edit", patch(change_field).delete(cancel_edit))
        .route("/api/edit/save", post(save_edit))
        .route("/api/edit/:id", post(begin_edit))
        .route("/api/delete-request", delete(dismiss_delete))
        .route("/api/delete-request/confirm", post(confirm_delete))
        .route("/api/delete-request/:id", post(request_delete))
}
