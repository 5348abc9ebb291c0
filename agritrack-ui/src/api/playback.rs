//! Music panel endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::playback::{PlaybackAction, PlaybackStatus};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub url: String,
}

/// Token handed back by the authorize redirect
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub access_token: String,
    pub expires_in: u64,
}

/// GET /api/playback
pub async fn get_status(State(state): State<AppState>) -> Json<PlaybackStatus> {
    Json(state.playback.status().await)
}

/// POST /api/playback/:action
///
/// `action` is one of play, pause, next, previous.
pub async fn control(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> ApiResult<Json<PlaybackStatus>> {
    let action: PlaybackAction = action.parse().map_err(ApiError::BadRequest)?;
    let status = state.playback.control(action).await?;
    Ok(Json(status))
}

/// GET /api/playback/login?clientId=...
///
/// Returns the authorize URL for the browser to navigate to.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> ApiResult<Json<LoginResponse>> {
    let url = state.playback.login_url(query.client_id).await?;
    Ok(Json(LoginResponse { url }))
}

/// POST /api/playback/token
pub async fn store_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<PlaybackStatus>> {
    if req.access_token.trim().is_empty() {
        return Err(ApiError::BadRequest("access_token cannot be empty".to_string()));
    }
    Ok(Json(
        state
            .playback
            .connect(req.access_token.trim(), req.expires_in)
            .await,
    ))
}

/// POST /api/playback/logout
pub async fn logout(State(state): State<AppState>) -> Json<PlaybackStatus> {
    Json(state.playback.disconnect().await)
}

/// Build playback routes
pub fn playback_routes() -> Router<AppState> {
    Router::new()
        .route("/api/playback", get(get_status))
        .route("/api/playback/login", get(login))
        .route("/api/playback/token", post(store_token))
        .route("/api/playback/logout", post(logout))
        .route("/api/playback/:action", post(control))
}
