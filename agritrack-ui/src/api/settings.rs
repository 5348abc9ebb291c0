//! Settings endpoints
//!
//! Theme preference only; records never go through here.

use agritrack_common::prefs::{self, Theme};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

/// GET /api/settings/theme
///
/// Dark when nothing has been stored yet.
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(ThemeBody {
        theme: prefs::load_theme(state.prefs.as_ref()),
    })
}

/// PUT /api/settings/theme
///
/// **Request:** `{"theme": "light"}`
pub async fn set_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> ApiResult<Json<ThemeBody>> {
    prefs::save_theme(state.prefs.as_ref(), body.theme)
        .map_err(|e| ApiError::Internal(format!("Failed to save theme: {}", e)))?;

    info!("Theme set to {}", body.theme.as_str());
    Ok(Json(body))
}

/// POST /api/settings/theme/toggle
pub async fn toggle_theme(State(state): State<AppState>) -> ApiResult<Json<ThemeBody>> {
    let theme = prefs::load_theme(state.prefs.as_ref()).toggled();
    prefs::save_theme(state.prefs.as_ref(), theme)
        .map_err(|e| ApiError::Internal(format!("Failed to save theme: {}", e)))?;

    info!("Theme toggled to {}", theme.as_str());
    Ok(Json(ThemeBody { theme }))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings/theme", get(get_theme).put(set_theme))
        .route("/api/settings/theme/toggle", post(toggle_theme))
}
