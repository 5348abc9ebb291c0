//! agritrack-ui library - haul logging service
//!
//! Serves the record store, dashboard aggregation and view controller to the
//! browser front end over JSON + SSE, and hosts the AI and music-playback
//! integrations.

pub mod api;
pub mod error;
pub mod playback;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use agritrack_common::events::EventBus;
use agritrack_common::prefs::KeyValueStore;
use agritrack_common::{RecordStore, ViewController};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::playback::PlaybackControl;
use crate::services::{EntryParser, Summarizer};

/// Default number of recent records handed to the summarizer
pub const DEFAULT_SUMMARY_LIMIT: usize = 20;

/// Application state shared across handlers
///
/// Lock order: `store` before `view` whenever both are held.
#[derive(Clone)]
pub struct AppState {
    /// Single source of truth for records
    pub store: Arc<RwLock<RecordStore>>,
    /// Active surface, edit session, pending delete, summary panel
    pub view: Arc<RwLock<ViewController>>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Free-text entry parser
    pub parser: Arc<dyn EntryParser>,
    /// Recent-records summarizer
    pub summarizer: Arc<dyn Summarizer>,
    /// Music panel; holds no handle to the record store
    pub playback: Arc<dyn PlaybackControl>,
    /// Theme and other peripheral preferences
    pub prefs: Arc<dyn KeyValueStore>,
    /// How many of the newest records the summarizer sees
    pub summary_record_limit: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the store and view controller to `event_bus` and wrap everything
    /// for sharing
    pub fn new(
        store: RecordStore,
        event_bus: EventBus,
        parser: Arc<dyn EntryParser>,
        summarizer: Arc<dyn Summarizer>,
        playback: Arc<dyn PlaybackControl>,
        prefs: Arc<dyn KeyValueStore>,
    ) -> Self {
        let store = store.with_event_bus(event_bus.clone());
        let view = ViewController::new().with_event_bus(event_bus.clone());

        Self {
            store: Arc::new(RwLock::new(store)),
            view: Arc::new(RwLock::new(view)),
            event_bus,
            parser,
            summarizer,
            playback,
            prefs,
            summary_record_limit: DEFAULT_SUMMARY_LIMIT,
            startup_time: Utc::now(),
        }
    }

    pub fn with_summary_limit(mut self, limit: usize) -> Self {
        self.summary_record_limit = limit;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .merge(api::record_routes())
        .merge(api::entry_routes())
        .merge(api::dashboard_routes())
        .merge(api::view_routes())
        .merge(api::settings_routes())
        .merge(api::playback_routes())
        .route("/api/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // Browser front end may be served from another origin during development
        .layer(CorsLayer::permissive())
        .with_state(state)
}
