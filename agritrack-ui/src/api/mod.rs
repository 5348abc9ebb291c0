//! HTTP API handlers for agritrack-ui
//!
//! JSON REST endpoints over the record store and view controller, plus an
//! SSE stream of change events.

pub mod dashboard;
pub mod entry;
pub mod health;
pub mod playback;
pub mod records;
pub mod settings;
pub mod sse;
pub mod view;

pub use dashboard::dashboard_routes;
pub use entry::entry_routes;
pub use health::health_routes;
pub use playback::playback_routes;
pub use records::record_routes;
pub use settings::settings_routes;
pub use sse::event_stream;
pub use view::view_routes;
