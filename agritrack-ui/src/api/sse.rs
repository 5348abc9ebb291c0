//! Server-Sent Events for browser updates

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;

use crate::AppState;

/// GET /api/events
///
/// Every `AgriEvent`: record changes, view switches, summary text, playback.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    agritrack_common::sse::create_event_sse_stream("agritrack-ui", &state.event_bus)
}
