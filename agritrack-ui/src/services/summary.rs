//! Background AI summary refresher
//!
//! Watches the event bus for record changes, waits for a quiet period, then
//! asks the summarizer about the newest records and hands the text to the
//! view controller. Responses carry a sequence number so a slow, older
//! request cannot overwrite a newer summary.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::AppState;

/// Shown when there are no records to summarize
pub const NO_DATA_TEXT: &str = "No data to summarize.";
/// Shown when the summarizer fails for any reason
pub const UNAVAILABLE_TEXT: &str = "Summary unavailable.";

/// Summarize the current newest records once and apply the result
///
/// Returns whether the result was displayed (false when superseded).
pub async fn refresh_summary(state: &AppState) -> bool {
    let (seq, recent) = {
        let store = state.store.read().await;
        let mut view = state.view.write().await;
        let recent: Vec<_> = store
            .records()
            .iter()
            .take(state.summary_record_limit)
            .cloned()
            .collect();
        (view.begin_summary_request(), recent)
    };

    let text = if recent.is_empty() {
        NO_DATA_TEXT.to_string()
    } else {
        match state.summarizer.summarize(&recent).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Summary request {} failed: {}", seq, e);
                UNAVAILABLE_TEXT.to_string()
            }
        }
    };

    let applied = state.view.write().await.apply_summary(seq, text);
    debug!(seq, applied, "Summary request finished");
    applied
}

/// Spawn the debounce loop
///
/// Every record change pushes the deadline out by `debounce`; other events
/// leave it alone. An initial summary is produced straight away when the
/// store already holds records.
pub fn spawn_summary_refresher(state: AppState, debounce: Duration) -> JoinHandle<()> {
    let mut rx = state.event_bus.subscribe();

    tokio::spawn(async move {
        info!("Summary refresher started (debounce {:?})", debounce);

        if !state.store.read().await.is_empty() {
            refresh_summary(&state).await;
        }

        let mut deadline: Option<Instant> = None;
        loop {
            let event = match deadline {
                Some(at) => tokio::select! {
                    _ = tokio::time::sleep_until(at) => {
                        deadline = None;
                        refresh_summary(&state).await;
                        continue;
                    }
                    event = rx.recv() => event,
                },
                None => rx.recv().await,
            };

            match event {
                Ok(event) if event.is_record_change() => {
                    deadline = Some(Instant::now() + debounce);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Summary refresher lagged by {} events", skipped);
                    deadline = Some(Instant::now() + debounce);
                }
                Err(RecvError::Closed) => {
                    info!("Event bus closed, summary refresher stopping");
                    break;
                }
            }
        }
    })
}
