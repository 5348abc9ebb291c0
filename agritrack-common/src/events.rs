//! Event types for the AgriTrack event system
//!
//! Provides the shared event enum and the broadcast EventBus the record
//! store, the summary refresher, the playback poller and SSE clients use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::record::{Record, RecordId};
use crate::view::ViewState;

/// Track shown in the music panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub name: String,
    pub artist: String,
    pub album_art: Option<String>,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// AgriTrack event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgriEvent {
    /// A record was created and is now first in the list
    ///
    /// Triggers:
    /// - Summary refresher: schedule a new summary
    /// - SSE: refresh dashboard and list
    RecordCreated {
        record: Record,
        timestamp: DateTime<Utc>,
    },

    /// A record was replaced in place
    RecordUpdated {
        record: Record,
        timestamp: DateTime<Utc>,
    },

    /// A record was removed
    RecordDeleted {
        record_id: RecordId,
        timestamp: DateTime<Utc>,
    },

    /// Active presentation mode changed
    ViewChanged {
        old_view: ViewState,
        new_view: ViewState,
        timestamp: DateTime<Utc>,
    },

    /// AI summary text replaced
    SummaryUpdated {
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// Music panel state changed (track, play/pause, mode)
    ///
    /// NOTE: never emitted by the record store; the playback subsystem owns it.
    PlaybackChanged {
        track: Option<NowPlaying>,
        is_playing: bool,
        demo_mode: bool,
        timestamp: DateTime<Utc>,
    },
}

impl AgriEvent {
    /// Get the event type as a string (for SSE event names)
    pub fn event_type(&self) -> &'static str {
        match self {
            AgriEvent::RecordCreated { .. } => "RecordCreated",
            AgriEvent::RecordUpdated { .. } => "RecordUpdated",
            AgriEvent::RecordDeleted { .. } => "RecordDeleted",
            AgriEvent::ViewChanged { .. } => "ViewChanged",
            AgriEvent::SummaryUpdated { .. } => "SummaryUpdated",
            AgriEvent::PlaybackChanged { .. } => "PlaybackChanged",
        }
    }

    /// True for events that change the record set
    pub fn is_record_change(&self) -> bool {
        matches!(
            self,
            AgriEvent::RecordCreated { .. }
                | AgriEvent::RecordUpdated { .. }
                | AgriEvent::RecordDeleted { .. }
        )
    }
}

/// Broadcast channel for [`AgriEvent`]s
///
/// Cloning shares the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AgriEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    ///
    /// # Examples
    ///
    /// ```
    /// use agritrack_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AgriEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers, ignoring if none are listening
    pub fn emit_lossy(&self, event: AgriEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
