//! View controller
//!
//! Holds the presentation state that sits between the record store and the
//! three display surfaces: which surface is active, the inline entry error,
//! the in-progress row edit, the pending delete confirmation and the AI
//! summary panel. Switching views never touches the store.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::{AgriEvent, EventBus};
use crate::record::{Record, RecordId, RecordInput};
use crate::store::RecordStore;
use crate::{time, Error, Result};

/// Message shown when the AI parser is missing a key or unreachable
pub const MSG_SERVICE_UNAVAILABLE: &str =
    "AI Service currently unavailable. Check your API key or try manual entry.";
/// Message shown when the AI parser answered but produced nothing usable
pub const MSG_UNINTERPRETABLE: &str =
    "Could not interpret that. Please try again or use manual mode.";

/// Presentation modes, mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    #[default]
    Dashboard,
    LogEntry,
    Records,
}

/// Why an entry did not become a record
#[derive(Debug, Clone, PartialEq)]
pub enum EntryFailure {
    /// AI parser missing, misconfigured or unreachable
    ServiceUnavailable,
    /// AI parser answered but the text could not be turned into a record
    Uninterpretable,
}

impl EntryFailure {
    /// User-facing inline message
    pub fn message(&self) -> String {
        match self {
            EntryFailure::ServiceUnavailable => MSG_SERVICE_UNAVAILABLE.to_string(),
            EntryFailure::Uninterpretable => MSG_UNINTERPRETABLE.to_string(),
        }
    }
}

/// Row edit state for the records list
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing {
        target_id: RecordId,
        scratch: Record,
    },
}

/// One field change applied to the edit scratch buffer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum EditField {
    Person(String),
    Vehicle(String),
    Crop(String),
    AmountTons(f64),
    SourceField(String),
    Destination(String),
    /// `YYYY-MM-DD` or RFC 3339
    Date(String),
}

#[derive(Debug, Default)]
struct SummaryPanel {
    text: String,
    issued: u64,
    applied: u64,
}

/// Presentation state for one user session
#[derive(Debug, Default)]
pub struct ViewController {
    active: ViewState,
    entry_error: Option<String>,
    edit: EditSession,
    pending_delete: Option<RecordId>,
    summary: SummaryPanel,
    event_bus: Option<EventBus>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an event bus for view and summary notifications
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn active_view(&self) -> ViewState {
        self.active
    }

    /// Make `view` the active surface
    pub fn switch_view(&mut self, view: ViewState) {
        if self.active == view {
            return;
        }
        let old_view = self.active;
        self.active = view;

        debug!(?old_view, new_view = ?view, "View switched");
        self.emit(AgriEvent::ViewChanged {
            old_view,
            new_view: view,
            timestamp: time::now(),
        });
    }

    // ------------------------------------------------------------------
    // Entry surface
    // ------------------------------------------------------------------

    /// Create a record from the entry surface
    ///
    /// Success switches to the dashboard. A validation failure records the
    /// inline error and leaves the active view alone.
    pub fn submit_entry(&mut self, store: &mut RecordStore, input: RecordInput) -> Result<Record> {
        match store.create(input) {
            Ok(record) => {
                self.entry_error = None;
                self.switch_view(ViewState::Dashboard);
                Ok(record)
            }
            Err(e) => {
                self.entry_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Create a record from an AI parse outcome
    ///
    /// A failed parse never reaches the store. A parse that produced fields
    /// the store rejects counts as uninterpretable.
    pub fn submit_parse_result(
        &mut self,
        store: &mut RecordStore,
        parsed: std::result::Result<RecordInput, EntryFailure>,
    ) -> std::result::Result<Record, EntryFailure> {
        let outcome = parsed.and_then(|input| match self.submit_entry(store, input) {
            Ok(record) => Ok(record),
            Err(e) => {
                debug!(error = %e, "Parsed entry rejected by store");
                Err(EntryFailure::Uninterpretable)
            }
        });

        if let Err(failure) = &outcome {
            self.entry_error = Some(failure.message());
        }
        outcome
    }

    /// Inline error from the last failed entry attempt
    pub fn entry_error(&self) -> Option<&str> {
        self.entry_error.as_deref()
    }

    pub fn clear_entry_error(&mut self) {
        self.entry_error = None;
    }

    // ------------------------------------------------------------------
    // Records list: edit session
    // ------------------------------------------------------------------

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    /// Snapshot the record into the scratch buffer
    ///
    /// Starting a new edit discards any edit already in progress.
    pub fn begin_edit(&mut self, store: &RecordStore, id: RecordId) -> Result<Record> {
        let record = store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("record {}", id)))?;

        self.edit = EditSession::Editing {
            target_id: id,
            scratch: record.clone(),
        };
        Ok(record)
    }

    /// Mutable access to the scratch buffer, if an edit is in progress
    pub fn scratch_mut(&mut self) -> Option<&mut Record> {
        match &mut self.edit {
            EditSession::Editing { scratch, .. } => Some(scratch),
            EditSession::Idle => None,
        }
    }

    /// Apply one field change to the scratch buffer
    pub fn apply_edit(&mut self, change: EditField) -> Result<()> {
        let scratch = self
            .scratch_mut()
            .ok_or_else(|| Error::NotFound("no edit in progress".to_string()))?;

        match change {
            EditField::Person(v) => scratch.person = v,
            EditField::Vehicle(v) => scratch.vehicle = v,
            EditField::Crop(v) => scratch.crop = v,
            EditField::AmountTons(v) => scratch.amount_tons = v,
            EditField::SourceField(v) => scratch.source_field = v,
            EditField::Destination(v) => scratch.destination = v,
            EditField::Date(v) => scratch.date = time::parse_date_input(&v)?,
        }
        Ok(())
    }

    /// Write the scratch buffer back through `RecordStore::update`
    ///
    /// The session is cleared only when the update succeeds.
    pub fn save_edit(&mut self, store: &mut RecordStore) -> Result<Record> {
        let scratch = match &self.edit {
            EditSession::Editing { scratch, .. } => scratch.clone(),
            EditSession::Idle => {
                return Err(Error::NotFound("no edit in progress".to_string()));
            }
        };

        store.update(scratch.clone())?;
        self.edit = EditSession::Idle;
        Ok(scratch)
    }

    /// Discard the scratch buffer; returns whether an edit was open
    pub fn cancel_edit(&mut self) -> bool {
        let was_editing = matches!(self.edit, EditSession::Editing { .. });
        self.edit = EditSession::Idle;
        was_editing
    }

    // ------------------------------------------------------------------
    // Records list: delete confirmation
    // ------------------------------------------------------------------

    /// Ask for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: RecordId) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<RecordId> {
        self.pending_delete
    }

    /// Delete the record awaiting confirmation
    ///
    /// Returns `None` when nothing was awaiting confirmation, otherwise
    /// whether the store actually removed a record.
    pub fn confirm_delete(&mut self, store: &mut RecordStore) -> Option<bool> {
        let id = self.pending_delete.take()?;

        if let EditSession::Editing { target_id, .. } = &self.edit {
            if *target_id == id {
                self.edit = EditSession::Idle;
            }
        }

        let removed = store.delete(id);
        info!(record_id = %id, removed, "Delete confirmed");
        Some(removed)
    }

    pub fn dismiss_delete(&mut self) {
        self.pending_delete = None;
    }

    // ------------------------------------------------------------------
    // AI summary panel
    // ------------------------------------------------------------------

    pub fn summary_text(&self) -> &str {
        &self.summary.text
    }

    /// Reserve a sequence number for a summary request about to be sent
    pub fn begin_summary_request(&mut self) -> u64 {
        self.summary.issued += 1;
        self.summary.issued
    }

    /// Show a summary response unless a newer one is already displayed
    pub fn apply_summary(&mut self, seq: u64, text: impl Into<String>) -> bool {
        if seq < self.summary.applied {
            debug!(seq, applied = self.summary.applied, "Discarding superseded summary");
            return false;
        }

        self.summary.applied = seq;
        self.summary.text = text.into();
        self.emit(AgriEvent::SummaryUpdated {
            text: self.summary.text.clone(),
            timestamp: time::now(),
        });
        true
    }

    fn emit(&self, event: AgriEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
