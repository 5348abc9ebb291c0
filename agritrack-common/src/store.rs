//! In-memory record store
//!
//! The store is the single source of truth for haul records. It is mutated
//! only through [`RecordStore::create`], [`RecordStore::update`] and
//! [`RecordStore::delete`]; every successful mutation is announced on the
//! attached [`EventBus`] so downstream consumers can re-read the snapshot.
//!
//! Records are kept most-recent-first by creation sequence. Creation
//! prepends; updates replace in place and never reorder, even when the
//! edit changes `date`.

use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::events::{AgriEvent, EventBus};
use crate::record::{Record, RecordId, RecordInput};
use crate::{time, Error, Result};

/// Ordered in-memory collection of records
#[derive(Debug)]
pub struct RecordStore {
    /// Presentation order: index 0 is the newest creation
    records: Vec<Record>,
    event_bus: Option<EventBus>,
}

impl RecordStore {
    /// Create an empty store with no event bus attached
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            event_bus: None,
        }
    }

    /// Create a store holding `seed`, given most-recent-first
    ///
    /// Fails with `Error::Validation` if two seed records share an id or a
    /// seed record violates the entry constraints.
    pub fn with_seed(seed: Vec<Record>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(seed.len());
        for record in &seed {
            record.validate()?;
            if !seen.insert(record.id) {
                return Err(Error::Validation(format!(
                    "duplicate record id in seed: {}",
                    record.id
                )));
            }
        }

        Ok(Self {
            records: seed,
            event_bus: None,
        })
    }

    /// Attach an event bus for change notifications
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Validate `input`, assign a fresh id and the current time, and
    /// prepend the new record
    pub fn create(&mut self, input: RecordInput) -> Result<Record> {
        input.validate()?;

        let id = self.fresh_id();
        let record = input.into_record(id, time::now());
        self.records.insert(0, record.clone());

        info!(
            record_id = %record.id,
            person = %record.person,
            vehicle = %record.vehicle,
            amount_tons = record.amount_tons,
            "Record created"
        );
        self.emit(AgriEvent::RecordCreated {
            record: record.clone(),
            timestamp: time::now(),
        });

        Ok(record)
    }

    /// Replace the record with `record.id` wholesale, keeping its position
    pub fn update(&mut self, record: Record) -> Result<()> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::NotFound(format!("record {}", record.id)))?;

        record.validate()?;
        *slot = record.clone();

        info!(record_id = %record.id, "Record updated");
        self.emit(AgriEvent::RecordUpdated {
            record,
            timestamp: time::now(),
        });

        Ok(())
    }

    /// Remove the record with `id` if present
    ///
    /// Deleting an unknown id is a no-op. Returns whether a record was removed.
    pub fn delete(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);

        if self.records.len() == before {
            debug!(record_id = %id, "Delete ignored, record not present");
            return false;
        }

        info!(record_id = %id, "Record deleted");
        self.emit(AgriEvent::RecordDeleted {
            record_id: id,
            timestamp: time::now(),
        });
        true
    }

    /// Snapshot of all records, most-recent-first
    pub fn list(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Borrow the current records without cloning, most-recent-first
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Look up a single record
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn fresh_id(&self) -> RecordId {
        loop {
            let id = Uuid::new_v4();
            if self.get(id).is_none() {
                return id;
            }
        }
    }

    fn emit(&self, event: AgriEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
