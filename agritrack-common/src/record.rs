//! Haul record entity
//!
//! A [`Record`] is one logged transport event: who drove, which vehicle, how
//! many tons of which crop, from where to where, and when. Records are
//! immutable once created; edits replace them wholesale through the store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Opaque record identifier
pub type RecordId = Uuid;

/// Crop recorded when the entry surface does not ask for one
pub const DEFAULT_CROP: &str = "Grain";
/// Source location recorded when the entry surface does not ask for one
pub const DEFAULT_SOURCE_FIELD: &str = "Field";
/// Destination recorded when the entry surface does not ask for one
pub const DEFAULT_DESTINATION: &str = "Storage";

/// One logged haul event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    /// Driver name
    pub person: String,
    /// Vehicle label (e.g. "Red Semi")
    pub vehicle: String,
    pub crop: String,
    /// Metric tons, full precision
    pub amount_tons: f64,
    pub source_field: String,
    pub destination: String,
    pub date: DateTime<Utc>,
}

/// Caller-supplied record fields; `id` and `date` are assigned on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub person: String,
    pub vehicle: String,
    pub crop: String,
    pub amount_tons: f64,
    pub source_field: String,
    pub destination: String,
}

impl RecordInput {
    /// Build an input from the three fields the manual form collects,
    /// filling crop, source and destination with their defaults.
    pub fn manual(person: impl Into<String>, vehicle: impl Into<String>, amount_tons: f64) -> Self {
        Self {
            person: person.into(),
            vehicle: vehicle.into(),
            crop: DEFAULT_CROP.to_string(),
            amount_tons,
            source_field: DEFAULT_SOURCE_FIELD.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
        }
    }

    /// Check the entry constraints without building a record
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.person, &self.vehicle, self.amount_tons)
    }

    /// Turn a validated input into a record with the given identity
    pub(crate) fn into_record(self, id: RecordId, date: DateTime<Utc>) -> Record {
        Record {
            id,
            person: self.person,
            vehicle: self.vehicle,
            crop: self.crop,
            amount_tons: self.amount_tons,
            source_field: self.source_field,
            destination: self.destination,
            date,
        }
    }
}

impl Record {
    /// Check the same constraints `RecordInput::validate` enforces
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.person, &self.vehicle, self.amount_tons)
    }
}

/// person and vehicle non-empty, amount finite and non-negative
fn validate_fields(person: &str, vehicle: &str, amount_tons: f64) -> Result<()> {
    if person.trim().is_empty() {
        return Err(Error::Validation("person must not be empty".to_string()));
    }
    if vehicle.trim().is_empty() {
        return Err(Error::Validation("vehicle must not be empty".to_string()));
    }
    if !amount_tons.is_finite() {
        return Err(Error::Validation(format!(
            "amountTons must be a finite number, got {}",
            amount_tons
        )));
    }
    if amount_tons < 0.0 {
        return Err(Error::Validation(format!(
            "amountTons must not be negative, got {}",
            amount_tons
        )));
    }
    Ok(())
}

/// Sample haul log used when the store is seeded for a demo
///
/// Dates are relative to `now`. Listed most-recent-first, the order the
/// store presents them in.
pub fn demo_records(now: DateTime<Utc>) -> Vec<Record> {
    let seed = |person: &str, vehicle: &str, tons: f64, date: DateTime<Utc>| {
        RecordInput::manual(person, vehicle, tons).into_record(Uuid::new_v4(), date)
    };

    vec![
        seed("Bob Lee", "White Semi", 22.1, now),
        seed("John Doe", "Red Semi", 15.0, now),
        seed("Jane Smith", "Blue Truck", 8.2, now - Duration::days(1)),
        seed("John Doe", "Red Semi", 12.5, now - Duration::days(2)),
    ]
}
