//! # AgriTrack Common Library
//!
//! Core of the haul logging system, shared by the AgriTrack service:
//! - Record entity and in-memory record store
//! - Dashboard aggregation
//! - View controller (active surface, edit session, delete confirmation)
//! - Event types and EventBus
//! - Configuration loading and key-value preferences

pub mod aggregate;
pub mod config;
pub mod error;
pub mod events;
pub mod prefs;
pub mod record;
pub mod sse;
pub mod store;
pub mod time;
pub mod view;

pub use error::{Error, Result};
pub use record::{Record, RecordId, RecordInput};
pub use store::RecordStore;
pub use view::{ViewController, ViewState};
