//! External AI collaborators
//!
//! The record store never talks to the network. Free-text parsing and
//! summaries go through these capability traits so handlers and the
//! summary refresher can be driven by fakes in tests.

pub mod gemini;
pub mod summary;

use agritrack_common::view::EntryFailure;
use agritrack_common::{Record, RecordInput};
use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

/// External AI service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("AI service API key is not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// The service envelope itself was malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The service answered but the content is not a usable entry
    #[error("Could not interpret input: {0}")]
    Uninterpretable(String),
}

impl ServiceError {
    /// True when the failure is "could not interpret" rather than
    /// "unavailable or misconfigured"
    pub fn is_uninterpretable(&self) -> bool {
        matches!(self, ServiceError::Uninterpretable(_))
    }
}

impl From<&ServiceError> for EntryFailure {
    fn from(err: &ServiceError) -> Self {
        if err.is_uninterpretable() {
            EntryFailure::Uninterpretable
        } else {
            EntryFailure::ServiceUnavailable
        }
    }
}

/// Turns a free-text haul description into record fields
#[async_trait]
pub trait EntryParser: Send + Sync {
    async fn parse_entry(&self, text: &str) -> Result<RecordInput, ServiceError>;
}

/// Produces a short prose summary of recent records
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, records: &[Record]) -> Result<String, ServiceError>;
}
