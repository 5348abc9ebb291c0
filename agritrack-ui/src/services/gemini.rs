//! Gemini generative-language API client
//!
//! Used for two things: turning a free-text haul description into record
//! fields (structured JSON output) and writing a two-sentence summary of
//! recent records. No retries; every call ends in a value or a
//! [`ServiceError`].

use std::time::Duration;

use agritrack_common::config::{is_valid_key, GeminiConfig};
use agritrack_common::record::{DEFAULT_CROP, DEFAULT_DESTINATION, DEFAULT_SOURCE_FIELD};
use agritrack_common::{Record, RecordInput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{EntryParser, ServiceError, Summarizer};

const USER_AGENT: &str = concat!("AgriTrack/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Text used when the model returns an empty summary
pub const EMPTY_SUMMARY_TEXT: &str = "Could not generate summary.";

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Structured entry as the model returns it; every field may be missing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedEntry {
    person: Option<String>,
    vehicle: Option<String>,
    amount_tons: Option<f64>,
    crop: Option<String>,
    source_field: Option<String>,
    destination: Option<String>,
}

impl ParsedEntry {
    fn into_input(self) -> Result<RecordInput, ServiceError> {
        let person = non_blank(self.person)
            .ok_or_else(|| ServiceError::Uninterpretable("no driver in response".to_string()))?;
        let vehicle = non_blank(self.vehicle)
            .ok_or_else(|| ServiceError::Uninterpretable("no vehicle in response".to_string()))?;
        let amount_tons = self
            .amount_tons
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or_else(|| ServiceError::Uninterpretable("no usable amount in response".to_string()))?;

        Ok(RecordInput {
            person,
            vehicle,
            crop: non_blank(self.crop).unwrap_or_else(|| DEFAULT_CROP.to_string()),
            amount_tons,
            source_field: non_blank(self.source_field)
                .unwrap_or_else(|| DEFAULT_SOURCE_FIELD.to_string()),
            destination: non_blank(self.destination)
                .unwrap_or_else(|| DEFAULT_DESTINATION.to_string()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decode the model's JSON text into record fields
fn parse_entry_text(text: &str) -> Result<RecordInput, ServiceError> {
    let parsed: ParsedEntry = serde_json::from_str(text.trim())
        .map_err(|e| ServiceError::Uninterpretable(format!("response is not an entry: {}", e)))?;
    parsed.into_input()
}

fn entry_prompt(text: &str) -> String {
    format!(
        "Extract transport details from this text: \"{text}\".\n\
         Focus on the person, the vehicle (truck, semi, grain cart), and the amount in tons.\n\
         \n\
         defaults:\n\
         - crop: \"{DEFAULT_CROP}\"\n\
         - sourceField: \"{DEFAULT_SOURCE_FIELD}\"\n\
         - destination: \"{DEFAULT_DESTINATION}\"\n\
         \n\
         If vehicle is not specified, try to infer it or default to \"Unknown Truck\".\n\
         Ensure amountTons is a number."
    )
}

fn entry_schema() -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "person": { "type": "STRING", "description": "The name of the driver" },
                "vehicle": { "type": "STRING", "description": "The vehicle used (e.g., Red Semi, Blue Truck)" },
                "amountTons": { "type": "NUMBER", "description": "The amount transported in tons" },
                "crop": { "type": "STRING", "description": "Crop type (default to Grain)" },
                "sourceField": { "type": "STRING", "description": "Source location (default to Field)" },
                "destination": { "type": "STRING", "description": "Destination (default to Storage)" }
            },
            "required": ["person", "vehicle", "amountTons", "crop", "sourceField", "destination"]
        }
    })
}

fn summary_prompt(records: &[Record]) -> Result<String, ServiceError> {
    let context = serde_json::to_string(records).map_err(|e| ServiceError::Parse(e.to_string()))?;
    Ok(format!(
        "Analyze these recent transport records and provide a 2-sentence executive summary \
         of driver performance or vehicle utilization: {}",
        context
    ))
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client; a missing or blank key is allowed and makes every
    /// call fail with `ServiceError::MissingApiKey`
    pub fn new(config: &GeminiConfig, api_key: Option<String>) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let api_key = api_key.filter(|k| is_valid_key(k));
        if api_key.is_none() {
            tracing::warn!("Gemini API key missing; smart entry and summaries are disabled");
        }

        Ok(Self {
            http_client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send one prompt and return the first candidate's text, if any
    async fn generate(
        &self,
        prompt: String,
        generation_config: Option<Value>,
    ) -> Result<Option<String>, ServiceError> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config,
        };

        tracing::debug!(model = %self.model, "Calling Gemini generateContent");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api(status.as_u16(), error_text));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        Ok(generated.text())
    }
}

#[async_trait]
impl EntryParser for GeminiClient {
    async fn parse_entry(&self, text: &str) -> Result<RecordInput, ServiceError> {
        let result = self
            .generate(entry_prompt(text), Some(entry_schema()))
            .await
            .and_then(|reply| {
                let reply = reply
                    .ok_or_else(|| ServiceError::Uninterpretable("empty response".to_string()))?;
                parse_entry_text(&reply)
            });

        match &result {
            Ok(input) => tracing::info!(
                person = %input.person,
                vehicle = %input.vehicle,
                amount_tons = input.amount_tons,
                "Smart entry parsed"
            ),
            Err(e) => tracing::warn!("Failed to parse entry with Gemini: {}", e),
        }
        result
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, records: &[Record]) -> Result<String, ServiceError> {
        let reply = self.generate(summary_prompt(records)?, None).await?;
        Ok(reply.unwrap_or_else(|| EMPTY_SUMMARY_TEXT.to_string()))
    }
}
