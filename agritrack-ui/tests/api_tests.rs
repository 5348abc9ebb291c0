//! Integration tests for agritrack-ui API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Record CRUD and validation
//! - Manual and smart entry, including AI failure modes
//! - Dashboard aggregation and summary panel
//! - Edit session and delete confirmation
//! - Theme preference and demo-mode playback

use std::sync::Arc;
use std::time::Duration;

use agritrack_common::config::SpotifyConfig;
use agritrack_common::events::EventBus;
use agritrack_common::prefs::{KeyValueStore, MemoryKvStore};
use agritrack_common::view::{MSG_SERVICE_UNAVAILABLE, MSG_UNINTERPRETABLE};
use agritrack_common::{record, time, Record, RecordInput, RecordStore};
use agritrack_ui::playback::PlaybackSession;
use agritrack_ui::services::summary::{
    refresh_summary, spawn_summary_refresher, NO_DATA_TEXT, UNAVAILABLE_TEXT,
};
use agritrack_ui::services::{EntryParser, ServiceError, Summarizer};
use agritrack_ui::{build_router, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Parser fake: answers every text with the same outcome
struct FakeParser(fn() -> Result<RecordInput, ServiceError>);

#[async_trait]
impl EntryParser for FakeParser {
    async fn parse_entry(&self, _text: &str) -> Result<RecordInput, ServiceError> {
        (self.0)()
    }
}

/// Summarizer fake: reports how many records it was given
struct CountingSummarizer;

#[async_trait]
impl Summarizer for CountingSummarizer {
    async fn summarize(&self, records: &[Record]) -> Result<String, ServiceError> {
        Ok(format!("{} records", records.len()))
    }
}

struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _records: &[Record]) -> Result<String, ServiceError> {
        Err(ServiceError::Network("connection refused".to_string()))
    }
}

fn parsed_ok() -> Result<RecordInput, ServiceError> {
    let mut input = RecordInput::manual("Tom", "Green Tractor", 10.0);
    input.crop = "Corn".to_string();
    Ok(input)
}

/// Test helper: state with the given parser and summarizer
fn state_with(
    store: RecordStore,
    parser: Arc<dyn EntryParser>,
    summarizer: Arc<dyn Summarizer>,
) -> AppState {
    let event_bus = EventBus::new(64);
    let prefs: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let playback = Arc::new(
        PlaybackSession::new(
            SpotifyConfig::default(),
            "http://127.0.0.1:5740".to_string(),
            prefs.clone(),
            event_bus.clone(),
        )
        .unwrap(),
    );

    AppState::new(store, event_bus, parser, summarizer, playback, prefs)
}

/// Test helper: demo-seeded state with working fakes
fn seeded_state() -> AppState {
    let store = RecordStore::with_seed(record::demo_records(time::now())).unwrap();
    state_with(store, Arc::new(FakeParser(parsed_ok)), Arc::new(CountingSummarizer))
}

fn empty_state() -> AppState {
    state_with(
        RecordStore::new(),
        Arc::new(FakeParser(parsed_ok)),
        Arc::new(CountingSummarizer),
    )
}

/// Test helper: send one request, return status and JSON body (Null when empty)
async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, value)
}

async fn record_count(state: &AppState) -> usize {
    state.store.read().await.len()
}

fn approx(value: &Value, expected: f64) -> bool {
    (value.as_f64().unwrap() - expected).abs() < 1e-9
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let state = empty_state();
    let (status, body) = send(&state, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "agritrack-ui");
    assert!(body["version"].is_string());
}

// =============================================================================
// Records
// =============================================================================

#[tokio::test]
async fn test_list_records_newest_first() {
    let state = seeded_state();
    let (status, body) = send(&state, "GET", "/api/records", None).await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["person"], "Bob Lee");
    assert_eq!(records[3]["amountTons"], 12.5);
}

#[tokio::test]
async fn test_create_record_switches_to_dashboard() {
    let state = empty_state();
    send(&state, "PUT", "/api/view", Some(json!({"view": "LOG_ENTRY"}))).await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/records",
        Some(json!({
            "person": "Ann",
            "vehicle": "Grey Truck",
            "crop": "Wheat",
            "amountTons": 7.25,
            "sourceField": "North 40",
            "destination": "Elevator"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["crop"], "Wheat");
    assert!(body["id"].is_string());
    assert!(body["date"].is_string());

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert_eq!(view["view"], "DASHBOARD");
    assert_eq!(record_count(&state).await, 1);
}

#[tokio::test]
async fn test_manual_entry_validation_keeps_view() {
    let state = seeded_state();
    send(&state, "PUT", "/api/view", Some(json!({"view": "LOG_ENTRY"}))).await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/entry/manual",
        Some(json!({"person": "  ", "vehicle": "Red Semi", "amountTons": 5.0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(record_count(&state).await, 4);

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert_eq!(view["view"], "LOG_ENTRY");
    assert!(view["entryError"].is_string());
}

#[tokio::test]
async fn test_manual_entry_rejects_negative_tons() {
    let state = empty_state();
    let (status, _) = send(
        &state,
        "POST",
        "/api/entry/manual",
        Some(json!({"person": "Ann", "vehicle": "Red Semi", "amountTons": -1.0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(record_count(&state).await, 0);
}

#[tokio::test]
async fn test_manual_entry_fills_defaults() {
    let state = empty_state();
    let (status, body) = send(
        &state,
        "POST",
        "/api/entry/manual",
        Some(json!({"person": "Ann", "vehicle": "Red Semi", "amountTons": 0.0})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["crop"], "Grain");
    assert_eq!(body["sourceField"], "Field");
    assert_eq!(body["destination"], "Storage");
}

#[tokio::test]
async fn test_update_unknown_record_is_not_found() {
    let state = seeded_state();
    let ghost = {
        let store = state.store.read().await;
        let mut record = store.records()[0].clone();
        record.id = uuid::Uuid::new_v4();
        record
    };

    let uri = format!("/api/records/{}", ghost.id);
    let (status, body) = send(&state, "PUT", &uri, Some(serde_json::to_value(&ghost).unwrap())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_id_mismatch_is_bad_request() {
    let state = seeded_state();
    let record = state.store.read().await.records()[0].clone();

    let uri = format!("/api/records/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&state, "PUT", &uri, Some(serde_json::to_value(&record).unwrap())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let state = seeded_state();
    let mut record = state.store.read().await.records()[2].clone();
    record.amount_tons = 9.0;

    let uri = format!("/api/records/{}", record.id);
    let (status, _) = send(&state, "PUT", &uri, Some(serde_json::to_value(&record).unwrap())).await;
    assert_eq!(status, StatusCode::OK);

    let store = state.store.read().await;
    assert_eq!(store.records()[2].amount_tons, 9.0);
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn test_records_cannot_be_deleted_without_confirmation() {
    let state = seeded_state();
    let id = state.store.read().await.records()[1].id;

    let (status, _) = send(&state, "DELETE", &format!("/api/records/{}", id), None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(record_count(&state).await, 4);
}

// =============================================================================
// Smart entry
// =============================================================================

#[tokio::test]
async fn test_smart_entry_creates_record() {
    let state = empty_state();
    let (status, body) = send(
        &state,
        "POST",
        "/api/entry/smart",
        Some(json!({"text": "Tom hauled 10 tons of corn in the green tractor"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["person"], "Tom");
    assert_eq!(body["crop"], "Corn");
    assert_eq!(record_count(&state).await, 1);
}

#[tokio::test]
async fn test_smart_entry_uninterpretable() {
    let state = state_with(
        RecordStore::new(),
        Arc::new(FakeParser(|| Err(ServiceError::Uninterpretable("no person".into())))),
        Arc::new(CountingSummarizer),
    );

    let (status, body) = send(&state, "POST", "/api/entry/smart", Some(json!({"text": "hello"}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], MSG_UNINTERPRETABLE);
    assert_eq!(record_count(&state).await, 0);
}

#[tokio::test]
async fn test_smart_entry_service_unavailable() {
    let state = state_with(
        RecordStore::new(),
        Arc::new(FakeParser(|| Err(ServiceError::MissingApiKey))),
        Arc::new(CountingSummarizer),
    );

    let (status, body) = send(&state, "POST", "/api/entry/smart", Some(json!({"text": "hello"}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["message"], MSG_SERVICE_UNAVAILABLE);

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert_eq!(view["entryError"], MSG_SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_smart_entry_with_invalid_fields_is_uninterpretable() {
    let state = state_with(
        RecordStore::new(),
        Arc::new(FakeParser(|| Ok(RecordInput::manual("Tom", "Truck", -3.0)))),
        Arc::new(CountingSummarizer),
    );

    let (status, _) = send(&state, "POST", "/api/entry/smart", Some(json!({"text": "Tom -3"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(record_count(&state).await, 0);
}

#[tokio::test]
async fn test_smart_entry_blank_text() {
    let state = empty_state();
    let (status, _) = send(&state, "POST", "/api/entry/smart", Some(json!({"text": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Dashboard and summary
// =============================================================================

#[tokio::test]
async fn test_dashboard_from_demo_seed() {
    let state = seeded_state();
    let (status, body) = send(&state, "GET", "/api/dashboard", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["totals"]["totalTons"], 57.8));
    assert_eq!(body["totals"]["totalTrips"], 4);
    assert_eq!(body["totals"]["uniquePeople"], 3);

    let by_person = body["byPerson"].as_array().unwrap();
    assert_eq!(by_person[0]["name"], "Bob Lee");
    assert_eq!(by_person[1]["name"], "John Doe");
    assert!(approx(&by_person[1]["tons"], 27.5));
    assert_eq!(by_person[1]["trips"], 2);

    let vehicles: Vec<&str> = body["byVehicle"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(vehicles, vec!["White Semi", "Red Semi", "Blue Truck"]);
}

#[tokio::test]
async fn test_dashboard_empty_store() {
    let state = empty_state();
    let (_, body) = send(&state, "GET", "/api/dashboard", None).await;

    assert_eq!(body["totals"]["totalTons"], 0.0);
    assert_eq!(body["totals"]["totalTrips"], 0);
    assert_eq!(body["byPerson"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_summary_refresh_texts() {
    let state = seeded_state();
    assert!(refresh_summary(&state).await);
    let (_, body) = send(&state, "GET", "/api/dashboard", None).await;
    assert_eq!(body["summary"], "4 records");

    let empty = empty_state();
    refresh_summary(&empty).await;
    assert_eq!(empty.view.read().await.summary_text(), NO_DATA_TEXT);

    let failing = state_with(
        RecordStore::with_seed(record::demo_records(time::now())).unwrap(),
        Arc::new(FakeParser(parsed_ok)),
        Arc::new(FailingSummarizer),
    );
    refresh_summary(&failing).await;
    assert_eq!(failing.view.read().await.summary_text(), UNAVAILABLE_TEXT);
}

#[tokio::test]
async fn test_summary_sees_only_recent_records() {
    let state = seeded_state().with_summary_limit(2);
    refresh_summary(&state).await;
    assert_eq!(state.view.read().await.summary_text(), "2 records");
}

#[tokio::test]
async fn test_summary_refresher_follows_record_changes() {
    let state = seeded_state();
    let handle = spawn_summary_refresher(state.clone(), Duration::from_millis(50));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(state.view.read().await.summary_text(), "4 records");

    send(
        &state,
        "POST",
        "/api/entry/manual",
        Some(json!({"person": "Ann", "vehicle": "Red Semi", "amountTons": 3.0})),
    )
    .await;

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(state.view.read().await.summary_text(), "5 records");
    handle.abort();
}

#[tokio::test]
async fn test_summary_refresh_endpoint_accepts() {
    let state = seeded_state();
    let (status, _) = send(&state, "POST", "/api/summary/refresh", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

// =============================================================================
// Edit session
// =============================================================================

#[tokio::test]
async fn test_edit_flow_updates_dashboard() {
    let state = seeded_state();
    let id = state.store.read().await.records()[0].id;

    let (status, scratch) = send(&state, "POST", &format!("/api/edit/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scratch["person"], "Bob Lee");

    let (status, scratch) = send(
        &state,
        "PATCH",
        "/api/edit",
        Some(json!({"field": "amountTons", "value": 2.1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scratch["amountTons"], 2.1);

    // Nothing reaches the store before save
    assert_eq!(state.store.read().await.records()[0].amount_tons, 22.1);

    let (status, _) = send(&state, "POST", "/api/edit/save", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&state, "GET", "/api/dashboard", None).await;
    assert!(approx(&body["totals"]["totalTons"], 37.8));

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert!(view["edit"].is_null());
}

#[tokio::test]
async fn test_rejected_save_keeps_session_open() {
    let state = seeded_state();
    let id = state.store.read().await.records()[0].id;

    send(&state, "POST", &format!("/api/edit/{}", id), None).await;
    send(&state, "PATCH", "/api/edit", Some(json!({"field": "person", "value": ""}))).await;

    let (status, body) = send(&state, "POST", "/api/edit/save", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert_eq!(view["edit"]["targetId"], id.to_string());
    assert_eq!(view["edit"]["scratch"]["person"], "");
    assert_eq!(state.store.read().await.records()[0].person, "Bob Lee");
}

#[tokio::test]
async fn test_edit_without_session() {
    let state = seeded_state();

    let (status, _) = send(&state, "PATCH", "/api/edit", Some(json!({"field": "crop", "value": "Oats"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&state, "POST", "/api/edit/save", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&state, "POST", &format!("/api/edit/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_edit_discards_scratch() {
    let state = seeded_state();
    let id = state.store.read().await.records()[3].id;

    send(&state, "POST", &format!("/api/edit/{}", id), None).await;
    send(&state, "PATCH", "/api/edit", Some(json!({"field": "vehicle", "value": "Blue Truck"}))).await;
    let (status, _) = send(&state, "DELETE", "/api/edit", None).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.store.read().await.records()[3].vehicle, "Red Semi");
}

// =============================================================================
// Delete confirmation
// =============================================================================

#[tokio::test]
async fn test_delete_confirmation_flow() {
    let state = seeded_state();
    let id = state.store.read().await.records()[2].id;

    let (status, view) = send(&state, "POST", &format!("/api/delete-request/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["pendingDelete"], id.to_string());
    assert_eq!(record_count(&state).await, 4);

    let (status, body) = send(&state, "POST", "/api/delete-request/confirm", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);
    assert_eq!(record_count(&state).await, 3);

    let (status, _) = send(&state, "POST", "/api/delete-request/confirm", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirmed_delete_closes_matching_edit() {
    let state = seeded_state();
    let id = state.store.read().await.records()[0].id;

    send(&state, "POST", &format!("/api/edit/{}", id), None).await;
    send(&state, "POST", &format!("/api/delete-request/{}", id), None).await;
    let (status, body) = send(&state, "POST", "/api/delete-request/confirm", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert!(view["edit"].is_null());
    assert!(view["pendingDelete"].is_null());
    assert!(state.store.read().await.get(id).is_none());
}

#[tokio::test]
async fn test_confirming_a_vanished_record_is_a_no_op() {
    let state = seeded_state();
    let id = uuid::Uuid::new_v4();

    send(&state, "POST", &format!("/api/delete-request/{}", id), None).await;
    let (status, body) = send(&state, "POST", "/api/delete-request/confirm", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], false);
    assert_eq!(record_count(&state).await, 4);
}

#[tokio::test]
async fn test_dismissed_delete_keeps_record() {
    let state = seeded_state();
    let id = state.store.read().await.records()[0].id;

    send(&state, "POST", &format!("/api/delete-request/{}", id), None).await;
    let (status, _) = send(&state, "DELETE", "/api/delete-request", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, view) = send(&state, "GET", "/api/view", None).await;
    assert!(view["pendingDelete"].is_null());
    assert_eq!(record_count(&state).await, 4);
}

// =============================================================================
// Settings and playback
// =============================================================================

#[tokio::test]
async fn test_theme_preference() {
    let state = empty_state();

    let (_, body) = send(&state, "GET", "/api/settings/theme", None).await;
    assert_eq!(body["theme"], "dark");

    let (status, _) = send(&state, "PUT", "/api/settings/theme", Some(json!({"theme": "light"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&state, "GET", "/api/settings/theme", None).await;
    assert_eq!(body["theme"], "light");
}

#[tokio::test]
async fn test_theme_toggle_flips_and_persists() {
    let state = empty_state();

    let (status, body) = send(&state, "POST", "/api/settings/theme/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "light");
    assert_eq!(state.prefs.get("theme").as_deref(), Some("light"));

    let (_, body) = send(&state, "POST", "/api/settings/theme/toggle", None).await;
    assert_eq!(body["theme"], "dark");

    let (_, body) = send(&state, "GET", "/api/settings/theme", None).await;
    assert_eq!(body["theme"], "dark");
}

#[tokio::test]
async fn test_demo_playback_controls() {
    let state = empty_state();

    let (_, body) = send(&state, "GET", "/api/playback", None).await;
    assert_eq!(body["demoMode"], true);
    assert_eq!(body["isPlaying"], false);

    let (status, body) = send(&state, "POST", "/api/playback/next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["track"]["artist"], "George Strait");
    assert_eq!(body["isPlaying"], true);

    let (status, _) = send(&state, "POST", "/api/playback/rewind", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_playback_login_requires_client_id() {
    let state = empty_state();

    let (status, body) = send(&state, "GET", "/api/playback/login", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Client ID is required for real connection");

    let (status, body) = send(&state, "GET", "/api/playback/login?clientId=abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().contains("client_id=abc"));
}

#[tokio::test]
async fn test_playback_never_touches_records() {
    let state = seeded_state();
    send(&state, "POST", "/api/playback/play", None).await;
    send(&state, "POST", "/api/playback/logout", None).await;
    assert_eq!(record_count(&state).await, 4);
}
