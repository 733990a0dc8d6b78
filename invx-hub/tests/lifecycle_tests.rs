//! Viewer lifecycle and document processing through AppState wiring

mod helpers;

use helpers::fragment;
use invx_hub::documents::RecognizedDocument;
use invx_hub::store::{InMemoryMetricStore, SqliteMetricStore};
use invx_hub::AppState;
use std::sync::Arc;

fn memory_state() -> AppState {
    AppState::new(Arc::new(InMemoryMetricStore::new()), 8)
}

fn invoice() -> RecognizedDocument {
    RecognizedDocument {
        fragments: vec![
            fragment("Price", 100, 150, 0),
            fragment("Quantity", 200, 280, 0),
            fragment("9.99", 105, 140, 30),
            fragment("3", 230, 240, 30),
        ],
        raw_text: "Invoice\nPrice Quantity\n9.99 3\nTotal $29.97".to_string(),
        elapsed_ms: 840,
    }
}

#[tokio::test]
async fn test_connect_does_not_push() {
    let state = memory_state();
    let mut outbox = state.transport.open("v1", 8);

    assert!(state.sessions.on_connect("v1").is_some());
    assert_eq!(state.registry.len().unwrap(), 1);
    assert!(outbox.try_recv().is_err(), "Nothing is pushed until the viewer asks");
}

#[tokio::test]
async fn test_get_metrics_replies_to_requester_only() {
    let state = memory_state();
    let mut first = state.transport.open("v1", 8);
    let mut second = state.transport.open("v2", 8);
    state.sessions.on_connect("v1");
    state.sessions.on_connect("v2");

    let report = state
        .sessions
        .on_message("v1", r#"{"action": "get-metrics"}"#)
        .await
        .expect("get-metrics triggers a push");

    assert_eq!(report.delivered, 1);
    let payload: serde_json::Value = serde_json::from_str(&first.recv().await.unwrap()).unwrap();
    assert_eq!(payload["type"], "metrics-update");
    assert_eq!(payload["data"]["total"], 0);
    assert!(second.try_recv().is_err());
}

#[tokio::test]
async fn test_unknown_and_malformed_messages_ignored() {
    let state = memory_state();
    let mut outbox = state.transport.open("v1", 8);
    state.sessions.on_connect("v1");

    assert!(state.sessions.on_message("v1", r#"{"action": "dance"}"#).await.is_none());
    assert!(state.sessions.on_message("v1", "{{{").await.is_none());
    assert!(outbox.try_recv().is_err());
    assert_eq!(state.registry.len().unwrap(), 1);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let state = memory_state();
    state.sessions.on_connect("v1");

    state.sessions.on_disconnect("v1");
    state.sessions.on_disconnect("v1");
    state.sessions.on_disconnect("never-connected");

    assert!(state.registry.is_empty().unwrap());
}

#[tokio::test]
async fn test_request_from_evicted_viewer_is_ignored() {
    let state = memory_state();
    state.sessions.on_connect("v1");
    state.registry.unregister("v1").unwrap();

    assert!(state.sessions.on_message("v1", r#"{"action": "get-metrics"}"#).await.is_none());
}

#[tokio::test]
async fn test_process_document_aligns_records_and_broadcasts() {
    let state = memory_state();
    let mut outbox = state.transport.open("v1", 8);
    state.sessions.on_connect("v1");

    let processed = state.processor.process(invoice()).await;

    assert!(processed.recorded);
    assert_eq!(processed.columns.len(), 2);
    let price: Vec<&str> = processed.columns["Price"].members.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(price, vec!["Price", "9.99"]);
    assert_eq!(processed.numbers, vec!["9.99", "29.97"]);
    assert!(processed.accuracy_pct > 0);
    assert_eq!(processed.broadcast.delivered, 1);

    let payload: serde_json::Value = serde_json::from_str(&outbox.recv().await.unwrap()).unwrap();
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["avgLatency"], 840);
    assert_eq!(payload["data"]["avgAccuracy"], processed.accuracy_pct as f64);
}

#[tokio::test]
async fn test_closed_viewer_evicted_on_next_document() {
    let state = memory_state();
    let outbox = state.transport.open("v1", 8);
    state.sessions.on_connect("v1");
    drop(outbox);

    let processed = state.processor.process(invoice()).await;

    assert_eq!(processed.broadcast.evicted, 1);
    assert!(state.registry.is_empty().unwrap());
}

#[tokio::test]
async fn test_document_succeeds_when_store_is_down() {
    let pool = invx_common::db::init_memory_database().await.unwrap();
    let state = AppState::new(Arc::new(SqliteMetricStore::new(pool.clone())), 8);
    pool.close().await;

    let processed = state.processor.process(invoice()).await;

    assert!(!processed.recorded);
    assert_eq!(processed.columns.len(), 2);
    assert_eq!(processed.broadcast.attempted, 0);
}

#[tokio::test]
async fn test_document_without_headers_has_empty_columns() {
    let state = memory_state();
    let processed = state
        .processor
        .process(RecognizedDocument {
            fragments: vec![fragment("Receipt", 0, 90, 0)],
            raw_text: String::new(),
            elapsed_ms: 10,
        })
        .await;

    assert!(processed.columns.is_empty());
    assert_eq!(processed.accuracy_pct, 0);
    assert!(processed.recorded);
}
