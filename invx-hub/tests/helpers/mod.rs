//! Shared test helpers for invx-hub integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use invx_common::{Quad, Sample, TextFragment};
use invx_hub::transport::{DeliveryOutcome, ViewerTransport};
use std::collections::HashMap;
use std::sync::Mutex;

/// Transport whose outcome per viewer can be scripted; records every
/// successfully delivered payload
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<HashMap<String, DeliveryOutcome>>,
    delivered: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_terminally(&self, viewer_id: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(viewer_id.to_string(), DeliveryOutcome::Terminal("410 Gone".to_string()));
    }

    pub fn fail_transiently(&self, viewer_id: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(viewer_id.to_string(), DeliveryOutcome::Transient("throttled".to_string()));
    }

    /// Payloads delivered to `viewer_id`, oldest first
    pub fn payloads_for(&self, viewer_id: &str) -> Vec<serde_json::Value> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == viewer_id)
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect()
    }
}

#[async_trait]
impl ViewerTransport for ScriptedTransport {
    async fn deliver(&self, viewer_id: &str, payload: &str) -> DeliveryOutcome {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(viewer_id)
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered);

        if outcome.is_delivered() {
            self.delivered
                .lock()
                .unwrap()
                .push((viewer_id.to_string(), payload.to_string()));
        }
        outcome
    }
}

pub fn sample(id: &str, latency_ms: u64, accuracy_pct: u8) -> Sample {
    Sample {
        id: id.to_string(),
        timestamp: invx_common::time::now_millis(),
        latency_ms,
        accuracy_pct,
    }
}

pub fn fragment(text: &str, x1: i32, x2: i32, y: i32) -> TextFragment {
    TextFragment::new(text, Quad::from_rect(x1, y, x2, y + 14))
}
