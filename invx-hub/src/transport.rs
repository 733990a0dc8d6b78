//! Viewer transport
//!
//! Delivery of encoded pushes to individual viewers. Each transport
//! classifies its own failures so callers never inspect error text.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Viewer is permanently unreachable and should be evicted
    Terminal(String),
    /// Delivery failed but the viewer may still be reachable
    Transient(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Pushes encoded messages to one viewer
#[async_trait]
pub trait ViewerTransport: Send + Sync {
    async fn deliver(&self, viewer_id: &str, payload: &str) -> DeliveryOutcome;
}

/// Per-viewer bounded outbound queues
///
/// The WebSocket handler opens a queue when a viewer connects and drains it
/// into the socket. When the socket writer stops, the receiving half is
/// dropped and further deliveries are classified `Terminal`. A full queue
/// (slow viewer) is `Transient`.
#[derive(Debug, Default)]
pub struct ChannelTransport {
    outboxes: RwLock<HashMap<String, mpsc::Sender<String>>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the outbound queue for `viewer_id`, replacing any previous one
    pub fn open(&self, viewer_id: &str, capacity: usize) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        match self.outboxes.write() {
            Ok(mut outboxes) => {
                outboxes.insert(viewer_id.to_string(), tx);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(viewer_id.to_string(), tx);
            }
        }
        rx
    }

    /// Drop the outbound queue for `viewer_id` (no-op if absent)
    pub fn close(&self, viewer_id: &str) {
        match self.outboxes.write() {
            Ok(mut outboxes) => {
                outboxes.remove(viewer_id);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(viewer_id);
            }
        }
    }

    pub fn open_count(&self) -> usize {
        match self.outboxes.read() {
            Ok(outboxes) => outboxes.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[async_trait]
impl ViewerTransport for ChannelTransport {
    async fn deliver(&self, viewer_id: &str, payload: &str) -> DeliveryOutcome {
        let sender = match self.outboxes.read() {
            Ok(outboxes) => outboxes.get(viewer_id).cloned(),
            Err(_) => return DeliveryOutcome::Transient("outbox table lock poisoned".to_string()),
        };

        let Some(sender) = sender else {
            return DeliveryOutcome::Terminal("no open connection".to_string());
        };

        match sender.try_send(payload.to_string()) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(TrySendError::Full(_)) => DeliveryOutcome::Transient("outbound queue full".to_string()),
            Err(TrySendError::Closed(_)) => DeliveryOutcome::Terminal("connection gone".to_string()),
        }
    }
}
