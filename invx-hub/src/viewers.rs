//! Viewer connection lifecycle
//!
//! Entry points for the three transport events: connect, disconnect and
//! incoming message. A viewer is not pushed anything on connect; it must
//! send `{"action": "get-metrics"}` to receive the current summary, and that
//! reply goes to the requester only.

use crate::dispatch::{BroadcastDispatcher, PublishReport};
use crate::registry::{ConnectionRegistry, ViewerHandle};
use invx_common::events::ViewerCommand;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ViewerSessions {
    registry: Arc<ConnectionRegistry>,
    dispatcher: BroadcastDispatcher,
}

impl ViewerSessions {
    pub fn new(registry: Arc<ConnectionRegistry>, dispatcher: BroadcastDispatcher) -> Self {
        Self { registry, dispatcher }
    }

    /// Register a newly connected viewer
    ///
    /// Returns the handle, or `None` if the registry is unavailable.
    pub fn on_connect(&self, viewer_id: &str) -> Option<ViewerHandle> {
        let handle = ViewerHandle::new(viewer_id);
        match self.registry.register(handle.clone()) {
            Ok(()) => {
                info!("Viewer {} connected, waiting for metrics request", viewer_id);
                Some(handle)
            }
            Err(e) => {
                warn!("Could not register viewer {}: {}", viewer_id, e);
                None
            }
        }
    }

    /// Forget a viewer; safe after eviction
    pub fn on_disconnect(&self, viewer_id: &str) {
        match self.registry.unregister(viewer_id) {
            Ok(true) => info!("Viewer {} disconnected", viewer_id),
            Ok(false) => debug!("Viewer {} disconnected after eviction", viewer_id),
            Err(e) => warn!("Could not unregister viewer {}: {}", viewer_id, e),
        }
    }

    /// Handle a control message from a viewer
    ///
    /// Returns the publish report when the message triggered a push.
    /// Malformed and unknown messages are logged and ignored.
    pub async fn on_message(&self, viewer_id: &str, payload: &str) -> Option<PublishReport> {
        let command = match ViewerCommand::parse(payload) {
            Ok(command) => command,
            Err(e) => {
                warn!("Ignoring message from viewer {}: {}", viewer_id, e);
                return None;
            }
        };

        match command {
            ViewerCommand::GetMetrics => {
                let handle = match self.registry.get(viewer_id) {
                    Ok(Some(handle)) => handle,
                    Ok(None) => {
                        debug!("Metrics request from unregistered viewer {}", viewer_id);
                        return None;
                    }
                    Err(e) => {
                        warn!("Skipping metrics request from {}: {}", viewer_id, e);
                        return None;
                    }
                };
                debug!("Viewer {} requested metrics", viewer_id);
                Some(self.dispatcher.publish_to_one(&handle).await)
            }
            ViewerCommand::Unknown(action) => {
                info!("Unknown action {:?} from viewer {}", action, viewer_id);
                None
            }
        }
    }
}
