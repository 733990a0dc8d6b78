//! Broadcast dispatcher
//!
//! Pushes the current metrics summary to registered viewers. A fan-out never
//! fails: viewers whose delivery is terminal are evicted, transient failures
//! are logged and skipped, and storage or registry outages degrade to a
//! logged no-op. There is no retry and no coalescing of concurrent publishes.

use crate::aggregator::MetricsAggregator;
use crate::registry::{ConnectionRegistry, ViewerHandle};
use crate::transport::{DeliveryOutcome, ViewerTransport};
use futures::future::join_all;
use invx_common::events::ViewerPush;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counts from one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub attempted: usize,
    pub delivered: usize,
    pub evicted: usize,
    pub transient_failures: usize,
}

impl PublishReport {
    fn record(&mut self, outcome: &DeliveryOutcome) {
        self.attempted += 1;
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Terminal(_) => self.evicted += 1,
            DeliveryOutcome::Transient(_) => self.transient_failures += 1,
        }
    }
}

/// Fans metrics summaries out to viewers
#[derive(Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
    aggregator: MetricsAggregator,
    transport: Arc<dyn ViewerTransport>,
}

impl BroadcastDispatcher {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        aggregator: MetricsAggregator,
        transport: Arc<dyn ViewerTransport>,
    ) -> Self {
        Self {
            registry,
            aggregator,
            transport,
        }
    }

    /// Push the current summary to every registered viewer
    pub async fn publish_to_all(&self) -> PublishReport {
        let handles = match self.registry.snapshot() {
            Ok(handles) => handles,
            Err(e) => {
                warn!("Skipping metrics broadcast: {}", e);
                return PublishReport::default();
            }
        };

        if handles.is_empty() {
            debug!("No viewers connected, nothing to broadcast");
            return PublishReport::default();
        }

        let Some(payload) = self.prepare_payload().await else {
            return PublishReport::default();
        };

        let outcomes = join_all(handles.iter().map(|handle| self.deliver_to(handle, &payload))).await;

        let mut report = PublishReport::default();
        for outcome in &outcomes {
            report.record(outcome);
        }

        info!(
            "Broadcast metrics to {}/{} viewers ({} evicted)",
            report.delivered, report.attempted, report.evicted
        );
        report
    }

    /// Push the current summary to a single viewer
    pub async fn publish_to_one(&self, handle: &ViewerHandle) -> PublishReport {
        let mut report = PublishReport::default();

        if let Some(payload) = self.prepare_payload().await {
            let outcome = self.deliver_to(handle, &payload).await;
            report.record(&outcome);
        }

        report
    }

    /// Aggregate and encode the push message; `None` when storage is down
    async fn prepare_payload(&self) -> Option<String> {
        let summary = match self.aggregator.aggregate().await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Skipping metrics publish, aggregation failed: {}", e);
                return None;
            }
        };

        match ViewerPush::MetricsUpdate(summary).to_json() {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Skipping metrics publish: {}", e);
                None
            }
        }
    }

    async fn deliver_to(&self, handle: &ViewerHandle, payload: &str) -> DeliveryOutcome {
        let outcome = self.transport.deliver(&handle.id, payload).await;

        match &outcome {
            DeliveryOutcome::Delivered => {}
            DeliveryOutcome::Terminal(reason) => match self.registry.unregister(&handle.id) {
                Ok(_) => info!("Evicted viewer {} ({})", handle.id, reason),
                Err(e) => warn!("Viewer {} is gone ({}) but eviction failed: {}", handle.id, reason, e),
            },
            DeliveryOutcome::Transient(reason) => {
                warn!("Delivery to viewer {} failed, keeping connection: {}", handle.id, reason);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryMetricStore, MetricStore};
    use async_trait::async_trait;
    use invx_common::Sample;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Transport with per-viewer scripted outcomes; records delivered payloads
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<HashMap<String, DeliveryOutcome>>,
        delivered: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedTransport {
        fn set(&self, id: &str, outcome: DeliveryOutcome) {
            self.outcomes.lock().unwrap().insert(id.to_string(), outcome);
        }

        fn delivered_to(&self) -> Vec<String> {
            let mut ids: Vec<String> = self.delivered.lock().unwrap().iter().map(|(id, _)| id.clone()).collect();
            ids.sort();
            ids
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

    async fn setup() -> (BroadcastDispatcher, Arc<ConnectionRegistry>, Arc<ScriptedTransport>) {
        let store = Arc::new(InMemoryMetricStore::new());
        store
            .insert(&Sample {
                id: "s1".to_string(),
                timestamp: 0,
                latency_ms: 100,
                accuracy_pct: 90,
            })
            .await
            .unwrap();

        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(ScriptedTransport::default());
        let dispatcher = BroadcastDispatcher::new(
            registry.clone(),
            MetricsAggregator::new(store),
            transport.clone(),
        );
        (dispatcher, registry, transport)
    }

    #[tokio::test]
    async fn test_publish_with_no_viewers_is_noop() {
        let (dispatcher, _registry, transport) = setup().await;

        assert_eq!(dispatcher.publish_to_all().await, PublishReport::default());
        assert!(transport.delivered_to().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_failure_evicts_viewer() {
        let (dispatcher, registry, transport) = setup().await;
        registry.register(ViewerHandle::new("a")).unwrap();
        registry.register(ViewerHandle::new("b")).unwrap();
        transport.set("b", DeliveryOutcome::Terminal("gone".to_string()));

        let report = dispatcher.publish_to_all().await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.evicted, 1);
        let ids: Vec<String> = registry.snapshot().unwrap().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_viewer() {
        let (dispatcher, registry, transport) = setup().await;
        registry.register(ViewerHandle::new("a")).unwrap();
        transport.set("a", DeliveryOutcome::Transient("busy".to_string()));

        let report = dispatcher.publish_to_all().await;

        assert_eq!(report.delivered, 0);
        assert_eq!(report.transient_failures, 1);
        assert!(registry.get("a").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_publish_to_one_targets_single_viewer() {
        let (dispatcher, registry, transport) = setup().await;
        let a = ViewerHandle::new("a");
        registry.register(a.clone()).unwrap();
        registry.register(ViewerHandle::new("b")).unwrap();

        let report = dispatcher.publish_to_one(&a).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(transport.delivered_to(), vec!["a"]);

        let payload = transport.delivered.lock().unwrap()[0].1.clone();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "metrics-update");
        assert_eq!(value["data"]["total"], 1);
    }

    #[tokio::test]
    async fn test_publish_to_one_terminal_evicts() {
        let (dispatcher, registry, transport) = setup().await;
        let a = ViewerHandle::new("a");
        registry.register(a.clone()).unwrap();
        transport.set("a", DeliveryOutcome::Terminal("gone".to_string()));

        let report = dispatcher.publish_to_one(&a).await;

        assert_eq!(report.evicted, 1);
        assert!(registry.is_empty().unwrap());
    }
}
