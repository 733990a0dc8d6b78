//! invx-hub library - live invoice metrics hub
//!
//! Aligns recognized invoice fragments into columns, records one metric
//! sample per processed document and pushes the rolling summary to every
//! connected dashboard viewer.

pub mod aggregator;
pub mod api;
pub mod dispatch;
pub mod documents;
pub mod error;
pub mod registry;
pub mod store;
pub mod transport;
pub mod viewers;

pub use crate::error::{ApiError, ApiResult};

use aggregator::MetricsAggregator;
use axum::Router;
use chrono::{DateTime, Utc};
use dispatch::BroadcastDispatcher;
use documents::DocumentProcessor;
use registry::ConnectionRegistry;
use std::sync::Arc;
use store::MetricStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use transport::ChannelTransport;
use viewers::ViewerSessions;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub aggregator: MetricsAggregator,
    /// WebSocket outbound queues, one per connected viewer
    pub transport: Arc<ChannelTransport>,
    pub sessions: ViewerSessions,
    pub processor: DocumentProcessor,
    /// Per-viewer outbound queue length
    pub outbound_buffer: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire all components around `store`
    pub fn new(store: Arc<dyn MetricStore>, outbound_buffer: usize) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(ChannelTransport::new());
        let aggregator = MetricsAggregator::new(store.clone());
        let dispatcher = BroadcastDispatcher::new(registry.clone(), aggregator.clone(), transport.clone());

        Self {
            sessions: ViewerSessions::new(registry.clone(), dispatcher.clone()),
            processor: DocumentProcessor::new(store, dispatcher),
            registry,
            aggregator,
            transport,
            outbound_buffer,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::document_routes())
        .merge(api::metrics_routes())
        .merge(api::viewer_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
