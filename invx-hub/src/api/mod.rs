//! HTTP and WebSocket API handlers for invx-hub

pub mod documents;
pub mod health;
pub mod metrics;
pub mod ws;

pub use documents::{document_routes, submit_document};
pub use health::{health_check, health_routes};
pub use metrics::{current_metrics, metrics_routes};
pub use ws::{attach_viewer, detach_viewer, viewer_routes, viewer_socket};
