//! Current metrics summary endpoint

use axum::{extract::State, routing::get, Json, Router};
use invx_common::Summary;

use crate::{ApiResult, AppState};

/// GET /api/metrics
///
/// Same summary a viewer receives in a `metrics-update` push. Answers 503
/// when the metric store is unavailable.
pub async fn current_metrics(State(state): State<AppState>) -> ApiResult<Json<Summary>> {
    let summary = state.aggregator.aggregate().await?;
    Ok(Json(summary))
}

pub fn metrics_routes() -> Router<AppState> {
    Router::new().route("/api/metrics", get(current_metrics))
}
