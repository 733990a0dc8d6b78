//! Metrics aggregation
//!
//! Reduces the full sample set to one summary. Every call rescans all
//! samples; the cost grows linearly with the number of processed documents.

use crate::store::MetricStore;
use invx_common::time::now_millis;
use invx_common::{Result, Sample, Summary};
use std::sync::Arc;

/// Summarize `samples` as of `timestamp`
///
/// Mean latency is rounded to the nearest millisecond, mean accuracy to one
/// decimal. Exact halves go to the even neighbour (100.5 → 100, 85.25 → 85.2).
/// Throughput is the cumulative count.
pub fn summarize(samples: &[Sample], timestamp: i64) -> Summary {
    let total = samples.len() as u64;

    let (avg_latency_ms, avg_accuracy_pct) = if samples.is_empty() {
        (0, 0.0)
    } else {
        let n = samples.len() as f64;
        let latency_sum: f64 = samples.iter().map(|s| s.latency_ms as f64).sum();
        let accuracy_sum: f64 = samples.iter().map(|s| s.accuracy_pct as f64).sum();
        (
            (latency_sum / n).round_ties_even() as i64,
            (accuracy_sum / n * 10.0).round_ties_even() / 10.0,
        )
    };

    Summary {
        total,
        avg_latency_ms,
        avg_accuracy_pct,
        throughput: total,
        timestamp,
    }
}

/// Computes summaries from a metric store
#[derive(Clone)]
pub struct MetricsAggregator {
    store: Arc<dyn MetricStore>,
}

impl MetricsAggregator {
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self { store }
    }

    /// Summary of every sample currently stored
    ///
    /// # Errors
    /// `Error::StoreUnavailable` if the samples cannot be read
    pub async fn aggregate(&self) -> Result<Summary> {
        let samples = self.store.all_samples().await?;
        Ok(summarize(&samples, now_millis()))
    }
}
