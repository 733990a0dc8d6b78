//! Metric sample storage
//!
//! Append-only collection of per-document samples. `SqliteMetricStore` is
//! the durable store used by the service; `InMemoryMetricStore` backs tests
//! and `--memory-store` runs.

use async_trait::async_trait;
use invx_common::{Error, Result, Sample};
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Durable append-only sample collection
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Append one sample
    ///
    /// # Errors
    /// `Error::StoreUnavailable` if the backing storage cannot be reached
    async fn insert(&self, sample: &Sample) -> Result<()>;

    /// Every sample ever inserted, in no particular order
    async fn all_samples(&self) -> Result<Vec<Sample>>;
}

/// Insert a sample, logging instead of failing when storage is down
///
/// Returns whether the sample was stored. Document processing must not fail
/// because metrics storage is unavailable.
pub async fn record_sample(store: &dyn MetricStore, sample: &Sample) -> bool {
    match store.insert(sample).await {
        Ok(()) => {
            debug!(
                "Recorded sample {} ({} ms, {}%)",
                sample.id, sample.latency_ms, sample.accuracy_pct
            );
            true
        }
        Err(e) => {
            warn!("Skipping metric sample {}: {}", sample.id, e);
            false
        }
    }
}

fn unavailable(e: sqlx::Error) -> Error {
    Error::StoreUnavailable(e.to_string())
}

/// SQLite-backed sample store (`invoice_metrics` table)
#[derive(Debug, Clone)]
pub struct SqliteMetricStore {
    pool: SqlitePool,
}

impl SqliteMetricStore {
    /// Wrap a pool whose schema was created by `invx_common::db::init_database`
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricStore for SqliteMetricStore {
    async fn insert(&self, sample: &Sample) -> Result<()> {
        let latency_ms = i64::try_from(sample.latency_ms)
            .map_err(|_| Error::InvalidInput(format!("latency {} ms out of range", sample.latency_ms)))?;

        sqlx::query(
            r#"
            INSERT INTO invoice_metrics (id, timestamp, latency_ms, accuracy_pct)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&sample.id)
        .bind(sample.timestamp)
        .bind(latency_ms)
        .bind(sample.accuracy_pct as i64)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn all_samples(&self) -> Result<Vec<Sample>> {
        let rows = sqlx::query("SELECT id, timestamp, latency_ms, accuracy_pct FROM invoice_metrics")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.into_iter()
            .map(|row| {
                let latency_ms: i64 = row.get("latency_ms");
                let accuracy_pct: i64 = row.get("accuracy_pct");
                Ok(Sample {
                    id: row.get("id"),
                    timestamp: row.get("timestamp"),
                    latency_ms: u64::try_from(latency_ms)
                        .map_err(|_| Error::Internal(format!("Stored latency {} is negative", latency_ms)))?,
                    accuracy_pct: u8::try_from(accuracy_pct)
                        .map_err(|_| Error::Internal(format!("Stored accuracy {} out of range", accuracy_pct)))?,
                })
            })
            .collect()
    }
}

/// Process-lifetime sample store
#[derive(Debug, Default)]
pub struct InMemoryMetricStore {
    samples: RwLock<Vec<Sample>>,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn insert(&self, sample: &Sample) -> Result<()> {
        self.samples.write().await.push(sample.clone());
        Ok(())
    }

    async fn all_samples(&self) -> Result<Vec<Sample>> {
        Ok(self.samples.read().await.clone())
    }
}
