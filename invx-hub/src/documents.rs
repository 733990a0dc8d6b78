//! Document processing boundary
//!
//! The OCR adapter hands over recognized fragments, the full text and the
//! measured processing time for one document. Alignment and scoring always
//! succeed; recording the sample and broadcasting are best-effort and never
//! fail the document.

use crate::dispatch::{BroadcastDispatcher, PublishReport};
use crate::store::{record_sample, MetricStore};
use invx_common::numbers::extract_numeric_tokens;
use invx_common::time::now_millis;
use invx_common::{align_columns, score_accuracy, ColumnMap, Sample, TextFragment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Output of the recognizer for one document
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizedDocument {
    pub fragments: Vec<TextFragment>,
    #[serde(default)]
    pub raw_text: String,
    pub elapsed_ms: u64,
}

/// Result handed back to the upload caller
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub sample_id: String,
    pub columns: ColumnMap,
    #[serde(rename = "accuracy")]
    pub accuracy_pct: u8,
    /// Numeric tokens found in the full text
    pub numbers: Vec<String>,
    /// Full recognized text, echoed back
    pub extracted_text: String,
    /// Recognized fragments in input order, echoed back
    pub text_segments: Vec<TextFragment>,
    /// Whether the metric sample was stored
    pub recorded: bool,
    pub broadcast: PublishReport,
}

#[derive(Clone)]
pub struct DocumentProcessor {
    store: Arc<dyn MetricStore>,
    dispatcher: BroadcastDispatcher,
}

impl DocumentProcessor {
    pub fn new(store: Arc<dyn MetricStore>, dispatcher: BroadcastDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Align, score, record and broadcast one document
    pub async fn process(&self, document: RecognizedDocument) -> ProcessedDocument {
        let columns = align_columns(&document.fragments);
        let accuracy_pct = score_accuracy(&document.raw_text);
        let numbers = extract_numeric_tokens(&document.raw_text);
        debug!(
            "Aligned {} fragments into {} columns, accuracy {}%",
            document.fragments.len(),
            columns.len(),
            accuracy_pct
        );

        let sample = Sample {
            id: Uuid::new_v4().to_string(),
            timestamp: now_millis(),
            latency_ms: document.elapsed_ms,
            accuracy_pct,
        };

        let recorded = record_sample(self.store.as_ref(), &sample).await;

        // Without a new sample there is nothing new to push
        let broadcast = if recorded {
            self.dispatcher.publish_to_all().await
        } else {
            PublishReport::default()
        };

        info!(
            "Processed document {} in {} ms ({} columns, accuracy {}%)",
            sample.id,
            sample.latency_ms,
            columns.len(),
            accuracy_pct
        );

        ProcessedDocument {
            sample_id: sample.id,
            columns,
            accuracy_pct,
            numbers,
            extracted_text: document.raw_text,
            text_segments: document.fragments,
            recorded,
            broadcast,
        }
    }
}
