//! # invx Common Library
//!
//! Shared code for the invx invoice processing services including:
//! - Recognized text model (fragments, bounding quads, columns)
//! - Column alignment and accuracy scoring
//! - Metric sample and summary types
//! - Viewer wire messages
//! - Configuration loading
//! - Database initialization

pub mod accuracy;
pub mod columns;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod model;
pub mod numbers;
pub mod time;

pub use accuracy::score_accuracy;
pub use columns::{align_columns, ColumnMap, HEADER_NAMES};
pub use error::{Error, Result};
pub use model::{Column, Point, Quad, Sample, Summary, TextFragment};
