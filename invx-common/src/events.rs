//! Viewer wire messages
//!
//! Server → viewer pushes and viewer → server control messages exchanged
//! over the live dashboard connection.

use crate::model::Summary;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Message pushed to dashboard viewers
///
/// Serializes as `{"type": "metrics-update", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewerPush {
    #[serde(rename = "metrics-update")]
    MetricsUpdate(Summary),
}

impl ViewerPush {
    /// Encode as the JSON text frame sent to viewers
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Internal(format!("Failed to serialize viewer push: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    action: Option<String>,
}

/// Control message received from a viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    /// `{"action": "get-metrics"}`: viewer asks for the current summary
    GetMetrics,
    /// Any other or missing action
    Unknown(Option<String>),
}

impl ViewerCommand {
    /// Parse a viewer text frame; an empty frame is treated as `{}`
    pub fn parse(payload: &str) -> Result<Self> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Ok(ViewerCommand::Unknown(None));
        }

        let raw: RawCommand = serde_json::from_str(payload)
            .map_err(|e| Error::InvalidInput(format!("Malformed viewer message: {}", e)))?;

        Ok(match raw.action.as_deref() {
            Some("get-metrics") => ViewerCommand::GetMetrics,
            _ => ViewerCommand::Unknown(raw.action),
        })
    }
}
