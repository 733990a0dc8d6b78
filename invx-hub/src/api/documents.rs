//! Document submission endpoint
//!
//! POST /api/documents receives the recognizer output for one document and
//! answers with the aligned columns and accuracy score.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::documents::{ProcessedDocument, RecognizedDocument};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub document: ProcessedDocument,
}

/// POST /api/documents
pub async fn submit_document(
    State(state): State<AppState>,
    payload: Result<Json<RecognizedDocument>, JsonRejection>,
) -> ApiResult<Json<DocumentResponse>> {
    let Json(document) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let processed = state.processor.process(document).await;

    Ok(Json(DocumentResponse {
        status: "success",
        document: processed,
    }))
}

pub fn document_routes() -> Router<AppState> {
    Router::new().route("/api/documents", post(submit_document))
}
