use super::pipeline::{ingest_items, IngestError};
use crate::storage::memory::MemoryBackend;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Response returned to the client once the ingest pipeline has terminated.
#[derive(Debug, Serialize)]
pub struct IngestReceipt {
    pub ingested: usize,
    pub status: String,
}

/// Accepts a single document object or an array of documents and runs one
/// ingest pipeline over them. The pipeline's single pass/fail outcome decides
/// the response; there is no partial-success reporting.
pub async fn handle_ingest(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<IngestReceipt>) {
    let documents = match collect_documents(payload) {
        Some(documents) => documents,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(IngestReceipt {
                    ingested: 0,
                    status: "payload_must_be_documents".to_string(),
                }),
            );
        }
    };

    let count = documents.len();
    let outcome = ingest_items(documents, move || async move { backend.ingest_stream() }).await;

    match outcome {
        Ok(()) => (
            StatusCode::CREATED,
            Json(IngestReceipt {
                ingested: count,
                status: "ingested".to_string(),
            }),
        ),
        Err(IngestError::Transform(reason)) => {
            tracing::warn!("Rejected ingest payload: {}", reason);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(IngestReceipt {
                    ingested: 0,
                    status: "invalid_document".to_string(),
                }),
            )
        }
        Err(error) => {
            tracing::error!("Ingest failed: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IngestReceipt {
                    ingested: 0,
                    status: "ingest_failed".to_string(),
                }),
            )
        }
    }
}

fn collect_documents(payload: Value) -> Option<Vec<crate::search::types::Document>> {
    match payload {
        Value::Object(document) => Some(vec![document]),
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                Value::Object(document) => Some(document),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}
