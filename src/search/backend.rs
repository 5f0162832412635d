//! Backend Search Boundary
//!
//! The contract this engine consumes from the document search service. The backend
//! owns all persistence and is the source of truth for match counts; this engine
//! only issues queries and never retries a failed call.

use super::types::SearchPage;
use crate::filter::types::{Bbox, QueryPredicate, SortSpec, TemporalExtent};
use async_trait::async_trait;
use geojson::Geometry;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Which document space a backend call searches. The Collection phase and the
/// Item phase of one client query address different spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSpace {
    Collections,
    Items,
}

/// The filter handed to one backend `search` call.
///
/// Shaped like a [`NormalizedFilter`](crate::filter::types::NormalizedFilter)
/// with one addition: `parent_collections`, the internal field the orchestrator
/// injects to scope an Item search to the Collections resolved in phase one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_collections: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Bbox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersects: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<TemporalExtent>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, QueryPredicate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
}

/// A failure reported by the search or write collaborator.
///
/// Propagated unchanged to the caller; treated as a server/upstream failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The document search service consumed by the orchestrator.
///
/// `search` returns one page of matching documents plus paging metadata.
/// Connection pooling, timeouts, and retry policy all live behind this trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &BackendQuery,
        space: DocumentSpace,
        page: usize,
        limit: usize,
    ) -> Result<SearchPage, BackendError>;
}
