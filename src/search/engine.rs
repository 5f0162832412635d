use super::backend::{BackendError, BackendQuery, DocumentSpace, SearchBackend};
use super::types::{SearchMeta, SearchResponse};
use crate::filter::normalize::normalize;
use crate::filter::types::{NormalizedFilter, RawFilter, ValidationError};
use crate::response::links::{build_response, item_links, links_json};
use crate::response::projector::project_document;
use serde_json::Value;
use thiserror::Error;

/// Limit for the internal Collection-phase call. One oversized page enumerates
/// every matching Collection in a single round trip; the deployment assumption
/// is that Collection cardinality never exceeds this system limit.
pub const COLLECTION_SCAN_LIMIT: usize = 5000;

/// A search request that could not be completed.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Answers one client Item search.
///
/// Normalizes the raw filter, runs the two-phase hierarchical search, then
/// shapes the result page: field projection per the filter's `fields` spec,
/// per-item navigation links, and response-level paging links. The backend's
/// `meta` is passed through verbatim.
pub async fn search_items(
    raw: RawFilter,
    page: usize,
    limit: usize,
    backend: &dyn SearchBackend,
    endpoint: &str,
) -> Result<SearchResponse, SearchError> {
    let filter = normalize(raw)?;

    // Phase 1: which Collections may own matching Items?
    let parent_ids = find_matching_collections(&filter, backend).await?;

    if parent_ids.is_empty() {
        // Empty intersection: nothing can match, so skip the Item phase
        // entirely and synthesize the zero page locally.
        tracing::debug!("No collections satisfy the filter, returning an empty page");
        let meta = SearchMeta {
            limit,
            page,
            found: 0,
            returned: 0,
        };
        return Ok(build_response(Vec::new(), meta, endpoint, &filter));
    }

    // Phase 2: Items scoped to the resolved parents. Must not start before
    // phase 1 completes; its filter depends on that output.
    let item_query = item_phase_query(&filter, parent_ids);
    let item_page = backend
        .search(&item_query, DocumentSpace::Items, page, limit)
        .await?;

    let features = item_page
        .results
        .iter()
        .map(|document| {
            let links = item_links(document, endpoint);
            let mut projected = project_document(document, &filter.fields);
            projected.insert("links".to_string(), links_json(&links));
            projected
        })
        .collect();

    Ok(build_response(features, item_page.meta, endpoint, &filter))
}

/// Collection phase: one backend call restricted to collection-scoped filter
/// fields, issued with `page = 1` and the oversized scan limit so normal
/// pagination semantics never apply to this internal call.
async fn find_matching_collections(
    filter: &NormalizedFilter,
    backend: &dyn SearchBackend,
) -> Result<Vec<String>, BackendError> {
    let query = BackendQuery {
        ids: filter.collections.clone(),
        query: filter.query.clone(),
        ..BackendQuery::default()
    };

    let page = backend
        .search(&query, DocumentSpace::Collections, 1, COLLECTION_SCAN_LIMIT)
        .await?;

    Ok(page
        .results
        .iter()
        .filter_map(|collection| collection.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Item phase filter: the caller's Item-scoped constraints plus the parent
/// Collections resolved in phase one, passed as an explicit argument rather
/// than shared state.
fn item_phase_query(filter: &NormalizedFilter, parent_ids: Vec<String>) -> BackendQuery {
    BackendQuery {
        ids: filter.ids.clone(),
        parent_collections: Some(parent_ids),
        bbox: filter.bbox.clone(),
        intersects: filter.intersects.clone(),
        datetime: filter.datetime,
        query: filter.query.clone(),
        sort: filter.sort.clone(),
    }
}
