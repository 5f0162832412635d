//! Search Response Types
//!
//! The document shape and the response envelope returned to API clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A catalog document as stored by the backend: either a Collection or an Item.
///
/// Kept as a raw JSON object rather than a fixed struct because field projection
/// must address arbitrary nested members, and the catalog item format is owned by
/// the backend index, not by this engine.
pub type Document = serde_json::Map<String, Value>;

/// Paging metadata for one search result page.
///
/// Produced by the backend and used verbatim; `returned` never exceeds `limit`
/// or `found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMeta {
    pub limit: usize,
    pub page: usize,
    pub found: usize,
    pub returned: usize,
}

/// One page of backend results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub meta: SearchMeta,
    pub results: Vec<Document>,
}

impl SearchPage {
    /// An empty page for the given paging window.
    pub fn empty(page: usize, limit: usize) -> Self {
        Self {
            meta: SearchMeta {
                limit,
                page,
                found: 0,
                returned: 0,
            },
            results: Vec::new(),
        }
    }
}

/// A navigation link, always relative to the caller-supplied endpoint base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>, media_type: &str) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            media_type: media_type.to_string(),
        }
    }
}

/// The final search response: a GeoJSON FeatureCollection envelope around the
/// projected documents, plus navigation links and paging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    pub features: Vec<Document>,
    pub links: Vec<Link>,
    pub meta: SearchMeta,
}

impl SearchResponse {
    pub fn new(features: Vec<Document>, links: Vec<Link>, meta: SearchMeta) -> Self {
        Self {
            response_type: "FeatureCollection".to_string(),
            features,
            links,
            meta,
        }
    }
}
