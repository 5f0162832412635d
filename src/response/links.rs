//! Navigation Links & Response Assembly
//!
//! All hrefs are anchored at the endpoint base supplied by the caller, never at
//! a configured absolute host, so the same engine can sit behind any gateway.

use crate::filter::types::NormalizedFilter;
use crate::search::types::{Document, Link, SearchMeta, SearchResponse};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const MEDIA_GEOJSON: &str = "application/geo+json";
pub const MEDIA_JSON: &str = "application/json";
pub const MEDIA_OPENAPI: &str = "application/vnd.oai.openapi";

/// Navigation links for one Item document, computed from its identifier and
/// owning collection. Documents missing either field still get a root link.
pub fn item_links(document: &Document, endpoint: &str) -> Vec<Link> {
    let id = document.get("id").and_then(Value::as_str);
    let collection = document.get("collection").and_then(Value::as_str);

    let mut links = Vec::with_capacity(4);
    if let (Some(id), Some(collection)) = (id, collection) {
        links.push(Link::new(
            "self",
            format!("{endpoint}/collections/{collection}/items/{id}"),
            MEDIA_GEOJSON,
        ));
        links.push(Link::new(
            "parent",
            format!("{endpoint}/collections/{collection}"),
            MEDIA_JSON,
        ));
        links.push(Link::new(
            "collection",
            format!("{endpoint}/collections/{collection}"),
            MEDIA_JSON,
        ));
    }
    links.push(Link::new("root", endpoint, MEDIA_JSON));
    links
}

/// Links as the JSON array stored on a projected document.
pub fn links_json(links: &[Link]) -> Value {
    Value::Array(
        links
            .iter()
            .map(|link| {
                json!({
                    "rel": link.rel,
                    "href": link.href,
                    "type": link.media_type,
                })
            })
            .collect(),
    )
}

/// Landing-page links for the catalog root.
pub fn root_links(endpoint: &str) -> Vec<Link> {
    vec![
        Link::new("self", endpoint, MEDIA_JSON),
        Link::new("root", endpoint, MEDIA_JSON),
        Link::new("conformance", format!("{endpoint}/conformance"), MEDIA_JSON),
        Link::new("data", format!("{endpoint}/collections"), MEDIA_JSON),
        Link::new("search", format!("{endpoint}/search"), MEDIA_GEOJSON),
        Link::new("service-desc", format!("{endpoint}/api"), MEDIA_OPENAPI),
    ]
}

/// Wraps one result page into the response envelope.
///
/// Emits `self` and `root` links always, and a `next` link only when the page
/// is full and more results exist beyond it. The metadata is taken as-is.
pub fn build_response(
    features: Vec<Document>,
    meta: SearchMeta,
    endpoint: &str,
    filter: &NormalizedFilter,
) -> SearchResponse {
    let mut links = vec![
        Link::new("self", search_href(endpoint, filter, &meta, meta.page), MEDIA_GEOJSON),
        Link::new("root", endpoint, MEDIA_JSON),
    ];

    if meta.returned == meta.limit && meta.found > meta.page * meta.limit {
        links.push(Link::new(
            "next",
            search_href(endpoint, filter, &meta, meta.page + 1),
            MEDIA_GEOJSON,
        ));
    }

    SearchResponse::new(features, links, meta)
}

/// Reconstructs the issuing request as a GET search URL, with the given page.
/// Parameters appear in a fixed order and map keys are sorted, so equal filters
/// always produce the same href.
fn search_href(
    endpoint: &str,
    filter: &NormalizedFilter,
    meta: &SearchMeta,
    page: usize,
) -> String {
    let mut params: Vec<String> = Vec::new();

    if let Some(collections) = &filter.collections {
        push_param(&mut params, "collections", collections.join(","));
    }
    if let Some(ids) = &filter.ids {
        push_param(&mut params, "ids", ids.join(","));
    }
    if let Some(bbox) = &filter.bbox {
        let ordinates: Vec<String> = bbox.0.iter().map(f64::to_string).collect();
        push_param(&mut params, "bbox", ordinates.join(","));
    }
    if let Some(geometry) = &filter.intersects {
        push_param(
            &mut params,
            "intersects",
            serde_json::to_string(geometry).unwrap_or_default(),
        );
    }
    if let Some(datetime) = &filter.datetime {
        push_param(&mut params, "datetime", datetime.to_interval_string());
    }
    if !filter.query.is_empty() {
        let ordered: BTreeMap<&String, _> = filter.query.iter().collect();
        push_param(
            &mut params,
            "query",
            serde_json::to_string(&ordered).unwrap_or_default(),
        );
    }
    if !filter.sort.is_empty() {
        push_param(
            &mut params,
            "sort",
            serde_json::to_string(&filter.sort).unwrap_or_default(),
        );
    }
    if !filter.fields.is_empty() {
        push_param(
            &mut params,
            "fields",
            serde_json::to_string(&filter.fields).unwrap_or_default(),
        );
    }
    push_param(&mut params, "limit", meta.limit.to_string());
    push_param(&mut params, "page", page.to_string());

    format!("{endpoint}/search?{}", params.join("&"))
}

fn push_param(params: &mut Vec<String>, key: &str, value: String) {
    params.push(format!("{key}={}", urlencoding::encode(&value)));
}
