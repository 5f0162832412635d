use super::engine::{search_items, SearchError};
use crate::filter::normalize::{DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::filter::types::{RawFields, RawFilter, ValidationError};
use crate::response::links::root_links;
use crate::storage::memory::MemoryBackend;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared API configuration injected into every handler.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base all navigation links are anchored at.
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub description: String,
}

/// Search parameters as they arrive on a GET query string: list members are
/// comma-separated, structured members are JSON-encoded strings.
#[derive(Debug, Default, Deserialize)]
pub struct GetSearchParams {
    pub collections: Option<String>,
    pub ids: Option<String>,
    pub bbox: Option<String>,
    pub intersects: Option<String>,
    pub datetime: Option<String>,
    pub query: Option<String>,
    pub sort: Option<String>,
    pub fields: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

pub async fn handle_root(Extension(config): Extension<ApiConfig>) -> Json<Value> {
    Json(json!({
        "type": "Catalog",
        "id": "catalog-search",
        "description": "Spatiotemporal catalog search API",
        "links": root_links(&config.endpoint),
    }))
}

pub async fn handle_search_post(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Extension(config): Extension<ApiConfig>,
    Json(raw): Json<RawFilter>,
) -> Response {
    run_search(raw, backend, config).await
}

pub async fn handle_search_get(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Extension(config): Extension<ApiConfig>,
    Query(params): Query<GetSearchParams>,
) -> Response {
    match raw_filter_from_query(params) {
        Ok(raw) => run_search(raw, backend, config).await,
        Err(error) => invalid_parameter(error),
    }
}

async fn run_search(raw: RawFilter, backend: Arc<MemoryBackend>, config: ApiConfig) -> Response {
    let page = match positive_or_default(raw.page, DEFAULT_PAGE) {
        Ok(page) => page,
        Err(value) => return invalid_parameter(ValidationError::InvalidPage(value)),
    };
    let limit = match positive_or_default(raw.limit, DEFAULT_LIMIT) {
        Ok(limit) => limit,
        Err(value) => return invalid_parameter(ValidationError::InvalidLimit(value)),
    };

    match search_items(raw, page, limit, backend.as_ref(), &config.endpoint).await {
        Ok(response) => (
            [(header::CONTENT_TYPE, "application/geo+json; charset=utf-8")],
            Json(response),
        )
            .into_response(),
        Err(SearchError::Validation(error)) => invalid_parameter(error),
        Err(SearchError::Backend(error)) => {
            tracing::error!("Backend search failed: {}", error);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiError {
                    code: "UpstreamFailure".to_string(),
                    description: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn handle_list_collections(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Extension(config): Extension<ApiConfig>,
) -> Json<Value> {
    Json(json!({
        "collections": backend.list_collections(),
        "links": [
            { "rel": "self", "href": format!("{}/collections", config.endpoint), "type": "application/json" },
            { "rel": "root", "href": config.endpoint, "type": "application/json" },
        ],
    }))
}

pub async fn handle_get_collection(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Path(collection_id): Path<String>,
) -> Response {
    match backend.collection(&collection_id) {
        Some(collection) => Json(Value::Object(collection)).into_response(),
        None => not_found(format!("Collection {collection_id:?} not found")),
    }
}

pub async fn handle_get_item(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Path((collection_id, item_id)): Path<(String, String)>,
) -> Response {
    match backend.item(&collection_id, &item_id) {
        Some(item) => (
            [(header::CONTENT_TYPE, "application/geo+json; charset=utf-8")],
            Json(Value::Object(item)),
        )
            .into_response(),
        None => not_found(format!(
            "Item {item_id:?} not found in collection {collection_id:?}"
        )),
    }
}

/// Rebuilds a structured filter from its query-string encoding.
fn raw_filter_from_query(params: GetSearchParams) -> Result<RawFilter, ValidationError> {
    let bbox = params
        .bbox
        .map(|text| {
            text.split(',')
                .map(|part| part.trim().parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map(|ordinates| json!(ordinates))
                .map_err(|_| ValidationError::BboxNotNumeric)
        })
        .transpose()?;

    let intersects = params
        .intersects
        .map(|text| {
            serde_json::from_str::<Value>(&text)
                .map_err(|error| ValidationError::InvalidGeoJson(error.to_string()))
        })
        .transpose()?;

    let query = match params.query {
        None => HashMap::new(),
        Some(text) => serde_json::from_str::<HashMap<String, Value>>(&text)
            .map_err(|error| ValidationError::InvalidQueryEncoding(error.to_string()))?,
    };

    let fields = params
        .fields
        .map(|text| {
            serde_json::from_str::<RawFields>(&text)
                .map_err(|error| ValidationError::InvalidFieldsEncoding(error.to_string()))
        })
        .transpose()?;

    Ok(RawFilter {
        collections: params.collections.map(split_csv),
        ids: params.ids.map(split_csv),
        bbox,
        intersects,
        datetime: params.datetime,
        query,
        // Left as a string on purpose: the normalizer accepts both encodings.
        sort: params.sort.map(Value::String),
        fields,
        limit: params.limit,
        page: params.page,
    })
}

fn split_csv(text: String) -> Vec<String> {
    text.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn positive_or_default(value: Option<i64>, default: usize) -> Result<usize, i64> {
    match value {
        None => Ok(default),
        Some(n) if n > 0 => Ok(n as usize),
        Some(n) => Err(n),
    }
}

fn invalid_parameter(error: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            code: "InvalidParameter".to_string(),
            description: error.to_string(),
        }),
    )
        .into_response()
}

fn not_found(description: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            code: "NotFound".to_string(),
            description,
        }),
    )
        .into_response()
}
