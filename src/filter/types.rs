//! Filter Data Types
//!
//! The raw client-facing filter shape, its validated counterpart, and the
//! validation error taxonomy.

use chrono::{DateTime, Utc};
use geojson::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Client-supplied search filter, one per request.
///
/// Every member is optional and loosely typed; nothing here is trusted until
/// [`normalize`](super::normalize::normalize) has run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilter {
    pub collections: Option<Vec<String>>,
    pub ids: Option<Vec<String>>,
    pub bbox: Option<Value>,
    pub intersects: Option<Value>,
    pub datetime: Option<String>,
    #[serde(default)]
    pub query: HashMap<String, Value>,
    pub sort: Option<Value>,
    pub fields: Option<RawFields>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// Raw include/exclude projection lists as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

/// Validated search filter.
#[derive(Debug, Clone, Default)]
pub struct NormalizedFilter {
    pub collections: Option<Vec<String>>,
    pub ids: Option<Vec<String>>,
    pub bbox: Option<Bbox>,
    /// Single geometry only. A Feature contributes its geometry during
    /// normalization; a FeatureCollection is rejected outright.
    pub intersects: Option<Geometry>,
    pub datetime: Option<TemporalExtent>,
    pub query: HashMap<String, QueryPredicate>,
    pub sort: Vec<SortSpec>,
    pub fields: FieldsSpec,
    pub limit: usize,
    pub page: usize,
}

/// Axis-aligned bounding box, 4 ordinates (2D) or 6 (3D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bbox(pub Vec<f64>);

impl Bbox {
    /// 2D extent as `[min_x, min_y, max_x, max_y]`, dropping the vertical
    /// ordinates of a 3D box.
    pub fn extent_2d(&self) -> [f64; 4] {
        match self.0.len() {
            6 => [self.0[0], self.0[1], self.0[3], self.0[4]],
            _ => [self.0[0], self.0[1], self.0[2], self.0[3]],
        }
    }
}

/// Temporal filter. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TemporalExtent {
    /// Renders the interval back into its `start/end` wire form, with `..`
    /// standing in for an open side.
    pub fn to_interval_string(&self) -> String {
        let side = |value: &Option<DateTime<Utc>>| match value {
            Some(instant) => instant.to_rfc3339(),
            None => "..".to_string(),
        };
        format!("{}/{}", side(&self.start), side(&self.end))
    }
}

/// Attribute predicate for a single property: operator name → operand.
///
/// Structure is validated during normalization; the meaning of each operator
/// is the backend's business.
pub type QueryPredicate = serde_json::Map<String, Value>;

/// Operator names accepted in a [`QueryPredicate`].
pub const QUERY_OPERATORS: [&str; 10] = [
    "eq",
    "neq",
    "gt",
    "gte",
    "lt",
    "lte",
    "in",
    "startsWith",
    "endsWith",
    "contains",
];

/// One sort instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Validated field projection instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldsSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl FieldsSpec {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// A filter that failed validation. Maps to a client-error response.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("intersects is not valid GeoJSON: {0}")]
    InvalidGeoJson(String),
    #[error("intersects may not be a FeatureCollection")]
    IntersectsFeatureCollection,
    #[error("intersects Feature carries no geometry")]
    FeatureWithoutGeometry,
    #[error("bbox must have 4 or 6 ordinates, got {0}")]
    BboxArity(usize),
    #[error("bbox ordinates must be numeric")]
    BboxNotNumeric,
    #[error("invalid datetime filter {0:?}")]
    InvalidDatetime(String),
    #[error("datetime interval starts after it ends")]
    DatetimeInverted,
    #[error("sort must be a sequence of {{field, direction}} objects: {0}")]
    InvalidSort(String),
    #[error("query must be a JSON object of predicates: {0}")]
    InvalidQueryEncoding(String),
    #[error("fields must be an object with include/exclude lists: {0}")]
    InvalidFieldsEncoding(String),
    #[error("query predicate for {property:?} must be an operator object")]
    QueryNotAnObject { property: String },
    #[error("query predicate for {property:?} uses unknown operator {operator:?}")]
    UnknownQueryOperator { property: String, operator: String },
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
    #[error("page must be a positive integer, got {0}")]
    InvalidPage(i64),
}
