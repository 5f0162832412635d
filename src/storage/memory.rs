use crate::filter::types::{Bbox, QueryPredicate, SortDirection, SortSpec, TemporalExtent};
use crate::ingest::pipeline::{
    DocumentTransform, IndexRecord, IngestError, IngestStream, RecordSink,
};
use crate::search::backend::{BackendError, BackendQuery, DocumentSpace, SearchBackend};
use crate::search::types::{Document, SearchMeta, SearchPage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Concurrent in-memory document index, one map per document space.
pub struct MemoryBackend {
    collections: Arc<DashMap<String, Document>>,
    items: Arc<DashMap<String, Document>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(DashMap::new()),
            items: Arc::new(DashMap::new()),
        }
    }

    /// Builds the transform/sink pair for one ingest pipeline run. The sink
    /// shares the backing maps, so concurrent pipelines write into the same
    /// index.
    pub fn ingest_stream(&self) -> Result<IngestStream, IngestError> {
        Ok(IngestStream {
            transform: Box::new(RouteTransform),
            sink: Box::new(MapSink {
                collections: self.collections.clone(),
                items: self.items.clone(),
                written: 0,
            }),
        })
    }

    pub fn collection(&self, id: &str) -> Option<Document> {
        self.collections.get(id).map(|entry| entry.value().clone())
    }

    /// Looks up one Item, checking that it belongs to the named Collection.
    pub fn item(&self, collection_id: &str, item_id: &str) -> Option<Document> {
        let entry = self.items.get(item_id)?;
        let owner = entry.value().get("collection").and_then(Value::as_str);
        if owner == Some(collection_id) {
            Some(entry.value().clone())
        } else {
            None
        }
    }

    /// All stored Collections, ordered by id.
    pub fn list_collections(&self) -> Vec<Document> {
        let mut collections: Vec<Document> = self
            .collections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        collections.sort_by(|a, b| {
            let left = a.get("id").and_then(Value::as_str).unwrap_or_default();
            let right = b.get("id").and_then(Value::as_str).unwrap_or_default();
            left.cmp(right)
        });
        collections
    }

    pub fn document_counts(&self) -> (usize, usize) {
        (self.collections.len(), self.items.len())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(
        &self,
        query: &BackendQuery,
        space: DocumentSpace,
        page: usize,
        limit: usize,
    ) -> Result<SearchPage, BackendError> {
        if page == 0 || limit == 0 {
            return Err(BackendError::new("page and limit must be positive"));
        }

        let store = match space {
            DocumentSpace::Collections => &self.collections,
            DocumentSpace::Items => &self.items,
        };

        let mut matches: Vec<Document> = store
            .iter()
            .filter(|entry| matches_query(entry.value(), query))
            .map(|entry| entry.value().clone())
            .collect();
        sort_documents(&mut matches, &query.sort);

        let found = matches.len();
        let results: Vec<Document> = matches
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        tracing::debug!(
            "Memory search over {:?}: {} found, {} returned",
            space,
            found,
            results.len()
        );

        Ok(SearchPage {
            meta: SearchMeta {
                limit,
                page,
                found,
                returned: results.len(),
            },
            results,
        })
    }
}

/// Routes a document to its space by shape: Items are GeoJSON Features or
/// carry an owning `collection`; everything else lands in Collections.
struct RouteTransform;

impl DocumentTransform for RouteTransform {
    fn apply(&self, document: Document) -> Result<IndexRecord, IngestError> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| IngestError::Transform("document has no id".to_string()))?
            .to_string();

        let is_item = document.get("type").and_then(Value::as_str) == Some("Feature")
            || document.contains_key("collection");
        let index = if is_item { "items" } else { "collections" };

        Ok(IndexRecord {
            index: index.to_string(),
            id,
            body: document,
        })
    }
}

/// Bulk-write destination over the shared maps.
struct MapSink {
    collections: Arc<DashMap<String, Document>>,
    items: Arc<DashMap<String, Document>>,
    written: usize,
}

#[async_trait]
impl RecordSink for MapSink {
    async fn write(&mut self, record: IndexRecord) -> Result<(), IngestError> {
        let store = match record.index.as_str() {
            "collections" => &self.collections,
            "items" => &self.items,
            other => return Err(IngestError::Sink(format!("unknown index {other:?}"))),
        };
        store.insert(record.id, record.body);
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), IngestError> {
        tracing::debug!("Flushed {} records to the in-memory index", self.written);
        Ok(())
    }
}

fn matches_query(document: &Document, query: &BackendQuery) -> bool {
    if let Some(ids) = &query.ids {
        match document.get("id").and_then(Value::as_str) {
            Some(id) if ids.iter().any(|candidate| candidate == id) => {}
            _ => return false,
        }
    }

    if let Some(parents) = &query.parent_collections {
        match document.get("collection").and_then(Value::as_str) {
            Some(owner) if parents.iter().any(|parent| parent == owner) => {}
            _ => return false,
        }
    }

    if let Some(bbox) = &query.bbox {
        if !bbox_overlaps(document, &bbox.extent_2d()) {
            return false;
        }
    }

    // Geometry intersection is approximated by its bounding box; exact
    // predicate evaluation belongs to a real spatial index.
    if let Some(geometry) = &query.intersects {
        match geometry_extent(geometry) {
            Some(extent) if bbox_overlaps(document, &extent) => {}
            _ => return false,
        }
    }

    if let Some(window) = &query.datetime {
        if !within_window(document, window) {
            return false;
        }
    }

    query
        .query
        .iter()
        .all(|(property, predicate)| satisfies_predicate(document, property, predicate))
}

fn bbox_overlaps(document: &Document, window: &[f64; 4]) -> bool {
    let Some(Value::Array(members)) = document.get("bbox") else {
        return false;
    };
    let ordinates: Vec<f64> = members.iter().filter_map(Value::as_f64).collect();
    if ordinates.len() != members.len() || (ordinates.len() != 4 && ordinates.len() != 6) {
        return false;
    }

    let own = Bbox(ordinates).extent_2d();
    own[0] <= window[2] && window[0] <= own[2] && own[1] <= window[3] && window[1] <= own[3]
}

/// Bounding box of an arbitrary GeoJSON geometry, from its positions.
fn geometry_extent(geometry: &geojson::Geometry) -> Option<[f64; 4]> {
    let mut extent: Option<[f64; 4]> = None;
    collect_extent(&geometry.value, &mut extent);
    extent
}

fn collect_extent(value: &geojson::Value, extent: &mut Option<[f64; 4]>) {
    use geojson::Value as Geo;

    match value {
        Geo::Point(position) => merge_position(position, extent),
        Geo::MultiPoint(positions) | Geo::LineString(positions) => {
            positions.iter().for_each(|p| merge_position(p, extent));
        }
        Geo::MultiLineString(lines) | Geo::Polygon(lines) => {
            lines
                .iter()
                .flatten()
                .for_each(|p| merge_position(p, extent));
        }
        Geo::MultiPolygon(polygons) => {
            polygons
                .iter()
                .flatten()
                .flatten()
                .for_each(|p| merge_position(p, extent));
        }
        Geo::GeometryCollection(members) => {
            members
                .iter()
                .for_each(|geometry| collect_extent(&geometry.value, extent));
        }
    }
}

fn merge_position(position: &[f64], extent: &mut Option<[f64; 4]>) {
    let (Some(&x), Some(&y)) = (position.first(), position.get(1)) else {
        return;
    };
    let merged = match *extent {
        None => [x, y, x, y],
        Some([min_x, min_y, max_x, max_y]) => {
            [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
        }
    };
    *extent = Some(merged);
}

fn within_window(document: &Document, window: &TemporalExtent) -> bool {
    let Some(value) = lookup(document, "properties.datetime") else {
        return false;
    };
    let Some(text) = value.as_str() else {
        return false;
    };
    let Ok(instant) = DateTime::parse_from_rfc3339(text) else {
        return false;
    };
    let instant = instant.with_timezone(&Utc);

    if let Some(start) = window.start {
        if instant < start {
            return false;
        }
    }
    if let Some(end) = window.end {
        if instant > end {
            return false;
        }
    }
    true
}

fn satisfies_predicate(document: &Document, property: &str, predicate: &QueryPredicate) -> bool {
    let Some(actual) = lookup_property(document, property) else {
        return false;
    };
    predicate
        .iter()
        .all(|(operator, operand)| apply_operator(operator, operand, actual))
}

fn apply_operator(operator: &str, operand: &Value, actual: &Value) -> bool {
    match operator {
        "eq" => actual == operand,
        "neq" => actual != operand,
        "gt" => compare_values(actual, operand) == Some(Ordering::Greater),
        "gte" => matches!(
            compare_values(actual, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "lt" => compare_values(actual, operand) == Some(Ordering::Less),
        "lte" => matches!(
            compare_values(actual, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        "in" => operand
            .as_array()
            .map(|candidates| candidates.contains(actual))
            .unwrap_or(false),
        "startsWith" => {
            string_pair(actual, operand).map_or(false, |(value, prefix)| value.starts_with(prefix))
        }
        "endsWith" => {
            string_pair(actual, operand).map_or(false, |(value, suffix)| value.ends_with(suffix))
        }
        "contains" => {
            string_pair(actual, operand).map_or(false, |(value, needle)| value.contains(needle))
        }
        // Unknown operators are rejected during normalization.
        _ => false,
    }
}

fn string_pair<'a>(a: &'a Value, b: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((a.as_str()?, b.as_str()?))
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(left), Value::Number(right)) => {
            left.as_f64().partial_cmp(&right.as_f64())
        }
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        _ => None,
    }
}

fn sort_documents(documents: &mut [Document], specs: &[SortSpec]) {
    if specs.is_empty() {
        // Newest first is the catalog's default ordering.
        documents.sort_by(|a, b| compare_field(b, a, "properties.datetime"));
        return;
    }

    documents.sort_by(|a, b| {
        for spec in specs {
            let ordering = match spec.direction {
                SortDirection::Asc => compare_field(a, b, &spec.field),
                SortDirection::Desc => compare_field(b, a, &spec.field),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    match (lookup_property(a, field), lookup_property(b, field)) {
        (Some(left), Some(right)) => compare_values(left, right).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Resolves an attribute name the way query predicates address documents:
/// a dotted name is a full path from the document root, a bare name is tried
/// under `properties` first and at the root second.
fn lookup_property<'a>(document: &'a Document, property: &str) -> Option<&'a Value> {
    if property.contains('.') {
        return lookup(document, property);
    }
    lookup(document, &format!("properties.{property}")).or_else(|| document.get(property))
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => document.get(path),
        Some((head, rest)) => match document.get(head)? {
            Value::Object(child) => lookup(child, rest),
            _ => None,
        },
    }
}
