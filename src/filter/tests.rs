//! Filter Normalization Tests
//!
//! Validates parsing and rejection behavior for every client-facing filter
//! parameter: spatial, temporal, attribute, sort, projection, and paging.

#[cfg(test)]
mod tests {
    use crate::filter::normalize::{
        extract_bbox, extract_datetime, extract_intersects, extract_sort, normalize,
        DEFAULT_LIMIT, DEFAULT_PAGE,
    };
    use crate::filter::types::{RawFilter, SortDirection, ValidationError};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    // ============================================================
    // INTERSECTS
    // ============================================================

    #[test]
    fn test_intersects_absent() {
        let geometry = extract_intersects(None).unwrap();
        assert!(geometry.is_none(), "No intersects parameter yields None");
    }

    #[test]
    fn test_intersects_invalid_geojson() {
        let value = json!({});
        let result = extract_intersects(Some(&value));
        assert!(matches!(result, Err(ValidationError::InvalidGeoJson(_))));
    }

    #[test]
    fn test_intersects_rejects_feature_collection() {
        let value = json!({ "type": "FeatureCollection", "features": [] });
        let result = extract_intersects(Some(&value));
        assert!(matches!(
            result,
            Err(ValidationError::IntersectsFeatureCollection)
        ));
    }

    #[test]
    fn test_intersects_accepts_geometry() {
        let value = json!({ "type": "Point", "coordinates": [-77.0, 38.9] });
        let geometry = extract_intersects(Some(&value)).unwrap().unwrap();
        assert_eq!(
            geometry.value,
            geojson::Value::Point(vec![-77.0, 38.9])
        );
    }

    #[test]
    fn test_intersects_unwraps_feature_geometry() {
        let value = json!({
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }
        });
        let geometry = extract_intersects(Some(&value)).unwrap().unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![1.0, 2.0]));
    }

    #[test]
    fn test_intersects_feature_without_geometry() {
        let value = json!({ "type": "Feature", "properties": {}, "geometry": null });
        let result = extract_intersects(Some(&value));
        assert!(matches!(
            result,
            Err(ValidationError::FeatureWithoutGeometry)
        ));
    }

    // ============================================================
    // BBOX
    // ============================================================

    #[test]
    fn test_bbox_four_ordinates() {
        let value = json!([-180.0, -90.0, 180.0, 90.0]);
        let bbox = extract_bbox(Some(&value)).unwrap().unwrap();
        assert_eq!(bbox.extent_2d(), [-180.0, -90.0, 180.0, 90.0]);
    }

    #[test]
    fn test_bbox_six_ordinates_drops_vertical() {
        let value = json!([-5.0, -5.0, 0.0, 5.0, 5.0, 100.0]);
        let bbox = extract_bbox(Some(&value)).unwrap().unwrap();
        assert_eq!(bbox.extent_2d(), [-5.0, -5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_bbox_wrong_arity() {
        let value = json!([1.0, 2.0, 3.0]);
        let result = extract_bbox(Some(&value));
        assert!(matches!(result, Err(ValidationError::BboxArity(3))));
    }

    #[test]
    fn test_bbox_non_numeric_member() {
        let value = json!([1.0, "two", 3.0, 4.0]);
        let result = extract_bbox(Some(&value));
        assert!(matches!(result, Err(ValidationError::BboxNotNumeric)));
    }

    #[test]
    fn test_bbox_not_an_array() {
        let value = json!("[-180,-90,180,90]");
        let result = extract_bbox(Some(&value));
        assert!(matches!(result, Err(ValidationError::BboxNotNumeric)));
    }

    // ============================================================
    // DATETIME
    // ============================================================

    #[test]
    fn test_datetime_single_instant() {
        let extent = extract_datetime(Some("2015-02-19T12:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(extent.start, extent.end);
        assert!(extent.start.is_some());
    }

    #[test]
    fn test_datetime_single_date_spans_day() {
        let extent = extract_datetime(Some("2015-02-19")).unwrap().unwrap();
        let start = extent.start.unwrap();
        let end = extent.end.unwrap();
        assert!(start < end, "A bare date covers its whole day");
        assert_eq!(start.to_rfc3339(), "2015-02-19T00:00:00+00:00");
    }

    #[test]
    fn test_datetime_interval() {
        let extent = extract_datetime(Some("2015-02-19/2015-02-20"))
            .unwrap()
            .unwrap();
        assert!(extent.start.unwrap() < extent.end.unwrap());
    }

    #[test]
    fn test_datetime_open_start() {
        let extent = extract_datetime(Some("../2015-02-20")).unwrap().unwrap();
        assert!(extent.start.is_none());
        assert!(extent.end.is_some());
    }

    #[test]
    fn test_datetime_open_end() {
        let extent = extract_datetime(Some("2015-02-19/..")).unwrap().unwrap();
        assert!(extent.start.is_some());
        assert!(extent.end.is_none());
    }

    #[test]
    fn test_datetime_inverted_interval() {
        let result = extract_datetime(Some("2020-01-01/2015-01-01"));
        assert!(matches!(result, Err(ValidationError::DatetimeInverted)));
    }

    #[test]
    fn test_datetime_garbage() {
        let result = extract_datetime(Some("last tuesday"));
        assert!(matches!(result, Err(ValidationError::InvalidDatetime(_))));
    }

    #[test]
    fn test_datetime_absent_or_blank() {
        assert!(extract_datetime(None).unwrap().is_none());
        assert!(extract_datetime(Some("  ")).unwrap().is_none());
    }

    // ============================================================
    // SORT
    // ============================================================

    #[test]
    fn test_sort_structured_sequence() {
        let value = json!([{ "field": "eo:cloud_cover", "direction": "desc" }]);
        let sort = extract_sort(Some(&value)).unwrap();
        assert_eq!(sort.len(), 1);
        assert_eq!(sort[0].field, "eo:cloud_cover");
        assert_eq!(sort[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_json_string_form() {
        // The same parameter arriving through a URL query string.
        let value = Value::String(
            r#"[{ "field": "eo:cloud_cover", "direction": "desc" }]"#.to_string(),
        );
        let sort = extract_sort(Some(&value)).unwrap();
        assert_eq!(sort.len(), 1);
        assert_eq!(sort[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_unparsable_string() {
        let value = Value::String("cloud_cover desc".to_string());
        let result = extract_sort(Some(&value));
        assert!(matches!(result, Err(ValidationError::InvalidSort(_))));
    }

    #[test]
    fn test_sort_unknown_direction() {
        let value = json!([{ "field": "datetime", "direction": "sideways" }]);
        let result = extract_sort(Some(&value));
        assert!(matches!(result, Err(ValidationError::InvalidSort(_))));
    }

    #[test]
    fn test_sort_absent() {
        assert!(extract_sort(None).unwrap().is_empty());
    }

    // ============================================================
    // QUERY PREDICATES
    // ============================================================

    #[test]
    fn test_query_operators_pass_through() {
        let raw = RawFilter {
            query: HashMap::from([
                ("platform".to_string(), json!({ "eq": "landsat-8" })),
                ("landsat:wrs_path".to_string(), json!({ "in": ["10"] })),
            ]),
            ..RawFilter::default()
        };
        let filter = normalize(raw).unwrap();
        assert_eq!(filter.query.len(), 2);
        assert_eq!(filter.query["platform"]["eq"], json!("landsat-8"));
    }

    #[test]
    fn test_query_predicate_must_be_object() {
        let raw = RawFilter {
            query: HashMap::from([("platform".to_string(), json!("landsat-8"))]),
            ..RawFilter::default()
        };
        let result = normalize(raw);
        assert!(matches!(
            result,
            Err(ValidationError::QueryNotAnObject { .. })
        ));
    }

    #[test]
    fn test_query_unknown_operator() {
        let raw = RawFilter {
            query: HashMap::from([("platform".to_string(), json!({ "regex": ".*" }))]),
            ..RawFilter::default()
        };
        let result = normalize(raw);
        assert!(matches!(
            result,
            Err(ValidationError::UnknownQueryOperator { .. })
        ));
    }

    // ============================================================
    // PAGING
    // ============================================================

    #[test]
    fn test_paging_defaults() {
        let filter = normalize(RawFilter::default()).unwrap();
        assert_eq!(filter.limit, DEFAULT_LIMIT);
        assert_eq!(filter.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_limit_must_be_positive() {
        let raw = RawFilter {
            limit: Some(0),
            ..RawFilter::default()
        };
        assert!(matches!(
            normalize(raw),
            Err(ValidationError::InvalidLimit(0))
        ));
    }

    #[test]
    fn test_page_must_be_positive() {
        let raw = RawFilter {
            page: Some(-2),
            ..RawFilter::default()
        };
        assert!(matches!(
            normalize(raw),
            Err(ValidationError::InvalidPage(-2))
        ));
    }

    // ============================================================
    // FULL NORMALIZATION
    // ============================================================

    #[test]
    fn test_normalize_full_filter() {
        let raw = RawFilter {
            collections: Some(vec!["landsat-8-l1".to_string()]),
            ids: Some(vec!["LC80100102015050LGN00".to_string()]),
            bbox: Some(json!([-180.0, -90.0, 180.0, 90.0])),
            intersects: Some(json!({ "type": "Point", "coordinates": [0.0, 0.0] })),
            datetime: Some("2015-02-19/2015-02-20".to_string()),
            query: HashMap::from([("platform".to_string(), json!({ "eq": "landsat-8" }))]),
            sort: Some(json!([{ "field": "properties.datetime", "direction": "asc" }])),
            fields: None,
            limit: Some(25),
            page: Some(3),
        };

        let filter = normalize(raw).unwrap();
        assert_eq!(filter.collections.as_deref().unwrap().len(), 1);
        assert!(filter.intersects.is_some());
        assert!(filter.datetime.is_some());
        assert_eq!(filter.limit, 25);
        assert_eq!(filter.page, 3);
        assert!(filter.fields.is_empty());
    }
}
