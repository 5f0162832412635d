use super::types::{
    Bbox, FieldsSpec, NormalizedFilter, QueryPredicate, RawFields, RawFilter, SortSpec,
    TemporalExtent, ValidationError, QUERY_OPERATORS,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use geojson::GeoJson;
use serde_json::Value;
use std::collections::HashMap;

/// Page size applied when the client does not request one.
pub const DEFAULT_LIMIT: usize = 10;
/// First page.
pub const DEFAULT_PAGE: usize = 1;

/// Validates a raw client filter into its canonical form.
///
/// Pure function of its input; the first offending parameter aborts
/// normalization with a [`ValidationError`].
pub fn normalize(raw: RawFilter) -> Result<NormalizedFilter, ValidationError> {
    let limit = extract_positive(raw.limit, DEFAULT_LIMIT, ValidationError::InvalidLimit)?;
    let page = extract_positive(raw.page, DEFAULT_PAGE, ValidationError::InvalidPage)?;

    Ok(NormalizedFilter {
        collections: raw.collections,
        ids: raw.ids,
        bbox: extract_bbox(raw.bbox.as_ref())?,
        intersects: extract_intersects(raw.intersects.as_ref())?,
        datetime: extract_datetime(raw.datetime.as_deref())?,
        query: extract_query(raw.query)?,
        sort: extract_sort(raw.sort.as_ref())?,
        fields: extract_fields(raw.fields),
        limit,
        page,
    })
}

/// Parses the `intersects` parameter into a single GeoJSON geometry.
///
/// A bare `Geometry` is taken as-is and a `Feature` contributes its geometry.
/// A `FeatureCollection` is rejected: only one spatial shape may scope a
/// search.
pub fn extract_intersects(
    value: Option<&Value>,
) -> Result<Option<geojson::Geometry>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let geojson = GeoJson::from_json_value(value.clone())
        .map_err(|err| ValidationError::InvalidGeoJson(err.to_string()))?;

    match geojson {
        GeoJson::FeatureCollection(_) => Err(ValidationError::IntersectsFeatureCollection),
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or(ValidationError::FeatureWithoutGeometry)
            .map(Some),
        GeoJson::Geometry(geometry) => Ok(Some(geometry)),
    }
}

/// Parses `bbox` into 4 or 6 numeric ordinates.
pub fn extract_bbox(value: Option<&Value>) -> Result<Option<Bbox>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let Value::Array(members) = value else {
        return Err(ValidationError::BboxNotNumeric);
    };
    if members.len() != 4 && members.len() != 6 {
        return Err(ValidationError::BboxArity(members.len()));
    }

    let ordinates = members
        .iter()
        .map(|member| member.as_f64().ok_or(ValidationError::BboxNotNumeric))
        .collect::<Result<Vec<f64>, ValidationError>>()?;

    Ok(Some(Bbox(ordinates)))
}

/// Parses the `datetime` parameter: a single instant, a single date, or a
/// `start/end` interval where either side may be open (`..` or empty).
pub fn extract_datetime(value: Option<&str>) -> Result<Option<TemporalExtent>, ValidationError> {
    let Some(text) = value else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let extent = match text.split_once('/') {
        Some((lhs, rhs)) => TemporalExtent {
            start: parse_interval_side(lhs, false)?,
            end: parse_interval_side(rhs, true)?,
        },
        None => TemporalExtent {
            start: Some(parse_instant(text, false)?),
            end: Some(parse_instant(text, true)?),
        },
    };

    if let (Some(start), Some(end)) = (extent.start, extent.end) {
        if start > end {
            return Err(ValidationError::DatetimeInverted);
        }
    }

    Ok(Some(extent))
}

fn parse_interval_side(
    text: &str,
    closing: bool,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let text = text.trim();
    if text.is_empty() || text == ".." {
        return Ok(None);
    }
    parse_instant(text, closing).map(Some)
}

/// A date without a time component spans its whole day: midnight when it
/// opens an interval, one second before the next midnight when it closes one.
fn parse_instant(text: &str, closing: bool) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        return Ok(if closing {
            midnight + Duration::days(1) - Duration::seconds(1)
        } else {
            midnight
        });
    }

    Err(ValidationError::InvalidDatetime(text.to_string()))
}

/// Checks that every attribute predicate is an operator object over known
/// operator names. Operand values are not interpreted here.
pub fn extract_query(
    raw: HashMap<String, Value>,
) -> Result<HashMap<String, QueryPredicate>, ValidationError> {
    let mut query = HashMap::with_capacity(raw.len());

    for (property, predicate) in raw {
        let Value::Object(operators) = predicate else {
            return Err(ValidationError::QueryNotAnObject { property });
        };
        if let Some(unknown) = operators
            .keys()
            .find(|name| !QUERY_OPERATORS.contains(&name.as_str()))
        {
            return Err(ValidationError::UnknownQueryOperator {
                operator: unknown.clone(),
                property,
            });
        }
        query.insert(property, operators);
    }

    Ok(query)
}

/// Parses `sort`, accepting both the structured sequence form and its JSON
/// string encoding. The string form exists because the same filter may arrive
/// through a URL query string rather than a request body.
pub fn extract_sort(value: Option<&Value>) -> Result<Vec<SortSpec>, ValidationError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    match value {
        Value::String(encoded) => {
            serde_json::from_str(encoded).map_err(|err| ValidationError::InvalidSort(err.to_string()))
        }
        structured => serde_json::from_value(structured.clone())
            .map_err(|err| ValidationError::InvalidSort(err.to_string())),
    }
}

fn extract_fields(raw: Option<RawFields>) -> FieldsSpec {
    let Some(raw) = raw else {
        return FieldsSpec::default();
    };
    FieldsSpec {
        include: raw.include.unwrap_or_default(),
        exclude: raw.exclude.unwrap_or_default(),
    }
}

fn extract_positive(
    value: Option<i64>,
    default: usize,
    error: fn(i64) -> ValidationError,
) -> Result<usize, ValidationError> {
    match value {
        None => Ok(default),
        Some(n) if n > 0 => Ok(n as usize),
        Some(n) => Err(error(n)),
    }
}
