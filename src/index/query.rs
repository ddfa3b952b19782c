use super::types::SearchParams;
use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

pub(crate) const DEFAULT_SIZE: usize = 20;
pub(crate) const MAX_SIZE: usize = 200;

/// Compiles search parameters into the request body for `_search`.
///
/// Builds a bool query with a weighted multi-match clause for the phrase and
/// filter clauses for keywords, source and the timestamp window. When no
/// clause applies the body degrades to `match_all`. Page size is clamped to
/// `[1, 200]` with a default of 20.
pub fn build_search_body(params: &SearchParams) -> Value {
    let size = if params.size == 0 {
        DEFAULT_SIZE
    } else {
        params.size.min(MAX_SIZE)
    };

    let mut must: Vec<Value> = Vec::new();
    let mut filters: Vec<Value> = Vec::new();

    if !params.query.is_empty() {
        must.push(json!({
            "multi_match": {
                "query": params.query,
                "fields": ["title^2", "text"],
            }
        }));
    }

    if !params.keywords.is_empty() {
        filters.push(json!({
            "terms": {
                "keywords": params.keywords,
            }
        }));
    }

    if !params.source.is_empty() {
        filters.push(json!({
            "term": {
                "source": params.source,
            }
        }));
    }

    if params.start.is_some() || params.end.is_some() {
        let mut range = Map::new();
        if let Some(start) = params.start {
            range.insert(
                "gte".to_string(),
                Value::String(start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        if let Some(end) = params.end {
            range.insert(
                "lte".to_string(),
                Value::String(end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        filters.push(json!({
            "range": {
                "timestamp": range,
            }
        }));
    }

    let mut bool_query = Map::new();
    if !must.is_empty() {
        bool_query.insert("must".to_string(), Value::Array(must));
    }
    if !filters.is_empty() {
        bool_query.insert("filter".to_string(), Value::Array(filters));
    }
    if bool_query.is_empty() {
        bool_query.insert("must".to_string(), json!([{ "match_all": {} }]));
    }

    let (field, order) = parse_sort(&params.sort);
    let mut sort_spec = Map::new();
    sort_spec.insert(field, json!({ "order": order }));

    json!({
        "from": params.from,
        "size": size,
        "track_total_hits": true,
        "query": { "bool": bool_query },
        "sort": [Value::Object(sort_spec)],
    })
}

/// Body for `_delete_by_query`: everything at or before the cutoff.
pub fn build_delete_body(cutoff: &str) -> Value {
    json!({
        "query": {
            "range": {
                "timestamp": {
                    "lte": cutoff,
                }
            }
        }
    })
}

/// Splits a `field:direction` sort spec, defaulting to `timestamp:desc`.
pub fn parse_sort(raw: &str) -> (String, String) {
    let raw = if raw.is_empty() { "timestamp:desc" } else { raw };

    let mut parts = raw.splitn(2, ':');
    let mut field = parts.next().unwrap_or_default();
    if field.is_empty() {
        field = "timestamp";
    }

    let order = match parts.next() {
        Some(dir) if !dir.is_empty() => dir,
        _ => "desc",
    };

    (field.to_string(), order.to_string())
}
