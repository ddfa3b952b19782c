use super::types::{ErrorResponse, HealthResponse};
use crate::config::ApiConfig;
use crate::index::client::Client;
use crate::index::types::SearchParams;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_FROM: usize = 10_000;

/// Shared state for every request handler.
pub struct AppState {
    pub cfg: ApiConfig,
    pub es: Client,
}

/// Raw query parameters of the `/news` endpoint. Everything arrives as an
/// optional string; malformed values fall back instead of rejecting the
/// request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub keywords: Option<String>,
    pub source: Option<String>,
    pub from: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

pub async fn handle_health(Extension(state): Extension<Arc<AppState>>) -> Response {
    match tokio::time::timeout(HEALTH_TIMEOUT, state.es.health()).await {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        )
            .into_response(),
        Ok(Err(err)) => error_response(StatusCode::SERVICE_UNAVAILABLE, &format!("{err:#}")),
        Err(_) => error_response(StatusCode::SERVICE_UNAVAILABLE, "health check timed out"),
    }
}

pub async fn handle_search(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let params = build_params(&query, &state.cfg);

    match tokio::time::timeout(SEARCH_TIMEOUT, state.es.search_news(&params)).await {
        Ok(Ok(result)) => (StatusCode::OK, Json(result)).into_response(),
        Ok(Err(err)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{err:#}")),
        Err(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "search timed out"),
    }
}

/// Translates raw query strings into clamped search parameters.
pub(crate) fn build_params(query: &SearchQuery, cfg: &ApiConfig) -> SearchParams {
    SearchParams {
        query: query.q.as_deref().unwrap_or("").trim().to_string(),
        keywords: parse_csv(query.keywords.as_deref().unwrap_or("")),
        source: query.source.as_deref().unwrap_or("").trim().to_string(),
        from: clamp_param(query.from.as_deref(), 0, MAX_FROM),
        size: clamp_param(query.size.as_deref(), cfg.default_page, cfg.max_page),
        sort: query.sort.as_deref().unwrap_or("").trim().to_string(),
        start: parse_time(query.start.as_deref()),
        end: parse_time(query.end.as_deref()),
    }
}

/// Falls back for empty, unparseable or non-positive input; caps at `max`.
pub(crate) fn clamp_param(raw: Option<&str>, fallback: usize, max: usize) -> usize {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return fallback,
    };

    match raw.parse::<i64>() {
        Ok(value) if value > 0 => (value as usize).min(max),
        _ => fallback,
    }
}

pub(crate) fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
