use crate::models::NewsDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Narrows the search endpoint query.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub keywords: Vec<String>,
    pub source: String,
    pub from: usize,
    pub size: usize,
    pub sort: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Bundles hits and total count.
///
/// The capitalized JSON field names are a wire contract; the front-end
/// reads `Total` and `Items` as-is.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
    pub total: i64,
    pub items: Vec<NewsDocument>,
}
