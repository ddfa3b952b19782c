use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire shape read from the `news_raw` topic. Every field may be absent or
/// empty; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNews {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub source: String,
}

/// Canonical structure stored in Elasticsearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDocument {
    pub id: String,
    pub title: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub keywords: Vec<String>,
    pub source: String,
    pub urls: Vec<String>,
}
