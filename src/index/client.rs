use super::query::{build_delete_body, build_search_body};
use super::types::{SearchParams, SearchResult};
use crate::models::NewsDocument;

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_DELETE_BATCH: usize = 1000;

/// Elasticsearch client with helpers tailored to this project.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    total: HitsTotal,
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct HitsTotal {
    value: i64,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: NewsDocument,
}

#[derive(Deserialize)]
struct DeleteResponse {
    deleted: i64,
}

impl Client {
    pub fn new(addr: &str, index: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("create elasticsearch client")?;

        Ok(Self {
            http,
            base_url: addr.trim_end_matches('/').to_string(),
            index: index.to_string(),
        })
    }

    /// Checks if Elasticsearch is available.
    pub async fn ping(&self) -> Result<()> {
        let res = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .context("ping elasticsearch")?;

        if !res.status().is_success() {
            bail!("elasticsearch ping failed: {}", res.status());
        }

        Ok(())
    }

    /// Queries cluster health to ensure connectivity.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/_cluster/health", self.base_url);
        let res = self.http.get(&url).send().await.context("cluster health")?;

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("cluster health bad: {}", body.trim());
        }

        Ok(())
    }

    /// Writes a document into the index under its deterministic id.
    /// Indexing the same id again is an idempotent overwrite.
    pub async fn index_news(&self, doc: &NewsDocument) -> Result<()> {
        let url = format!(
            "{}/{}/_doc/{}?refresh=false",
            self.base_url, self.index, doc.id
        );

        let res = self
            .http
            .put(&url)
            .json(doc)
            .send()
            .await
            .context("index doc")?;

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("index doc failed: {}", body.trim());
        }

        Ok(())
    }

    /// Executes a bool query with optional filters.
    pub async fn search_news(&self, params: &SearchParams) -> Result<SearchResult> {
        let body = build_search_body(params);
        let url = format!("{}/{}/_search", self.base_url, self.index);

        let res = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("search")?;

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("search failed: {}", body.trim());
        }

        let parsed: SearchResponse = res.json().await.context("decode search response")?;

        Ok(SearchResult {
            total: parsed.hits.total.value,
            items: parsed.hits.hits.into_iter().map(|hit| hit.source).collect(),
        })
    }

    /// Removes documents older than `max_age` using batched delete-by-query.
    /// Loops until a round deletes fewer documents than the batch size and
    /// returns the accumulated total.
    pub async fn delete_older_than(&self, max_age: Duration, batch_size: usize) -> Result<i64> {
        let batch = if batch_size == 0 {
            DEFAULT_DELETE_BATCH
        } else {
            batch_size
        };

        let max_age = chrono::Duration::from_std(max_age).context("max age out of range")?;
        let cutoff = (Utc::now() - max_age).to_rfc3339_opts(SecondsFormat::Secs, true);
        let body = build_delete_body(&cutoff);
        let url = format!(
            "{}/{}/_delete_by_query?wait_for_completion=true&conflicts=proceed&scroll_size={}",
            self.base_url, self.index, batch
        );

        let mut total_deleted = 0i64;
        loop {
            let res = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .context("delete by query")?;

            if !res.status().is_success() {
                let body = res.text().await.unwrap_or_default();
                bail!("delete by query failed: {}", body.trim());
            }

            let parsed: DeleteResponse = res.json().await.context("decode delete response")?;
            total_deleted += parsed.deleted;

            if parsed.deleted < batch as i64 {
                break;
            }
        }

        Ok(total_deleted)
    }
}
