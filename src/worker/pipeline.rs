use crate::config::WorkerConfig;
use crate::dedupe::Cache;
use crate::index;
use crate::models::{NewsDocument, RawNews};
use crate::processing;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Word budget for titles synthesized from the message body.
const TITLE_MAX_WORDS: usize = 10;

/// The narrow indexing capability the worker consumes. The real
/// Elasticsearch client and test doubles both satisfy it.
#[async_trait]
pub trait NewsIndexer: Send + Sync {
    async fn index_news(&self, doc: &NewsDocument) -> Result<()>;
}

#[async_trait]
impl NewsIndexer for index::client::Client {
    async fn index_news(&self, doc: &NewsDocument) -> Result<()> {
        index::client::Client::index_news(self, doc).await
    }
}

/// Transforms one raw message into a canonical document and indexes it.
///
/// Returns an error for poison input (undecodable JSON, empty payload) and
/// for index failures; the caller decides whether that routes to the DLQ.
/// Duplicates inside the dedupe window are dropped silently.
pub async fn process_message<I>(
    indexer: &I,
    cache: &Cache,
    cfg: &WorkerConfig,
    payload: &[u8],
) -> Result<()>
where
    I: NewsIndexer + ?Sized,
{
    let raw: RawNews = serde_json::from_slice(payload).context("decode raw news")?;

    let mut title = raw.title.trim().to_string();
    let text = raw.text.trim().to_string();
    let urls = processing::extract_urls(&text);

    if title.is_empty() && text.is_empty() {
        bail!("empty payload");
    }

    if title.is_empty() {
        title = processing::generate_title_from_text(&text, TITLE_MAX_WORDS);
    }

    let ts = parse_timestamp(&raw.timestamp).unwrap_or_else(Utc::now);

    // Keywords come from the cleaned text; the stored text keeps its
    // original punctuation and URLs for display.
    let cleaned_text = processing::clean_text(&text);
    let keywords = processing::extract_keywords(
        &format!("{} {}", title, cleaned_text),
        cfg.keyword_limit,
        cfg.keyword_min_length,
    );

    let mut source = raw.source.trim().to_string();
    if source.is_empty() {
        source = "unknown".to_string();
    }

    let mut id = processing::build_document_id(&title, &cleaned_text, ts);
    if id.is_empty() {
        id = uuid::Uuid::new_v4().to_string();
    }

    let doc = NewsDocument {
        id,
        title,
        text,
        timestamp: ts,
        keywords,
        source,
        urls,
    };

    if cache.is_seen(&doc.id) {
        tracing::debug!("duplicate news {}", doc.id);
        return Ok(());
    }

    indexer.index_news(&doc).await?;

    cache.mark_seen(&doc.id);
    tracing::info!("indexed news {} ({})", doc.id, doc.title);
    Ok(())
}

/// Parses RFC3339 (with or without fractional seconds) or the legacy
/// `YYYY-MM-DD HH:MM:SS` form, normalized to UTC. Returns `None` for empty
/// or unparseable input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    None
}
