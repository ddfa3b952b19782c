//! Text-Processing Pipeline
//!
//! Pure, deterministic functions that turn raw news text into the enriched
//! fields of the canonical document: extracted URLs, cleaned text, ranked
//! keywords, a synthesized title and a stable document id.
//!
//! Cleaning is Unicode-aware: letters and digits are recognized across
//! scripts, so Cyrillic input is handled the same way as Latin.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha1::{Digest, Sha1};
use std::collections::{HashMap, HashSet};


static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "и", "в", "на", "с", "по", "к", "что", "как", "это", "из", "от", "до", "a", "an", "the",
        "to", "in", "for",
    ]
    .into_iter()
    .collect()
});

/// Extracts all HTTP(S) URLs from the input text, de-duplicated while
/// preserving first-occurrence order.
pub fn extract_urls(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for m in URL_RE.find_iter(input) {
        if seen.insert(m.as_str()) {
            urls.push(m.as_str().to_string());
        }
    }
    urls
}

/// Replaces every URL with a single space so token boundaries survive.
pub fn remove_urls(input: &str) -> String {
    URL_RE.replace_all(input, " ").into_owned()
}

/// Decodes HTML entities, strips URLs and punctuation, squeezes whitespace.
pub fn clean_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let decoded = html_escape::decode_html_entities(input);
    let decoded = remove_urls(&decoded);
    let decoded = PUNCT_RE.replace_all(&decoded, " ");
    let decoded = WS_RE.replace_all(&decoded, " ");
    decoded.trim().to_string()
}

/// Returns the most frequent words that are not stop-words.
///
/// Tokens shorter than `min_len` code points are dropped. The result is
/// ordered by descending count, ties broken by ascending word order, and
/// truncated to `limit` entries (`0` or an over-length limit means "all").
pub fn extract_keywords(text: &str, limit: usize, min_len: usize) -> Vec<String> {
    let clean = clean_text(text).to_lowercase();
    if clean.is_empty() {
        return Vec::new();
    }

    let mut freq: HashMap<String, usize> = HashMap::new();
    for token in clean.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if token.chars().count() < min_len {
            continue;
        }
        if STOPWORDS.contains(token) {
            continue;
        }
        *freq.entry(token.to_string()).or_insert(0) += 1;
    }

    if freq.is_empty() {
        return Vec::new();
    }

    let mut pairs: Vec<(String, usize)> = freq.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let max = if limit == 0 || limit > pairs.len() {
        pairs.len()
    } else {
        limit
    };

    pairs.into_iter().take(max).map(|(word, _)| word).collect()
}

/// Hashes the most stable fields to form a deterministic 40-hex id.
pub fn build_document_id(title: &str, text: &str, ts: DateTime<Utc>) -> String {
    let stamp = ts.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut hasher = Sha1::new();
    hasher.update(title.as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    hasher.update(b"|");
    hasher.update(stamp.as_bytes());
    hex::encode(hasher.finalize())
}

/// Creates a title from the first sentence of `text`, truncated to
/// `max_words` words (`0` means unlimited). Returns an empty string when the
/// text holds no words.
pub fn generate_title_from_text(text: &str, max_words: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let without_urls = remove_urls(text);

    let first_sentence = match without_urls.find(['.', '!', '?']) {
        Some(pos) if pos > 0 => &without_urls[..pos],
        _ => without_urls.as_str(),
    };

    let words: Vec<&str> = first_sentence.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }

    if max_words > 0 && words.len() > max_words {
        return format!("{}...", words[..max_words].join(" "));
    }

    words.join(" ")
}
