//! Configuration Module
//!
//! Environment-driven configuration for the three service binaries. Loaders
//! are pure functions over an injected lookup so tests can feed values
//! without touching process state; the public entry points read real
//! environment variables. Empty values count as unset. Validation failures
//! are fatal at startup.

use anyhow::{bail, Result};
use std::time::Duration;


/// Elasticsearch parameters shared by every service.
#[derive(Debug, Clone)]
pub struct CommonConfig {
    pub elasticsearch_addr: String,
    pub elasticsearch_index: String,
}

/// Configuration for the Kafka -> Elasticsearch worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub common: CommonConfig,
    pub kafka_brokers: Vec<String>,
    pub kafka_topic: String,
    pub kafka_consumer_group: String,
    pub keyword_limit: usize,
    pub keyword_min_length: usize,
    pub dedupe_capacity: usize,
    pub dedupe_ttl: Duration,
    pub batch_size: usize,
    pub commit_interval: Duration,
}

/// HTTP-layer configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub common: CommonConfig,
    pub bind_addr: String,
    pub default_page: usize,
    pub max_page: usize,
}

/// Configuration for the cleanup loop.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub common: CommonConfig,
    pub interval: Duration,
    pub max_age: Duration,
    pub batch_size: usize,
}

/// Builds a [`WorkerConfig`] from environment variables.
pub fn load_worker() -> Result<WorkerConfig> {
    load_worker_from(&process_env)
}

/// Builds an [`ApiConfig`] from environment variables.
pub fn load_api() -> Result<ApiConfig> {
    load_api_from(&process_env)
}

/// Builds a [`RetentionConfig`] from environment variables.
pub fn load_retention() -> Result<RetentionConfig> {
    load_retention_from(&process_env)
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub(crate) fn load_worker_from(env: &impl Fn(&str) -> Option<String>) -> Result<WorkerConfig> {
    let kafka_brokers = split_and_trim(&get_env(env, "KAFKA_BROKERS", "kafka:9092"));
    let keyword_limit = get_int(env, "WORKER_KEYWORD_LIMIT", 8);
    let keyword_min_length = get_int(env, "WORKER_KEYWORD_MIN_LEN", 4);
    let dedupe_capacity = get_int(env, "WORKER_DEDUPE_CAPACITY", 20_000);
    let batch_size = get_int(env, "WORKER_BATCH_SIZE", 10);

    if kafka_brokers.is_empty() {
        bail!("KAFKA_BROKERS must contain at least one broker");
    }
    if batch_size <= 0 {
        bail!("WORKER_BATCH_SIZE must be positive");
    }
    if dedupe_capacity <= 0 {
        bail!("WORKER_DEDUPE_CAPACITY must be positive");
    }
    if keyword_limit <= 0 {
        bail!("WORKER_KEYWORD_LIMIT must be positive");
    }
    if keyword_min_length < 0 {
        bail!("WORKER_KEYWORD_MIN_LEN cannot be negative");
    }

    Ok(WorkerConfig {
        common: common_from(env),
        kafka_brokers,
        kafka_topic: get_env(env, "KAFKA_TOPIC", "news_raw"),
        kafka_consumer_group: get_env(env, "KAFKA_CONSUMER_GROUP", "news-worker"),
        keyword_limit: keyword_limit as usize,
        keyword_min_length: keyword_min_length as usize,
        dedupe_capacity: dedupe_capacity as usize,
        dedupe_ttl: get_duration(env, "WORKER_DEDUPE_TTL", "24h"),
        batch_size: batch_size as usize,
        commit_interval: get_duration(env, "WORKER_COMMIT_INTERVAL", "2s"),
    })
}

pub(crate) fn load_api_from(env: &impl Fn(&str) -> Option<String>) -> Result<ApiConfig> {
    let default_page = get_int(env, "API_PAGE_SIZE", 20);
    let max_page = get_int(env, "API_MAX_PAGE_SIZE", 100);

    if default_page <= 0 {
        bail!("API_PAGE_SIZE must be positive");
    }
    if max_page <= 0 {
        bail!("API_MAX_PAGE_SIZE must be positive");
    }
    if default_page > max_page {
        bail!("API_PAGE_SIZE cannot exceed API_MAX_PAGE_SIZE");
    }

    Ok(ApiConfig {
        common: common_from(env),
        bind_addr: get_env(env, "API_BIND_ADDR", "0.0.0.0:8080"),
        default_page: default_page as usize,
        max_page: max_page as usize,
    })
}

pub(crate) fn load_retention_from(env: &impl Fn(&str) -> Option<String>) -> Result<RetentionConfig> {
    let interval = get_positive_duration(env, "RETENTION_CRON", "24h")?;
    let max_age = get_positive_duration(env, "RETENTION_MAX_AGE", "168h")?;
    let batch_size = get_int(env, "RETENTION_BATCH_SIZE", 500);

    if max_age.is_zero() {
        bail!("RETENTION_MAX_AGE must be positive");
    }
    if interval.is_zero() {
        bail!("RETENTION_CRON must be positive");
    }
    if batch_size <= 0 {
        bail!("RETENTION_BATCH_SIZE must be positive");
    }

    Ok(RetentionConfig {
        common: common_from(env),
        interval,
        max_age,
        batch_size: batch_size as usize,
    })
}

fn common_from(env: &impl Fn(&str) -> Option<String>) -> CommonConfig {
    CommonConfig {
        elasticsearch_addr: get_env(env, "ELASTICSEARCH_ADDR", "http://elasticsearch:9200"),
        elasticsearch_index: get_env(env, "ELASTICSEARCH_INDEX", "news"),
    }
}

fn get_env(env: &impl Fn(&str) -> Option<String>, key: &str, fallback: &str) -> String {
    match env(key) {
        Some(value) if !value.is_empty() => value,
        _ => fallback.to_string(),
    }
}

fn get_int(env: &impl Fn(&str) -> Option<String>, key: &str, fallback: i64) -> i64 {
    match env(key) {
        Some(value) if !value.is_empty() => value.parse().unwrap_or(fallback),
        _ => fallback,
    }
}

/// Parses durations like `72h`, `15m` or `5s`; a malformed override falls
/// back to the default.
fn get_duration(env: &impl Fn(&str) -> Option<String>, key: &str, fallback: &str) -> Duration {
    let raw = get_env(env, key, fallback);
    humantime::parse_duration(&raw).unwrap_or_else(|_| {
        humantime::parse_duration(fallback).expect("invalid fallback duration")
    })
}

/// Variant for knobs with a positivity rule. `Duration` cannot represent a
/// negative value, so a `-5h` override would otherwise read as malformed and
/// silently fall back; it must fail startup instead.
fn get_positive_duration(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    fallback: &str,
) -> Result<Duration> {
    if let Some(value) = env(key) {
        if value.trim().starts_with('-') {
            bail!("{} must be positive", key);
        }
    }
    Ok(get_duration(env, key, fallback))
}

fn split_and_trim(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
