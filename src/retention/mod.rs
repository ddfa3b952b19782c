//! Retention Sweep Module
//!
//! Deletes documents older than the configured horizon on a fixed interval.
//! Startup waits for the index to come up with capped exponential backoff;
//! after that a failed sweep only logs a warning and waits for the next
//! tick.

use crate::config::RetentionConfig;
use crate::index::client::Client;

use anyhow::{bail, Result};
use std::time::Duration;
use tokio::sync::watch;

const MAX_CONNECT_ATTEMPTS: u32 = 10;
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const PING_TIMEOUT: Duration = Duration::from_secs(5);
const RUN_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds the index client and verifies connectivity, retrying with
/// exponential backoff capped at 30 seconds. Returns `Ok(None)` when the
/// shutdown signal arrives before a connection is established.
pub async fn connect_with_backoff(
    cfg: &RetentionConfig,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<Option<Client>> {
    let mut delay = INITIAL_RETRY_DELAY;

    for attempt in 1..=MAX_CONNECT_ATTEMPTS {
        match Client::new(
            &cfg.common.elasticsearch_addr,
            &cfg.common.elasticsearch_index,
        ) {
            Ok(client) => match tokio::time::timeout(PING_TIMEOUT, client.ping()).await {
                Ok(Ok(())) => return Ok(Some(client)),
                Ok(Err(err)) => tracing::warn!(
                    "elasticsearch ping failed (attempt {}/{}), retrying in {:?}: {:#}",
                    attempt,
                    MAX_CONNECT_ATTEMPTS,
                    delay,
                    err
                ),
                Err(_) => tracing::warn!(
                    "elasticsearch ping timed out (attempt {}/{}), retrying in {:?}",
                    attempt,
                    MAX_CONNECT_ATTEMPTS,
                    delay
                ),
            },
            Err(err) => tracing::warn!(
                "failed to create elasticsearch client (attempt {}/{}): {:#}",
                attempt,
                MAX_CONNECT_ATTEMPTS,
                err
            ),
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => {
                tracing::info!("shutdown signal received during startup");
                return Ok(None);
            }
        }

        delay = (delay * 2).min(MAX_RETRY_DELAY);
    }

    bail!(
        "failed to connect to elasticsearch after {} attempts",
        MAX_CONNECT_ATTEMPTS
    )
}

/// Sweeps once immediately, then on every interval tick until shutdown.
pub async fn run(cfg: &RetentionConfig, client: &Client, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(cfg.interval);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("shutdown signal received");
                return;
            }
            _ = ticker.tick() => run_once(cfg, client).await,
        }
    }
}

/// One bounded sweep. Errors are warned and deferred to the next tick.
async fn run_once(cfg: &RetentionConfig, client: &Client) {
    let sweep = client.delete_older_than(cfg.max_age, cfg.batch_size);

    match tokio::time::timeout(RUN_TIMEOUT, sweep).await {
        Ok(Ok(deleted)) if deleted > 0 => {
            tracing::info!("retention run completed, deleted {}", deleted);
        }
        Ok(Ok(_)) => {
            tracing::debug!("retention run completed, no old documents found");
        }
        Ok(Err(err)) => {
            tracing::warn!("retention run failed (will retry on next interval): {:#}", err);
        }
        Err(_) => {
            tracing::warn!("retention run timed out (will retry on next interval)");
        }
    }
}
