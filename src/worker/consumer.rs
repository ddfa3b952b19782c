use super::pipeline::{process_message, NewsIndexer};
use crate::config::WorkerConfig;
use crate::dedupe::Cache;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Header, Message, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tokio::sync::watch;

const DLQ_MAX_ATTEMPTS: u32 = 5;
const DLQ_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// A message bound for the dead-letter topic: the verbatim payload plus the
/// diagnostic headers describing where it came from and why it failed.
#[derive(Debug, Clone)]
pub struct DlqEnvelope {
    pub payload: Vec<u8>,
    pub partition: i32,
    pub offset: i64,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl DlqEnvelope {
    /// Header set attached to the DLQ record.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("original_partition", self.partition.to_string()),
            ("original_offset", self.offset.to_string()),
            ("error", self.error.clone()),
            (
                "timestamp",
                self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ]
    }
}

/// Outcome of the bounded DLQ hand-off.
#[derive(Debug, PartialEq, Eq)]
enum DlqOutcome {
    Delivered,
    Exhausted,
    Shutdown,
}

/// Runs the serial fetch -> transform -> index -> commit loop until a
/// shutdown signal arrives.
///
/// Offsets commit in fetch order, and only after the message was indexed or
/// handed to the DLQ. When the DLQ itself is unreachable the offset stays
/// uncommitted so the message is redelivered after a restart.
pub async fn run<I>(
    cfg: &WorkerConfig,
    consumer: &StreamConsumer,
    dlq_producer: &FutureProducer,
    indexer: &I,
    cache: &Cache,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    I: NewsIndexer,
{
    let dlq_topic = format!("{}_dlq", cfg.kafka_topic);

    loop {
        let msg = tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("shutdown signal received, stopping consumer");
                return Ok(());
            }
            received = consumer.recv() => match received {
                Ok(msg) => msg,
                Err(err) => {
                    tracing::error!("fetch message: {}", err);
                    continue;
                }
            },
        };

        let payload = msg.payload().unwrap_or_default();

        match process_message(indexer, cache, cfg, payload).await {
            Ok(()) => {
                if let Err(err) = consumer.commit_message(&msg, CommitMode::Sync) {
                    tracing::error!("commit message: {}", err);
                }
            }
            Err(err) => {
                tracing::warn!(
                    "process message failed (partition {} offset {}), sending to DLQ: {:#}",
                    msg.partition(),
                    msg.offset(),
                    err
                );

                let envelope = DlqEnvelope {
                    payload: payload.to_vec(),
                    partition: msg.partition(),
                    offset: msg.offset(),
                    error: format!("{:#}", err),
                    timestamp: Utc::now(),
                };

                match send_to_dlq(dlq_producer, &dlq_topic, &envelope, &mut shutdown).await {
                    DlqOutcome::Delivered => {
                        if let Err(err) = consumer.commit_message(&msg, CommitMode::Sync) {
                            tracing::error!("commit message handed to dlq: {}", err);
                        }
                    }
                    DlqOutcome::Exhausted => {
                        tracing::error!(
                            "DLQ write exhausted retries; partition {} offset {} stays uncommitted and will be reprocessed",
                            msg.partition(),
                            msg.offset()
                        );
                    }
                    DlqOutcome::Shutdown => {
                        tracing::info!("shutdown signal received during DLQ retry");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Attempts up to five DLQ writes with exponential backoff (1, 2, 4, 8, 16
/// seconds). Every backoff sleep races the shutdown signal so termination
/// never waits out the ladder.
async fn send_to_dlq(
    producer: &FutureProducer,
    topic: &str,
    envelope: &DlqEnvelope,
    shutdown: &mut watch::Receiver<bool>,
) -> DlqOutcome {
    for attempt in 0..DLQ_MAX_ATTEMPTS {
        let mut headers = OwnedHeaders::new();
        for (key, value) in envelope.headers() {
            headers = headers.insert(Header {
                key,
                value: Some(&value),
            });
        }

        let record: FutureRecord<'_, (), Vec<u8>> = FutureRecord::to(topic)
            .payload(&envelope.payload)
            .headers(headers);

        match producer.send(record, Timeout::After(DLQ_SEND_TIMEOUT)).await {
            Ok(_) => {
                tracing::info!(
                    "message sent to DLQ (partition {} offset {}, attempt {})",
                    envelope.partition,
                    envelope.offset,
                    attempt + 1
                );
                return DlqOutcome::Delivered;
            }
            Err((err, _)) => {
                let backoff = Duration::from_secs(1 << attempt);
                tracing::warn!(
                    "DLQ write failed (attempt {}), retrying in {:?}: {}",
                    attempt + 1,
                    backoff,
                    err
                );

                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = shutdown.changed() => return DlqOutcome::Shutdown,
                }
            }
        }
    }

    DlqOutcome::Exhausted
}
