use anyhow::{Context, Result};
use news_radar::{config, dedupe, index, logging, shutdown, worker};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::producer::FutureProducer;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cfg = config::load_worker().context("load config")?;

    let es = index::client::Client::new(
        &cfg.common.elasticsearch_addr,
        &cfg.common.elasticsearch_index,
    )
    .context("init elasticsearch")?;

    let cache = dedupe::Cache::new(cfg.dedupe_capacity, cfg.dedupe_ttl);

    let brokers = cfg.kafka_brokers.join(",");

    // Auto-commit stays off; every offset commit in the loop is explicit.
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", &cfg.kafka_consumer_group)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .set("queued.min.messages", cfg.batch_size.to_string())
        .create()
        .context("create kafka consumer")?;

    consumer
        .subscribe(&[cfg.kafka_topic.as_str()])
        .context("subscribe to input topic")?;

    let dlq_producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("message.send.max.retries", "3")
        .create()
        .context("create dlq producer")?;

    let shutdown = shutdown::watch_signals()?;

    tracing::info!(
        "worker started (topic {}, group {}, dlq {}_dlq)",
        cfg.kafka_topic,
        cfg.kafka_consumer_group,
        cfg.kafka_topic
    );

    worker::consumer::run(&cfg, &consumer, &dlq_producer, &es, &cache, shutdown).await
}
