#[cfg(test)]
mod tests {
    use crate::config::{CommonConfig, WorkerConfig};
    use crate::dedupe::Cache;
    use crate::models::NewsDocument;
    use crate::worker::consumer::DlqEnvelope;
    use crate::worker::pipeline::{parse_timestamp, process_message, NewsIndexer};

    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubIndexer {
        docs: Mutex<Vec<NewsDocument>>,
    }

    impl StubIndexer {
        fn new() -> Self {
            Self {
                docs: Mutex::new(Vec::new()),
            }
        }

        fn docs(&self) -> Vec<NewsDocument> {
            self.docs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsIndexer for StubIndexer {
        async fn index_news(&self, doc: &NewsDocument) -> Result<()> {
            self.docs.lock().unwrap().push(doc.clone());
            Ok(())
        }
    }

    struct FailingIndexer;

    #[async_trait]
    impl NewsIndexer for FailingIndexer {
        async fn index_news(&self, _doc: &NewsDocument) -> Result<()> {
            bail!("index unavailable")
        }
    }

    fn test_config() -> WorkerConfig {
        WorkerConfig {
            common: CommonConfig {
                elasticsearch_addr: "http://test".to_string(),
                elasticsearch_index: "news".to_string(),
            },
            kafka_brokers: vec!["kafka:9092".to_string()],
            kafka_topic: "news_raw".to_string(),
            kafka_consumer_group: "news-worker".to_string(),
            keyword_limit: 5,
            keyword_min_length: 3,
            dedupe_capacity: 100,
            dedupe_ttl: Duration::from_secs(3600),
            batch_size: 10,
            commit_interval: Duration::from_secs(2),
        }
    }

    // ============================================================
    // MESSAGE PROCESSING
    // ============================================================

    #[tokio::test]
    async fn test_process_message_indexes_document() {
        let cfg = test_config();
        let cache = Cache::new(100, Duration::from_secs(3600));
        let indexer = StubIndexer::new();

        let payload = serde_json::json!({
            "title": "Горящий тур",
            "text": "<b>Море и солнце</b> ждут",
            "timestamp": "2024-01-02T15:04:05Z",
            "source": "rss",
        })
        .to_string();

        process_message(&indexer, &cache, &cfg, payload.as_bytes())
            .await
            .unwrap();

        let docs = indexer.docs();
        assert_eq!(docs.len(), 1);

        let doc = &docs[0];
        assert_eq!(doc.title, "Горящий тур");
        assert_eq!(doc.source, "rss");
        assert!(!doc.keywords.is_empty());
        assert_eq!(doc.id.len(), 40);
        assert_eq!(
            doc.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap()
        );

        // A second identical message is dropped by the dedupe cache.
        process_message(&indexer, &cache, &cfg, payload.as_bytes())
            .await
            .unwrap();
        assert_eq!(indexer.docs().len(), 1);
    }

    #[tokio::test]
    async fn test_process_message_generates_title_when_missing() {
        let cfg = test_config();
        let cache = Cache::new(100, Duration::from_secs(3600));
        let indexer = StubIndexer::new();

        let payload = serde_json::json!({
            "title": "",
            "text": "Горящий тур в Турцию! Всего 30000 рублей. Вылет завтра.",
            "timestamp": "2024-01-02T15:04:05Z",
            "source": "telegram",
        })
        .to_string();

        process_message(&indexer, &cache, &cfg, payload.as_bytes())
            .await
            .unwrap();

        let docs = indexer.docs();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Горящий тур в Турцию");
        assert_eq!(docs[0].source, "telegram");
        assert!(!docs[0].keywords.is_empty());
    }

    #[tokio::test]
    async fn test_process_message_extracts_urls_and_keeps_raw_text() {
        let cfg = test_config();
        let cache = Cache::new(100, Duration::from_secs(3600));
        let indexer = StubIndexer::new();

        let payload = serde_json::json!({
            "title": "Ссылки",
            "text": "Поездка поездка https://a.com и снова https://a.com ждет",
            "timestamp": "2024-01-02T15:04:05Z",
            "source": "rss",
        })
        .to_string();

        process_message(&indexer, &cache, &cfg, payload.as_bytes())
            .await
            .unwrap();

        let docs = indexer.docs();
        let doc = &docs[0];
        assert_eq!(doc.urls, vec!["https://a.com"]);
        assert!(doc.text.contains("https://a.com"));
        assert!(doc.keywords.iter().all(|k| !k.contains("com")));
    }

    #[tokio::test]
    async fn test_process_message_rejects_poison_payloads() {
        let cfg = test_config();
        let cache = Cache::new(100, Duration::from_secs(3600));
        let indexer = StubIndexer::new();

        let err = process_message(&indexer, &cache, &cfg, b"not json")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("decode raw news"));

        let empty = serde_json::json!({
            "title": "  ",
            "text": "",
            "timestamp": "",
            "source": "",
        })
        .to_string();
        let err = process_message(&indexer, &cache, &cfg, empty.as_bytes())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty payload"));

        assert!(indexer.docs().is_empty());
    }

    #[tokio::test]
    async fn test_process_message_does_not_mark_seen_on_index_failure() {
        let cfg = test_config();
        let cache = Cache::new(100, Duration::from_secs(3600));

        let payload = serde_json::json!({
            "title": "Горящий тур",
            "text": "Море и солнце ждут",
            "timestamp": "2024-01-02T15:04:05Z",
            "source": "rss",
        })
        .to_string();

        let failing = FailingIndexer;
        let err = process_message(&failing, &cache, &cfg, payload.as_bytes()).await;
        assert!(err.is_err());

        // The id was not marked seen, so a redelivery still indexes.
        let indexer = StubIndexer::new();
        process_message(&indexer, &cache, &cfg, payload.as_bytes())
            .await
            .unwrap();
        assert_eq!(indexer.docs().len(), 1);
    }

    #[tokio::test]
    async fn test_process_message_id_is_stable_across_runs() {
        let cfg = test_config();
        let payload = serde_json::json!({
            "title": "Стабильный заголовок",
            "text": "Одинаковый текст",
            "timestamp": "2024-01-02T15:04:05Z",
            "source": "rss",
        })
        .to_string();

        let first = StubIndexer::new();
        process_message(
            &first,
            &Cache::new(10, Duration::from_secs(60)),
            &cfg,
            payload.as_bytes(),
        )
        .await
        .unwrap();

        let second = StubIndexer::new();
        process_message(
            &second,
            &Cache::new(10, Duration::from_secs(60)),
            &cfg,
            payload.as_bytes(),
        )
        .await
        .unwrap();

        assert_eq!(first.docs()[0].id, second.docs()[0].id);
    }

    #[tokio::test]
    async fn test_process_message_defaults_source_to_unknown() {
        let cfg = test_config();
        let cache = Cache::new(100, Duration::from_secs(3600));
        let indexer = StubIndexer::new();

        let payload = serde_json::json!({
            "title": "Без источника",
            "text": "Какой-то текст",
        })
        .to_string();

        process_message(&indexer, &cache, &cfg, payload.as_bytes())
            .await
            .unwrap();

        assert_eq!(indexer.docs()[0].source, "unknown");
    }

    // ============================================================
    // TIMESTAMP PARSING
    // ============================================================

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-02-03T04:05:06Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap());

        let nano = parse_timestamp("2024-02-03T04:05:06.123456789Z").unwrap();
        assert_eq!(nano.timestamp(), ts.timestamp());

        let legacy = parse_timestamp("2024-02-03 04:05:06").unwrap();
        assert_eq!(legacy, Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap());

        let offset = parse_timestamp("2024-02-03T07:05:06+03:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap());

        assert!(parse_timestamp("invalid").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
    }

    // ============================================================
    // DLQ ENVELOPE
    // ============================================================

    #[test]
    fn test_dlq_envelope_headers() {
        let envelope = DlqEnvelope {
            payload: b"broken".to_vec(),
            partition: 3,
            offset: 42,
            error: "decode raw news".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap(),
        };

        let headers = envelope.headers();
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[0], ("original_partition", "3".to_string()));
        assert_eq!(headers[1], ("original_offset", "42".to_string()));
        assert_eq!(headers[2], ("error", "decode raw news".to_string()));
        assert_eq!(
            headers[3],
            ("timestamp", "2024-01-02T15:04:05Z".to_string())
        );
    }
}
