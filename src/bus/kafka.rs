//! Kafka / Redpanda bus adapter.
//!
//! Requires the `kafka` feature. Each `subscribe` call creates one
//! `BaseConsumer` in its own consumer group (`<group_id>.<pattern>`) and
//! clones of the subscription share it, so worker threads compete for its
//! records. Offsets are auto-committed: a record handed out by `poll` is
//! never redelivered, which keeps delivery at-most-once.
//!
//! Patterns with wildcards become regex subscriptions; see
//! [`TopicPattern::to_regex`].
//!
//! ## Example
//!
//! ```ignore
//! use statistics_service::bus::KafkaBus;
//!
//! let bus = KafkaBus::new("localhost:9092", "statistics-service");
//! let mut subscriber = EventSubscriber::new(bus, store, SubscriberConfig::default());
//! subscriber.start()?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::message::Message as _;
use tracing::info;

use super::{Message, PublishError, Subscribable, Subscriber, TopicPattern};

/// Header carrying the record key, when the producer set a UTF-8 one.
pub const KAFKA_KEY_HEADER: &str = "kafka.key";

/// Connection settings for a Kafka-compatible broker.
#[derive(Clone, Debug)]
pub struct KafkaBus {
    brokers: String,
    group_id: String,
    auto_offset_reset: String,
}

impl KafkaBus {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            auto_offset_reset: "earliest".to_string(),
        }
    }

    /// Where a new consumer group starts: `earliest` (default) or `latest`.
    pub fn with_auto_offset_reset(mut self, reset: impl Into<String>) -> Self {
        self.auto_offset_reset = reset.into();
        self
    }

    pub fn brokers(&self) -> &str {
        &self.brokers
    }
}

impl Subscribable for KafkaBus {
    type Subscription = KafkaSubscription;

    fn subscribe(&self, pattern: &str) -> Result<KafkaSubscription, PublishError> {
        let pattern = TopicPattern::parse(pattern)?;
        let group_id = format!("{}.{}", self.group_id, pattern.as_str());

        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| PublishError::ConnectionFailed(format!("failed to create consumer: {e}")))?;

        let expression = if pattern.has_wildcards() {
            pattern.to_regex()
        } else {
            pattern.as_str().to_string()
        };
        consumer.subscribe(&[expression.as_str()]).map_err(|e| {
            PublishError::ConnectionFailed(format!("failed to subscribe to {expression}: {e}"))
        })?;

        info!(
            pattern = pattern.as_str(),
            %expression,
            %group_id,
            brokers = %self.brokers,
            "subscribed to kafka topics"
        );

        Ok(KafkaSubscription {
            consumer: Arc::new(consumer),
            pattern,
        })
    }
}

/// A consumer-group subscription. Clones compete for records.
#[derive(Clone)]
pub struct KafkaSubscription {
    consumer: Arc<BaseConsumer>,
    pattern: TopicPattern,
}

impl Subscriber for KafkaSubscription {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Message>, PublishError> {
        let record = match self.consumer.poll(Duration::from_millis(timeout_ms)) {
            None => return Ok(None),
            Some(Err(e)) => return Err(PublishError::ConnectionFailed(e.to_string())),
            Some(Ok(record)) => record,
        };

        // The broker's regex dialect may match more than the pattern does.
        if !self.pattern.matches(record.topic()) {
            return Ok(None);
        }

        let mut message = Message::new(
            format!("{}/{}/{}", record.topic(), record.partition(), record.offset()),
            record.topic(),
            record.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        );
        if let Some(key) = record.key().and_then(|k| std::str::from_utf8(k).ok()) {
            message = message.with_metadata(KAFKA_KEY_HEADER, key);
        }
        Ok(Some(message))
    }
}
