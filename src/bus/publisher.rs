//! Core publisher trait for the service bus.

use thiserror::Error;

/// A raw message travelling over the bus.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Unique identifier for this delivery
    pub id: String,
    /// Topic (subject) the message was published on, e.g. `order.events`
    pub topic: String,
    /// Encoded payload (protobuf for order and inventory events)
    pub payload: Vec<u8>,
    /// Optional headers
    pub metadata: Option<Vec<(String, String)>>,
}

impl Message {
    /// Create a new message on the given topic.
    pub fn new(id: impl Into<String>, topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            payload,
            metadata: None,
        }
    }

    /// Create a message with a freshly generated id.
    pub fn on_topic(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), topic, payload)
    }

    /// Add a header to the message.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Look up a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Error type for bus operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection to the bus failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The topic or pattern is not valid
    #[error("invalid topic: {0}")]
    InvalidTopic(String),
    /// Internal state of the bus client is unusable
    #[error("bus lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Trait for publishing messages to a bus.
///
/// Implemented by the in-memory queue here; a NATS or Kafka client
/// implements the same trait in deployment.
pub trait Publisher: Send + Sync {
    /// Publish a single message.
    fn publish(&self, message: Message) -> Result<(), PublishError>;

    /// Publish multiple messages.
    ///
    /// Default implementation publishes sequentially.
    fn publish_batch(&self, messages: Vec<Message>) -> Result<(), PublishError> {
        for message in messages {
            self.publish(message)?;
        }
        Ok(())
    }
}
