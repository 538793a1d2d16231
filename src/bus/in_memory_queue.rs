//! In-memory bus for tests and single-process deployments.
//!
//! A thread-safe append-only message log implementing `Publisher` and
//! `Subscribable`. Every subscription keeps its own read position over the
//! shared log and only sees messages whose topic matches its pattern.

use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};

use super::topic::TopicPattern;
use super::{Message, PublishError, Publisher, Subscribable, Subscriber};

/// In-memory bus.
///
/// ## Example
///
/// ```
/// use statistics_service::bus::{InMemoryQueue, Message, Publisher, Subscribable, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// let orders = queue.subscribe("order.*").unwrap();
///
/// queue.publish(Message::new("m-1", "order.events", vec![])).unwrap();
/// queue.publish(Message::new("m-2", "inventory.events", vec![])).unwrap();
///
/// assert_eq!(orders.poll(10).unwrap().unwrap().id, "m-1");
/// assert!(orders.poll(10).unwrap().is_none());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<Message>>>,
    cursors: Arc<Mutex<Vec<Weak<Mutex<usize>>>>>,
}

impl InMemoryQueue {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far, in publish order.
    pub fn messages(&self) -> Result<Vec<Message>, PublishError> {
        Ok(self.read_log()?.clone())
    }

    /// Messages published on exactly `topic`.
    pub fn messages_on(&self, topic: &str) -> Result<Vec<Message>, PublishError> {
        Ok(self
            .read_log()?
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect())
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.read_log().map(|log| log.len()).unwrap_or(0)
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear the log and rewind every open subscription to the start.
    pub fn clear(&self) -> Result<(), PublishError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| PublishError::LockPoisoned("clear"))?;
        log.clear();

        // Pollers lock the log before their cursor; rewind under the write guard.
        let mut cursors = self
            .cursors
            .lock()
            .map_err(|_| PublishError::LockPoisoned("clear"))?;
        cursors.retain(|cursor| cursor.strong_count() > 0);
        for cursor in cursors.iter().filter_map(Weak::upgrade) {
            *cursor
                .lock()
                .map_err(|_| PublishError::LockPoisoned("clear"))? = 0;
        }
        Ok(())
    }

    fn read_log(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Message>>, PublishError> {
        self.log.read().map_err(|_| PublishError::LockPoisoned("read"))
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, message: Message) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish"))?
            .push(message);
        Ok(())
    }

    fn publish_batch(&self, messages: Vec<Message>) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish_batch"))?
            .extend(messages);
        Ok(())
    }
}

impl Subscribable for InMemoryQueue {
    type Subscription = InMemorySubscription;

    fn subscribe(&self, pattern: &str) -> Result<InMemorySubscription, PublishError> {
        let pattern = TopicPattern::parse(pattern)?;
        let position = Arc::new(Mutex::new(0));

        let mut cursors = self
            .cursors
            .lock()
            .map_err(|_| PublishError::LockPoisoned("subscribe"))?;
        cursors.retain(|cursor| cursor.strong_count() > 0);
        cursors.push(Arc::downgrade(&position));

        Ok(InMemorySubscription {
            log: Arc::clone(&self.log),
            pattern,
            position,
        })
    }
}

/// A topic-filtered subscription on an [`InMemoryQueue`].
///
/// Starts at the beginning of the log. Clones share the read position.
#[derive(Clone)]
pub struct InMemorySubscription {
    log: Arc<RwLock<Vec<Message>>>,
    pattern: TopicPattern,
    position: Arc<Mutex<usize>>,
}

impl InMemorySubscription {
    /// The pattern this subscription was opened with.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn next_match(&self) -> Result<Option<Message>, PublishError> {
        let log = self
            .log
            .read()
            .map_err(|_| PublishError::LockPoisoned("poll"))?;
        let mut pos = self
            .position
            .lock()
            .map_err(|_| PublishError::LockPoisoned("poll"))?;

        while *pos < log.len() {
            let message = &log[*pos];
            *pos += 1;
            if self.pattern.matches(&message.topic) {
                return Ok(Some(message.clone()));
            }
        }
        Ok(None)
    }
}

impl Subscriber for InMemorySubscription {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Message>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if let Some(message) = self.next_match()? {
                return Ok(Some(message));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Nothing matched yet; back off briefly.
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
