//! Bus subscriber - drives bus messages through decode, validate and append.
//!
//! ```text
//!             ┌─ worker ─┐
//! order.*  ──▶├─ worker ─┤──▶ decode ──▶ validate ──▶ EventStore::append
//!             └─ worker ─┘
//! inventory.* ──▶ (same, own workers)
//! ```
//!
//! Failures are terminal and local: a message that fails to decode, fails
//! validation or fails to persist is logged and dropped. There is no retry
//! and no dead-letter queue; ingestion stays available at the cost of an
//! incomplete log.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use base64::Engine as _;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bus::{Message, PublishError, Subscribable, Subscriber};
use crate::decoder::{decode, DecodeError};
use crate::domain::DomainEvent;
use crate::store::{EventStore, StoreError};
use crate::validator::{validate, ValidationError};

/// Why a message did not make it into the store.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("event {event_id} rejected: {source}")]
    Rejected {
        event_id: String,
        #[source]
        source: ValidationError,
    },
    #[error("event {event_id} not stored: {source}")]
    Store {
        event_id: String,
        #[source]
        source: StoreError,
    },
}

/// Run one message through the write path.
///
/// A blank event id is replaced by the bus message id.
pub fn ingest<S: EventStore + ?Sized>(
    store: &S,
    message: &Message,
) -> Result<DomainEvent, IngestError> {
    let event = decode(&message.topic, &message.payload)?.with_fallback_id(&message.id);

    validate(&event).map_err(|source| IngestError::Rejected {
        event_id: event.event_id().to_string(),
        source,
    })?;

    store.append(&event).map_err(|source| IngestError::Store {
        event_id: event.event_id().to_string(),
        source,
    })?;

    Ok(event)
}

/// Error type for subscriber lifecycle operations.
#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("subscriber is already started")]
    AlreadyStarted,
    #[error("subscriber is not started")]
    NotStarted,
    #[error("failed to subscribe to {pattern}: {source}")]
    Subscribe {
        pattern: String,
        #[source]
        source: PublishError,
    },
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Lifecycle state of an [`EventSubscriber`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribed,
}

/// Subscriber settings.
#[derive(Clone, Debug)]
pub struct SubscriberConfig {
    /// Pattern for order lifecycle topics.
    pub order_pattern: String,
    /// Pattern for inventory lifecycle topics.
    pub inventory_pattern: String,
    /// Competing worker threads per subscription.
    pub workers_per_topic: usize,
    /// How long a worker blocks in one poll before rechecking for stop.
    pub poll_interval: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            order_pattern: "order.*".to_string(),
            inventory_pattern: "inventory.*".to_string(),
            workers_per_topic: 4,
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Counts of message outcomes since the subscriber was started.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub received: u64,
    pub stored: u64,
    pub decode_failures: u64,
    pub validation_failures: u64,
    pub store_failures: u64,
    pub poll_errors: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    stored: AtomicU64,
    decode_failures: AtomicU64,
    validation_failures: AtomicU64,
    store_failures: AtomicU64,
    poll_errors: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SubscriptionStats {
        SubscriptionStats {
            received: self.received.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            poll_errors: self.poll_errors.load(Ordering::Relaxed),
        }
    }
}

struct Running {
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

/// Owns the order and inventory subscriptions and their worker threads.
///
/// Each instance is independent; several can run against the same bus and
/// store (every subscription sees every matching message).
///
/// ## Example
///
/// ```
/// use statistics_service::bus::{InMemoryQueue, Message, Publisher};
/// use statistics_service::store::InMemoryEventStore;
/// use statistics_service::subscriber::{EventSubscriber, SubscriberConfig};
///
/// let queue = InMemoryQueue::new();
/// let store = InMemoryEventStore::new();
/// let mut subscriber = EventSubscriber::new(queue.clone(), store, SubscriberConfig::default());
///
/// subscriber.start().unwrap();
/// queue.publish(Message::new("m-1", "order.events", vec![])).unwrap();
/// let stats = subscriber.stop().unwrap();
/// assert!(stats.received <= 1);
/// ```
pub struct EventSubscriber<B, S> {
    bus: B,
    store: S,
    config: SubscriberConfig,
    running: Option<Running>,
}

impl<B, S> EventSubscriber<B, S>
where
    B: Subscribable,
    S: EventStore + Clone + 'static,
{
    pub fn new(bus: B, store: S, config: SubscriberConfig) -> Self {
        Self {
            bus,
            store,
            config,
            running: None,
        }
    }

    pub fn state(&self) -> SubscriptionState {
        if self.running.is_some() {
            SubscriptionState::Subscribed
        } else {
            SubscriptionState::Unsubscribed
        }
    }

    /// Subscribe to both topic patterns and start the workers.
    pub fn start(&mut self) -> Result<(), SubscriberError> {
        if self.running.is_some() {
            return Err(SubscriberError::AlreadyStarted);
        }

        let subscriptions = [
            self.subscribe(&self.config.order_pattern)?,
            self.subscribe(&self.config.inventory_pattern)?,
        ];

        let stop = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());
        let mut workers = Vec::new();

        for (pattern, subscription) in subscriptions {
            for n in 0..self.config.workers_per_topic.max(1) {
                let worker = Worker {
                    subscription: subscription.clone(),
                    store: self.store.clone(),
                    stop: Arc::clone(&stop),
                    counters: Arc::clone(&counters),
                    poll_interval: self.config.poll_interval,
                };
                let spawned = std::thread::Builder::new()
                    .name(format!("ingest-{pattern}-{n}"))
                    .spawn(move || worker.run());
                match spawned {
                    Ok(handle) => workers.push(handle),
                    Err(e) => {
                        stop.store(true, Ordering::SeqCst);
                        for handle in workers {
                            let _ = handle.join();
                        }
                        return Err(SubscriberError::Spawn(e));
                    }
                }
            }
            info!(pattern = %pattern, workers = self.config.workers_per_topic.max(1), "subscribed");
        }

        self.running = Some(Running {
            stop,
            workers,
            counters,
        });
        Ok(())
    }

    /// Stop the workers, wait for in-flight messages, and return the stats.
    pub fn stop(&mut self) -> Result<SubscriptionStats, SubscriberError> {
        let running = self.running.take().ok_or(SubscriberError::NotStarted)?;
        running.stop.store(true, Ordering::SeqCst);
        for handle in running.workers {
            if handle.join().is_err() {
                warn!("ingest worker panicked");
            }
        }
        let stats = running.counters.snapshot();
        info!(?stats, "unsubscribed");
        Ok(stats)
    }

    /// Stats so far, without stopping. Default stats when not started.
    pub fn stats(&self) -> SubscriptionStats {
        self.running
            .as_ref()
            .map(|r| r.counters.snapshot())
            .unwrap_or_default()
    }

    fn subscribe(&self, pattern: &str) -> Result<(String, B::Subscription), SubscriberError> {
        let subscription = self
            .bus
            .subscribe(pattern)
            .map_err(|source| SubscriberError::Subscribe {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok((pattern.to_string(), subscription))
    }
}

impl<B, S> Drop for EventSubscriber<B, S> {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.stop.store(true, Ordering::SeqCst);
        }
    }
}

struct Worker<T, S> {
    subscription: T,
    store: S,
    stop: Arc<AtomicBool>,
    counters: Arc<Counters>,
    poll_interval: Duration,
}

impl<T: Subscriber, S: EventStore> Worker<T, S> {
    fn run(self) {
        let timeout_ms = self.poll_interval.as_millis() as u64;
        while !self.stop.load(Ordering::SeqCst) {
            match self.subscription.poll(timeout_ms) {
                Ok(Some(message)) => self.handle(&message),
                Ok(None) => {}
                Err(e) => {
                    self.counters.poll_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "bus poll failed");
                    std::thread::sleep(self.poll_interval);
                }
            }
        }
    }

    fn handle(&self, message: &Message) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        match ingest(&self.store, message) {
            Ok(event) => {
                self.counters.stored.fetch_add(1, Ordering::Relaxed);
                debug!(
                    topic = %message.topic,
                    event_id = event.event_id(),
                    kind = %event.kind(),
                    "event stored"
                );
            }
            Err(IngestError::Decode(e)) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(topic = %message.topic, message_id = %message.id, error = %e, "dropping undecodable message");
                debug!(
                    payload = %base64::engine::general_purpose::STANDARD.encode(&message.payload),
                    "undecodable payload"
                );
            }
            Err(IngestError::Rejected { event_id, source }) => {
                self.counters.validation_failures.fetch_add(1, Ordering::Relaxed);
                warn!(topic = %message.topic, %event_id, reason = %source, "dropping invalid event");
            }
            Err(IngestError::Store { event_id, source }) => {
                self.counters.store_failures.fetch_add(1, Ordering::Relaxed);
                warn!(topic = %message.topic, %event_id, error = %source, "failed to store event, dropping");
            }
        }
    }
}
