//! Service bus - message transport abstractions.
//!
//! ```text
//! ┌───────────────────┐  publish   ┌──────────────┐  subscribe("order.*")
//! │ order-service     │ ─────────▶ │  Publisher / │ ────────────────────▶ ingestion
//! │ inventory-service │            │  Subscribable│  subscribe("inventory.*")
//! └───────────────────┘            └──────────────┘
//!                                    │
//!                                    ├── InMemoryQueue (tests, single process)
//!                                    └── KafkaBus (feature `kafka`)
//! ```
//!
//! Delivery is at-most-once from the consumer's point of view: there is no
//! acknowledgement and no redelivery.

mod in_memory_queue;
#[cfg(feature = "kafka")]
mod kafka;
mod publisher;
mod subscriber;
pub mod topic;

pub use in_memory_queue::{InMemoryQueue, InMemorySubscription};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaBus, KafkaSubscription, KAFKA_KEY_HEADER};
pub use publisher::{Message, PublishError, Publisher};
pub use subscriber::{Subscribable, Subscriber};
pub use topic::TopicPattern;

/// Topic order-service publishes lifecycle events on.
pub const ORDER_EVENTS_TOPIC: &str = "order.events";

/// Topic inventory-service publishes lifecycle events on.
pub const INVENTORY_EVENTS_TOPIC: &str = "inventory.events";
