//! Core subscriber traits for the service bus.

use super::publisher::{Message, PublishError};

/// Trait for pulling messages from a bus subscription.
///
/// Delivery is at-most-once: there is no ack or redelivery. A message handed
/// out by `poll` is gone from this subscription whatever happens to it next.
pub trait Subscriber: Send + Sync {
    /// Poll for the next message, blocking until one is available or timeout.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Message>, PublishError>;
}

/// Trait for buses that can open topic-filtered subscriptions.
pub trait Subscribable: Send + Sync {
    /// The subscription handle returned by `subscribe`.
    type Subscription: Subscriber + Clone + 'static;

    /// Open a new independent subscription receiving every message whose
    /// topic matches `pattern` (NATS subject syntax, see [`super::topic`]).
    ///
    /// Clones of the returned subscription share its read position, so they
    /// act as competing consumers of the same stream.
    fn subscribe(&self, pattern: &str) -> Result<Self::Subscription, PublishError>;
}
