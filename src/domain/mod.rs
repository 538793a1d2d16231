//! Domain model: immutable events and the statistics derived from them.

mod events;
mod statistics;

pub use events::{
    is_zero_timestamp, DomainEvent, EventKind, InventoryEvent, OrderEvent, OrderItem, OrderStatus,
};
pub use statistics::{TopProduct, UserOrderStatistics, UserStatistics};
