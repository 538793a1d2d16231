//! Event store - append-only logs of order and inventory events.
//!
//! Two collections, `order_events` and `inventory_events`, each only ever
//! grows. Writers never update in place, so concurrent appends from several
//! subscribers need no coordination beyond the backend's own locking.
//!
//! ```text
//! append_order ──────▶ order_events      ──▶ find_by_user / aggregate_top_product
//! append_inventory ──▶ inventory_events  ──▶ find_inventory_by_product
//! ```

mod aggregate;
mod error;
mod file;
mod in_memory;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{DomainEvent, InventoryEvent, OrderEvent, TopProduct};

pub use aggregate::top_product;
pub use error::StoreError;
pub use file::FileEventStore;
pub use in_memory::InMemoryEventStore;

/// A record type with its own collection in the store.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection name. Maps to a table, a Mongo collection or a file.
    const COLLECTION: &'static str;
}

impl Document for OrderEvent {
    const COLLECTION: &'static str = "order_events";
}

impl Document for InventoryEvent {
    const COLLECTION: &'static str = "inventory_events";
}

/// Append-only storage for events plus the reads statistics need.
pub trait EventStore: Send + Sync {
    /// Append an order event to `order_events`.
    fn append_order(&self, event: &OrderEvent) -> Result<(), StoreError>;

    /// Append an inventory event to `inventory_events`.
    fn append_inventory(&self, event: &InventoryEvent) -> Result<(), StoreError>;

    /// All order events for a user. No ordering guarantee.
    fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderEvent>, StoreError>;

    /// All inventory events for a product. No ordering guarantee.
    fn find_inventory_by_product(&self, product_id: &str)
        -> Result<Vec<InventoryEvent>, StoreError>;

    /// Most purchased product across the user's completed orders.
    ///
    /// `None` when the user has no completed order lines.
    fn aggregate_top_product(&self, user_id: &str) -> Result<Option<TopProduct>, StoreError>;

    /// Number of records in `order_events`.
    fn order_event_count(&self) -> Result<usize, StoreError>;

    /// Number of records in `inventory_events`.
    fn inventory_event_count(&self) -> Result<usize, StoreError>;

    /// Append a decoded event to the log of its family.
    fn append(&self, event: &DomainEvent) -> Result<(), StoreError> {
        match event {
            DomainEvent::Order(e) => self.append_order(e),
            DomainEvent::Inventory(e) => self.append_inventory(e),
        }
    }
}

impl<S: EventStore + ?Sized> EventStore for std::sync::Arc<S> {
    fn append_order(&self, event: &OrderEvent) -> Result<(), StoreError> {
        (**self).append_order(event)
    }

    fn append_inventory(&self, event: &InventoryEvent) -> Result<(), StoreError> {
        (**self).append_inventory(event)
    }

    fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderEvent>, StoreError> {
        (**self).find_by_user(user_id)
    }

    fn find_inventory_by_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<InventoryEvent>, StoreError> {
        (**self).find_inventory_by_product(product_id)
    }

    fn aggregate_top_product(&self, user_id: &str) -> Result<Option<TopProduct>, StoreError> {
        (**self).aggregate_top_product(user_id)
    }

    fn order_event_count(&self) -> Result<usize, StoreError> {
        (**self).order_event_count()
    }

    fn inventory_event_count(&self) -> Result<usize, StoreError> {
        (**self).inventory_event_count()
    }
}
