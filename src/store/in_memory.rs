//! InMemoryEventStore - vector-backed event logs for tests and development.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::{top_product, EventStore, StoreError};
use crate::domain::{InventoryEvent, OrderEvent, TopProduct};

/// In-memory event store. Clone-friendly via Arc; clones share the logs.
///
/// Reads hold the read guard only while copying out the matching events.
/// An append waits for at most that copy, never for an aggregation.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    orders: Arc<RwLock<Vec<OrderEvent>>>,
    inventory: Arc<RwLock<Vec<InventoryEvent>>>,
}

impl InMemoryEventStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every order event, in append order.
    pub fn order_events(&self) -> Result<Vec<OrderEvent>, StoreError> {
        Ok(self.read_orders()?.clone())
    }

    /// Every inventory event, in append order.
    pub fn inventory_events(&self) -> Result<Vec<InventoryEvent>, StoreError> {
        Ok(self.read_inventory()?.clone())
    }

    fn read_orders(&self) -> Result<RwLockReadGuard<'_, Vec<OrderEvent>>, StoreError> {
        self.orders
            .read()
            .map_err(|_| StoreError::LockPoisoned("read order_events"))
    }

    fn read_inventory(&self) -> Result<RwLockReadGuard<'_, Vec<InventoryEvent>>, StoreError> {
        self.inventory
            .read()
            .map_err(|_| StoreError::LockPoisoned("read inventory_events"))
    }
}

impl EventStore for InMemoryEventStore {
    fn append_order(&self, event: &OrderEvent) -> Result<(), StoreError> {
        self.orders
            .write()
            .map_err(|_| StoreError::LockPoisoned("append order_events"))?
            .push(event.clone());
        Ok(())
    }

    fn append_inventory(&self, event: &InventoryEvent) -> Result<(), StoreError> {
        self.inventory
            .write()
            .map_err(|_| StoreError::LockPoisoned("append inventory_events"))?
            .push(event.clone());
        Ok(())
    }

    fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderEvent>, StoreError> {
        Ok(self
            .read_orders()?
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    fn find_inventory_by_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<InventoryEvent>, StoreError> {
        Ok(self
            .read_inventory()?
            .iter()
            .filter(|e| e.product_id == product_id)
            .cloned()
            .collect())
    }

    fn aggregate_top_product(&self, user_id: &str) -> Result<Option<TopProduct>, StoreError> {
        let orders = self.find_by_user(user_id)?;
        Ok(top_product(&orders))
    }

    fn order_event_count(&self) -> Result<usize, StoreError> {
        Ok(self.read_orders()?.len())
    }

    fn inventory_event_count(&self) -> Result<usize, StoreError> {
        Ok(self.read_inventory()?.len())
    }
}
