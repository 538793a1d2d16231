//! Stores for exercising the query surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use statistics_service::store::top_product;
use statistics_service::{
    EventKind, EventStore, InMemoryEventStore, InventoryEvent, OrderEvent, OrderItem, OrderStatus,
    StoreError, TopProduct,
};

pub fn order(event_id: &str, user_id: &str, status: OrderStatus, hour: u32, items: &[(&str, i32, f64)]) -> OrderEvent {
    let at = Utc.with_ymd_and_hms(2024, 5, 20, hour, 0, 0).unwrap();
    let items: Vec<OrderItem> = items
        .iter()
        .map(|&(product_id, quantity, price)| OrderItem {
            product_id: product_id.into(),
            quantity,
            price,
        })
        .collect();
    OrderEvent {
        event_id: event_id.into(),
        order_id: format!("order-{event_id}"),
        user_id: user_id.into(),
        total: items.iter().map(|i| i.quantity as f64 * i.price).sum(),
        items,
        status,
        created_at: at,
        updated_at: at,
        kind: EventKind::OrderCreated,
    }
}

/// Three orders for `u1` (completed at 9, completed at 9, cancelled at 14).
pub fn seeded_store() -> InMemoryEventStore {
    let store = InMemoryEventStore::new();
    store
        .append_order(&order("e-1", "u1", OrderStatus::Completed, 9, &[("p1", 2, 10.0)]))
        .unwrap();
    store
        .append_order(&order("e-2", "u1", OrderStatus::Completed, 9, &[("p1", 2, 10.0)]))
        .unwrap();
    store
        .append_order(&order("e-3", "u1", OrderStatus::Cancelled, 14, &[("p2", 1, 5.0)]))
        .unwrap();
    store
}

/// Counts every read and write that reaches the inner store.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: InMemoryEventStore,
    accesses: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.accesses.fetch_add(1, Ordering::SeqCst);
    }
}

impl EventStore for CountingStore {
    fn append_order(&self, event: &OrderEvent) -> Result<(), StoreError> {
        self.touch();
        self.inner.append_order(event)
    }

    fn append_inventory(&self, event: &InventoryEvent) -> Result<(), StoreError> {
        self.touch();
        self.inner.append_inventory(event)
    }

    fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderEvent>, StoreError> {
        self.touch();
        self.inner.find_by_user(user_id)
    }

    fn find_inventory_by_product(&self, product_id: &str) -> Result<Vec<InventoryEvent>, StoreError> {
        self.touch();
        self.inner.find_inventory_by_product(product_id)
    }

    fn aggregate_top_product(&self, user_id: &str) -> Result<Option<TopProduct>, StoreError> {
        self.touch();
        let orders = self.inner.find_by_user(user_id)?;
        Ok(top_product(&orders))
    }

    fn order_event_count(&self) -> Result<usize, StoreError> {
        self.touch();
        self.inner.order_event_count()
    }

    fn inventory_event_count(&self) -> Result<usize, StoreError> {
        self.touch();
        self.inner.inventory_event_count()
    }
}

/// A store whose every read fails.
#[derive(Clone, Default)]
pub struct UnavailableStore;

impl EventStore for UnavailableStore {
    fn append_order(&self, _event: &OrderEvent) -> Result<(), StoreError> {
        Err(StoreError::LockPoisoned("order_events"))
    }

    fn append_inventory(&self, _event: &InventoryEvent) -> Result<(), StoreError> {
        Err(StoreError::LockPoisoned("inventory_events"))
    }

    fn find_by_user(&self, _user_id: &str) -> Result<Vec<OrderEvent>, StoreError> {
        Err(StoreError::LockPoisoned("order_events"))
    }

    fn find_inventory_by_product(&self, _product_id: &str) -> Result<Vec<InventoryEvent>, StoreError> {
        Err(StoreError::LockPoisoned("inventory_events"))
    }

    fn aggregate_top_product(&self, _user_id: &str) -> Result<Option<TopProduct>, StoreError> {
        Err(StoreError::LockPoisoned("order_events"))
    }

    fn order_event_count(&self) -> Result<usize, StoreError> {
        Err(StoreError::LockPoisoned("order_events"))
    }

    fn inventory_event_count(&self) -> Result<usize, StoreError> {
        Err(StoreError::LockPoisoned("inventory_events"))
    }
}
