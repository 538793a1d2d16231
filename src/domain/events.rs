//! Order and inventory events as recorded in the append-only logs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to the entity an event describes.
///
/// Closed set of kinds the pipeline understands. Wire codes outside the
/// known range decode to `Unknown`, which validation rejects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    OrderCreated,
    OrderUpdated,
    OrderCancelled,
    OrderDeleted,
    InventoryCreated,
    InventoryUpdated,
    InventoryDeleted,
    Unknown,
}

impl EventKind {
    /// Stable name used in logs and documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::OrderCreated => "order.created",
            EventKind::OrderUpdated => "order.updated",
            EventKind::OrderCancelled => "order.cancelled",
            EventKind::OrderDeleted => "order.deleted",
            EventKind::InventoryCreated => "inventory.created",
            EventKind::InventoryUpdated => "inventory.updated",
            EventKind::InventoryDeleted => "inventory.deleted",
            EventKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an order at the time the event was published.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
    /// A status code this service does not know yet, kept verbatim.
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i32,
    pub price: f64,
}

/// Snapshot of an order at one point in its history.
///
/// `total` is stored as produced upstream and never recomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: String,
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub kind: EventKind,
}

impl OrderEvent {
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}

/// Snapshot of a product after a catalogue or stock change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryEvent {
    pub event_id: String,
    pub product_id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub kind: EventKind,
}

/// A decoded event of either family.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Order(OrderEvent),
    Inventory(InventoryEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::Order(e) => e.kind,
            DomainEvent::Inventory(e) => e.kind,
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            DomainEvent::Order(e) => &e.event_id,
            DomainEvent::Inventory(e) => &e.event_id,
        }
    }

    /// Fill in the event id when the producer left it blank.
    pub fn with_fallback_id(mut self, id: &str) -> Self {
        let slot = match &mut self {
            DomainEvent::Order(e) => &mut e.event_id,
            DomainEvent::Inventory(e) => &mut e.event_id,
        };
        if slot.is_empty() {
            *slot = id.to_string();
        }
        self
    }
}

/// Whether a timestamp is the zero value (absent on the wire).
pub fn is_zero_timestamp(at: &DateTime<Utc>) -> bool {
    *at == DateTime::<Utc>::UNIX_EPOCH
}
