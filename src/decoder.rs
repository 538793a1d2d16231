//! Raw bus payload -> typed domain event.
//!
//! The first token of the topic selects the schema: `order.*` decodes an
//! [`OrderEventMessage`], `inventory.*` an [`InventoryEventMessage`]. Absent
//! fields become zero values and unknown kind codes become
//! [`EventKind::Unknown`]; only structurally broken payloads fail here.

use chrono::{DateTime, Utc};
use prost::Message as _;
use thiserror::Error;

use crate::domain::{DomainEvent, EventKind, InventoryEvent, OrderEvent, OrderItem, OrderStatus};
use crate::wire::{
    InventoryEventMessage, InventoryEventType, OrderEventMessage, OrderEventType,
    OrderStatusCode, Timestamp,
};

/// A payload that could not be turned into a typed event.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no event schema for topic {0:?}")]
    UnknownTopic(String),
    #[error("malformed {schema} payload: {source}")]
    Malformed {
        schema: &'static str,
        #[source]
        source: prost::DecodeError,
    },
    #[error("invalid timestamp (seconds={seconds}, nanos={nanos})")]
    InvalidTimestamp { seconds: i64, nanos: i32 },
}

/// Which event family a topic carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFamily {
    Order,
    Inventory,
}

impl EventFamily {
    /// Resolve the family from a topic such as `order.events`.
    pub fn for_topic(topic: &str) -> Option<Self> {
        match topic.split('.').next() {
            Some("order") => Some(EventFamily::Order),
            Some("inventory") => Some(EventFamily::Inventory),
            _ => None,
        }
    }
}

/// Decode a payload received on `topic`.
pub fn decode(topic: &str, payload: &[u8]) -> Result<DomainEvent, DecodeError> {
    match EventFamily::for_topic(topic) {
        Some(EventFamily::Order) => decode_order(payload).map(DomainEvent::Order),
        Some(EventFamily::Inventory) => decode_inventory(payload).map(DomainEvent::Inventory),
        None => Err(DecodeError::UnknownTopic(topic.to_string())),
    }
}

/// Decode an order event payload.
pub fn decode_order(payload: &[u8]) -> Result<OrderEvent, DecodeError> {
    let message = OrderEventMessage::decode(payload).map_err(|source| DecodeError::Malformed {
        schema: "order event",
        source,
    })?;

    Ok(OrderEvent {
        event_id: message.event_id,
        order_id: message.id,
        user_id: message.user_id,
        items: message.items.iter().map(OrderItem::from).collect(),
        total: message.total,
        status: order_status(message.status),
        created_at: timestamp(message.created_at)?,
        updated_at: timestamp(message.updated_at)?,
        kind: order_kind(message.event_type),
    })
}

/// Decode an inventory event payload.
pub fn decode_inventory(payload: &[u8]) -> Result<InventoryEvent, DecodeError> {
    let message =
        InventoryEventMessage::decode(payload).map_err(|source| DecodeError::Malformed {
            schema: "inventory event",
            source,
        })?;

    Ok(InventoryEvent {
        event_id: message.event_id,
        product_id: message.id,
        category_id: message.category_id,
        name: message.name,
        description: message.description,
        price: message.price,
        quantity: message.quantity,
        created_at: timestamp(message.created_at)?,
        updated_at: timestamp(message.updated_at)?,
        kind: inventory_kind(message.event_type),
    })
}

fn timestamp(ts: Option<Timestamp>) -> Result<DateTime<Utc>, DecodeError> {
    let Some(ts) = ts else {
        return Ok(DateTime::<Utc>::UNIX_EPOCH);
    };
    u32::try_from(ts.nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(ts.seconds, nanos))
        .ok_or(DecodeError::InvalidTimestamp {
            seconds: ts.seconds,
            nanos: ts.nanos,
        })
}

fn order_status(code: i32) -> OrderStatus {
    match OrderStatusCode::try_from(code) {
        Ok(OrderStatusCode::Pending) => OrderStatus::Pending,
        Ok(OrderStatusCode::Completed) => OrderStatus::Completed,
        Ok(OrderStatusCode::Cancelled) => OrderStatus::Cancelled,
        Err(_) => OrderStatus::Other(code.to_string()),
    }
}

fn order_kind(code: i32) -> EventKind {
    match OrderEventType::try_from(code) {
        Ok(OrderEventType::Created) => EventKind::OrderCreated,
        Ok(OrderEventType::Updated) => EventKind::OrderUpdated,
        Ok(OrderEventType::Cancelled) => EventKind::OrderCancelled,
        Ok(OrderEventType::Deleted) => EventKind::OrderDeleted,
        Err(_) => EventKind::Unknown,
    }
}

fn inventory_kind(code: i32) -> EventKind {
    match InventoryEventType::try_from(code) {
        Ok(InventoryEventType::Created) => EventKind::InventoryCreated,
        Ok(InventoryEventType::Updated) => EventKind::InventoryUpdated,
        Ok(InventoryEventType::Deleted) => EventKind::InventoryDeleted,
        Err(_) => EventKind::Unknown,
    }
}
