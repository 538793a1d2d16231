//! Protobuf wire schema shared with order-service and inventory-service.
//!
//! Messages are declared with prost derives (standard protobuf wire format,
//! no `.proto` file). Field tags must stay in sync with the producers.

use chrono::{DateTime, Utc};

use crate::domain::{EventKind, InventoryEvent, OrderEvent, OrderItem, OrderStatus};

/// `google.protobuf.Timestamp` layout.
#[derive(Clone, Copy, PartialEq, Eq, prost::Message)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanos: at.timestamp_subsec_nanos() as i32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OrderStatusCode {
    Pending = 0,
    Completed = 1,
    Cancelled = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OrderEventType {
    Created = 0,
    Updated = 1,
    Cancelled = 2,
    Deleted = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum InventoryEventType {
    Created = 0,
    Updated = 1,
    Deleted = 2,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct OrderItemMessage {
    #[prost(string, tag = "1")]
    pub product_id: String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
    #[prost(double, tag = "3")]
    pub price: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct OrderEventMessage {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub user_id: String,
    #[prost(message, repeated, tag = "3")]
    pub items: Vec<OrderItemMessage>,
    #[prost(double, tag = "4")]
    pub total: f64,
    #[prost(enumeration = "OrderStatusCode", tag = "5")]
    pub status: i32,
    #[prost(message, optional, tag = "6")]
    pub created_at: Option<Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub updated_at: Option<Timestamp>,
    #[prost(enumeration = "OrderEventType", tag = "8")]
    pub event_type: i32,
    #[prost(string, tag = "9")]
    pub event_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InventoryEventMessage {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub category_id: String,
    #[prost(double, tag = "5")]
    pub price: f64,
    #[prost(int32, tag = "6")]
    pub quantity: i32,
    #[prost(message, optional, tag = "7")]
    pub created_at: Option<Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub updated_at: Option<Timestamp>,
    #[prost(enumeration = "InventoryEventType", tag = "9")]
    pub event_type: i32,
    #[prost(string, tag = "10")]
    pub event_id: String,
}

// ---------------------------------------------------------------------------
// Producer side: domain -> wire
// ---------------------------------------------------------------------------

fn order_status_code(status: &OrderStatus) -> i32 {
    match status {
        OrderStatus::Pending => OrderStatusCode::Pending as i32,
        OrderStatus::Completed => OrderStatusCode::Completed as i32,
        OrderStatus::Cancelled => OrderStatusCode::Cancelled as i32,
        // Unknown statuses were decoded from their numeric code.
        OrderStatus::Other(raw) => raw.parse().unwrap_or(OrderStatusCode::Pending as i32),
    }
}

fn order_event_type(kind: EventKind) -> i32 {
    match kind {
        EventKind::OrderCreated => OrderEventType::Created as i32,
        EventKind::OrderUpdated => OrderEventType::Updated as i32,
        EventKind::OrderCancelled => OrderEventType::Cancelled as i32,
        EventKind::OrderDeleted => OrderEventType::Deleted as i32,
        _ => -1,
    }
}

fn inventory_event_type(kind: EventKind) -> i32 {
    match kind {
        EventKind::InventoryCreated => InventoryEventType::Created as i32,
        EventKind::InventoryUpdated => InventoryEventType::Updated as i32,
        EventKind::InventoryDeleted => InventoryEventType::Deleted as i32,
        _ => -1,
    }
}

impl From<&OrderEvent> for OrderEventMessage {
    fn from(event: &OrderEvent) -> Self {
        Self {
            id: event.order_id.clone(),
            user_id: event.user_id.clone(),
            items: event
                .items
                .iter()
                .map(|item| OrderItemMessage {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            total: event.total,
            status: order_status_code(&event.status),
            created_at: Some(event.created_at.into()),
            updated_at: Some(event.updated_at.into()),
            event_type: order_event_type(event.kind),
            event_id: event.event_id.clone(),
        }
    }
}

impl From<&InventoryEvent> for InventoryEventMessage {
    fn from(event: &InventoryEvent) -> Self {
        Self {
            id: event.product_id.clone(),
            name: event.name.clone(),
            description: event.description.clone(),
            category_id: event.category_id.clone(),
            price: event.price,
            quantity: event.quantity,
            created_at: Some(event.created_at.into()),
            updated_at: Some(event.updated_at.into()),
            event_type: inventory_event_type(event.kind),
            event_id: event.event_id.clone(),
        }
    }
}

/// Encode an order event the way order-service publishes it.
pub fn encode_order_event(event: &OrderEvent) -> Vec<u8> {
    prost::Message::encode_to_vec(&OrderEventMessage::from(event))
}

/// Encode an inventory event the way inventory-service publishes it.
pub fn encode_inventory_event(event: &InventoryEvent) -> Vec<u8> {
    prost::Message::encode_to_vec(&InventoryEventMessage::from(event))
}

/// Wire form of an order line, for building payloads by hand.
pub fn order_item(product_id: &str, quantity: i32, price: f64) -> OrderItemMessage {
    OrderItemMessage {
        product_id: product_id.to_string(),
        quantity,
        price,
    }
}

impl From<&OrderItemMessage> for OrderItem {
    fn from(item: &OrderItemMessage) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}
