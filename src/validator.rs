//! Business rules an event must satisfy before it is recorded.
//!
//! Validation is pure: the same event always yields the same verdict.

use thiserror::Error;

use crate::domain::{is_zero_timestamp, DomainEvent, EventKind, InventoryEvent};

/// Reason an event was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown event kind")]
    UnknownKind,
    #[error("created inventory event has non-positive price {0}")]
    NonPositivePrice(f64),
    #[error("created inventory event has non-positive quantity {0}")]
    NonPositiveQuantity(i32),
    #[error("created inventory event has a zero creation timestamp")]
    ZeroCreatedAt,
}

/// Accept or reject an event.
pub fn validate(event: &DomainEvent) -> Result<(), ValidationError> {
    if event.kind() == EventKind::Unknown {
        return Err(ValidationError::UnknownKind);
    }
    match event {
        DomainEvent::Inventory(inventory) if inventory.kind == EventKind::InventoryCreated => {
            validate_created_inventory(inventory)
        }
        // Order statuses outside the known set are kept for forward compatibility.
        _ => Ok(()),
    }
}

fn validate_created_inventory(event: &InventoryEvent) -> Result<(), ValidationError> {
    if event.price <= 0.0 || event.price.is_nan() {
        return Err(ValidationError::NonPositivePrice(event.price));
    }
    if event.quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity(event.quantity));
    }
    if is_zero_timestamp(&event.created_at) {
        return Err(ValidationError::ZeroCreatedAt);
    }
    Ok(())
}
