pub mod bus;
pub mod config;
pub mod decoder;
pub mod domain;
pub mod engine;
pub mod service;
pub mod store;
pub mod subscriber;
pub mod validator;
pub mod wire;

pub use config::{init_tracing, Config};
pub use decoder::{decode, DecodeError};
pub use domain::{
    DomainEvent, EventKind, InventoryEvent, OrderEvent, OrderItem, OrderStatus, TopProduct,
    UserOrderStatistics, UserStatistics,
};
pub use engine::StatisticsEngine;
pub use service::{ServiceError, StatisticsService};
pub use store::{EventStore, FileEventStore, InMemoryEventStore, StoreError};
pub use subscriber::{
    ingest, EventSubscriber, IngestError, SubscriberConfig, SubscriberError, SubscriptionState,
    SubscriptionStats,
};
pub use validator::{validate, ValidationError};
