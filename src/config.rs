//! Configuration for the statistics service binary.
//!
//! Loads configuration from environment variables with defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::subscriber::SubscriberConfig;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// gRPC listen address (`GRPC_ADDR`)
    pub grpc_addr: String,
    /// Optional HTTP listen address (`HTTP_ADDR`)
    pub http_addr: Option<String>,
    /// Directory for the durable event logs (`DATA_DIR`); in-memory when unset
    pub data_dir: Option<PathBuf>,
    /// Subscription pattern for order events (`ORDER_TOPIC`)
    pub order_topic: String,
    /// Subscription pattern for inventory events (`INVENTORY_TOPIC`)
    pub inventory_topic: String,
    /// Competing workers per subscription (`SUBSCRIBER_WORKERS`)
    pub subscriber_workers: usize,
    /// Poll timeout in milliseconds (`POLL_INTERVAL_MS`)
    pub poll_interval_ms: u64,
    /// Kafka/Redpanda bootstrap servers (`KAFKA_BROKERS`); in-process bus when unset
    pub kafka_brokers: Option<String>,
    /// Consumer group prefix (`KAFKA_GROUP_ID`)
    pub kafka_group_id: String,
    /// Start position for a new consumer group (`KAFKA_AUTO_OFFSET_RESET`)
    pub kafka_auto_offset_reset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            grpc_addr: var("GRPC_ADDR").unwrap_or_else(|| "0.0.0.0:8083".to_string()),
            http_addr: var("HTTP_ADDR").filter(|s| !s.is_empty()),
            data_dir: var("DATA_DIR").filter(|s| !s.is_empty()).map(PathBuf::from),
            order_topic: var("ORDER_TOPIC").unwrap_or_else(|| "order.*".to_string()),
            inventory_topic: var("INVENTORY_TOPIC").unwrap_or_else(|| "inventory.*".to_string()),
            subscriber_workers: var("SUBSCRIBER_WORKERS")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(4),
            poll_interval_ms: var("POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
            kafka_brokers: var("KAFKA_BROKERS").filter(|s| !s.is_empty()),
            kafka_group_id: var("KAFKA_GROUP_ID")
                .unwrap_or_else(|| "statistics-service".to_string()),
            kafka_auto_offset_reset: var("KAFKA_AUTO_OFFSET_RESET")
                .unwrap_or_else(|| "earliest".to_string()),
        }
    }

    /// Subscriber settings derived from this configuration.
    pub fn subscriber_config(&self) -> SubscriberConfig {
        SubscriberConfig {
            order_pattern: self.order_topic.clone(),
            inventory_pattern: self.inventory_topic.clone(),
            workers_per_topic: self.subscriber_workers,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default `statistics_service=info` filter. Calling
/// this more than once is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statistics_service=info".into()),
        )
        .with_target(false)
        .try_init();
}
