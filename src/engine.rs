//! Statistics engine - per-user statistics computed on read.
//!
//! Nothing is maintained incrementally: every call rescans the user's order
//! events and reruns the top-product aggregation, so events that arrived out
//! of order or concurrently are always reflected.

use std::collections::BTreeMap;

use chrono::Timelike;
use tracing::debug;

use crate::domain::{UserOrderStatistics, UserStatistics};
use crate::store::{EventStore, StoreError};

/// Computes statistics from an [`EventStore`]. Only ever reads.
#[derive(Clone)]
pub struct StatisticsEngine<S> {
    store: S,
}

impl<S: EventStore> StatisticsEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The store this engine reads from.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute a user's order statistics.
    ///
    /// The hourly distribution counts order events of every status, bucketed
    /// by the UTC hour of their creation timestamp. Average order value and
    /// most purchased item come from the completed-orders aggregation; both
    /// reads must succeed or the whole call fails. `user_id` is assumed
    /// non-empty.
    pub fn compute_user_statistics(&self, user_id: &str) -> Result<UserOrderStatistics, StoreError> {
        let events = self.store.find_by_user(user_id)?;

        let mut stats = UserOrderStatistics {
            user_id: user_id.to_string(),
            total_orders: events.len() as u64,
            ..Default::default()
        };
        let mut hourly: BTreeMap<u32, u64> = BTreeMap::new();
        for event in &events {
            if event.is_completed() {
                stats.total_completed_orders += 1;
            } else if event.is_cancelled() {
                stats.total_cancelled_orders += 1;
            }
            *hourly.entry(event.created_at.hour()).or_default() += 1;
        }
        stats.hourly_distribution = hourly;

        if let Some(top) = self.store.aggregate_top_product(user_id)? {
            stats.average_order_value = top.average_order_value();
            stats.total_items_purchased = top.total_quantity;
            stats.most_purchased_item = Some(top.product_id);
        }

        debug!(
            user_id,
            total_orders = stats.total_orders,
            completed = stats.total_completed_orders,
            "computed user statistics"
        );
        Ok(stats)
    }

    /// Compute the `GetUserStatistics` view of a user.
    pub fn user_statistics(&self, user_id: &str) -> Result<UserStatistics, StoreError> {
        self.compute_user_statistics(user_id)
            .map(|stats| UserStatistics::from(&stats))
    }
}
