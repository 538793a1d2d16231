//! Derived, never-persisted statistics views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-user order statistics computed from the order log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserOrderStatistics {
    pub user_id: String,
    pub total_orders: u64,
    pub total_completed_orders: u64,
    pub total_cancelled_orders: u64,
    /// Hour of day (0-23, UTC) to number of order events created in it.
    pub hourly_distribution: BTreeMap<u32, u64>,
    pub most_purchased_item: Option<String>,
    pub average_order_value: f64,
    pub total_items_purchased: i64,
}

impl UserOrderStatistics {
    /// The hour with the most order events, if any.
    ///
    /// Ties resolve to the earliest hour.
    pub fn most_active_hour(&self) -> Option<u32> {
        let mut best: Option<(u32, u64)> = None;
        for (&hour, &count) in &self.hourly_distribution {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((hour, count));
            }
        }
        best.map(|(hour, _)| hour)
    }
}

/// The `GetUserStatistics` view of a user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub user_id: String,
    pub total_users: u64,
    pub user_order_count: u64,
    pub most_active_hour: Option<u32>,
    pub total_completed_orders: u64,
    pub total_items_purchased: i64,
    pub average_order_value: f64,
    pub most_purchased_item: Option<String>,
}

impl From<&UserOrderStatistics> for UserStatistics {
    fn from(stats: &UserOrderStatistics) -> Self {
        Self {
            user_id: stats.user_id.clone(),
            total_users: u64::from(stats.total_orders > 0),
            user_order_count: stats.total_orders,
            most_active_hour: stats.most_active_hour(),
            total_completed_orders: stats.total_completed_orders,
            total_items_purchased: stats.total_items_purchased,
            average_order_value: stats.average_order_value,
            most_purchased_item: stats.most_purchased_item.clone(),
        }
    }
}

/// Result row of the top-product aggregation over completed orders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: String,
    pub total_quantity: i64,
    pub order_count: u64,
    pub total_spent: f64,
}

impl TopProduct {
    /// Average value of the orders the product appeared in.
    pub fn average_order_value(&self) -> f64 {
        if self.order_count == 0 {
            0.0
        } else {
            self.total_spent / self.order_count as f64
        }
    }
}
