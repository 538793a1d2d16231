//! StatisticsService - request validation in front of the engine.

use tracing::{info, warn};

use super::error::ServiceError;
use crate::domain::{UserOrderStatistics, UserStatistics};
use crate::engine::StatisticsEngine;
use crate::store::EventStore;

/// The synchronous query surface consumed by the gateway.
///
/// Transport-agnostic: the gRPC and HTTP adapters both call into this.
pub struct StatisticsService<S> {
    engine: StatisticsEngine<S>,
}

impl<S: EventStore> StatisticsService<S> {
    pub fn new(store: S) -> Self {
        Self {
            engine: StatisticsEngine::new(store),
        }
    }

    pub fn engine(&self) -> &StatisticsEngine<S> {
        &self.engine
    }

    /// Order counts and hourly distribution for a user.
    pub fn get_user_order_statistics(
        &self,
        user_id: &str,
    ) -> Result<UserOrderStatistics, ServiceError> {
        require_user_id(user_id)?;
        self.engine
            .compute_user_statistics(user_id)
            .map_err(|e| unavailable("GetUserOrderStatistics", user_id, e.into()))
    }

    /// Activity summary for a user.
    pub fn get_user_statistics(&self, user_id: &str) -> Result<UserStatistics, ServiceError> {
        require_user_id(user_id)?;
        self.engine
            .user_statistics(user_id)
            .map_err(|e| unavailable("GetUserStatistics", user_id, e.into()))
    }
}

fn require_user_id(user_id: &str) -> Result<(), ServiceError> {
    if user_id.is_empty() {
        info!("rejecting statistics request without user id");
        return Err(ServiceError::InvalidArgument("user ID is required".into()));
    }
    Ok(())
}

fn unavailable(rpc: &str, user_id: &str, err: ServiceError) -> ServiceError {
    warn!(rpc, user_id, error = %err, "statistics query failed");
    err
}
