//! gRPC transport for the statistics queries.
//!
//! Requires the `grpc` feature. Uses tonic for the server and prost for
//! message serialization (standard protobuf wire format, no `.proto` file).
//!
//! ## RPCs
//!
//! - `GetUserOrderStatistics` - order counts and hourly distribution.
//! - `GetUserStatistics` - activity summary and most purchased item.
//! - `Health` - liveness plus log sizes.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use statistics_service::service::{self, StatisticsService};
//! use statistics_service::store::InMemoryEventStore;
//!
//! let service = Arc::new(StatisticsService::new(InMemoryEventStore::new()));
//!
//! // Get the server to compose with other tonic routes
//! let grpc_svc = service::grpc_server(service.clone());
//!
//! // Or serve directly
//! service::serve_grpc(service, "0.0.0.0:8083".parse()?).await?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::query::StatisticsService;
use crate::store::EventStore;

// ---------------------------------------------------------------------------
// Message types (prost - standard protobuf wire format)
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserOrderStatisticsRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserOrderStatisticsResponse {
    #[prost(int32, tag = "1")]
    pub total_orders: i32,
    #[prost(int32, tag = "2")]
    pub total_completed_orders: i32,
    #[prost(int32, tag = "3")]
    pub total_cancelled_orders: i32,
    #[prost(map = "uint32, int32", tag = "4")]
    pub hourly_distribution: HashMap<u32, i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserStatisticsRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserStatisticsResponse {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(int32, tag = "2")]
    pub total_users: i32,
    #[prost(int32, tag = "3")]
    pub user_order_count: i32,
    /// Hour of day 0-23; -1 when the user has no orders.
    #[prost(int32, tag = "4")]
    pub most_active_hour: i32,
    #[prost(int32, tag = "5")]
    pub total_completed_orders: i32,
    #[prost(int32, tag = "6")]
    pub total_items_purchased: i32,
    #[prost(double, tag = "7")]
    pub average_order_value: f64,
    #[prost(string, tag = "8")]
    pub most_purchased_item: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthResponse {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(uint64, tag = "2")]
    pub order_events: u64,
    #[prost(uint64, tag = "3")]
    pub inventory_events: u64,
}

// ---------------------------------------------------------------------------
// Generated service trait + server/client
// ---------------------------------------------------------------------------

include!(concat!(env!("OUT_DIR"), "/statistics.StatisticsService.rs"));

pub use statistics_service_client::StatisticsServiceClient;
pub use statistics_service_server::{StatisticsService as StatisticsRpc, StatisticsServiceServer};

// ---------------------------------------------------------------------------
// Handler implementation
// ---------------------------------------------------------------------------

/// gRPC handler wrapping a shared [`StatisticsService`].
pub struct GrpcHandler<S> {
    service: Arc<StatisticsService<S>>,
}

impl<S> GrpcHandler<S> {
    pub fn new(service: Arc<StatisticsService<S>>) -> Self {
        Self { service }
    }
}

fn count(n: impl TryInto<i32>) -> i32 {
    n.try_into().unwrap_or(i32::MAX)
}

#[tonic::async_trait]
impl<S: EventStore + 'static> StatisticsRpc for GrpcHandler<S> {
    async fn get_user_order_statistics(
        &self,
        request: Request<UserOrderStatisticsRequest>,
    ) -> Result<Response<UserOrderStatisticsResponse>, Status> {
        let req = request.into_inner();
        let stats = self.service.get_user_order_statistics(&req.user_id)?;

        Ok(Response::new(UserOrderStatisticsResponse {
            total_orders: count(stats.total_orders),
            total_completed_orders: count(stats.total_completed_orders),
            total_cancelled_orders: count(stats.total_cancelled_orders),
            hourly_distribution: stats
                .hourly_distribution
                .iter()
                .map(|(&hour, &n)| (hour, count(n)))
                .collect(),
        }))
    }

    async fn get_user_statistics(
        &self,
        request: Request<UserStatisticsRequest>,
    ) -> Result<Response<UserStatisticsResponse>, Status> {
        let req = request.into_inner();
        let stats = self.service.get_user_statistics(&req.user_id)?;

        Ok(Response::new(UserStatisticsResponse {
            user_id: stats.user_id,
            total_users: count(stats.total_users),
            user_order_count: count(stats.user_order_count),
            most_active_hour: stats.most_active_hour.map_or(-1, count),
            total_completed_orders: count(stats.total_completed_orders),
            total_items_purchased: count(stats.total_items_purchased),
            average_order_value: stats.average_order_value,
            most_purchased_item: stats.most_purchased_item.unwrap_or_default(),
        }))
    }

    async fn health(
        &self,
        _request: Request<HealthRequest>,
    ) -> Result<Response<HealthResponse>, Status> {
        let store = self.service.engine().store();
        let order_events = store.order_event_count();
        let inventory_events = store.inventory_event_count();

        Ok(Response::new(match (order_events, inventory_events) {
            (Ok(orders), Ok(inventory)) => HealthResponse {
                ok: true,
                order_events: orders as u64,
                inventory_events: inventory as u64,
            },
            _ => HealthResponse {
                ok: false,
                order_events: 0,
                inventory_events: 0,
            },
        }))
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create a `StatisticsServiceServer` from a shared service.
pub fn grpc_server<S: EventStore + 'static>(
    service: Arc<StatisticsService<S>>,
) -> StatisticsServiceServer<GrpcHandler<S>> {
    StatisticsServiceServer::new(GrpcHandler::new(service))
}

/// Bind and serve the gRPC transport at `addr`.
pub async fn serve_grpc<S: EventStore + 'static>(
    service: Arc<StatisticsService<S>>,
    addr: SocketAddr,
) -> Result<(), tonic::transport::Error> {
    tonic::transport::Server::builder()
        .add_service(grpc_server(service))
        .serve(addr)
        .await
}

/// Serve the gRPC transport until `shutdown` resolves.
pub async fn serve_grpc_with_shutdown<S, F>(
    service: Arc<StatisticsService<S>>,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    S: EventStore + 'static,
    F: std::future::Future<Output = ()> + Send,
{
    tonic::transport::Server::builder()
        .add_service(grpc_server(service))
        .serve_with_shutdown(addr, shutdown)
        .await
}
