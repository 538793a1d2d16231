//! gRPC transport integration tests.
//!
//! Starts a tonic gRPC server and exercises it with the generated client.

use std::sync::Arc;

use statistics_service::service::grpc::{
    HealthRequest, StatisticsServiceClient, UserOrderStatisticsRequest, UserStatisticsRequest,
};
use statistics_service::store::EventStore;
use statistics_service::StatisticsService;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

use crate::support::{seeded_store, UnavailableStore};

/// Bind to port 0, spawn the gRPC server, and return a connected client.
async fn start_server<S: EventStore + 'static>(
    store: S,
) -> StatisticsServiceClient<tonic::transport::Channel> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let grpc_svc = statistics_service::service::grpc_server(Arc::new(StatisticsService::new(store)));
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(grpc_svc)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    let endpoint = format!("http://{addr}");
    StatisticsServiceClient::connect(endpoint).await.unwrap()
}

#[tokio::test]
async fn health_check() {
    let mut client = start_server(seeded_store()).await;

    let resp = client.health(HealthRequest {}).await.unwrap().into_inner();

    assert!(resp.ok);
    assert_eq!(resp.order_events, 3);
    assert_eq!(resp.inventory_events, 0);
}

#[tokio::test]
async fn get_user_order_statistics() {
    let mut client = start_server(seeded_store()).await;

    let resp = client
        .get_user_order_statistics(UserOrderStatisticsRequest {
            user_id: "u1".into(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.total_orders, 3);
    assert_eq!(resp.total_completed_orders, 2);
    assert_eq!(resp.total_cancelled_orders, 1);
    assert_eq!(resp.hourly_distribution.len(), 2);
    assert_eq!(resp.hourly_distribution[&9], 2);
    assert_eq!(resp.hourly_distribution[&14], 1);
}

#[tokio::test]
async fn get_user_statistics() {
    let mut client = start_server(seeded_store()).await;

    let resp = client
        .get_user_statistics(UserStatisticsRequest {
            user_id: "u1".into(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.user_id, "u1");
    assert_eq!(resp.total_users, 1);
    assert_eq!(resp.user_order_count, 3);
    assert_eq!(resp.most_active_hour, 9);
    assert_eq!(resp.total_completed_orders, 2);
    assert_eq!(resp.total_items_purchased, 4);
    assert_eq!(resp.average_order_value, 20.0);
    assert_eq!(resp.most_purchased_item, "p1");
}

#[tokio::test]
async fn user_without_orders_has_no_active_hour() {
    let mut client = start_server(seeded_store()).await;

    let resp = client
        .get_user_statistics(UserStatisticsRequest {
            user_id: "nobody".into(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.total_users, 0);
    assert_eq!(resp.most_active_hour, -1);
    assert_eq!(resp.most_purchased_item, "");
}

#[tokio::test]
async fn empty_user_id_is_invalid_argument() {
    let mut client = start_server(seeded_store()).await;

    let status = client
        .get_user_order_statistics(UserOrderStatisticsRequest::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);
    assert_eq!(status.message(), "user ID is required");

    let status = client
        .get_user_statistics(UserStatisticsRequest::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);
}

#[tokio::test]
async fn store_failure_is_internal() {
    let mut client = start_server(UnavailableStore).await;

    let status = client
        .get_user_order_statistics(UserOrderStatisticsRequest {
            user_id: "u1".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::Internal);

    let health = client.health(HealthRequest {}).await.unwrap().into_inner();
    assert!(!health.ok);
}
