//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use statistics_service::service::http;
use statistics_service::store::EventStore;
use statistics_service::wire::{encode_inventory_event, encode_order_event};
use statistics_service::{EventKind, InMemoryEventStore, InventoryEvent, OrderStatus, StatisticsService};

use crate::support::{order, seeded_store, UnavailableStore};

/// Bind to port 0 and return the base URL.
async fn start_server<S: EventStore + 'static>(store: S) -> String {
    let app = http::router(Arc::new(StatisticsService::new(store)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let base = start_server(seeded_store()).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["order_events"], 3);
}

#[tokio::test]
async fn order_statistics() {
    let base = start_server(seeded_store()).await;

    let resp = reqwest::get(format!("{base}/users/u1/order-statistics"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total_orders"], 3);
    assert_eq!(body["total_completed_orders"], 2);
    assert_eq!(body["total_cancelled_orders"], 1);
    assert_eq!(body["hourly_distribution"]["9"], 2);
    assert_eq!(body["hourly_distribution"]["14"], 1);
}

#[tokio::test]
async fn user_statistics() {
    let base = start_server(seeded_store()).await;

    let resp = reqwest::get(format!("{base}/users/u1/statistics")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["most_active_hour"], 9);
    assert_eq!(body["most_purchased_item"], "p1");
}

#[tokio::test]
async fn store_failure_returns_500() {
    let base = start_server(UnavailableStore).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/users/u1/statistics"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("statistics unavailable"));

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let base = start_server(seeded_store()).await;

    let resp = reqwest::get(format!("{base}/users")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn posted_order_event_is_ingested() {
    let base = start_server(InMemoryEventStore::new()).await;
    let client = reqwest::Client::new();
    let payload = encode_order_event(&order("e-9", "u9", OrderStatus::Completed, 11, &[("p7", 3, 2.5)]));

    let resp = client
        .post(format!("{base}/events/order.events"))
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["event_id"], "e-9");
    assert_eq!(body["kind"], "order.created");

    let resp = reqwest::get(format!("{base}/users/u9/statistics")).await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user_order_count"], 1);
    assert_eq!(body["most_active_hour"], 11);
    assert_eq!(body["most_purchased_item"], "p7");
}

#[tokio::test]
async fn ingest_rejections_map_to_client_errors() {
    let base = start_server(InMemoryEventStore::new()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/events/order.events"))
        .body(vec![0xff, 0xff, 0xff])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{base}/events/payments.events"))
        .body(Vec::new())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let at = Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap();
    let free = InventoryEvent {
        event_id: "i-1".into(),
        product_id: "p1".into(),
        category_id: "c1".into(),
        name: "widget".into(),
        description: String::new(),
        price: 0.0,
        quantity: 5,
        created_at: at,
        updated_at: at,
        kind: EventKind::InventoryCreated,
    };
    let resp = client
        .post(format!("{base}/events/inventory.events"))
        .body(encode_inventory_event(&free))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["order_events"], 0);
    assert_eq!(body["inventory_events"], 0);
}
