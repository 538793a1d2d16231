//! HTTP transport for the statistics queries.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - returns `{ "ok": true, "order_events": n, "inventory_events": n }`.
//! - `GET /users/:user_id/order-statistics` - [`UserOrderStatistics`] as JSON.
//! - `GET /users/:user_id/statistics` - [`UserStatistics`] as JSON.
//! - `POST /events/:topic` - ingest one protobuf-encoded event published on
//!   `topic` (e.g. `order.events`). 202 when stored, 400 when undecodable,
//!   422 when rejected by validation.
//!
//! Errors are `{ "error": "..." }` with 400 for a bad request and 500 when
//! the store cannot be read.
//!
//! [`UserOrderStatistics`]: crate::domain::UserOrderStatistics
//! [`UserStatistics`]: crate::domain::UserStatistics

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::error::ServiceError;
use super::query::StatisticsService;
use crate::bus::Message;
use crate::store::EventStore;
use crate::subscriber::{ingest, IngestError};

/// Build an axum `Router` serving the statistics queries.
pub fn router<S: EventStore + 'static>(service: Arc<StatisticsService<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<S>))
        .route(
            "/users/:user_id/order-statistics",
            get(order_statistics_handler::<S>),
        )
        .route("/users/:user_id/statistics", get(user_statistics_handler::<S>))
        .route("/events/:topic", post(ingest_handler::<S>))
        .with_state(service)
}

/// Serve the HTTP transport at the given address (e.g. `"0.0.0.0:8084"`).
pub async fn serve<S: EventStore + 'static>(
    service: Arc<StatisticsService<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health_handler<S: EventStore + 'static>(
    State(service): State<Arc<StatisticsService<S>>>,
) -> Response {
    let store = service.engine().store();
    match (store.order_event_count(), store.inventory_event_count()) {
        (Ok(orders), Ok(inventory)) => Json(json!({
            "ok": true,
            "order_events": orders,
            "inventory_events": inventory,
        }))
        .into_response(),
        (Err(e), _) | (_, Err(e)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ok": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn order_statistics_handler<S: EventStore + 'static>(
    State(service): State<Arc<StatisticsService<S>>>,
    Path(user_id): Path<String>,
) -> Response {
    respond(service.get_user_order_statistics(&user_id))
}

async fn user_statistics_handler<S: EventStore + 'static>(
    State(service): State<Arc<StatisticsService<S>>>,
    Path(user_id): Path<String>,
) -> Response {
    respond(service.get_user_statistics(&user_id))
}

async fn ingest_handler<S: EventStore + 'static>(
    State(service): State<Arc<StatisticsService<S>>>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Response {
    let message = Message::on_topic(topic, body.to_vec());
    match ingest(service.engine().store(), &message) {
        Ok(event) => (
            StatusCode::ACCEPTED,
            Json(json!({ "event_id": event.event_id(), "kind": event.kind().as_str() })),
        )
            .into_response(),
        Err(e) => {
            let status = match &e {
                IngestError::Decode(_) => StatusCode::BAD_REQUEST,
                IngestError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                IngestError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!(topic = %message.topic, error = %e, "ingest request failed");
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

fn respond<T: Serialize>(result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({ "error": e.to_string() });
            (status, Json(body)).into_response()
        }
    }
}
