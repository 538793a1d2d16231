//! Query service - the read path exposed to the gateway.
//!
//! ```text
//!   gRPC (tonic) ──┐
//!                  ├──► StatisticsService ──► StatisticsEngine ──► EventStore
//!   HTTP (axum) ───┘
//! ```
//!
//! [`StatisticsService`] owns the request validation and error mapping; the
//! transports are thin adapters behind the `grpc` and `http` features.

mod error;
mod query;

#[cfg(feature = "grpc")]
pub mod grpc;
#[cfg(feature = "http")]
pub mod http;

pub use error::ServiceError;
pub use query::StatisticsService;

#[cfg(feature = "grpc")]
pub use grpc::{grpc_server, serve_grpc, serve_grpc_with_shutdown, GrpcHandler};
#[cfg(feature = "http")]
pub use http::{router, serve};
