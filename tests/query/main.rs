//! Query service integration tests.

mod support;

#[cfg(feature = "grpc")]
mod grpc;

#[cfg(feature = "http")]
mod http;
