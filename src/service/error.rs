//! Error types for the statistics query surface.

use thiserror::Error;

use crate::store::StoreError;

/// Error returned to RPC callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed; nothing was read.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The event store could not be read.
    #[error("statistics unavailable: {0}")]
    StatisticsUnavailable(#[from] StoreError),
}

impl ServiceError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidArgument(_) => 400,
            ServiceError::StatisticsUnavailable(_) => 500,
        }
    }
}

#[cfg(feature = "grpc")]
impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg.clone()),
            ServiceError::StatisticsUnavailable(_) => tonic::Status::internal(err.to_string()),
        }
    }
}
