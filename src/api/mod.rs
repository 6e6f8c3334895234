//! Client side of the post-fixed interest calculation service.

mod http;

pub use http::HttpBackend;

use crate::core::{CalculationRequest, CalculationResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("invalid endpoint URL: {0}")]
    Endpoint(String),
    #[error("request to calculation service failed: {0}")]
    Transport(String),
    #[error("calculation service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response from calculation service: {0}")]
    Decode(String),
}

/// Something able to run the interest calculation for a set of installments
pub trait CalculationBackend {
    fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse, ApiError>;
}
