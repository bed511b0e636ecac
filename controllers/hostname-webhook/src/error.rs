//! Webhook error types.
//!
//! `WebhookError` covers a single admission request and maps onto an HTTP
//! status. `ServerError` covers startup and serving.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hostname_allocator::AllocatorError;
use kube::core::admission::SerializePatchError;
use thiserror::Error;

/// Errors that can occur while handling one admission request.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The body is not a usable admission review
    #[error("invalid admission review: {0}")]
    InvalidReview(String),

    /// The reviewed object is missing or is not a Pod
    #[error("invalid pod object: {0}")]
    InvalidPod(String),

    /// No hostname number could be allocated
    #[error("error getting next hostname: {0}")]
    Allocation(#[from] AllocatorError),

    /// The JSON patch could not be serialized
    #[error("patch serialization error: {0}")]
    Patch(#[from] SerializePatchError),
}

impl WebhookError {
    /// HTTP status returned for this error
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::InvalidReview(_) | WebhookError::InvalidPod(_) => StatusCode::BAD_REQUEST,
            WebhookError::Allocation(_) | WebhookError::Patch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

/// Errors that can stop the webhook server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Kubernetes client could not be created
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Allocator could not be constructed
    #[error("Allocator error: {0}")]
    Allocator(#[from] AllocatorError),

    /// Certificate or key could not be loaded
    #[error("TLS configuration error: {0}")]
    Tls(#[source] std::io::Error),

    /// Listener failed
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
