//! HTTPS server for the admission webhook.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebhookConfig;
use crate::error::ServerError;
use crate::mutate::{mutate_handler, WebhookState};

/// Create the webhook router
///
/// - POST /mutate - assign a hostname to a Pod
/// - GET /healthz - liveness/readiness probe
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/mutate", post(mutate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the webhook over TLS until the listener fails
pub async fn serve(config: &WebhookConfig, state: Arc<WebhookState>) -> Result<(), ServerError> {
    let tls_config = RustlsConfig::from_pem_file(&config.tls_cert, &config.tls_key)
        .await
        .map_err(ServerError::Tls)?;

    info!("Starting webhook server on https://{}", config.bind_addr);

    axum_server::bind_rustls(config.bind_addr, tls_config)
        .serve(webhook_router(state).into_make_service())
        .await?;

    Ok(())
}
