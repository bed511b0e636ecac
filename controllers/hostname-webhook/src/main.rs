//! Pod Hostname Webhook
//!
//! Mutating admission webhook that gives every pod of a deployment a numbered
//! hostname (`<deployment>-<n>`, `n` in `1..=50`) so replicas get stable,
//! human-readable names:
//! - Reads the deployment name from the pod's `app` label
//! - Allocates the smallest free number for that deployment
//! - Patches `/metadata/labels/hostname` (or `/spec/hostname`)

mod config;
mod error;
mod mutate;
mod server;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use crate::config::{AllocatorKind, WebhookConfig};
use crate::error::ServerError;
use crate::mutate::WebhookState;
use hostname_allocator::{ClusterAllocator, HostnameAllocator, KubePodLister, MemoryAllocator};
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Pod Hostname Webhook");

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed, keeping it");
    }

    let config = WebhookConfig::from_env()?;

    info!("Configuration:");
    info!("  Listen address: {}", config.bind_addr);
    info!("  TLS certificate: {}", config.tls_cert.display());
    info!("  TLS key: {}", config.tls_key.display());
    info!("  Patch target: {}", config.patch_target.pointer());
    info!("  Pool size: {}", config.pool_size);

    let allocator = build_allocator(&config).await?;
    info!("  Allocator: {}", allocator.strategy());

    let state = Arc::new(WebhookState::new(allocator, config.patch_target));
    server::serve(&config, state).await
}

async fn build_allocator(config: &WebhookConfig) -> Result<Arc<dyn HostnameAllocator>, ServerError> {
    match config.allocator {
        AllocatorKind::Cluster => {
            let client = Client::try_default().await?;
            Ok(Arc::new(ClusterAllocator::new(KubePodLister::new(client), config.pool_size)?))
        }
        AllocatorKind::Memory => {
            warn!("In-memory allocation never releases numbers and is not shared between replicas");
            Ok(Arc::new(MemoryAllocator::new(config.pool_size)?))
        }
    }
}
