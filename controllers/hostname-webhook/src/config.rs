//! Webhook configuration.
//!
//! Every setting comes from an environment variable with a default, so the
//! webhook runs unconfigured with the conventional in-cluster layout:
//! certificate and key mounted under `/app/tls`, port 8443, cluster-derived
//! allocation of 50 numbers written to the `hostname` label.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use hostname_allocator::DEFAULT_POOL_SIZE;

use crate::error::ServerError;
use crate::mutate::PatchTarget;

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8443";
/// Default PEM certificate path
pub const DEFAULT_TLS_CERT: &str = "/app/tls/tls.crt";
/// Default PEM private key path
pub const DEFAULT_TLS_KEY: &str = "/app/tls/tls.key";

/// Which allocator backs the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocatorKind {
    /// Recompute used numbers from the pod list on every request
    #[default]
    Cluster,
    /// Keep used numbers in process memory
    Memory,
}

impl FromStr for AllocatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cluster" => Ok(AllocatorKind::Cluster),
            "memory" => Ok(AllocatorKind::Memory),
            other => Err(format!("unknown allocator '{other}' (expected 'cluster' or 'memory')")),
        }
    }
}

/// Runtime configuration of the webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Address the HTTPS listener binds
    pub bind_addr: SocketAddr,
    /// PEM certificate path
    pub tls_cert: PathBuf,
    /// PEM private key path
    pub tls_key: PathBuf,
    /// Allocation strategy
    pub allocator: AllocatorKind,
    /// Field receiving the hostname
    pub patch_target: PatchTarget,
    /// Numbers available per deployment
    pub pool_size: u32,
}

impl WebhookConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let bind_addr = parse_var(&lookup, "WEBHOOK_BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let tls_cert = lookup("WEBHOOK_TLS_CERT").unwrap_or_else(|| DEFAULT_TLS_CERT.to_string());
        let tls_key = lookup("WEBHOOK_TLS_KEY").unwrap_or_else(|| DEFAULT_TLS_KEY.to_string());
        let allocator = parse_var(&lookup, "HOSTNAME_ALLOCATOR", "cluster")?;
        let patch_target = parse_var(&lookup, "HOSTNAME_PATCH_TARGET", "label")?;
        let pool_size: u32 = parse_var(&lookup, "HOSTNAME_POOL_SIZE", &DEFAULT_POOL_SIZE.to_string())?;

        if pool_size == 0 {
            return Err(ServerError::InvalidConfig(
                "HOSTNAME_POOL_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            tls_cert: PathBuf::from(tls_cert),
            tls_key: PathBuf::from(tls_key),
            allocator,
            patch_target,
            pool_size,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ServerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.parse()
        .map_err(|e| ServerError::InvalidConfig(format!("{key}={raw}: {e}")))
}
