//! Allocator trait and shared types.

use crate::error::AllocatorError;
use std::fmt;

/// Number of hostname suffixes available to each deployment.
pub const DEFAULT_POOL_SIZE: u32 = 50;

/// Pod label carrying the deployment name.
pub const APP_LABEL: &str = "app";

/// Pod label the webhook writes the allocated hostname into.
pub const HOSTNAME_LABEL: &str = "hostname";

/// An allocated hostname: `<deployment>-<number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hostname {
    /// Deployment the number was allocated for (may be empty)
    pub deployment: String,
    /// Allocated number, `1..=capacity`
    pub number: u32,
}

impl Hostname {
    /// Creates a hostname for `deployment` with suffix `number`.
    pub fn new(deployment: impl Into<String>, number: u32) -> Self {
        Self {
            deployment: deployment.into(),
            number,
        }
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.deployment, self.number)
    }
}

/// Key identifying one deployment's pool.
#[must_use]
pub fn pool_key(namespace: &str, deployment: &str) -> String {
    format!("{namespace}/{deployment}")
}

/// Hands out hostname numbers for deployments.
///
/// Implementations must be `Send + Sync` so a single instance can be shared
/// across request handlers behind an `Arc`.
#[async_trait::async_trait]
pub trait HostnameAllocator: Send + Sync {
    /// Short name of the strategy, for logging
    fn strategy(&self) -> &'static str;

    /// Allocates the smallest free number for `deployment` in `namespace`.
    async fn allocate(&self, namespace: &str, deployment: &str) -> Result<Hostname, AllocatorError>;
}
