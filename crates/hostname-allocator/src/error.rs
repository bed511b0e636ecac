//! Allocator errors

use thiserror::Error;

/// Errors that can occur while allocating a hostname number
#[derive(Debug, Error)]
pub enum AllocatorError {
    /// Listing pods through the Kubernetes API failed
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Every number in the pool is already taken for this deployment
    #[error("no available hostname number for deployment '{deployment}' (all {capacity} in use)")]
    Exhausted {
        /// Deployment whose pool is full
        deployment: String,
        /// Size of the pool
        capacity: u32,
    },

    /// A pool must hold at least one number
    #[error("Invalid pool size: {0}")]
    InvalidCapacity(u32),
}
