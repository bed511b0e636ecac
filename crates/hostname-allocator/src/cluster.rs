//! Cluster-derived allocation.
//!
//! Nothing is remembered between calls. Each allocation lists the
//! deployment's pods, collects the numbers they already carry (from the
//! `hostname` label and from `spec.hostname`) and returns the smallest free
//! one. Deleted pods release their number automatically.

use crate::allocator::{pool_key, Hostname, HostnameAllocator, APP_LABEL, HOSTNAME_LABEL};
use crate::error::AllocatorError;
use crate::locks::KeyedLocks;
use crate::pods::PodLister;
use crate::suffix::{first_free, parse_suffix};
use k8s_openapi::api::core::v1::Pod;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Allocator that recomputes used numbers from the live pod list.
#[derive(Debug)]
pub struct ClusterAllocator<L> {
    lister: L,
    capacity: u32,
    locks: KeyedLocks,
}

impl<L: PodLister> ClusterAllocator<L> {
    /// Creates an allocator handing out numbers in `1..=capacity`.
    pub fn new(lister: L, capacity: u32) -> Result<Self, AllocatorError> {
        if capacity == 0 {
            return Err(AllocatorError::InvalidCapacity(capacity));
        }
        Ok(Self {
            lister,
            capacity,
            locks: KeyedLocks::new(),
        })
    }
}

/// Collects the hostname numbers already carried by `pods`.
#[must_use]
pub fn used_numbers(pods: &[Pod]) -> BTreeSet<u32> {
    pods.iter()
        .flat_map(|pod| {
            let label = pod.metadata.labels.as_ref().and_then(|labels| labels.get(HOSTNAME_LABEL));
            let spec = pod.spec.as_ref().and_then(|spec| spec.hostname.as_ref());
            label.into_iter().chain(spec)
        })
        .filter_map(|value| parse_suffix(value))
        .collect()
}

#[async_trait::async_trait]
impl<L: PodLister> HostnameAllocator for ClusterAllocator<L> {
    fn strategy(&self) -> &'static str {
        "cluster"
    }

    async fn allocate(&self, namespace: &str, deployment: &str) -> Result<Hostname, AllocatorError> {
        // Held across the list call so two pods of one deployment admitted
        // together cannot observe the same free number
        let _guard = self.locks.lock(&pool_key(namespace, deployment)).await;

        let selector = format!("{APP_LABEL}={deployment}");
        let pods = self.lister.list_pods(namespace, &selector).await?;
        let used = used_numbers(&pods);
        debug!("Deployment {}/{} has {} numbers in use", namespace, deployment, used.len());

        match first_free(&used, self.capacity) {
            Some(number) => Ok(Hostname::new(deployment, number)),
            None => {
                warn!("Hostname pool exhausted for {}/{} ({} in use)", namespace, deployment, self.capacity);
                Err(AllocatorError::Exhausted {
                    deployment: deployment.to_string(),
                    capacity: self.capacity,
                })
            }
        }
    }
}
