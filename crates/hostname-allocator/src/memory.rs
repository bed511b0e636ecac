//! In-memory allocation.
//!
//! Occupied numbers live in process memory, keyed by namespace and
//! deployment. The cluster is never consulted, so numbers are never released
//! when pods go away, state is lost on restart, and replicas do not share
//! pools. Exhaustion is reported as an error rather than recycling numbers.

use crate::allocator::{pool_key, Hostname, HostnameAllocator};
use crate::error::AllocatorError;
use crate::suffix::first_free;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Allocator keeping per-deployment occupancy in process memory.
#[derive(Debug)]
pub struct MemoryAllocator {
    capacity: u32,
    pools: Mutex<HashMap<String, BTreeSet<u32>>>,
}

impl MemoryAllocator {
    /// Creates an allocator handing out numbers in `1..=capacity`.
    pub fn new(capacity: u32) -> Result<Self, AllocatorError> {
        if capacity == 0 {
            return Err(AllocatorError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            pools: Mutex::new(HashMap::new()),
        })
    }

    /// Numbers currently held for `deployment` in `namespace`, ascending.
    #[must_use]
    pub fn occupied(&self, namespace: &str, deployment: &str) -> Vec<u32> {
        let pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        pools
            .get(&pool_key(namespace, deployment))
            .map(|used| used.iter().copied().collect())
            .unwrap_or_default()
    }

    fn claim(&self, namespace: &str, deployment: &str) -> Option<u32> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        let used = pools.entry(pool_key(namespace, deployment)).or_default();
        let number = first_free(used, self.capacity)?;
        used.insert(number);
        Some(number)
    }
}

#[async_trait::async_trait]
impl HostnameAllocator for MemoryAllocator {
    fn strategy(&self) -> &'static str {
        "memory"
    }

    async fn allocate(&self, namespace: &str, deployment: &str) -> Result<Hostname, AllocatorError> {
        match self.claim(namespace, deployment) {
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
