//! Pod Hostname Allocation
//!
//! Assigns each pod of a deployment a small numeric suffix drawn from a
//! fixed pool (`1..=50` by default), producing hostnames such as `web-3`.
//!
//! # Example
//!
//! ```no_run
//! use hostname_allocator::{ClusterAllocator, HostnameAllocator, KubePodLister, DEFAULT_POOL_SIZE};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let allocator = ClusterAllocator::new(KubePodLister::new(client), DEFAULT_POOL_SIZE)?;
//!
//! let hostname = allocator.allocate("default", "web").await?;
//! println!("next hostname: {hostname}");
//! # Ok(())
//! # }
//! ```
//!
//! # Strategies
//!
//! - **Cluster-derived** ([`ClusterAllocator`]): lists the deployment's pods on
//!   every call and picks the smallest number not already carried by one of
//!   them. Numbers are reclaimed as soon as pods disappear.
//! - **In-memory** ([`MemoryAllocator`]): keeps an occupancy set per
//!   deployment for the process lifetime. Numbers are never released.

pub mod allocator;
pub mod cluster;
pub mod error;
pub mod locks;
pub mod memory;
pub mod pods;
pub mod suffix;
#[cfg(feature = "test-util")]
pub mod mock;

pub use allocator::{pool_key, Hostname, HostnameAllocator, APP_LABEL, DEFAULT_POOL_SIZE, HOSTNAME_LABEL};
pub use cluster::{used_numbers, ClusterAllocator};
pub use error::AllocatorError;
pub use locks::KeyedLocks;
pub use memory::MemoryAllocator;
pub use pods::{KubePodLister, PodLister};
pub use suffix::{first_free, parse_suffix};
#[cfg(feature = "test-util")]
pub use mock::MockPodLister;
