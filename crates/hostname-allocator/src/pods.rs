//! Pod listing seam
//!
//! The cluster-derived allocator only needs one Kubernetes call: list the pods
//! of a deployment. This trait abstracts that call so the allocator can be
//! unit tested without a cluster.

use crate::error::AllocatorError;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::debug;

/// Lists pods by label selector.
#[async_trait::async_trait]
pub trait PodLister: Send + Sync {
    /// Lists the pods in `namespace` matching `label_selector` (e.g. `app=web`).
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, AllocatorError>;
}

/// [`PodLister`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubePodLister {
    client: Client,
}

impl KubePodLister {
    /// Creates a lister using the given Kubernetes client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for KubePodLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubePodLister").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl PodLister for KubePodLister {
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, AllocatorError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default().labels(label_selector)).await?;
        debug!("Listed {} pods in {} matching {}", pods.items.len(), namespace, label_selector);
        Ok(pods.items)
    }
}
