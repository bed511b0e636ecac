//! Mock PodLister for unit testing
//!
//! This module provides an in-memory implementation of [`PodLister`] that can
//! be used in tests without requiring a running cluster.

use crate::allocator::{APP_LABEL, HOSTNAME_LABEL};
use crate::error::AllocatorError;
use crate::pods::PodLister;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock PodLister for testing
///
/// Stores pods per namespace and filters them with equality label selectors
/// (`key=value[,key=value]`). Clones share the same storage, so a test can
/// keep a handle while the allocator owns another.
#[derive(Clone, Debug, Default)]
pub struct MockPodLister {
    pods: Arc<Mutex<HashMap<String, Vec<Pod>>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockPodLister {
    /// Create a new, empty mock lister
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pod to the mock store (namespace taken from its metadata, `default` if unset)
    pub fn add_pod(&self, pod: Pod) {
        let namespace = pod.metadata.namespace.clone().unwrap_or_else(|| "default".to_string());
        lock(&self.pods).entry(namespace).or_default().push(pod);
    }

    /// Remove a pod by name
    pub fn remove_pod(&self, namespace: &str, name: &str) {
        if let Some(pods) = lock(&self.pods).get_mut(namespace) {
            pods.retain(|pod| pod.metadata.name.as_deref() != Some(name));
        }
    }

    /// Make every subsequent list call fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    /// `(namespace, selector)` pairs of every list call so far
    #[must_use]
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    /// Build a pod of deployment `app` carrying `hostname` in its hostname label
    #[must_use]
    pub fn pod(namespace: &str, name: &str, app: &str, hostname: Option<&str>) -> Pod {
        let mut labels = BTreeMap::from([(APP_LABEL.to_string(), app.to_string())]);
        if let Some(hostname) = hostname {
            labels.insert(HOSTNAME_LABEL.to_string(), hostname.to_string());
        }
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn matches_selector(pod: &Pod, selector: &str) -> bool {
    let labels = pod.metadata.labels.clone().unwrap_or_default();
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
            None => labels.contains_key(term),
        })
}

#[async_trait::async_trait]
impl PodLister for MockPodLister {
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, AllocatorError> {
        lock(&self.calls).push((namespace.to_string(), label_selector.to_string()));

        if let Some(message) = lock(&self.failure).clone() {
            return Err(AllocatorError::Kube(kube::Error::Service(message.into())));
        }

        let pods = lock(&self.pods);
        Ok(pods
            .get(namespace)
            .map(|pods| {
                pods.iter()
                    .filter(|pod| matches_selector(pod, label_selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
