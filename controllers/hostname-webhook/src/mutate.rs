//! Pod Mutation Webhook
//!
//! Handles AdmissionReview requests for Pods: reads the deployment name from
//! the `app` label, allocates the next free hostname number for it and
//! returns a single JSON patch `add` operation carrying `<deployment>-<n>`.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use hostname_allocator::{Hostname, HostnameAllocator, APP_LABEL, HOSTNAME_LABEL};
use json_patch::{AddOperation, Patch, PatchOperation};
use jsonptr::PointerBuf;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::DynamicObject,
    core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
};
use tracing::{debug, error, info, warn};

use crate::error::WebhookError;

/// Namespace used when neither the request nor the pod names one
const DEFAULT_NAMESPACE: &str = "default";

/// Where the allocated hostname is written in the pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchTarget {
    /// `/metadata/labels/hostname`
    #[default]
    Label,
    /// `/spec/hostname`
    Spec,
}

impl PatchTarget {
    /// JSON pointer of the patched field
    pub fn pointer(self) -> PointerBuf {
        match self {
            PatchTarget::Label => PointerBuf::from_tokens(["metadata", "labels", HOSTNAME_LABEL]),
            PatchTarget::Spec => PointerBuf::from_tokens(["spec", "hostname"]),
        }
    }
}

impl std::str::FromStr for PatchTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(PatchTarget::Label),
            "spec" => Ok(PatchTarget::Spec),
            other => Err(format!("unknown patch target '{other}' (expected 'label' or 'spec')")),
        }
    }
}

/// Shared state for webhook handlers
#[derive(Clone)]
pub struct WebhookState {
    /// Allocator shared by every request
    pub allocator: Arc<dyn HostnameAllocator>,
    /// Field receiving the hostname
    pub patch_target: PatchTarget,
}

impl WebhookState {
    /// Create webhook state around an allocator
    pub fn new(allocator: Arc<dyn HostnameAllocator>, patch_target: PatchTarget) -> Self {
        Self {
            allocator,
            patch_target,
        }
    }
}

impl std::fmt::Debug for WebhookState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookState")
            .field("allocator", &self.allocator.strategy())
            .field("patch_target", &self.patch_target)
            .finish()
    }
}

/// Handle mutating admission review for Pods
///
/// The body is decoded by hand rather than with the `Json` extractor so that
/// every malformed review is answered with 400.
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> Result<Json<AdmissionReview<DynamicObject>>, WebhookError> {
    let review: AdmissionReview<DynamicObject> = serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to decode admission review: {}", e);
        WebhookError::InvalidReview(format!("decode error: {e}"))
    })?;

    let request: AdmissionRequest<DynamicObject> = review.try_into().map_err(|e| {
        warn!("Admission review carries no request: {}", e);
        WebhookError::InvalidReview(format!("{e}"))
    })?;

    let response = mutate_pod(&state, &request).await?;
    Ok(Json(response.into_review()))
}

/// Process a single pod mutation request
async fn mutate_pod(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
) -> Result<AdmissionResponse, WebhookError> {
    let uid = &request.uid;
    let pod = decode_pod(request)?;

    // No validation: a pod without the label allocates against ""
    let deployment = deployment_name(&pod);
    let namespace = request
        .namespace
        .as_deref()
        .or(pod.metadata.namespace.as_deref())
        .unwrap_or(DEFAULT_NAMESPACE);

    debug!("Admission {}: allocating hostname for {}/{}", uid, namespace, deployment);

    let hostname = state.allocator.allocate(namespace, &deployment).await.map_err(|e| {
        error!("Admission {}: failed to allocate hostname for {}/{}: {}", uid, namespace, deployment, e);
        WebhookError::from(e)
    })?;

    info!(
        "Admission {}: assigned {} at {} ({} allocator)",
        uid,
        hostname,
        state.patch_target.pointer(),
        state.allocator.strategy()
    );

    // The number stays claimed even if serialization fails below
    let response = AdmissionResponse::from(request).with_patch(build_patch(state.patch_target, &hostname))?;
    Ok(response)
}

/// Extract the Pod carried by the admission request
fn decode_pod(request: &AdmissionRequest<DynamicObject>) -> Result<Pod, WebhookError> {
    let object = request
        .object
        .as_ref()
        .ok_or_else(|| WebhookError::InvalidPod("admission request carries no object".to_string()))?;

    let value = serde_json::to_value(object).map_err(|e| WebhookError::InvalidPod(format!("unmarshal error: {e}")))?;
    serde_json::from_value(value).map_err(|e| {
        warn!("Admission {}: object is not a Pod: {}", request.uid, e);
        WebhookError::InvalidPod(format!("unmarshal error: {e}"))
    })
}

/// Deployment name from the `app` label, empty when absent
fn deployment_name(pod: &Pod) -> String {
    pod.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(APP_LABEL))
        .cloned()
        .unwrap_or_default()
}

/// Build the single `add` operation writing the hostname
fn build_patch(target: PatchTarget, hostname: &Hostname) -> Patch {
    Patch(vec![PatchOperation::Add(AddOperation {
        path: target.pointer(),
        value: serde_json::Value::String(hostname.to_string()),
    })])
}
