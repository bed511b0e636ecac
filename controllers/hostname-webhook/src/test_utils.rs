//! Test utilities for driving the webhook router
//!
//! This module provides helpers for building admission reviews and sending
//! them through the router without a TLS listener.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a Pod manifest, optionally labelled `app=<app>`
pub fn pod_json(name: &str, app: Option<&str>) -> Value {
    let mut pod = json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": name},
        "spec": {"containers": [{"name": "main", "image": "nginx:latest"}]}
    });
    if let Some(app) = app {
        pod["metadata"]["labels"] = json!({"app": app});
    }
    pod
}

/// Helper to wrap a pod in a v1beta1 AdmissionReview CREATE request
pub fn review_json(uid: &str, namespace: &str, pod: Value) -> Value {
    json!({
        "apiVersion": "admission.k8s.io/v1beta1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uid,
            "kind": {"group": "", "version": "v1", "kind": "Pod"},
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "namespace": namespace,
            "operation": "CREATE",
            "userInfo": {"username": "system:serviceaccount:kube-system:replicaset-controller"},
            "object": pod,
            "dryRun": false
        }
    })
}

/// POST a JSON value to /mutate, returning status and parsed body
pub async fn send(app: Router, review: Value) -> (StatusCode, Value) {
    send_raw(app, review.to_string()).await
}

/// POST a raw body to /mutate, returning status and parsed body
pub async fn send_raw(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mutate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Decode the JSON patch carried by an admission response
pub fn decode_patch(review: &Value) -> Value {
    let bytes = match &review["response"]["patch"] {
        Value::String(encoded) => STANDARD.decode(encoded).unwrap(),
        Value::Array(raw) => raw.iter().map(|b| u8::try_from(b.as_u64().unwrap()).unwrap()).collect(),
        other => panic!("response has no patch: {other}"),
    };
    serde_json::from_slice(&bytes).unwrap()
}
