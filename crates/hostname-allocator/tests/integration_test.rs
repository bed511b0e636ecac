//! Integration tests for hostname allocation
//!
//! Most tests run against the mock pod lister. The live-cluster test
//! requires a kubeconfig or in-cluster credentials and is ignored by default.

use hostname_allocator::{
    AllocatorError, ClusterAllocator, HostnameAllocator, KubePodLister, MockPodLister, DEFAULT_POOL_SIZE,
};

/// Allocates once and materializes the result as a pod, like the API server
/// does after the webhook patches it.
async fn admit(allocator: &ClusterAllocator<MockPodLister>, lister: &MockPodLister, deployment: &str, pod: &str) -> u32 {
    let hostname = allocator
        .allocate("default", deployment)
        .await
        .expect("allocation should succeed");
    lister.add_pod(MockPodLister::pod("default", pod, deployment, Some(&hostname.to_string())));
    hostname.number
}

#[tokio::test]
async fn test_sequential_admissions_get_smallest_free_numbers() {
    let lister = MockPodLister::new();
    let allocator = ClusterAllocator::new(lister.clone(), DEFAULT_POOL_SIZE).unwrap();

    let mut numbers = Vec::new();
    for i in 0..DEFAULT_POOL_SIZE {
        numbers.push(admit(&allocator, &lister, "web", &format!("web-pod-{i}")).await);
    }

    assert_eq!(numbers, (1..=DEFAULT_POOL_SIZE).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_fifty_first_admission_is_exhausted() {
    let lister = MockPodLister::new();
    let allocator = ClusterAllocator::new(lister.clone(), DEFAULT_POOL_SIZE).unwrap();
    for i in 0..DEFAULT_POOL_SIZE {
        admit(&allocator, &lister, "web", &format!("web-pod-{i}")).await;
    }

    let err = allocator.allocate("default", "web").await.unwrap_err();
    assert!(
        matches!(err, AllocatorError::Exhausted { capacity: 50, .. }),
        "expected exhaustion, got {err}"
    );
}

#[tokio::test]
async fn test_deleted_pod_releases_its_number() {
    let lister = MockPodLister::new();
    let allocator = ClusterAllocator::new(lister.clone(), DEFAULT_POOL_SIZE).unwrap();
    for name in ["a", "b", "c"] {
        admit(&allocator, &lister, "web", name).await;
    }

    lister.remove_pod("default", "b");

    let hostname = allocator.allocate("default", "web").await.unwrap();
    assert_eq!(hostname.to_string(), "web-2");
}

#[tokio::test]
async fn test_deployments_do_not_contaminate_each_other() {
    let lister = MockPodLister::new();
    let allocator = ClusterAllocator::new(lister.clone(), DEFAULT_POOL_SIZE).unwrap();
    admit(&allocator, &lister, "web", "web-a").await;
    admit(&allocator, &lister, "web", "web-b").await;

    let api = allocator.allocate("default", "api").await.unwrap();
    assert_eq!(api.to_string(), "api-1");
}

#[tokio::test]
async fn test_namespaces_are_listed_separately() {
    let lister = MockPodLister::new();
    lister.add_pod(MockPodLister::pod("staging", "web-a", "web", Some("web-1")));
    let allocator = ClusterAllocator::new(lister.clone(), DEFAULT_POOL_SIZE).unwrap();

    let hostname = allocator.allocate("default", "web").await.unwrap();
    assert_eq!(hostname.number, 1);
    assert_eq!(lister.calls(), vec![("default".to_string(), "app=web".to_string())]);
}

#[tokio::test]
async fn test_unchanged_cluster_gives_same_answer() {
    let lister = MockPodLister::new();
    lister.add_pod(MockPodLister::pod("default", "web-a", "web", Some("web-1")));
    lister.add_pod(MockPodLister::pod("default", "web-b", "web", Some("web-3")));
    let allocator = ClusterAllocator::new(lister, DEFAULT_POOL_SIZE).unwrap();

    let first = allocator.allocate("default", "web").await.unwrap();
    let second = allocator.allocate("default", "web").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "web-2");
}

#[tokio::test]
async fn test_pods_without_hostname_do_not_hold_numbers() {
    let lister = MockPodLister::new();
    lister.add_pod(MockPodLister::pod("default", "web-a", "web", None));
    let allocator = ClusterAllocator::new(lister, DEFAULT_POOL_SIZE).unwrap();

    assert_eq!(allocator.allocate("default", "web").await.unwrap().number, 1);
}

#[tokio::test]
async fn test_list_failure_is_surfaced() {
    let lister = MockPodLister::new();
    lister.fail_with("connection refused");
    let allocator = ClusterAllocator::new(lister, DEFAULT_POOL_SIZE).unwrap();

    let err = allocator.allocate("default", "web").await.unwrap_err();
    assert!(matches!(err, AllocatorError::Kube(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
#[ignore] // Requires a reachable cluster
async fn test_live_cluster_allocation() {
    let client = kube::Client::try_default()
        .await
        .expect("Failed to create Kubernetes client");
    let allocator = ClusterAllocator::new(KubePodLister::new(client), DEFAULT_POOL_SIZE).unwrap();

    let hostname = allocator
        .allocate("default", "hostname-allocator-test")
        .await
        .expect("Failed to allocate hostname");

    println!("Allocated {hostname}");
    assert!((1..=DEFAULT_POOL_SIZE).contains(&hostname.number));
}
