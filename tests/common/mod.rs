#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Node, PersistentVolumeClaim, Pod};
use prometheus_client::registry::Registry;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use pgo_status::error::StatusError;
use pgo_status::k8s::gateway::ResourceGateway;
use pgo_status::k8s::resource::{ResourceKind, ResourceList, ResourceQuery};
use pgo_status::metrics::Metrics;
use pgo_status::server::api::AppState;
use pgo_status::status::StatusComposer;

/// In-memory gateway keyed by kind and label selector.
#[derive(Default)]
pub struct FakeGateway {
    lists: HashMap<(ResourceKind, Option<String>), ResourceList>,
    failing: HashSet<ResourceKind>,
    pub calls: Mutex<Vec<ResourceQuery>>,
}

impl FakeGateway {
    pub fn with(mut self, kind: ResourceKind, selector: Option<&str>, list: ResourceList) -> Self {
        self.lists.insert((kind, selector.map(str::to_string)), list);
        self
    }

    pub fn failing(mut self, kind: ResourceKind) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ResourceGateway for FakeGateway {
    async fn list(&self, query: &ResourceQuery) -> Result<ResourceList, StatusError> {
        self.calls.lock().unwrap().push(query.clone());
        if self.failing.contains(&query.kind) {
            return Err(StatusError::KubernetesApi {
                kind: query.kind,
                message: "forbidden".to_string(),
            });
        }
        Ok(self
            .lists
            .get(&(query.kind, query.label_selector.clone()))
            .cloned()
            .unwrap_or_else(|| ResourceList::empty(query.kind)))
    }
}

pub fn operator_pod() -> Pod {
    serde_json::from_value(json!({
        "metadata": {"name": "postgres-operator-0", "labels": {"name": "postgres-operator"}},
        "status": {"phase": "Running", "startTime": "2024-05-01T10:00:00Z"}
    }))
    .unwrap()
}

pub fn cluster_pod(name: &str, image: &str, ready: bool) -> Pod {
    serde_json::from_value(json!({
        "metadata": {"name": name, "labels": {"pg-cluster": name}},
        "spec": {"containers": [{"name": "database", "image": image}]},
        "status": {
            "phase": "Running",
            "containerStatuses": [{
                "name": "database", "image": image, "imageID": "", "ready": ready, "restartCount": 0
            }]
        }
    }))
    .unwrap()
}

pub fn backup_job(name: &str) -> Job {
    serde_json::from_value(json!({"metadata": {"name": name, "labels": {"pgbackup": "true"}}}))
        .unwrap()
}

pub fn claim(name: &str, storage: &str) -> PersistentVolumeClaim {
    serde_json::from_value(json!({
        "metadata": {"name": name, "labels": {"pgremove": "true"}},
        "status": {"phase": "Bound", "capacity": {"storage": storage}}
    }))
    .unwrap()
}

pub fn deployment(name: &str) -> Deployment {
    serde_json::from_value(json!({
        "metadata": {"name": name, "labels": {"pg-cluster": name, "vendor": "crunchydata"}}
    }))
    .unwrap()
}

pub fn node(name: &str) -> Node {
    serde_json::from_value(json!({
        "metadata": {"name": name, "labels": {"kubernetes.io/os": "linux"}},
        "status": {"conditions": [
            {"type": "MemoryPressure", "status": "False"},
            {"type": "Ready", "status": "True"}
        ]}
    }))
    .unwrap()
}

/// A namespace with two databases, two claims and one backup.
pub fn populated_gateway() -> FakeGateway {
    let deployments = vec![deployment("hippo"), deployment("rhino")];
    FakeGateway::default()
        .with(
            ResourceKind::Pod,
            Some("name=postgres-operator"),
            ResourceList::Pods(vec![operator_pod()]),
        )
        .with(
            ResourceKind::Pod,
            Some("pg-cluster"),
            ResourceList::Pods(vec![
                cluster_pod("hippo", "crunchy-postgres:13", true),
                cluster_pod("rhino", "crunchy-postgres:13", false),
            ]),
        )
        .with(
            ResourceKind::Job,
            Some("pgbackup"),
            ResourceList::Jobs(vec![backup_job("hippo-backup")]),
        )
        .with(
            ResourceKind::PersistentVolumeClaim,
            Some("pgremove"),
            ResourceList::Claims(vec![claim("hippo", "5Gi"), claim("rhino", "3Gi")]),
        )
        .with(
            ResourceKind::Deployment,
            Some("pg-cluster"),
            ResourceList::Deployments(deployments.clone()),
        )
        .with(
            ResourceKind::Deployment,
            None,
            ResourceList::Deployments(deployments),
        )
        .with(
            ResourceKind::Node,
            None,
            ResourceList::Nodes(vec![node("worker-1")]),
        )
}

pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
}

pub fn test_app(gateway: FakeGateway, watched: Vec<String>) -> TestApp {
    let gateway = Arc::new(gateway);
    let mut registry = Registry::default();
    let metrics = Arc::new(Metrics::new(&mut registry));
    let composer = StatusComposer::new(gateway.clone())
        .with_watched_namespaces(watched)
        .with_metrics(metrics.clone());
    let state = AppState::new(
        Arc::new(composer),
        metrics,
        Arc::new(registry),
        CancellationToken::new(),
    );
    TestApp { state, gateway }
}
