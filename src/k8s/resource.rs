//! Resource kinds queried for the status report and their typed listings.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Node, PersistentVolumeClaim, Pod};

use crate::error::StatusError;

/// The closed set of object categories the status report reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pod,
    Job,
    PersistentVolumeClaim,
    Deployment,
    Node,
}

impl ResourceKind {
    /// Nodes are cluster scoped; everything else lives in a namespace.
    pub const fn is_namespaced(self) -> bool {
        !matches!(self, Self::Node)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pod => "pods",
            Self::Job => "jobs",
            Self::PersistentVolumeClaim => "persistentvolumeclaims",
            Self::Deployment => "deployments",
            Self::Node => "nodes",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single list request against the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub kind: ResourceKind,
    /// `None` lists across all namespaces (and is the only option for nodes).
    pub namespace: Option<String>,
    /// `None` matches every object.
    pub label_selector: Option<String>,
}

impl ResourceQuery {
    /// Query scoped to `namespace`. Cluster-scoped kinds ignore the namespace.
    pub fn namespaced(kind: ResourceKind, namespace: &str, label_selector: Option<&str>) -> Self {
        Self {
            kind,
            namespace: kind.is_namespaced().then(|| namespace.to_string()),
            label_selector: label_selector
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    pub fn cluster(kind: ResourceKind) -> Self {
        Self {
            kind,
            namespace: None,
            label_selector: None,
        }
    }
}

/// Objects returned by the gateway, one variant per kind.
#[derive(Debug, Clone)]
pub enum ResourceList {
    Pods(Vec<Pod>),
    Jobs(Vec<Job>),
    Claims(Vec<PersistentVolumeClaim>),
    Deployments(Vec<Deployment>),
    Nodes(Vec<Node>),
}

impl ResourceList {
    pub const fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Pod => Self::Pods(Vec::new()),
            ResourceKind::Job => Self::Jobs(Vec::new()),
            ResourceKind::PersistentVolumeClaim => Self::Claims(Vec::new()),
            ResourceKind::Deployment => Self::Deployments(Vec::new()),
            ResourceKind::Node => Self::Nodes(Vec::new()),
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Pods(_) => ResourceKind::Pod,
            Self::Jobs(_) => ResourceKind::Job,
            Self::Claims(_) => ResourceKind::PersistentVolumeClaim,
            Self::Deployments(_) => ResourceKind::Deployment,
            Self::Nodes(_) => ResourceKind::Node,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Pods(items) => items.len(),
            Self::Jobs(items) => items.len(),
            Self::Claims(items) => items.len(),
            Self::Deployments(items) => items.len(),
            Self::Nodes(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_pods(self) -> Result<Vec<Pod>, StatusError> {
        match self {
            Self::Pods(items) => Ok(items),
            other => Err(other.mismatch(ResourceKind::Pod)),
        }
    }

    pub fn into_jobs(self) -> Result<Vec<Job>, StatusError> {
        match self {
            Self::Jobs(items) => Ok(items),
            other => Err(other.mismatch(ResourceKind::Job)),
        }
    }

    pub fn into_claims(self) -> Result<Vec<PersistentVolumeClaim>, StatusError> {
        match self {
            Self::Claims(items) => Ok(items),
            other => Err(other.mismatch(ResourceKind::PersistentVolumeClaim)),
        }
    }

    pub fn into_deployments(self) -> Result<Vec<Deployment>, StatusError> {
        match self {
            Self::Deployments(items) => Ok(items),
            other => Err(other.mismatch(ResourceKind::Deployment)),
        }
    }

    pub fn into_nodes(self) -> Result<Vec<Node>, StatusError> {
        match self {
            Self::Nodes(items) => Ok(items),
            other => Err(other.mismatch(ResourceKind::Node)),
        }
    }

    fn mismatch(&self, expected: ResourceKind) -> StatusError {
        StatusError::UnexpectedKind {
            expected,
            actual: self.kind(),
        }
    }
}
