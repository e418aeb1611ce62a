//! Read-only resource listing against the Kubernetes API.

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Node, PersistentVolumeClaim, Pod};
use kube::Api;
use kube::api::ListParams;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::StatusError;
use crate::k8s::resource::{ResourceKind, ResourceList, ResourceQuery};

/// Lists platform objects of one kind by namespace and label selector.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> Result<ResourceList, StatusError>;
}

/// Gateway backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeGateway {
    client: kube::Client,
}

impl KubeGateway {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn namespaced_api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: kube::Resource<Scope = NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

#[async_trait]
impl ResourceGateway for KubeGateway {
    async fn list(&self, query: &ResourceQuery) -> Result<ResourceList, StatusError> {
        let params = list_params(query);
        let namespace = query.namespace.as_deref();

        debug!(
            kind = %query.kind,
            namespace = namespace.unwrap_or("*"),
            selector = query.label_selector.as_deref().unwrap_or(""),
            "Listing resources"
        );

        let result = match query.kind {
            ResourceKind::Pod => list_items(self.namespaced_api::<Pod>(namespace), &params)
                .await
                .map(ResourceList::Pods),
            ResourceKind::Job => list_items(self.namespaced_api::<Job>(namespace), &params)
                .await
                .map(ResourceList::Jobs),
            ResourceKind::PersistentVolumeClaim => list_items(
                self.namespaced_api::<PersistentVolumeClaim>(namespace),
                &params,
            )
            .await
            .map(ResourceList::Claims),
            ResourceKind::Deployment => {
                list_items(self.namespaced_api::<Deployment>(namespace), &params)
                    .await
                    .map(ResourceList::Deployments)
            }
            ResourceKind::Node => list_items(Api::<Node>::all(self.client.clone()), &params)
                .await
                .map(ResourceList::Nodes),
        };

        result.map_err(|e| StatusError::KubernetesApi {
            kind: query.kind,
            message: e.to_string(),
        })
    }
}

async fn list_items<K>(api: Api<K>, params: &ListParams) -> Result<Vec<K>, kube::Error>
where
    K: Clone + DeserializeOwned + std::fmt::Debug,
{
    Ok(api.list(params).await?.items)
}

fn list_params(query: &ResourceQuery) -> ListParams {
    match &query.label_selector {
        Some(selector) => ListParams::default().labels(selector),
        None => ListParams::default(),
    }
}
