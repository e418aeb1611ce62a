//! Summary metrics derived from one resource listing each.
//!
//! Every function here is pure: the composer fetches the listing and decides
//! what to substitute when a function (or the fetch) fails.

use std::collections::{BTreeMap, HashMap};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Node, PersistentVolumeClaim, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use tracing::debug;

use crate::error::StatusError;
use crate::quantity;
use crate::status::types::{KeyValue, NodeInfo};

const RUNNING_PHASE: &str = "Running";
const STORAGE_RESOURCE: &str = "storage";

/// Start time of the first operator pod in the `Running` phase.
///
/// Running pods that do not report a start time yet are skipped.
pub fn operator_start(pods: &[Pod]) -> Result<String, StatusError> {
    pods.iter()
        .filter_map(|pod| pod.status.as_ref())
        .filter(|status| status.phase.as_deref() == Some(RUNNING_PHASE))
        .find_map(|status| status.start_time.as_ref().and_then(format_time))
        .ok_or(StatusError::NoRunningOperatorPod)
}

/// Backup jobs are counted regardless of completion.
pub fn backup_count(jobs: &[Job]) -> usize {
    jobs.len()
}

pub fn claim_count(claims: &[PersistentVolumeClaim]) -> usize {
    claims.len()
}

pub fn database_count(deployments: &[Deployment]) -> usize {
    deployments.len()
}

/// Sum of reported storage capacity across claims, rendered once at the end.
pub fn volume_capacity(claims: &[PersistentVolumeClaim]) -> Result<String, StatusError> {
    let mut total: i64 = 0;
    for claim in claims {
        let bytes = claim_capacity_bytes(claim)?;
        total = total
            .checked_add(bytes)
            .ok_or_else(|| StatusError::InvalidQuantity("total capacity overflow".to_string()))?;
    }

    let rendered = quantity::format_binary_si(total);
    debug!(total_bytes = total, capacity = %rendered, "Summed claim capacity");
    Ok(rendered)
}

/// Storage capacity from the claim status; unbound claims report none.
pub fn claim_capacity_bytes(claim: &PersistentVolumeClaim) -> Result<i64, StatusError> {
    claim
        .status
        .as_ref()
        .and_then(|status| status.capacity.as_ref())
        .and_then(|capacity| capacity.get(STORAGE_RESOURCE))
        .map_or(Ok(0), |qty| quantity::parse_bytes(&qty.0))
}

/// Occurrences of each container image across pods.
pub fn image_tags(pods: &[Pod]) -> BTreeMap<String, usize> {
    let mut tags = BTreeMap::new();
    for spec in pods.iter().filter_map(|pod| pod.spec.as_ref()) {
        for container in &spec.containers {
            *tags
                .entry(container.image.clone().unwrap_or_default())
                .or_insert(0) += 1;
        }
    }
    tags
}

/// Pod name once per container status reporting `ready=false`.
pub fn not_ready(pods: &[Pod]) -> Vec<String> {
    let mut names = Vec::new();
    for pod in pods {
        let statuses = pod
            .status
            .as_ref()
            .and_then(|status| status.container_statuses.as_deref())
            .unwrap_or_default();
        for _ in statuses.iter().filter(|c| !c.ready) {
            names.push(pod.metadata.name.clone().unwrap_or_default());
        }
    }
    names
}

/// Name, labels and status for each node.
///
/// Status is the type of the *last* condition in the node's list, not a
/// lookup of the `Ready` condition.
pub fn node_inventory(nodes: &[Node]) -> Vec<NodeInfo> {
    nodes
        .iter()
        .map(|node| NodeInfo {
            name: node.metadata.name.clone().unwrap_or_default(),
            labels: node.metadata.labels.clone().unwrap_or_default(),
            status: node
                .status
                .as_ref()
                .and_then(|status| status.conditions.as_ref())
                .and_then(|conditions| conditions.last())
                .map(|condition| condition.type_.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// `key=value` label occurrences over deployments, highest count first.
///
/// Equal counts are ordered by label text.
pub fn label_histogram(deployments: &[Deployment]) -> Vec<KeyValue> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for labels in deployments.iter().filter_map(|d| d.metadata.labels.as_ref()) {
        for (key, value) in labels {
            *counts.entry(format!("{key}={value}")).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<KeyValue> = counts
        .into_iter()
        .map(|(label, count)| KeyValue::new(label, count))
        .collect();
    ranked.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    ranked
}

/// RFC 3339 rendering of a Kubernetes timestamp.
fn format_time(time: &Time) -> Option<String> {
    serde_json::to_value(time)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
}
