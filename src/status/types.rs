use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Aggregated inventory for one namespace.
///
/// Field names on the wire follow the operator API (`OperatorStartTime`,
/// `NumBackups`, ...). A default value is the fully degraded report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StatusReport {
    pub operator_start_time: String,
    pub num_backups: usize,
    pub num_claims: usize,
    pub num_databases: usize,
    /// Total claim capacity in canonical binary-SI form.
    pub volume_cap: String,
    /// Container image reference -> occurrences across cluster pods.
    #[serde(deserialize_with = "null_as_default")]
    pub db_tags: BTreeMap<String, usize>,
    /// One entry per not-ready container, so a pod may repeat.
    #[serde(deserialize_with = "null_as_default")]
    pub not_ready: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<NodeInfo>,
    /// `key=value` label counts over deployments, highest count first.
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeInfo {
    pub name: String,
    /// Type of the last condition reported by the node.
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValue {
    pub key: String,
    pub value: usize,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: usize) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Go encoders emit `null` for empty slices and maps.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
