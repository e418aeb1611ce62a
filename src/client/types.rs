//! Response documents returned by the operator API server.
//!
//! Envelope fields use the API's PascalCase names. The pgBackRest structs
//! mirror the JSON printed by `pgbackrest info --output=json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::status::Status;
use crate::status::types::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShowWorkflowResponse {
    pub results: ShowWorkflowDetail,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShowWorkflowDetail {
    pub cluster_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShowBackrestResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<ShowBackrestDetail>,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShowBackrestDetail {
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub info: Vec<PgBackRestInfo>,
    pub storage_type: String,
}

/// One stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestInfo {
    #[serde(rename = "archive", deserialize_with = "null_as_default")]
    pub archives: Vec<PgBackRestArchive>,
    #[serde(rename = "backup", deserialize_with = "null_as_default")]
    pub backups: Vec<PgBackRestBackup>,
    pub cipher: String,
    #[serde(deserialize_with = "null_as_default")]
    pub db: Vec<PgBackRestDb>,
    pub name: String,
    pub status: PgBackRestStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestArchive {
    pub database: PgBackRestDatabase,
    pub id: String,
    pub max: String,
    pub min: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestBackup {
    pub archive: PgBackRestBackupArchive,
    pub backrest: PgBackRestVersion,
    pub database: PgBackRestDatabase,
    pub info: PgBackRestBackupInfo,
    pub label: String,
    pub prior: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub reference: Vec<String>,
    pub timestamp: PgBackRestTimestamp,
    #[serde(rename = "type")]
    pub backup_type: String,
}

/// WAL segment range covered by a backup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestBackupArchive {
    pub start: String,
    pub stop: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestVersion {
    pub format: i64,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestDatabase {
    pub id: i64,
    #[serde(rename = "repo-key")]
    pub repo_key: i64,
}

/// Sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestBackupInfo {
    pub delta: i64,
    pub repository: PgBackRestRepository,
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestRepository {
    pub delta: i64,
    pub size: i64,
}

/// Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestTimestamp {
    pub start: i64,
    pub stop: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestDb {
    pub id: i64,
    #[serde(rename = "repo-key")]
    pub repo_key: i64,
    #[serde(rename = "system-id")]
    pub system_id: i64,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgBackRestStatus {
    pub code: i64,
    pub message: String,
}
