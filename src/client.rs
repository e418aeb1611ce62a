//! HTTP client for the operator API server.

pub mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Args, VERSION};
use crate::error::ClientError;
use crate::status::{Status, StatusResponse};
use types::{ShowBackrestResponse, ShowWorkflowResponse};

/// Name sent when backups are selected by label only.
pub const ALL_CLUSTERS: &str = "all";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    /// Path of a PEM file trusted in addition to the system roots.
    pub ca_cert_path: Option<String>,
    pub timeout: Duration,
    /// Reported to the server, which rejects mismatched clients.
    pub client_version: String,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            ca_cert_path: None,
            timeout: Duration::from_secs(30),
            client_version: VERSION.to_string(),
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Self {
            base_url: args.apiserver_url.clone().unwrap_or_default(),
            username: args.username.clone(),
            password: args.password.clone(),
            ca_cert_path: args.pgo_ca_cert.clone(),
            timeout: args.request_timeout(),
            client_version: VERSION.to_string(),
        }
    }
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<SecretString>,
    client_version: String,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10));

        if let Some(path) = settings.ca_cert_path.as_deref().filter(|p| !p.is_empty()) {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read CA certificate {}", path))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .with_context(|| format!("Invalid CA certificate {}", path))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            username: settings.username,
            password: settings.password,
            client_version: settings.client_version,
        })
    }

    pub async fn show_status(&self, namespace: &str) -> Result<StatusResponse> {
        self.get("status", &[("namespace", namespace)]).await
    }

    pub async fn show_workflow(&self, id: &str, namespace: &str) -> Result<ShowWorkflowResponse> {
        let path = format!("workflow/{}", urlencoding::encode(id));
        self.get(&path, &[("namespace", namespace)]).await
    }

    pub async fn show_backrest(
        &self,
        name: &str,
        namespace: &str,
        selector: Option<&str>,
    ) -> Result<ShowBackrestResponse> {
        let path = format!("backrest/{}", urlencoding::encode(name));
        self.get(
            &path,
            &[("namespace", namespace), ("selector", selector.unwrap_or(""))],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Sending request to API server");

        let mut request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("version", self.client_version.as_str())]);
        if let Some(username) = &self.username {
            request = request.basic_auth(
                username,
                self.password.as_ref().map(|p| p.expose_secret().to_string()),
            );
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send HTTP request to {}", url))?;

        status_check(response.status())?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {}", url))
    }
}

fn status_check(status: StatusCode) -> Result<(), ClientError> {
    debug!(status = status.as_u16(), "API server responded");
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => Err(ClientError::AuthenticationFailed(status.as_u16())),
        other => Err(ClientError::InvalidStatusCode(other.as_u16())),
    }
}

/// Turn an `Error` envelope into a [`ClientError::Server`].
pub fn ensure_ok(status: &Status) -> Result<(), ClientError> {
    if status.is_ok() {
        Ok(())
    } else {
        Err(ClientError::Server(status.msg.clone()))
    }
}
