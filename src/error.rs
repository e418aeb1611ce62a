//! Custom error types for pgo-status.

use thiserror::Error;

use crate::k8s::resource::ResourceKind;

/// Errors raised while building a status report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Kubernetes API error listing {kind}: {message}")]
    KubernetesApi { kind: ResourceKind, message: String },

    #[error("Timeout listing {kind} after {timeout_ms}ms")]
    Timeout { kind: ResourceKind, timeout_ms: u64 },

    #[error("Listing {kind} was cancelled")]
    Cancelled { kind: ResourceKind },

    #[error("Gateway returned {actual} for a {expected} query")]
    UnexpectedKind {
        expected: ResourceKind,
        actual: ResourceKind,
    },

    #[error("a running postgres-operator pod is not found")]
    NoRunningOperatorPod,

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),
}

impl StatusError {
    /// Returns true if the error came from the remote call rather than from
    /// shaping the returned data.
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::KubernetesApi { .. } | Self::Timeout { .. } | Self::Cancelled { .. }
        )
    }
}

/// Errors returned by the API client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication Failed: {0}")]
    AuthenticationFailed(u16),

    #[error("Invalid Status Code: {0}")]
    InvalidStatusCode(u16),

    #[error("Error: {0}")]
    Server(String),

    #[error("{0}")]
    Config(String),
}
