//! Kubernetes connection for the `serve` command.

use std::fmt::Display;

use tracing::debug;

use crate::error::StatusError;

/// Connect to the cluster whose operator objects the status report reads.
///
/// A named `--context` is resolved from the local kubeconfig. Without one the
/// pod's service account is tried first, since `serve` normally runs inside
/// the cluster, and the default kubeconfig is the fallback.
pub async fn build_client(context: Option<&str>) -> Result<kube::Client, StatusError> {
    let config = match context {
        Some(ctx) => context_config(ctx).await?,
        None => match kube::Config::incluster() {
            Ok(config) => {
                debug!("Reading status objects with the in-cluster service account");
                config
            }
            Err(e) => {
                debug!(error = %e, "No in-cluster service account, reading the local kubeconfig");
                kube::Config::infer()
                    .await
                    .map_err(|e| StatusError::Kubeconfig(e.to_string()))?
            }
        },
    };

    kube::Client::try_from(config).map_err(|e| StatusError::Kubeconfig(e.to_string()))
}

async fn context_config(ctx: &str) -> Result<kube::Config, StatusError> {
    debug!(context = %ctx, "Reading status objects through kubeconfig context");
    let kubeconfig = kube::config::Kubeconfig::read().map_err(|e| context_error(ctx, e))?;
    let options = kube::config::KubeConfigOptions {
        context: Some(ctx.to_string()),
        ..Default::default()
    };
    kube::Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(|e| context_error(ctx, e))
}

fn context_error(ctx: &str, err: impl Display) -> StatusError {
    StatusError::Kubeconfig(format!("context '{}': {}", ctx, err))
}
