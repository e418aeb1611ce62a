//! Runs every extractor for a namespace and merges the results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::StatusError;
use crate::k8s::gateway::ResourceGateway;
use crate::k8s::resource::{ResourceKind, ResourceList, ResourceQuery};
use crate::metrics::Metrics;
use crate::status::extractors;
use crate::status::types::StatusReport;

/// Value substituted for string metrics that could not be derived.
pub const ERROR_SENTINEL: &str = "error";

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_NAMESPACE_LEN: usize = 63;

/// Label selectors used to find operator-managed objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub operator: String,
    pub backup: String,
    pub claim: String,
    pub cluster: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            operator: "name=postgres-operator".to_string(),
            backup: "pgbackup".to_string(),
            claim: "pgremove".to_string(),
            cluster: "pg-cluster".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    OperatorStart,
    BackupCount,
    ClaimCount,
    DatabaseCount,
    VolumeCapacity,
    ImageTags,
    NotReady,
    Nodes,
    Labels,
}

impl Extractor {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OperatorStart => "operator_start",
            Self::BackupCount => "backup_count",
            Self::ClaimCount => "claim_count",
            Self::DatabaseCount => "database_count",
            Self::VolumeCapacity => "volume_capacity",
            Self::ImageTags => "image_tags",
            Self::NotReady => "not_ready",
            Self::Nodes => "nodes",
            Self::Labels => "labels",
        }
    }
}

impl std::fmt::Display for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extractor error that was replaced by its default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorFailure {
    pub extractor: Extractor,
    pub error: StatusError,
}

/// A composed report together with the failures absorbed while building it.
#[derive(Debug, Clone)]
pub struct Composition {
    pub report: StatusReport,
    pub failures: Vec<ExtractorFailure>,
}

impl Composition {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed(&self, extractor: Extractor) -> bool {
        self.failures.iter().any(|f| f.extractor == extractor)
    }
}

pub struct StatusComposer {
    gateway: Arc<dyn ResourceGateway>,
    selectors: Selectors,
    query_timeout: Duration,
    watched_namespaces: Vec<String>,
    metrics: Option<Arc<Metrics>>,
}

impl StatusComposer {
    pub fn new(gateway: Arc<dyn ResourceGateway>) -> Self {
        Self {
            gateway,
            selectors: Selectors::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            watched_namespaces: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Restrict queries to these namespaces (empty allows any).
    pub fn with_watched_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.watched_namespaces = namespaces;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Reject namespaces that are empty, not a DNS-1123 label, or not watched.
    pub fn validate_namespace(&self, namespace: &str) -> Result<(), StatusError> {
        if namespace.is_empty() {
            return Err(StatusError::InvalidNamespace(
                "namespace is required".to_string(),
            ));
        }

        let bytes = namespace.as_bytes();
        let valid_chars = bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');
        let valid_edges =
            bytes[0].is_ascii_alphanumeric() && bytes[bytes.len() - 1].is_ascii_alphanumeric();
        if namespace.len() > MAX_NAMESPACE_LEN || !valid_chars || !valid_edges {
            return Err(StatusError::InvalidNamespace(format!(
                "'{}' is not a valid namespace name",
                namespace
            )));
        }

        if !self.watched_namespaces.is_empty()
            && !self.watched_namespaces.iter().any(|ns| ns == namespace)
        {
            return Err(StatusError::InvalidNamespace(format!(
                "'{}' is not a watched namespace",
                namespace
            )));
        }

        Ok(())
    }

    /// Build the status report for `namespace`.
    ///
    /// Extractors run concurrently. A failing extractor is logged and replaced
    /// by its default value; only namespace validation fails the whole call.
    pub async fn compose(
        &self,
        namespace: &str,
        cancel: &CancellationToken,
    ) -> Result<Composition, StatusError> {
        self.validate_namespace(namespace)?;

        let started = Instant::now();
        let sel = &self.selectors;
        let scoped = |kind, selector: Option<&str>| {
            ResourceQuery::namespaced(kind, namespace, selector)
        };

        let (
            operator_start,
            num_backups,
            num_claims,
            num_databases,
            volume_cap,
            db_tags,
            not_ready,
            nodes,
            labels,
        ) = tokio::join!(
            self.extract(scoped(ResourceKind::Pod, Some(sel.operator.as_str())), cancel, |list| {
                extractors::operator_start(&list.into_pods()?)
            }),
            self.extract(scoped(ResourceKind::Job, Some(sel.backup.as_str())), cancel, |list| {
                Ok(extractors::backup_count(&list.into_jobs()?))
            }),
            self.extract(
                scoped(ResourceKind::PersistentVolumeClaim, Some(sel.claim.as_str())),
                cancel,
                |list| Ok(extractors::claim_count(&list.into_claims()?)),
            ),
            self.extract(
                scoped(ResourceKind::Deployment, Some(sel.cluster.as_str())),
                cancel,
                |list| Ok(extractors::database_count(&list.into_deployments()?)),
            ),
            self.extract(
                scoped(ResourceKind::PersistentVolumeClaim, Some(sel.claim.as_str())),
                cancel,
                |list| extractors::volume_capacity(&list.into_claims()?),
            ),
            self.extract(scoped(ResourceKind::Pod, Some(sel.cluster.as_str())), cancel, |list| {
                Ok(extractors::image_tags(&list.into_pods()?))
            }),
            self.extract(scoped(ResourceKind::Pod, Some(sel.cluster.as_str())), cancel, |list| {
                Ok(extractors::not_ready(&list.into_pods()?))
            }),
            self.extract(ResourceQuery::cluster(ResourceKind::Node), cancel, |list| {
                Ok(extractors::node_inventory(&list.into_nodes()?))
            }),
            self.extract(scoped(ResourceKind::Deployment, None), cancel, |list| {
                Ok(extractors::label_histogram(&list.into_deployments()?))
            }),
        );

        let mut failures = Vec::new();
        let report = StatusReport {
            operator_start_time: absorb(&mut failures, Extractor::OperatorStart, operator_start, || {
                ERROR_SENTINEL.to_string()
            }),
            num_backups: absorb(&mut failures, Extractor::BackupCount, num_backups, || 0),
            num_claims: absorb(&mut failures, Extractor::ClaimCount, num_claims, || 0),
            num_databases: absorb(&mut failures, Extractor::DatabaseCount, num_databases, || 0),
            volume_cap: absorb(&mut failures, Extractor::VolumeCapacity, volume_cap, || {
                ERROR_SENTINEL.to_string()
            }),
            db_tags: absorb(&mut failures, Extractor::ImageTags, db_tags, Default::default),
            not_ready: absorb(&mut failures, Extractor::NotReady, not_ready, Vec::new),
            nodes: absorb(&mut failures, Extractor::Nodes, nodes, Vec::new),
            labels: absorb(&mut failures, Extractor::Labels, labels, Vec::new),
        };

        for failure in &failures {
            warn!(
                namespace = %namespace,
                extractor = %failure.extractor,
                error = %failure.error,
                "Extractor failed, using default value"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_extractor_failure(failure.extractor.as_str());
            }
        }

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.observe_compose(elapsed.as_secs_f64());
        }
        info!(
            namespace = %namespace,
            failures = failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Composed status report"
        );

        Ok(Composition { report, failures })
    }

    /// Fetch one listing, bounded by the query timeout and the caller's
    /// cancellation, and derive a value from it.
    async fn extract<T, F>(
        &self,
        query: ResourceQuery,
        cancel: &CancellationToken,
        derive: F,
    ) -> Result<T, StatusError>
    where
        F: FnOnce(ResourceList) -> Result<T, StatusError>,
    {
        let kind = query.kind;
        let listing = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(StatusError::Cancelled { kind }),
            result = tokio::time::timeout(self.query_timeout, self.gateway.list(&query)) => {
                result.map_err(|_| StatusError::Timeout {
                    kind,
                    timeout_ms: self.query_timeout.as_millis() as u64,
                })??
            }
        };

        debug!(kind = %kind, items = listing.len(), "Listed resources");
        derive(listing)
    }
}

fn absorb<T>(
    failures: &mut Vec<ExtractorFailure>,
    extractor: Extractor,
    result: Result<T, StatusError>,
    fallback: impl FnOnce() -> T,
) -> T {
    result.unwrap_or_else(|error| {
        failures.push(ExtractorFailure { extractor, error });
        fallback()
    })
}
