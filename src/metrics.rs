//! Prometheus metrics for the status API.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

use crate::status::envelope::ResponseCode;

/// Labels for status responses.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ResponseLabels {
    pub code: String,
}

/// Labels for absorbed extractor failures.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ExtractorLabels {
    pub extractor: String,
}

pub struct Metrics {
    pub requests_total: Family<ResponseLabels, Counter>,
    pub extractor_failures_total: Family<ExtractorLabels, Counter>,
    pub compose_duration_seconds: Histogram,
}

const COMPOSE_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

impl Metrics {
    /// Create and register all metrics with the given registry.
    pub fn new(registry: &mut Registry) -> Self {
        let requests_total = Family::<ResponseLabels, Counter>::default();
        registry.register(
            "pgo_status_requests",
            "Total number of status responses by envelope code",
            requests_total.clone(),
        );

        let extractor_failures_total = Family::<ExtractorLabels, Counter>::default();
        registry.register(
            "pgo_status_extractor_failures",
            "Total number of extractor failures substituted with a default value",
            extractor_failures_total.clone(),
        );

        let compose_duration_seconds = Histogram::new(COMPOSE_BUCKETS.iter().copied());
        registry.register(
            "pgo_status_compose_duration_seconds",
            "Time spent composing a status report in seconds",
            compose_duration_seconds.clone(),
        );

        Self {
            requests_total,
            extractor_failures_total,
            compose_duration_seconds,
        }
    }

    pub fn record_response(&self, code: ResponseCode) {
        self.requests_total
            .get_or_create(&ResponseLabels {
                code: code.to_string(),
            })
            .inc();
    }

    pub fn record_extractor_failure(&self, extractor: &str) {
        self.extractor_failures_total
            .get_or_create(&ExtractorLabels {
                extractor: extractor.to_string(),
            })
            .inc();
    }

    pub fn observe_compose(&self, seconds: f64) {
        self.compose_duration_seconds.observe(seconds);
    }
}

/// Encode the registry as OpenMetrics text.
pub fn render(registry: &Registry) -> Result<String, std::fmt::Error> {
    let mut buf = String::new();
    encode(&mut buf, registry)?;
    Ok(buf)
}
