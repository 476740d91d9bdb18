//! Payload builder metrics.

use metrics::{counter, Counter};

/// Metrics for the payload builder and its background jobs.
#[derive(Clone)]
pub(crate) struct PayloadBuilderMetrics {
    /// Number of build attempts initiated by background jobs.
    initiated_payload_builds: Counter,
    /// Number of build attempts that failed.
    failed_payload_builds: Counter,
    /// Number of requests that resolved with the empty payload.
    resolved_empty_payload: Counter,
}

impl Default for PayloadBuilderMetrics {
    fn default() -> Self {
        Self {
            initiated_payload_builds: counter!("payload_builder.initiated_payload_builds"),
            failed_payload_builds: counter!("payload_builder.failed_payload_builds"),
            resolved_empty_payload: counter!("payload_builder.resolved_empty_payload"),
        }
    }
}

impl PayloadBuilderMetrics {
    pub(crate) fn inc_initiated_payload_builds(&self) {
        self.initiated_payload_builds.increment(1);
    }

    pub(crate) fn inc_failed_payload_builds(&self) {
        self.failed_payload_builds.increment(1);
    }

    pub(crate) fn inc_resolved_empty_payload(&self) {
        self.resolved_empty_payload.increment(1);
    }
}
