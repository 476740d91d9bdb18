//! The background job that keeps improving a payload until its deadline.

use crate::{
    cache::PayloadCache, metrics::PayloadBuilderMetrics, payload::PayloadAttributes,
    traits::BlockBuilder,
};
use std::{sync::Arc, time::Duration};
use tokio::time;
use tracing::{debug, trace};

/// A background job that rebuilds the payload for one request at a fixed
/// cadence and feeds improvements into the [`PayloadCache`].
///
/// The first build fires immediately, afterwards the recommit interval is
/// re-armed at the end of every attempt, successful or not. The job winds
/// down the moment the slot deadline elapses or the request is finalized,
/// whichever comes first; a failed attempt never stops it.
pub(crate) struct PayloadJob<B: BlockBuilder> {
    /// The type that assembles payload candidates.
    builder: Arc<B>,
    /// The attributes of the request this job improves.
    attributes: PayloadAttributes,
    /// The cache receiving accepted candidates and carrying the stop signal.
    cache: Arc<PayloadCache<B::Block>>,
    /// The interval at which the job builds a new payload after the last
    /// attempt.
    interval: Duration,
    /// The deadline after which no further attempts are made.
    deadline: Duration,
    /// Metrics for build attempts.
    metrics: PayloadBuilderMetrics,
}

// === impl PayloadJob ===

impl<B: BlockBuilder> PayloadJob<B> {
    /// Creates the job for one build request.
    pub(crate) fn new(
        builder: Arc<B>,
        attributes: PayloadAttributes,
        cache: Arc<PayloadCache<B::Block>>,
        interval: Duration,
        deadline: Duration,
    ) -> Self {
        Self { builder, attributes, cache, interval, deadline, metrics: Default::default() }
    }

    /// Drives the job to completion.
    pub(crate) async fn run(self) {
        // The deadline is armed exactly once for the whole job; the rebuild
        // interval completes immediately on the first tick.
        let deadline = time::sleep(self.deadline);
        tokio::pin!(deadline);
        let mut interval = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.metrics.inc_initiated_payload_builds();
                    match self.builder.build_payload(&self.attributes, false).await {
                        Ok(payload) => self.cache.update(payload),
                        Err(err) => {
                            // dropped on purpose, the next tick tries again
                            self.metrics.inc_failed_payload_builds();
                            debug!(%err, "payload build attempt failed");
                        }
                    }
                    // re-arm relative to the end of the attempt
                    interval.reset();
                }
                _ = &mut deadline => {
                    trace!("payload job deadline reached");
                    return
                }
                _ = self.cache.cancelled() => {
                    trace!("payload job cancelled");
                    return
                }
            }
        }
    }
}
