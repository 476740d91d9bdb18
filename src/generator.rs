//! Creation of payload build requests and their background jobs.

use crate::{
    cache::PayloadCache, error::PayloadBuilderError, job::PayloadJob, payload::PayloadAttributes,
    traits::BlockBuilder, SLOT_DURATION,
};
use std::{fmt, sync::Arc, time::Duration};
use tracing::debug;

/// Settings for the [`PayloadJobGenerator`].
#[derive(Debug, Clone)]
pub struct PayloadJobGeneratorConfig {
    /// The interval at which a job builds a new payload after the last
    /// attempt.
    interval: Duration,
    /// The deadline after which a job stops improving the payload.
    deadline: Duration,
}

// === impl PayloadJobGeneratorConfig ===

impl PayloadJobGeneratorConfig {
    /// Sets the interval at which a job should build a new payload after the
    /// last attempt.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the deadline after which a job stops improving the payload.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

impl Default for PayloadJobGeneratorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            // building past the slot cannot pay off anymore
            deadline: SLOT_DURATION,
        }
    }
}

/// Creates the payload cache and the background improvement job for build
/// requests.
pub struct PayloadJobGenerator<B> {
    /// The type that assembles payload candidates.
    builder: Arc<B>,
    /// The configuration for the jobs this generator spawns.
    config: PayloadJobGeneratorConfig,
}

// === impl PayloadJobGenerator ===

impl<B: BlockBuilder> PayloadJobGenerator<B> {
    /// Creates a new generator with the given builder and config.
    pub fn new(builder: Arc<B>, config: PayloadJobGeneratorConfig) -> Self {
        Self { builder, config }
    }

    /// Builds the payload for the given attributes.
    ///
    /// The initial version of the payload is built with an empty transaction
    /// set right here, so there is always something to deliver without
    /// missing the slot; failing that build fails the whole request and no
    /// cache or job is created. A background job improving the payload is
    /// then spawned, and the cache is returned immediately without waiting
    /// for any improvement.
    pub async fn build_payload(
        &self,
        attributes: PayloadAttributes,
    ) -> Result<Arc<PayloadCache<B::Block>>, PayloadBuilderError> {
        let empty = self.builder.build_payload(&attributes, true).await?;
        let cache = Arc::new(PayloadCache::new(empty));

        debug!(
            parent = %attributes.parent,
            timestamp = attributes.timestamp,
            "spawning payload job"
        );
        let job = PayloadJob::new(
            Arc::clone(&self.builder),
            attributes,
            Arc::clone(&cache),
            self.config.interval,
            self.config.deadline,
        );
        tokio::spawn(job.run());

        Ok(cache)
    }
}

impl<B> fmt::Debug for PayloadJobGenerator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadJobGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_attributes, TestBlockBuilder};
    use alloy_primitives::U256;

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_rebuilds() {
        let builder = Arc::new(TestBlockBuilder::default());
        let config = PayloadJobGeneratorConfig::default()
            .interval(Duration::from_secs(1))
            .deadline(Duration::from_secs(3));
        let generator = PayloadJobGenerator::new(Arc::clone(&builder), config);

        let cache = generator.build_payload(test_attributes()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        let attempts = builder.full_builds();
        assert!(attempts >= 2, "expected repeated rebuilds before the deadline, got {attempts}");

        // the job exited, no further builder calls
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(builder.full_builds(), attempts);

        // the best payload is still resolvable after the deadline
        let envelope = cache.resolve_best();
        assert_eq!(envelope.block_value, U256::from(attempts));
    }

    #[tokio::test]
    async fn empty_build_failure_is_fatal() {
        let builder = Arc::new(TestBlockBuilder::default().fail_empty());
        let generator =
            PayloadJobGenerator::new(Arc::clone(&builder), PayloadJobGeneratorConfig::default());

        let err = generator.build_payload(test_attributes()).await.unwrap_err();
        assert!(matches!(err, PayloadBuilderError::Other(_)));
        assert_eq!(builder.full_builds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempts_do_not_stop_the_job() {
        let builder = Arc::new(TestBlockBuilder::default());
        builder.fail_full(true);
        let config = PayloadJobGeneratorConfig::default()
            .interval(Duration::from_secs(1))
            .deadline(Duration::from_secs(10));
        let generator = PayloadJobGenerator::new(Arc::clone(&builder), config);

        let cache = generator.build_payload(test_attributes()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(builder.full_builds() >= 2, "the job must keep rescheduling through failures");

        builder.fail_full(false);
        tokio::time::sleep(Duration::from_secs(2)).await;

        let envelope = cache.resolve_best();
        assert!(envelope.block_value > U256::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn resolving_stops_the_job() {
        let builder = Arc::new(TestBlockBuilder::default());
        let config = PayloadJobGeneratorConfig::default()
            .interval(Duration::from_secs(1))
            .deadline(Duration::from_secs(60));
        let generator = PayloadJobGenerator::new(Arc::clone(&builder), config);

        let cache = generator.build_payload(test_attributes()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        let envelope = cache.resolve_best();
        assert!(envelope.block_value > U256::ZERO);
        assert!(cache.is_cancelled());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let attempts = builder.full_builds();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(builder.full_builds(), attempts);
    }
}
