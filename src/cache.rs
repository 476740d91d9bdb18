//! The synchronized holder of the payloads built for a single request.

use crate::{
    metrics::PayloadBuilderMetrics,
    payload::{BuiltPayload, ExecutionPayloadEnvelope},
    traits::BlockArtifact,
};
use std::fmt;
use tokio::sync::watch;
use tracing::trace;

/// The mutable half of a [`PayloadCache`], guarded by the watch channel.
struct CacheState<B> {
    /// The best full payload accepted so far. Once set it never reverts to
    /// `None`, and it is only ever replaced by a payload paying strictly
    /// higher fees.
    best: Option<BuiltPayload<B>>,
    /// Whether the request was finalized. One-shot: set once, never cleared.
    cancelled: bool,
}

/// Synchronized holder of the payloads built for one request.
///
/// The empty payload is built up front and always available so there is
/// something to deliver for the slot, the full payload is set and replaced
/// afterwards as the background job finds better-paying candidates. Any
/// number of consumers may resolve concurrently at any time.
pub struct PayloadCache<B> {
    /// The initial empty payload, set at construction and never mutated.
    empty: BuiltPayload<B>,
    /// Best payload and cancellation flag.
    ///
    /// The channel is the single exclusion mechanism for every read and
    /// compare-and-replace of the mutable state, and wakes resolvers blocked
    /// in [`PayloadCache::resolve_full`] on the first accepted update as
    /// well as on cancellation.
    state: watch::Sender<CacheState<B>>,
    /// Metrics for resolve outcomes.
    metrics: PayloadBuilderMetrics,
}

// === impl PayloadCache ===

impl<B: BlockArtifact> PayloadCache<B> {
    /// Creates the cache around the initial empty payload.
    pub fn new(empty: BuiltPayload<B>) -> Self {
        let (state, _) = watch::channel(CacheState { best: None, cancelled: false });
        Self { empty, state, metrics: Default::default() }
    }

    /// Stores a new candidate if it pays more fees than the current best.
    ///
    /// Results arriving after the request was finalized are expected under
    /// races and silently discarded. Ties lose: the first candidate to
    /// exceed the stored fees wins. Accepting a candidate wakes any resolver
    /// blocked waiting for the first full payload.
    pub fn update(&self, payload: BuiltPayload<B>) {
        self.state.send_if_modified(|state| {
            if state.cancelled {
                trace!(fees = %payload.fees(), "discarding stale payload update");
                return false
            }
            if state.best.as_ref().map_or(true, |best| payload.fees() > best.fees()) {
                trace!(fees = %payload.fees(), "stored better payload");
                state.best = Some(payload);
                true
            } else {
                trace!(fees = %payload.fees(), "rejected non-improving payload");
                false
            }
        });
    }

    /// Finalizes the request and returns the best payload built so far,
    /// falling back to the empty payload.
    ///
    /// The first call marks the request cancelled, which tells the
    /// background job to wind down and releases resolvers blocked in
    /// [`PayloadCache::resolve_full`]. Safe to call any number of times,
    /// also concurrently; every call returns the same payload.
    pub fn resolve_best(&self) -> ExecutionPayloadEnvelope<B::Wire> {
        self.state.send_if_modified(|state| {
            if state.cancelled {
                false
            } else {
                state.cancelled = true;
                true
            }
        });
        // `best` can no longer change once the flag is set.
        let best = self.state.borrow().best.clone();
        match best {
            Some(payload) => payload.to_envelope(),
            None => {
                self.metrics.inc_resolved_empty_payload();
                self.empty.to_envelope()
            }
        }
    }

    /// Returns the initial empty payload, ignoring any improvements.
    ///
    /// Touches neither the cancellation flag nor the best payload; intended
    /// for deterministic inspection, never for production finalization.
    pub fn resolve_empty(&self) -> ExecutionPayloadEnvelope<B::Wire> {
        self.empty.to_envelope()
    }

    /// Waits until a full payload was accepted and returns it.
    ///
    /// Returns `None` if the request is finalized before any candidate was
    /// accepted, immediately so if that already happened. Without
    /// cancellation the call waits for the first update indefinitely, which
    /// makes it suitable for controlled usage only, not for production
    /// paths.
    pub async fn resolve_full(&self) -> Option<ExecutionPayloadEnvelope<B::Wire>> {
        let mut state = self.state.subscribe();
        let best = match state.wait_for(|state| state.best.is_some() || state.cancelled).await {
            Ok(state) => state.best.clone(),
            // the sender lives in `self`, a closed channel means the cache
            // is gone and there is nothing left to wait for
            Err(_) => None,
        };
        best.map(|payload| payload.to_envelope())
    }

    /// Whether the request was finalized.
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().cancelled
    }

    /// Completes once the request is finalized.
    ///
    /// This is the stop signal observed by the background job; it never
    /// blocks the job beyond the await itself.
    pub(crate) async fn cancelled(&self) {
        let mut state = self.state.subscribe();
        let _ = state.wait_for(|state| state.cancelled).await;
    }
}

impl<B> fmt::Debug for PayloadCache<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PayloadCache")
            .field("best_fees", &state.best.as_ref().map(|best| best.fees()))
            .field("cancelled", &state.cancelled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestBlock;
    use alloy_primitives::U256;
    use std::{sync::Arc, time::Duration};

    fn payload(number: u64, fees: u64) -> BuiltPayload<TestBlock> {
        BuiltPayload::new(TestBlock { number }, U256::from(fees))
    }

    fn cache() -> PayloadCache<TestBlock> {
        PayloadCache::new(payload(0, 0))
    }

    #[test]
    fn empty_payload_available_immediately() {
        let cache = cache();
        let envelope = cache.resolve_empty();
        assert_eq!(envelope.payload, TestBlock { number: 0 });
        assert_eq!(envelope.block_value, U256::ZERO);
        assert!(!cache.is_cancelled());
    }

    #[test]
    fn update_keeps_highest_fees() {
        let cache = cache();
        cache.update(payload(1, 5));
        cache.update(payload(2, 3));
        cache.update(payload(3, 10));

        let envelope = cache.resolve_best();
        assert_eq!(envelope.payload, TestBlock { number: 3 });
        assert_eq!(envelope.block_value, U256::from(10));
    }

    #[test]
    fn update_rejects_ties() {
        let cache = cache();
        cache.update(payload(1, 7));
        cache.update(payload(2, 7));
        assert_eq!(cache.resolve_best().payload, TestBlock { number: 1 });
    }

    #[test]
    fn resolve_best_falls_back_to_empty() {
        let cache = cache();
        let envelope = cache.resolve_best();
        assert_eq!(envelope.payload, TestBlock { number: 0 });
        assert!(cache.is_cancelled());
    }

    #[test]
    fn updates_after_resolve_are_discarded() {
        let cache = cache();
        cache.update(payload(1, 5));

        let first = cache.resolve_best();
        cache.update(payload(2, 50));
        let second = cache.resolve_best();

        assert_eq!(first, second);
        assert_eq!(second.payload, TestBlock { number: 1 });
    }

    #[tokio::test]
    async fn concurrent_resolves_agree() {
        let cache = Arc::new(cache());
        cache.update(payload(1, 5));

        let resolves = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.resolve_best() })
        });
        let envelopes = futures_util::future::try_join_all(resolves).await.unwrap();

        for envelope in &envelopes {
            assert_eq!(envelope, &envelopes[0]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_full_waits_for_first_payload() {
        let cache = Arc::new(cache());
        let waiter = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.resolve_full().await }
        });

        // no update yet, the waiter must stay parked
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!waiter.is_finished());

        cache.update(payload(1, 5));
        let resolved = waiter.await.unwrap();
        assert_eq!(resolved.unwrap().payload, TestBlock { number: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_full_released_by_cancellation() {
        let cache = Arc::new(cache());
        let waiter = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.resolve_full().await }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!waiter.is_finished());

        cache.resolve_best();
        assert!(waiter.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn resolve_full_returns_immediately_when_cancelled() {
        let cache = cache();
        cache.resolve_best();
        assert!(cache.resolve_full().await.is_none());
    }

    #[tokio::test]
    async fn resolve_full_returns_available_payload() {
        let cache = cache();
        cache.update(payload(1, 5));
        let resolved = cache.resolve_full().await.unwrap();
        assert_eq!(resolved.payload, TestBlock { number: 1 });
    }
}
