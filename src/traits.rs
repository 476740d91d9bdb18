//! Trait abstractions used by the payload crate.

use crate::{
    error::PayloadBuilderError,
    payload::{BuiltPayload, PayloadAttributes},
};
use async_trait::async_trait;

/// An opaque block artifact assembled by a [`BlockBuilder`].
///
/// The payload machinery never inspects the artifact; all it needs is the
/// conversion into the consumer-facing wire representation.
pub trait BlockArtifact: Send + Sync + 'static {
    /// The wire representation delivered to consumers.
    type Wire: Clone + Send + Sync + 'static;

    /// Encodes the artifact into its wire representation.
    ///
    /// Must be a pure, side-effect-free conversion; it is invoked by every
    /// resolve operation.
    fn to_wire(&self) -> Self::Wire;
}

/// A type that assembles block payload candidates.
///
/// How transactions are selected and the block is assembled is up to the
/// implementation. Calls must be safe to repeat and to run concurrently
/// with resolve operations on previous results; latency is unbounded from
/// the caller's perspective.
#[async_trait]
pub trait BlockBuilder: Send + Sync + 'static {
    /// The block artifact this builder produces.
    type Block: BlockArtifact;

    /// Builds a payload candidate for the given attributes.
    ///
    /// With `empty_only` set the builder must return a minimal candidate
    /// without transactions. That build is expected to be fast enough to
    /// make sure there is always something to deliver for the slot.
    async fn build_payload(
        &self,
        attributes: &PayloadAttributes,
        empty_only: bool,
    ) -> Result<BuiltPayload<Self::Block>, PayloadBuilderError>;
}
