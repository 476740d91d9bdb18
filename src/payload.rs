//! Types describing a payload build request and its results.

use crate::traits::BlockArtifact;
use alloy_primitives::{Address, B256, U256};
use std::{fmt, sync::Arc};

/// The parameters a payload is built for.
///
/// Created once per build request and read-only afterwards. Check the
/// engine-api specification for the semantics of the individual fields:
/// <https://github.com/ethereum/execution-apis/blob/main/src/engine/paris.md#payloadattributesv1>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadAttributes {
    /// The parent block to build the payload on top of.
    pub parent: B256,
    /// The timestamp of the generated payload.
    pub timestamp: u64,
    /// The address collecting the transaction fees.
    pub suggested_fee_recipient: Address,
    /// The randomness value for the generated payload.
    pub prev_randao: B256,
}

impl PayloadAttributes {
    /// Creates the attributes for a new payload build request.
    pub fn new(
        parent: B256,
        timestamp: u64,
        suggested_fee_recipient: Address,
        prev_randao: B256,
    ) -> Self {
        Self { parent, timestamp, suggested_fee_recipient, prev_randao }
    }
}

/// A built payload candidate: the opaque block artifact together with the
/// total fees it collects.
///
/// Candidates are immutable once constructed. The artifact is reference
/// counted so the clones held by the cache and handed to resolvers stay
/// cheap; at most two artifacts (the empty one and the best one) are alive
/// per request.
pub struct BuiltPayload<B> {
    /// The built block.
    block: Arc<B>,
    /// The total fees collected by the block.
    fees: U256,
}

// === impl BuiltPayload ===

impl<B> BuiltPayload<B> {
    /// Initializes the payload with the given block and fees.
    pub fn new(block: B, fees: U256) -> Self {
        Self { block: Arc::new(block), fees }
    }

    /// Returns the built block.
    pub fn block(&self) -> &B {
        &self.block
    }

    /// Returns the total fees collected by the block.
    pub fn fees(&self) -> U256 {
        self.fees
    }
}

impl<B: BlockArtifact> BuiltPayload<B> {
    /// Converts the payload into the wire representation delivered to
    /// consumers.
    pub fn to_envelope(&self) -> ExecutionPayloadEnvelope<B::Wire> {
        ExecutionPayloadEnvelope { payload: self.block.to_wire(), block_value: self.fees }
    }
}

impl<B> Clone for BuiltPayload<B> {
    fn clone(&self) -> Self {
        Self { block: Arc::clone(&self.block), fees: self.fees }
    }
}

impl<B> fmt::Debug for BuiltPayload<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltPayload").field("fees", &self.fees).finish_non_exhaustive()
    }
}

/// The wire representation of a resolved payload, pairing the encoded block
/// with the value it pays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPayloadEnvelope<W> {
    /// The wire-encoded block.
    pub payload: W,
    /// The expected value of the block, as total fees.
    pub block_value: U256,
}
