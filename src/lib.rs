#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Block payload building with background improvement.
//!
//! A payload build request is served in two steps: an initial payload with
//! an empty transaction set is built synchronously, so there is always
//! something to deliver for the slot, and a background job then keeps
//! rebuilding the payload at a fixed cadence to maximize the collected fees
//! until the slot deadline elapses or a consumer finalizes the request.
//!
//! The moving parts:
//!
//! - [`PayloadJobGenerator`]: builds the initial empty payload for a
//!   request and spawns the background job.
//! - [`PayloadCache`]: the synchronized holder of the empty and the
//!   best-so-far payload, exposing the resolve operations consumers call
//!   concurrently.
//! - [`BlockBuilder`] and [`BlockArtifact`]: the seams towards the actual
//!   block assembly and the wire encoding, both external to this crate.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use alloy_primitives::{Address, B256, U256};
//! use async_trait::async_trait;
//! use payload_builder::{
//!     error::PayloadBuilderError, BlockArtifact, BlockBuilder, BuiltPayload,
//!     PayloadAttributes, PayloadJobGenerator, PayloadJobGeneratorConfig,
//! };
//!
//! /// An opaque block artifact; here the wire format is the raw bytes.
//! #[derive(Clone)]
//! struct Block(Vec<u8>);
//!
//! impl BlockArtifact for Block {
//!     type Wire = Vec<u8>;
//!
//!     fn to_wire(&self) -> Vec<u8> {
//!         self.0.clone()
//!     }
//! }
//!
//! struct Builder;
//!
//! #[async_trait]
//! impl BlockBuilder for Builder {
//!     type Block = Block;
//!
//!     async fn build_payload(
//!         &self,
//!         attributes: &PayloadAttributes,
//!         empty_only: bool,
//!     ) -> Result<BuiltPayload<Block>, PayloadBuilderError> {
//!         // assemble a block for `attributes`, without transactions if
//!         // `empty_only` is set
//!         Ok(BuiltPayload::new(Block(vec![]), U256::ZERO))
//!     }
//! }
//!
//! # async fn run() -> Result<(), PayloadBuilderError> {
//! let generator =
//!     PayloadJobGenerator::new(Arc::new(Builder), PayloadJobGeneratorConfig::default());
//! let attributes =
//!     PayloadAttributes::new(B256::ZERO, 1_700_000_000, Address::ZERO, B256::ZERO);
//! let payload = generator.build_payload(attributes).await?;
//!
//! // the empty payload is available immediately, improvements land in the
//! // background until this finalizes the request
//! let best = payload.resolve_best();
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `test-utils`: Export utilities for testing

use std::time::Duration;

mod cache;
pub mod error;
mod generator;
mod job;
mod metrics;
mod payload;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cache::PayloadCache;
pub use generator::{PayloadJobGenerator, PayloadJobGeneratorConfig};
pub use payload::{BuiltPayload, ExecutionPayloadEnvelope, PayloadAttributes};
pub use traits::{BlockArtifact, BlockBuilder};

/// The duration of a slot, the default deadline for improving a payload.
///
/// 12 seconds in the Mainnet configuration.
pub const SLOT_DURATION: Duration = Duration::from_secs(12);
