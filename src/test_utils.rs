//! Utils for testing purposes.

use crate::{
    error::PayloadBuilderError,
    payload::{BuiltPayload, PayloadAttributes},
    traits::{BlockArtifact, BlockBuilder},
};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Attributes for a test build request.
pub fn test_attributes() -> PayloadAttributes {
    PayloadAttributes::new(
        B256::repeat_byte(1),
        1_700_000_000,
        Address::repeat_byte(2),
        B256::repeat_byte(3),
    )
}

/// A minimal block artifact for tests; the wire format is the block itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBlock {
    /// Sequence number of the build attempt that produced the block.
    pub number: u64,
}

impl BlockArtifact for TestBlock {
    type Wire = TestBlock;

    fn to_wire(&self) -> TestBlock {
        self.clone()
    }
}

/// A scripted [`BlockBuilder`] for tests.
///
/// Every full build returns a block paying one more unit of fees than the
/// previous one, so candidates keep improving. Empty builds pay zero fees.
/// Failures can be injected for either build kind.
#[derive(Debug, Default)]
pub struct TestBlockBuilder {
    full_builds: AtomicU64,
    fail_empty: AtomicBool,
    fail_full: AtomicBool,
}

impl TestBlockBuilder {
    /// Returns the number of full build attempts so far, failed ones
    /// included.
    pub fn full_builds(&self) -> u64 {
        self.full_builds.load(Ordering::SeqCst)
    }

    /// Makes empty builds fail.
    pub fn fail_empty(self) -> Self {
        self.fail_empty.store(true, Ordering::SeqCst);
        self
    }

    /// Toggles failure of full builds.
    pub fn fail_full(&self, fail: bool) {
        self.fail_full.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlockBuilder for TestBlockBuilder {
    type Block = TestBlock;

    async fn build_payload(
        &self,
        _attributes: &PayloadAttributes,
        empty_only: bool,
    ) -> Result<BuiltPayload<TestBlock>, PayloadBuilderError> {
        if empty_only {
            if self.fail_empty.load(Ordering::SeqCst) {
                return Err(PayloadBuilderError::Other("empty build failed".into()))
            }
            return Ok(BuiltPayload::new(TestBlock { number: 0 }, U256::ZERO))
        }

        let number = self.full_builds.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_full.load(Ordering::SeqCst) {
            return Err(PayloadBuilderError::Other("full build failed".into()))
        }
        Ok(BuiltPayload::new(TestBlock { number }, U256::from(number)))
    }
}
