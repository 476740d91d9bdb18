//! Error types emitted by payload building.

use alloy_primitives::B256;
use thiserror::Error;

/// Possible error variants during payload building.
#[derive(Error, Debug)]
pub enum PayloadBuilderError {
    /// Thrown when the parent block to build on top of could not be found.
    #[error("missing parent block {0}")]
    MissingParentBlock(B256),
    /// Any other payload building error.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PayloadBuilderError {
    /// Creates an instance of the `Other` variant from the given error.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}
