//! Error types shared by the leaf store and the sequence container.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SeqError>;

/// Recoverable errors raised by the leaf store and sequence container.
///
/// Programmer errors (out-of-range indices, mutating an immutable container) are not
/// represented here: they are asserted against at the call boundary and panic, since
/// they indicate a bug in the caller rather than a condition the caller can recover
/// from. See the `assert_range` / `assert_mutable` helpers in `types`.
#[derive(Error, Debug)]
pub enum SeqError {
    /// The allocator failed and the caller's out-of-memory handler declined to retry.
    #[error("allocation of {requested} bytes failed ({context})")]
    AllocationFailed { requested: usize, context: String },

    /// A 2-3 tree or leaf invariant was found violated during an operation.
    ///
    /// This should never surface in correct code; it exists so a bug in the tree
    /// discipline fails loudly instead of silently corrupting the logical sequence.
    #[error("leaf store invariant violated: {0}")]
    Invariant(String),
}

impl SeqError {
    pub fn allocation_failed(requested: usize, context: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            context: context.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}
