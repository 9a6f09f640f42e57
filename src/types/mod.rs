//! Shared constants, the logical-range type, and the out-of-memory callback contract
//! used by both the leaf store and the sequence container.

mod callbacks;
mod range;

pub use callbacks::{type_ops, CallbackKind, Callbacks, ElementOps};
pub use range::Range;

/// Upper bound on a deque representation's capacity; at or above this element count
/// the sequence container promotes to a leaf store.
pub const MAX_DEQUE_CAPACITY: usize = 262_140;

/// Below this element count (`MAX_DEQUE_CAPACITY / 2`) a leaf-store-backed container
/// demotes back to a deque on deletion.
pub const DEQUE_DEMOTE_THRESHOLD: usize = MAX_DEQUE_CAPACITY / 2;

/// Upper bound on a leaf's byte capacity.
pub const MAX_LEAF_BYTES: usize = 12_288;

/// Half a (hypothetical) page; requests above this round up to a whole page when
/// growing a leaf buffer, requests at or below it round up to the next 64 bytes.
pub const PAGE_LIMIT_BYTES: usize = 2_048;

/// Page size used by the leaf growth policy (see `store::leaf::grown_capacity`).
pub const PAGE_BYTES: usize = 4_096;

/// Minimum deque capacity; deques never shrink below this.
pub const MIN_DEQUE_CAPACITY: usize = 4;

/// Hints passed to the allocator describing how the requested memory will be used.
///
/// Mirrors the allocator contract in spec §6: callers (in particular, a conservative
/// scanning collector) use this to decide whether to register memory as scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocHint {
    /// Memory holds strong references the collector must scan.
    Scanned,
    /// Memory holds no references the collector needs to trace.
    Unscanned,
    /// Memory is opaque to the collector (e.g. raw bytes).
    Opaque,
}

/// Caller-supplied out-of-memory handler.
///
/// Invoked with a short description of what allocation failed. Returning `true`
/// tells the caller to retry; returning `false` propagates a
/// [`crate::error::SeqError::AllocationFailed`] to the operation's caller.
pub trait OomHandler: Send + Sync {
    fn on_allocation_failure(&self, context: &str) -> bool;
}

/// An out-of-memory handler that never retries; allocation failures always fail the
/// operation. This is the default for containers and stores created without an
/// explicit handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverRetry;

impl OomHandler for NeverRetry {
    fn on_allocation_failure(&self, _context: &str) -> bool {
        false
    }
}

/// Panics with a message identifying a programmer error: an out-of-bounds or
/// otherwise malformed logical range. Range errors are asserted rather than
/// returned as a recoverable error (spec §7: "programmer errors ... trigger an
/// assertion; they need not be recovered").
#[track_caller]
pub fn assert_range_in_bounds(range: Range, count: usize) {
    assert!(
        range.location <= count && range.location.saturating_add(range.length) <= count,
        "range {:?} out of bounds for count {count}",
        range
    );
}
