//! Leaf pages: the bottom level of the 2-3 tree, each holding a contiguous run of
//! logical slots.
//!
//! A leaf's backing buffer is lazily materialized (spec §4.2: "first read triggers
//! lazy allocation") and shared through an `Arc<RwLock<..>>` so the generation-counted
//! cache (`super::cache`) can hold a non-owning `Weak` handle to it without ever
//! extending its lifetime.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{MAX_LEAF_BYTES, PAGE_BYTES, PAGE_LIMIT_BYTES};

/// Shared, lock-guarded leaf contents. Cloning a `LeafHandle` is cheap (an `Arc`
/// bump); the generation cache clones a `Weak` of the same handle.
pub(crate) type LeafHandle<T> = Arc<RwLock<LeafData<T>>>;

/// The mutable state of one leaf page.
pub(crate) struct LeafData<T> {
    /// Logical slot count currently stored. `slots` may still be `None` while
    /// `len == 0` — an untouched leaf never allocates until first read.
    pub len: usize,
    /// Maximum slot count this leaf may hold before an insert must split it,
    /// derived from `MAX_LEAF_BYTES / value_size`.
    pub capacity: usize,
    /// The backing buffer. `None` until the first read or write touches this leaf.
    pub slots: Option<Vec<T>>,
}

impl<T: Clone + Default> LeafData<T> {
    pub fn empty(capacity: usize) -> Self {
        Self {
            len: 0,
            capacity,
            slots: None,
        }
    }

    pub fn from_slots(slots: Vec<T>, capacity: usize) -> Self {
        Self {
            len: slots.len(),
            capacity,
            slots: Some(slots),
        }
    }

    /// Lazily materializes the backing buffer, zero-filling (via `T::default`) up
    /// to `len` entries if this is the first touch.
    pub fn materialize(&mut self) -> &mut Vec<T> {
        if self.slots.is_none() {
            self.slots = Some(vec![T::default(); self.len]);
        }
        self.slots.as_mut().unwrap()
    }

    pub fn slots(&self) -> std::borrow::Cow<'_, [T]> {
        match &self.slots {
            Some(v) => std::borrow::Cow::Borrowed(v),
            None => std::borrow::Cow::Owned(vec![T::default(); self.len]),
        }
    }
}

pub(crate) fn new_handle<T: Clone + Default>(capacity: usize) -> LeafHandle<T> {
    Arc::new(RwLock::new(LeafData::empty(capacity)))
}

pub(crate) fn handle_from_slots<T: Clone + Default>(slots: Vec<T>, capacity: usize) -> LeafHandle<T> {
    Arc::new(RwLock::new(LeafData::from_slots(slots, capacity)))
}

/// Maximum slots a leaf may hold for a given per-slot byte size, bounded by
/// `MAX_LEAF_BYTES`.
pub(crate) fn max_leaf_capacity(value_size: usize) -> usize {
    (MAX_LEAF_BYTES / value_size.max(1)).max(1)
}

/// The byte-rounding growth policy translated into slot counts: requests above
/// `PAGE_LIMIT_BYTES` round up to a whole page (capped at `max_leaf_capacity`),
/// smaller requests round up to the next 64-byte multiple.
pub(crate) fn grown_capacity(requested_slots: usize, value_size: usize, max_leaf_capacity: usize) -> usize {
    let value_size = value_size.max(1);
    let requested_bytes = requested_slots.saturating_mul(value_size);
    let grown_bytes = if requested_bytes > PAGE_LIMIT_BYTES {
        round_up(requested_bytes, PAGE_BYTES).min(max_leaf_capacity * value_size)
    } else {
        round_up(requested_bytes, 64)
    };
    (grown_bytes / value_size).max(requested_slots).min(max_leaf_capacity)
}

fn round_up(value: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return value;
    }
    value.div_ceil(multiple) * multiple
}
