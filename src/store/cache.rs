//! A small generation-counted read cache remembering the last leaf touched by
//! `get`/`get_range`, so repeated nearby reads skip the tree descent.
//!
//! The cache never owns the leaf it remembers — it holds a `Weak` handle, so a
//! concurrent structural mutation (split, merge, collapse) that drops the last
//! strong reference simply makes the cache's next lookup miss rather than keep a
//! stale leaf alive. Validity is published through a seqlock-style odd/even
//! generation counter: writers bump the counter to an odd value before updating the
//! cached fields and back to even once done, so a reader that observes two matching
//! even reads around its load knows it saw a consistent `(location, length)` pair.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::leaf::LeafHandle;

struct CacheSlot<T> {
    generation: AtomicUsize,
    location: AtomicUsize,
    length: AtomicUsize,
    leaf: Mutex<Weak<parking_lot::RwLock<super::leaf::LeafData<T>>>>,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            generation: AtomicUsize::new(0),
            location: AtomicUsize::new(0),
            length: AtomicUsize::new(0),
            leaf: Mutex::new(Weak::new()),
        }
    }
}

/// Read cache for a single leaf store. Cheap to construct; one lives per store.
pub(crate) struct LeafCache<T> {
    slot: CacheSlot<T>,
}

impl<T> Default for LeafCache<T> {
    fn default() -> Self {
        Self {
            slot: CacheSlot::default(),
        }
    }
}

pub(crate) struct CachedLeaf<T> {
    pub leaf: LeafHandle<T>,
    pub location: usize,
    pub length: usize,
}

impl<T> LeafCache<T> {
    /// Publishes a new cached leaf, covering logical range `[location, location + length)`.
    pub fn publish(&self, leaf: &LeafHandle<T>, location: usize, length: usize) {
        let odd = self.slot.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(odd % 2 == 1, "generation must be odd during publish");
        self.slot.location.store(location, Ordering::Relaxed);
        self.slot.length.store(length, Ordering::Relaxed);
        *self.slot.leaf.lock() = Arc::downgrade(leaf);
        self.slot.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Invalidates the cache; any structural mutation that might move slot offsets
    /// around must call this before returning.
    pub fn invalidate(&self) {
        let odd = self.slot.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(odd % 2 == 1);
        *self.slot.leaf.lock() = Weak::new();
        self.slot.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Looks up whether `index` falls within the currently cached leaf, retrying the
    /// read if a concurrent publish raced with it. Returns `None` on a cache miss —
    /// either nothing is cached, the index falls outside the cached range, or the
    /// leaf has since been dropped.
    pub fn lookup(&self, index: usize) -> Option<CachedLeaf<T>> {
        loop {
            let g1 = self.slot.generation.load(Ordering::Acquire);
            if g1 % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let location = self.slot.location.load(Ordering::Relaxed);
            let length = self.slot.length.load(Ordering::Relaxed);
            let weak = self.slot.leaf.lock().clone();
            let g2 = self.slot.generation.load(Ordering::Acquire);
            if g1 != g2 {
                continue;
            }
            if g1 == 0 {
                return None;
            }
            if index < location || index >= location + length {
                return None;
            }
            return weak.upgrade().map(|leaf| CachedLeaf { leaf, location, length });
        }
    }
}
