//! The indexed leaf store: a 2-3 tree of leaf pages addressed by logical slot index,
//! with a small generation-counted cache remembering the most recently touched leaf.
//!
//! This is the storage engine the sequence container's large (`Mutable-Store`)
//! representation is built on; it is also usable directly as an indexed container
//! in its own right.

mod cache;
mod interior;
mod leaf;
mod node;

use std::sync::Arc;

use crate::error::{Result, SeqError};
use crate::types::{NeverRetry, OomHandler, Range};

use cache::LeafCache;
use interior::Interior;
use node::Node;

/// Configuration for a [`LeafStore`]: the fixed per-slot size and an optional
/// out-of-memory handler (see [`OomHandler`]).
pub struct LeafStoreConfig {
    value_size: usize,
    oom: Arc<dyn OomHandler>,
}

impl LeafStoreConfig {
    /// `value_size` bounds leaf capacity (`MAX_LEAF_BYTES / value_size`) the same
    /// way it would for a raw byte store; pass `std::mem::size_of::<T>()` for a
    /// typed store unless you have a reason to model a narrower slot width.
    pub fn new(value_size: usize) -> Self {
        Self {
            value_size: value_size.max(1),
            oom: Arc::new(NeverRetry),
        }
    }

    pub fn with_oom_handler(mut self, handler: Arc<dyn OomHandler>) -> Self {
        self.oom = handler;
        self
    }
}

/// An indexed store of `T` values backed by a 2-3 tree of leaf pages.
pub struct LeafStore<T> {
    root: Node<T>,
    count: usize,
    value_size: usize,
    max_leaf_capacity: usize,
    cache: LeafCache<T>,
    oom: Arc<dyn OomHandler>,
}

impl<T: Clone + Default + Send + Sync + 'static> LeafStore<T> {
    pub fn create(config: LeafStoreConfig) -> Self {
        let max_leaf_capacity = leaf::max_leaf_capacity(config.value_size);
        Self {
            root: Node::new_empty_leaf(max_leaf_capacity),
            count: 0,
            value_size: config.value_size,
            max_leaf_capacity,
            cache: LeafCache::default(),
            oom: config.oom,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Reads the value at `index`, consulting the leaf cache before descending the
    /// tree.
    pub fn get(&self, index: usize) -> T {
        crate::types::assert_range_in_bounds(Range::single(index), self.count);
        if let Some(hit) = self.cache.lookup(index) {
            let leaf = hit.leaf.read();
            let local = index - hit.location;
            return leaf.slots()[local].clone();
        }
        let (leaf, location, length) = self.root.locate_leaf(index, 0);
        let value = {
            let guard = leaf.read();
            guard.slots()[index - location].clone()
        };
        self.cache.publish(&leaf, location, length);
        value
    }

    pub fn get_range(&self, range: Range) -> Vec<T> {
        crate::types::assert_range_in_bounds(range, self.count);
        let mut out = Vec::with_capacity(range.length);
        self.root.read_range(range, &mut out);
        out
    }

    /// Invokes `f(index, &mut value)` for every slot in `range`, in order.
    pub fn apply<F: FnMut(usize, &mut T)>(&self, range: Range, mut f: F) {
        crate::types::assert_range_in_bounds(range, self.count);
        self.root.apply_range(range, &mut f, 0);
        self.cache.invalidate();
    }

    pub fn insert_range(&mut self, at: usize, values: Vec<T>) -> Result<()> {
        assert!(at <= self.count, "insert index {at} out of bounds for count {}", self.count);
        if values.is_empty() {
            return Ok(());
        }
        self.probe_allocation(values.len())?;
        let incoming = values.len();
        if let Some(sibling) = self.root.insert_at(at, values, self.value_size, self.max_leaf_capacity) {
            log::debug!("leaf store root split, promoting to a new interior root (count was {})", self.count);
            let old_root = std::mem::replace(&mut self.root, Node::new_empty_leaf(self.max_leaf_capacity));
            self.root = Node::Interior(Interior::from_children(vec![old_root, sibling]));
        }
        self.count += incoming;
        self.cache.invalidate();
        Ok(())
    }

    pub fn delete_range(&mut self, range: Range) -> Result<()> {
        crate::types::assert_range_in_bounds(range, self.count);
        if range.is_empty() {
            return Ok(());
        }
        let emptied = self.root.delete_range(range);
        self.count -= range.length;
        if emptied {
            self.root = Node::new_empty_leaf(self.max_leaf_capacity);
        } else {
            let was_interior = matches!(self.root, Node::Interior(_));
            self.collapse_degenerate_root();
            if was_interior && matches!(self.root, Node::Leaf(_)) {
                log::debug!("leaf store root collapsed to a single leaf (count now {})", self.count);
            }
        }
        self.cache.invalidate();
        Ok(())
    }

    /// Overwrites `range` with `values` in place; never inserts or deletes slots, so
    /// `values.len()` must equal `range.length`. Callers that need to change the
    /// element count should call [`Self::insert_range`] / [`Self::delete_range`]
    /// directly instead.
    pub fn replace_range(&mut self, range: Range, values: Vec<T>) -> Result<()> {
        crate::types::assert_range_in_bounds(range, self.count);
        assert_eq!(values.len(), range.length, "replace_range overwrites in place; it cannot change element count");
        if range.is_empty() {
            return Ok(());
        }
        let mut incoming = values.into_iter();
        self.root.apply_range(range, &mut |_, slot| *slot = incoming.next().expect("value count matches range length"), 0);
        self.cache.invalidate();
        Ok(())
    }

    /// Human-readable dump of the tree shape, for diagnostics.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        describe_node(&self.root, 0, &mut out);
        out
    }

    /// Walks the whole tree checking the 2-3 discipline and leaf capacities, for use
    /// by callers that want to confirm structural health (e.g. after a large batch
    /// of mutations, or in tests). Not called on any mutating path — it's an O(n)
    /// diagnostic, not a safety net.
    pub fn verify_invariants(&self) -> Result<()> {
        let actual_len = self.root.len();
        if actual_len != self.count {
            return Err(SeqError::invariant(format!("root length {actual_len} does not match store count {}", self.count)));
        }
        verify_node(&self.root, true)
    }

    fn collapse_degenerate_root(&mut self) {
        while let Node::Interior(interior) = &mut self.root {
            if interior.children.len() != 1 {
                break;
            }
            let only = interior.children.pop().unwrap();
            self.root = only;
        }
    }

    fn probe_allocation(&self, additional: usize) -> Result<()> {
        loop {
            let mut probe: Vec<T> = Vec::new();
            match probe.try_reserve(additional) {
                Ok(()) => return Ok(()),
                Err(_) => {
                    let context = format!("leaf store allocation of {additional} slots");
                    log::warn!("{context} failed, consulting oom handler");
                    if self.oom.on_allocation_failure(&context) {
                        continue;
                    }
                    return Err(SeqError::allocation_failed(additional * self.value_size, context));
                }
            }
        }
    }
}

/// A non-root interior node with a single child is a transient state this tree
/// accepts rather than forbids: a delete that collapses a subtree down to one leaf
/// can leave that leaf as the sole child of its parent until a later mutation walks
/// through it again. Every traversal still works correctly through such a node, so
/// this only flags 0 children (an interior that should have been dropped) or more
/// than 3 (a split that should have happened but didn't).
fn verify_node<T>(node: &Node<T>, is_root: bool) -> Result<()> {
    match node {
        Node::Leaf(handle) => {
            let leaf = handle.read();
            if leaf.len > leaf.capacity {
                return Err(SeqError::invariant(format!("leaf length {} exceeds capacity {}", leaf.len, leaf.capacity)));
            }
            Ok(())
        }
        Node::Interior(interior) => {
            let children = interior.children.len();
            if !is_root && (children == 0 || children > 3) {
                return Err(SeqError::invariant(format!("interior node has {children} children, expected 1 to 3")));
            }
            let actual_len: usize = interior.children.iter().map(Node::len).sum();
            if actual_len != interior.len {
                return Err(SeqError::invariant(format!("interior node's cached len {} does not match its children's total {actual_len}", interior.len)));
            }
            for child in &interior.children {
                verify_node(child, false)?;
            }
            Ok(())
        }
    }
}

fn describe_node<T>(node: &Node<T>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Leaf(handle) => {
            let leaf = handle.read();
            out.push_str(&format!("{indent}leaf len={} capacity={}\n", leaf.len, leaf.capacity));
        }
        Node::Interior(interior) => {
            out.push_str(&format!("{indent}interior len={} children={}\n", interior.len, interior.children.len()));
            for child in &interior.children {
                describe_node(child, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(value_size: usize) -> LeafStore<i64> {
        LeafStore::create(LeafStoreConfig::new(value_size))
    }

    #[test]
    fn empty_store_has_zero_count() {
        let s = store(8);
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut s = store(8);
        s.insert_range(0, vec![1, 2, 3]).unwrap();
        assert_eq!(s.count(), 3);
        assert_eq!(s.get_range(Range::new(0, 3)), vec![1, 2, 3]);
        assert_eq!(s.get(1), 2);
    }

    #[test]
    fn insert_in_the_middle_preserves_order() {
        let mut s = store(8);
        s.insert_range(0, vec![1, 2, 3]).unwrap();
        s.insert_range(1, vec![9, 9]).unwrap();
        assert_eq!(s.get_range(Range::new(0, 5)), vec![1, 9, 9, 2, 3]);
    }

    #[test]
    fn delete_range_shrinks_and_reindexes() {
        let mut s = store(8);
        s.insert_range(0, vec![1, 2, 3, 4, 5]).unwrap();
        s.delete_range(Range::new(1, 2)).unwrap();
        assert_eq!(s.count(), 3);
        assert_eq!(s.get_range(Range::new(0, 3)), vec![1, 4, 5]);
    }

    #[test]
    fn leaf_splits_when_it_overflows_capacity() {
        let max = leaf::max_leaf_capacity(8);
        let mut s = store(8);
        let values: Vec<i64> = (0..(max as i64 + 50)).collect();
        s.insert_range(0, values.clone()).unwrap();
        assert_eq!(s.count(), values.len());
        assert_eq!(s.get_range(Range::new(0, values.len())), values);
        assert!(matches!(s.root, Node::Interior(_)), "store should have split into an interior node");
    }

    #[test]
    fn insert_in_middle_of_a_full_leaf_forces_three_way_split() {
        let max = leaf::max_leaf_capacity(8);
        let mut s = store(8);
        let values: Vec<i64> = (0..max as i64).collect();
        s.insert_range(0, values).unwrap();
        s.insert_range(max / 2, vec![-1]).unwrap();
        assert_eq!(s.count(), max + 1);
        let out = s.get_range(Range::new(0, s.count()));
        assert_eq!(out[max / 2], -1);
    }

    #[test]
    fn many_inserts_and_deletes_keep_the_tree_consistent() {
        let mut s = store(8);
        let max = leaf::max_leaf_capacity(8);
        let values: Vec<i64> = (0..(max as i64 * 4)).collect();
        s.insert_range(0, values.clone()).unwrap();
        let mut expected = values;

        // Repeatedly delete a run of 3 near the front to force repeated merges and
        // grandchild rebalances as the tree shrinks.
        let mut round = 0;
        while expected.len() > 3 && round < 200 {
            let at = (round * 7) % (expected.len() - 3);
            s.delete_range(Range::new(at, 3)).unwrap();
            expected.drain(at..at + 3);
            round += 1;
        }
        assert_eq!(s.count(), expected.len());
        assert_eq!(s.get_range(Range::new(0, s.count())), expected);
        s.verify_invariants().unwrap();
    }

    #[test]
    fn replace_range_substitutes_in_place() {
        let mut s = store(8);
        s.insert_range(0, vec![1, 2, 3, 4]).unwrap();
        s.replace_range(Range::new(1, 2), vec![9, 9]).unwrap();
        assert_eq!(s.count(), 4);
        assert_eq!(s.get_range(Range::new(0, s.count())), vec![1, 9, 9, 4]);
    }

    #[test]
    #[should_panic]
    fn replace_range_rejects_a_length_change() {
        let mut s = store(8);
        s.insert_range(0, vec![1, 2, 3, 4]).unwrap();
        s.replace_range(Range::new(1, 2), vec![9]).unwrap();
    }

    #[test]
    fn apply_mutates_in_place_and_invalidates_cache() {
        let mut s = store(8);
        s.insert_range(0, vec![1, 2, 3]).unwrap();
        let _ = s.get(0);
        s.apply(Range::new(0, 3), |_, v| *v *= 10);
        assert_eq!(s.get_range(Range::new(0, 3)), vec![10, 20, 30]);
    }
}
