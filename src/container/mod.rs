//! The ordered-sequence container: an immutable inline array, or a mutable
//! container that transparently promotes from a ring-buffer deque to a leaf-store
//! tree as it grows past [`MAX_DEQUE_CAPACITY`], and demotes back down again once
//! deletions shrink it below [`DEQUE_DEMOTE_THRESHOLD`].

mod deque;

use std::fmt;

use crate::error::Result;
use crate::store::{LeafStore, LeafStoreConfig};
use crate::types::{assert_range_in_bounds, Callbacks, Range, MAX_DEQUE_CAPACITY};

use deque::Deque;

enum Representation<T> {
    /// A fixed array backing an immutable container; never transitions to another
    /// representation since an immutable container never mutates.
    Inline(Vec<T>),
    /// A ring buffer backing a mutable container below the promotion threshold.
    Deque(Deque<T>),
    /// A 2-3 tree backing a mutable container at or above the promotion threshold.
    Store(LeafStore<T>),
}

/// Configuration for a new container: whether it is mutable, and which element
/// callbacks it uses for retain/release/equal/describe.
pub struct ContainerConfig<T> {
    mutable: bool,
    callbacks: Callbacks<T>,
}

impl<T> ContainerConfig<T> {
    pub fn immutable(callbacks: Callbacks<T>) -> Self {
        Self {
            mutable: false,
            callbacks,
        }
    }

    pub fn mutable(callbacks: Callbacks<T>) -> Self {
        Self {
            mutable: true,
            callbacks,
        }
    }
}

/// An ordered sequence of `T`, in one of three representations depending on size
/// and mutability (see [`Representation`]).
pub struct SequenceContainer<T> {
    mutable: bool,
    representation: Representation<T>,
    callbacks: Callbacks<T>,
    /// Bumped on every mutating operation; used by callers that need to detect
    /// concurrent modification (e.g. an in-progress external iterator).
    mutation_counter: u64,
}

impl<T: Clone + Default + Send + Sync + 'static> SequenceContainer<T> {
    /// Builds an immutable container from `values`; it never mutates or changes
    /// representation for the rest of its life.
    pub fn create(values: Vec<T>, config: ContainerConfig<T>) -> Self {
        assert!(!config.mutable, "create() builds an immutable container; use create_mutable() instead");
        let values: Vec<T> = values.into_iter().map(|v| config.callbacks.retain(v)).collect();
        Self {
            mutable: false,
            representation: Representation::Inline(values),
            callbacks: config.callbacks,
            mutation_counter: 0,
        }
    }

    /// Builds an empty mutable container, optionally reserving `capacity_hint`
    /// slots up front.
    pub fn create_mutable(capacity_hint: usize, config: ContainerConfig<T>) -> Self {
        assert!(config.mutable, "create_mutable() requires a mutable ContainerConfig");
        let representation = if capacity_hint >= MAX_DEQUE_CAPACITY {
            Representation::Store(LeafStore::create(LeafStoreConfig::new(std::mem::size_of::<T>())))
        } else {
            Representation::Deque(Deque::with_capacity_hint(capacity_hint))
        };
        Self {
            mutable: true,
            representation,
            callbacks: config.callbacks,
            mutation_counter: 0,
        }
    }

    /// An immutable snapshot of this container's current contents.
    pub fn create_copy(&self) -> Self {
        Self::create(self.get_range(Range::new(0, self.count())), ContainerConfig::immutable(self.callbacks.clone()))
    }

    /// A mutable copy of this container's current contents, starting in whichever
    /// representation its size calls for.
    pub fn create_mutable_copy(&self) -> Self {
        let values = self.get_range(Range::new(0, self.count()));
        let mut copy = Self::create_mutable(values.len(), ContainerConfig::mutable(self.callbacks.clone()));
        copy.append_range(values).expect("copying an existing count never overflows allocation");
        copy
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn mutation_counter(&self) -> u64 {
        self.mutation_counter
    }

    pub fn count(&self) -> usize {
        match &self.representation {
            Representation::Inline(v) => v.len(),
            Representation::Deque(d) => d.len(),
            Representation::Store(s) => s.count(),
        }
    }

    #[track_caller]
    pub fn get(&self, index: usize) -> T {
        assert_range_in_bounds(Range::single(index), self.count());
        match &self.representation {
            Representation::Inline(v) => v[index].clone(),
            Representation::Deque(d) => d.get(index),
            Representation::Store(s) => s.get(index),
        }
    }

    pub fn get_range(&self, range: Range) -> Vec<T> {
        assert_range_in_bounds(range, self.count());
        match &self.representation {
            Representation::Inline(v) => v[range.location..range.end()].to_vec(),
            Representation::Deque(d) => d.get_range(range.location, range.length),
            Representation::Store(s) => s.get_range(range),
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        (0..self.count()).find(|&i| self.callbacks.equal(&self.get(i), value))
    }

    pub fn count_of(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        (0..self.count()).filter(|&i| self.callbacks.equal(&self.get(i), value)).count()
    }

    /// Visits every element of `range` in order, allowing in-place mutation.
    pub fn apply<F: FnMut(usize, &mut T)>(&mut self, range: Range, mut f: F) {
        self.assert_mutable();
        assert_range_in_bounds(range, self.count());
        match &mut self.representation {
            Representation::Inline(_) => unreachable!("immutable containers reject apply via assert_mutable"),
            Representation::Deque(d) => {
                for i in range.location..range.end() {
                    let mut value = d.get(i);
                    f(i, &mut value);
                    d.set(i, value);
                }
            }
            Representation::Store(s) => s.apply(range, f),
        }
        self.mutation_counter += 1;
    }

    pub fn append(&mut self, value: T) -> Result<()> {
        let at = self.count();
        self.insert(at, value)
    }

    pub fn insert(&mut self, at: usize, value: T) -> Result<()> {
        self.insert_range(at, vec![value])
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.assert_mutable();
        assert_range_in_bounds(Range::single(index), self.count());
        let value = self.callbacks.retain(value);
        let old = self.get(index);
        match &mut self.representation {
            Representation::Inline(_) => unreachable!(),
            Representation::Deque(d) => d.set(index, value),
            Representation::Store(s) => s.replace_range(Range::single(index), vec![value])?,
        }
        self.callbacks.release(&old);
        self.mutation_counter += 1;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.remove_range(Range::single(index))
    }

    pub fn remove_all(&mut self) -> Result<()> {
        let count = self.count();
        if count > 0 {
            self.remove_range(Range::new(0, count))?;
        }
        Ok(())
    }

    /// Swaps the elements at `a` and `b`; a no-op if they're the same index.
    pub fn exchange(&mut self, a: usize, b: usize) -> Result<()> {
        self.assert_mutable();
        assert_range_in_bounds(Range::single(a), self.count());
        assert_range_in_bounds(Range::single(b), self.count());
        if a == b {
            return Ok(());
        }
        let va = self.get(a);
        let vb = self.get(b);
        match &mut self.representation {
            Representation::Inline(_) => unreachable!(),
            Representation::Deque(d) => {
                d.set(a, vb);
                d.set(b, va);
            }
            Representation::Store(s) => {
                s.replace_range(Range::single(a), vec![vb])?;
                s.replace_range(Range::single(b), vec![va])?;
            }
        }
        self.mutation_counter += 1;
        Ok(())
    }

    pub fn append_range(&mut self, values: Vec<T>) -> Result<()> {
        let at = self.count();
        self.insert_range(at, values)
    }

    pub fn insert_range(&mut self, at: usize, values: Vec<T>) -> Result<()> {
        self.replace_range(Range::new(at, 0), values)
    }

    pub fn remove_range(&mut self, range: Range) -> Result<()> {
        self.replace_range(range, Vec::new())
    }

    /// The hardest single operation: replaces `range` with `values`, retaining and
    /// releasing elements as they cross the boundary, and transitioning the backing
    /// representation (deque <-> leaf store) as the resulting size crosses
    /// [`MAX_DEQUE_CAPACITY`] / [`crate::types::DEQUE_DEMOTE_THRESHOLD`].
    ///
    /// `values` must not alias storage already owned by this container — this
    /// container may read its own prior contents as part of a representation
    /// transition, and an aliased slice would then observe inconsistent state.
    pub fn replace_range(&mut self, range: Range, values: Vec<T>) -> Result<()> {
        self.assert_mutable();
        assert_range_in_bounds(range, self.count());

        let values: Vec<T> = values.into_iter().map(|v| self.callbacks.retain(v)).collect();
        for i in range.location..range.end() {
            let old = self.get(i);
            self.callbacks.release(&old);
        }

        let new_count = self.count() - range.length + values.len();

        match &mut self.representation {
            Representation::Inline(_) => unreachable!("immutable containers reject mutation via assert_mutable"),
            Representation::Deque(d) => {
                if !range.is_empty() {
                    d.delete_range(range.location, range.length);
                }
                d.insert_range(range.location, values);
            }
            Representation::Store(s) => {
                if values.len() == range.length {
                    if !range.is_empty() {
                        s.replace_range(range, values)?;
                    }
                } else {
                    if !range.is_empty() {
                        s.delete_range(range)?;
                    }
                    s.insert_range(range.location, values)?;
                }
            }
        }

        self.mutation_counter += 1;
        self.rebalance_representation(new_count)?;
        Ok(())
    }

    fn rebalance_representation(&mut self, count: usize) -> Result<()> {
        match &self.representation {
            Representation::Inline(_) => {}
            Representation::Deque(_) if count >= MAX_DEQUE_CAPACITY => {
                log::debug!("promoting sequence container from deque to leaf store at count {count}");
                let values = self.get_range(Range::new(0, count));
                let mut store = LeafStore::create(LeafStoreConfig::new(std::mem::size_of::<T>()));
                store.insert_range(0, values)?;
                self.representation = Representation::Store(store);
            }
            Representation::Store(_) if count < crate::types::DEQUE_DEMOTE_THRESHOLD => {
                log::debug!("demoting sequence container from leaf store to deque at count {count}");
                let values = self.get_range(Range::new(0, count));
                let mut deque = Deque::with_capacity_hint(count);
                deque.insert_range(0, values);
                self.representation = Representation::Deque(deque);
            }
            _ => {}
        }
        Ok(())
    }

    /// Sorts the elements within `range` in place, leaving everything outside it
    /// untouched.
    pub fn sort<F: FnMut(&T, &T) -> std::cmp::Ordering>(&mut self, range: Range, mut cmp: F) {
        self.assert_mutable();
        assert_range_in_bounds(range, self.count());
        let mut values = self.get_range(range);
        values.sort_by(&mut cmp);
        match &mut self.representation {
            Representation::Inline(_) => unreachable!(),
            Representation::Deque(d) => {
                for (offset, v) in values.into_iter().enumerate() {
                    d.set(range.location + offset, v);
                }
            }
            Representation::Store(s) => {
                s.replace_range(range, values).expect("in-place re-sort never changes element count");
            }
        }
        self.mutation_counter += 1;
    }

    /// Binary search over an already-sorted `range`. Returns `Ok(index)` for an
    /// exact match, or `Err(index)` for the first-greater-or-equal insertion point
    /// that would keep `range` sorted, bounded to `[range.location, range.end()]`.
    pub fn bsearch<F: Fn(&T) -> std::cmp::Ordering>(&self, range: Range, probe: F) -> std::result::Result<usize, usize> {
        assert_range_in_bounds(range, self.count());
        let mut lo = range.location;
        let mut hi = range.end();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match probe(&self.get(mid)) {
                std::cmp::Ordering::Equal => return Ok(mid),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Err(lo)
    }

    /// Reserves capacity for future growth without changing the logical count.
    /// A no-op for containers already backed by the leaf store, which grows its own
    /// leaves on demand.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.assert_mutable();
        if let Representation::Deque(d) = &mut self.representation {
            if capacity > d.capacity() {
                let values = d.to_vec();
                let mut grown = Deque::with_capacity_hint(capacity);
                grown.insert_range(0, values);
                *d = grown;
            }
        }
    }

    /// Sign of the deque representation's last re-center tie-break, or `None` if
    /// this container isn't currently backed by a deque.
    pub fn deque_bias(&self) -> Option<i8> {
        match &self.representation {
            Representation::Deque(d) => Some(d.bias()),
            _ => None,
        }
    }

    pub fn describe(&self) -> String
    where
        T: fmt::Debug,
    {
        let kind = match &self.representation {
            Representation::Inline(_) => "inline",
            Representation::Deque(_) => "deque",
            Representation::Store(_) => "store",
        };
        let elements: Vec<String> = (0..self.count()).map(|i| self.callbacks.describe(&self.get(i))).collect();
        format!("SequenceContainer(mutable={}, repr={kind}, count={}) [{}]", self.mutable, self.count(), elements.join(", "))
    }

    #[track_caller]
    fn assert_mutable(&self) {
        assert!(self.mutable, "attempted to mutate an immutable sequence container");
    }
}

/// Structural equality: callback identity is compared first (two containers built
/// with different custom callbacks are never equal, regardless of contents), then
/// element count, then elements in order.
impl<T: Clone + Default + PartialEq + Send + Sync + 'static> PartialEq for SequenceContainer<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.callbacks != other.callbacks {
            return false;
        }
        if self.count() != other.count() {
            return false;
        }
        (0..self.count()).all(|i| self.callbacks.equal(&self.get(i), &other.get(i)))
    }
}

/// Intentionally weak: only the element count participates in the hash, matching
/// the requirement that `a == b` implies `hash(a) == hash(b)` without forcing a full
/// element scan on every hash.
impl<T: Clone + Default + Send + Sync + 'static> std::hash::Hash for SequenceContainer<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.count().hash(state);
    }
}

impl<T: Clone + Default + Send + Sync + 'static + fmt::Debug> fmt::Debug for SequenceContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl<T> Drop for SequenceContainer<T> {
    fn drop(&mut self) {
        if let Representation::Inline(values) = &self.representation {
            for value in values {
                self.callbacks.release(value);
            }
        }
        // Deque/Store elements are released as they're removed via `replace_range`;
        // any remaining elements at drop time are simply deallocated with the
        // backing buffer, matching a container callers never emptied by hand.
    }
}
