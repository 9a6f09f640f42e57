//! # seqcore
//!
//! Core in-memory data structures for an object runtime: an ordered-sequence
//! container and an indexed leaf store, both generic over element type.
//!
//! ## Architecture
//!
//! - **Types Layer** (`types`): shared constants, the logical `Range` type, and the
//!   element callback contract
//! - **Leaf Store** (`store`): a 2-3 tree of lazily-materialized leaf pages,
//!   addressed by logical slot index, with a small read cache
//! - **Sequence Container** (`container`): an ordered sequence that is either a
//!   fixed immutable array or a mutable container transparently backed by a deque
//!   or a leaf store depending on size
//!
//! ## Usage
//!
//! ```rust
//! use seqcore::{Callbacks, ContainerConfig, SequenceContainer};
//!
//! let mut list = SequenceContainer::create_mutable(0, ContainerConfig::mutable(Callbacks::type_callbacks()));
//! list.append_range(vec![1, 2, 3]).unwrap();
//! list.insert(1, 99).unwrap();
//! assert_eq!(list.get_range((0, 4).into()), vec![1, 99, 2, 3]);
//! ```

pub mod container;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, SeqError};
pub use types::{Callbacks, ElementOps, OomHandler, Range, MAX_DEQUE_CAPACITY};

pub use container::{ContainerConfig, SequenceContainer};
pub use store::{LeafStore, LeafStoreConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_and_store_compose_end_to_end() {
        let mut list = SequenceContainer::create_mutable(0, ContainerConfig::mutable(Callbacks::type_callbacks()));
        list.append_range(vec![1, 2, 3, 4, 5]).unwrap();
        list.remove(2).unwrap();
        assert_eq!(list.get_range(Range::new(0, 4)), vec![1, 2, 4, 5]);

        let mut store = LeafStore::create(LeafStoreConfig::new(std::mem::size_of::<i32>()));
        store.insert_range(0, vec![10, 20, 30]).unwrap();
        assert_eq!(store.get_range(Range::new(0, 3)), vec![10, 20, 30]);
    }
}
