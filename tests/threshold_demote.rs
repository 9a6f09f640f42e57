//! Boundary scenario: deleting enough elements from a leaf-store-backed container
//! demotes it back to a deque once count drops below `DEQUE_DEMOTE_THRESHOLD`.

use seqcore::types::{DEQUE_DEMOTE_THRESHOLD, MAX_DEQUE_CAPACITY};
use seqcore::{Callbacks, ContainerConfig, Range, SequenceContainer};

#[test]
fn demotes_below_the_threshold() {
    let mut list: SequenceContainer<i32> = SequenceContainer::create_mutable(0, ContainerConfig::mutable(Callbacks::type_callbacks()));
    list.append_range(vec![0i32; MAX_DEQUE_CAPACITY]).unwrap();
    assert_eq!(list.count(), MAX_DEQUE_CAPACITY);

    // Drop count to DEQUE_DEMOTE_THRESHOLD - 1, strictly below the demote threshold.
    let target = DEQUE_DEMOTE_THRESHOLD - 1;
    let to_remove = list.count() - target;
    list.remove_range(Range::new(list.count() - to_remove, to_remove)).unwrap();

    assert_eq!(list.count(), target);
    for i in 0..list.count() {
        assert_eq!(list.get(i), 0);
    }
}
