//! Boundary scenario: a mutable container promotes from deque to leaf store the
//! instant its count reaches `MAX_DEQUE_CAPACITY`, never before.

use seqcore::types::MAX_DEQUE_CAPACITY;
use seqcore::{Callbacks, ContainerConfig, Range, SequenceContainer};

#[test]
fn promotes_exactly_at_the_threshold() {
    let mut list: SequenceContainer<i32> = SequenceContainer::create_mutable(0, ContainerConfig::mutable(Callbacks::type_callbacks()));

    let below_threshold = vec![0i32; MAX_DEQUE_CAPACITY - 1];
    list.append_range(below_threshold).unwrap();
    assert_eq!(list.count(), MAX_DEQUE_CAPACITY - 1);

    list.append(0).unwrap();
    assert_eq!(list.count(), MAX_DEQUE_CAPACITY);

    assert_eq!(list.get(0), 0);
    assert_eq!(list.get(MAX_DEQUE_CAPACITY - 1), 0);
    assert_eq!(list.get_range(Range::new(0, list.count())).len(), MAX_DEQUE_CAPACITY);
}
