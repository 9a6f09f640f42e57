//! Boundary scenario: two containers built from distinct custom callback records
//! compare unequal even when both are empty, because callback identity is checked
//! before any element ever is.

use std::sync::Arc;

use seqcore::{Callbacks, ContainerConfig, ElementOps, SequenceContainer};

struct Loud;
impl ElementOps<i32> for Loud {
    fn equal(&self, a: &i32, b: &i32) -> bool {
        a == b
    }
    fn describe(&self, value: &i32) -> String {
        format!("loud({value})")
    }
}

#[test]
fn distinct_custom_callbacks_are_never_equal_even_when_empty() {
    let a: SequenceContainer<i32> = SequenceContainer::create(vec![], ContainerConfig::immutable(Callbacks::custom(Arc::new(Loud) as Arc<dyn ElementOps<i32>>)));
    let b: SequenceContainer<i32> = SequenceContainer::create(vec![], ContainerConfig::immutable(Callbacks::custom(Arc::new(Loud) as Arc<dyn ElementOps<i32>>)));

    assert_eq!(a.count(), 0);
    assert_eq!(b.count(), 0);
    assert_ne!(a, b, "distinct custom callback records must break equality before elements are compared");
}

#[test]
fn shared_custom_callback_record_is_equal_when_elements_match() {
    let ops: Arc<dyn ElementOps<i32>> = Arc::new(Loud);
    let a: SequenceContainer<i32> = SequenceContainer::create(vec![1, 2, 3], ContainerConfig::immutable(Callbacks::custom(ops.clone())));
    let b: SequenceContainer<i32> = SequenceContainer::create(vec![1, 2, 3], ContainerConfig::immutable(Callbacks::custom(ops)));

    assert_eq!(a, b);
}
