//! Interior nodes of the 2-3 tree and the fixed grandchild-redistribution table used
//! when a delete leaves a node's children short of their own 2-3 quota.

use super::node::Node;

/// An interior node always holds 2 or 3 children; `len` is the cached sum of its
/// children's logical slot counts.
pub(crate) struct Interior<T> {
    pub len: usize,
    pub children: Vec<Node<T>>,
}

impl<T> Interior<T> {
    pub fn from_children(children: Vec<Node<T>>) -> Self {
        debug_assert!(
            children.len() == 2 || children.len() == 3,
            "interior node must have 2 or 3 children, got {}",
            children.len()
        );
        let len = children.iter().map(Node::len).sum();
        Self { len, children }
    }

    pub fn recompute_len(&mut self) {
        self.len = self.children.iter().map(Node::len).sum();
    }
}

/// `DISTRIBUTION[g] = (for_child0, for_child1, for_child2)` grandchildren counts for
/// a total of `g` grandchildren collected from surviving children after a delete,
/// `g` ranging over 0..=9 (at most 3 children, each with at most 3 children of its
/// own). Chosen so each nonzero group stays within 2..=3 wherever grouping into more
/// than one slot is possible.
pub(crate) const DISTRIBUTION: [(usize, usize, usize); 10] = [
    (0, 0, 0), // 0
    (1, 0, 0), // 1
    (2, 0, 0), // 2
    (3, 0, 0), // 3
    (2, 2, 0), // 4
    (3, 2, 0), // 5
    (3, 3, 0), // 6
    (3, 2, 2), // 7
    (3, 3, 2), // 8
    (3, 3, 3), // 9
];

/// Redistributes a flattened list of grandchildren into a replacement node, per
/// [`DISTRIBUTION`]. When the table assigns everything to a single group, the
/// replacement collapses by one tree level (the group becomes the direct
/// replacement rather than being wrapped in a degenerate one-child interior).
pub(crate) fn rebalance<T>(grandchildren: Vec<Node<T>>) -> Option<Node<T>> {
    let g = grandchildren.len();
    assert!(g <= 9, "at most 9 grandchildren can be collected from 3 children of 3");
    let (n0, n1, n2) = DISTRIBUTION[g];
    debug_assert_eq!(n0 + n1 + n2, g);

    let mut iter = grandchildren.into_iter();
    let group0: Vec<_> = (&mut iter).take(n0).collect();
    let group1: Vec<_> = (&mut iter).take(n1).collect();
    let group2: Vec<_> = iter.collect();
    debug_assert_eq!(group2.len(), n2);

    let groups: Vec<Vec<Node<T>>> = [group0, group1, group2]
        .into_iter()
        .filter(|group| !group.is_empty())
        .collect();

    match groups.len() {
        0 => None,
        1 => Some(group_to_node(groups.into_iter().next().unwrap())),
        _ => {
            let children = groups.into_iter().map(group_to_node).collect();
            Some(Node::Interior(Interior::from_children(children)))
        }
    }
}

fn group_to_node<T>(mut group: Vec<Node<T>>) -> Node<T> {
    if group.len() == 1 {
        group.pop().unwrap()
    } else {
        Node::Interior(Interior::from_children(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_rows_sum_to_their_index() {
        for (g, &(a, b, c)) in DISTRIBUTION.iter().enumerate() {
            assert_eq!(a + b + c, g);
        }
    }

    #[test]
    fn distribution_never_overfills_a_slot() {
        for &(a, b, c) in &DISTRIBUTION {
            assert!(a <= 3 && b <= 3 && c <= 3);
        }
    }

    #[test]
    fn distribution_uses_at_most_one_nonempty_slot_below_four() {
        for &(a, b, c) in &DISTRIBUTION[0..=3] {
            let nonempty = [a, b, c].iter().filter(|&&x| x > 0).count();
            assert!(nonempty <= 1);
        }
    }

    #[test]
    fn distribution_uses_at_least_two_nonempty_slots_from_four_up() {
        for &(a, b, c) in &DISTRIBUTION[4..=9] {
            let nonempty = [a, b, c].iter().filter(|&&x| x > 0).count();
            assert!(nonempty >= 2);
        }
    }
}
