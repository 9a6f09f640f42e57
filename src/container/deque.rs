//! The mid-size ring-buffer representation of a sequence container.
//!
//! A deque holds its elements in a power-of-two buffer with wraparound indexing so
//! both front and back inserts are amortized O(1). Making room for an insert or
//! closing a gap after a delete never recenters unconditionally — it shifts
//! whichever side of the insertion point is shorter, reallocating only when the
//! buffer is genuinely out of slack.

use crate::types::{MAX_DEQUE_CAPACITY, MIN_DEQUE_CAPACITY};

pub(crate) struct Deque<T> {
    buffer: Vec<T>,
    left: usize,
    len: usize,
    bias: i8,
}

impl<T: Clone + Default> Deque<T> {
    pub fn new() -> Self {
        Self::with_capacity_hint(MIN_DEQUE_CAPACITY)
    }

    pub fn with_capacity_hint(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_DEQUE_CAPACITY).next_power_of_two();
        Self {
            buffer: vec![T::default(); capacity],
            left: capacity / 2,
            len: 0,
            bias: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Sign of the last re-center's tie-break: negative if the extra slot of odd
    /// slack went to the front, positive if it went to the back, zero if the last
    /// re-center's slack split evenly (or none has happened yet).
    pub fn bias(&self) -> i8 {
        self.bias
    }

    fn slot(&self, logical: usize) -> usize {
        (self.left + logical) % self.buffer.len()
    }

    pub fn get(&self, index: usize) -> T {
        self.buffer[self.slot(index)].clone()
    }

    pub fn set(&mut self, index: usize, value: T) {
        let slot = self.slot(index);
        self.buffer[slot] = value;
    }

    pub fn get_range(&self, location: usize, length: usize) -> Vec<T> {
        (location..location + length).map(|i| self.get(i)).collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.get_range(0, self.len)
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        let mut deque = Self::with_capacity_hint(values.len().max(MIN_DEQUE_CAPACITY));
        deque.insert_range(0, values);
        deque
    }

    pub fn insert_range(&mut self, at: usize, values: Vec<T>) {
        let extra = values.len();
        if extra == 0 {
            return;
        }
        self.make_room(at, extra);
        for (offset, value) in values.into_iter().enumerate() {
            let slot = self.slot(at + offset);
            self.buffer[slot] = value;
        }
        self.len += extra;
    }

    pub fn delete_range(&mut self, location: usize, length: usize) {
        if length == 0 {
            return;
        }
        let before = location;
        let after = self.len - (location + length);
        if before <= after {
            // Shift the shorter, front side forward to close the gap; the ring's
            // logical start simply advances past the removed slots.
            for i in (0..before).rev() {
                let dst = self.slot(i + length);
                let src = self.slot(i);
                self.buffer[dst] = self.buffer[src].clone();
            }
            self.left = (self.left + length) % self.buffer.len();
        } else {
            // Shift the shorter, back side backward to close the gap.
            for i in (location + length)..self.len {
                let dst = self.slot(i - length);
                let src = self.slot(i);
                self.buffer[dst] = self.buffer[src].clone();
            }
        }
        self.len -= length;
    }

    /// Opens a gap of `extra` logical slots at `at`, growing the buffer first if it
    /// has no room left. Mirrors the source's reposition discipline: prefer sliding
    /// whichever side of the insertion point is shorter (Move-A / Move-C) over a
    /// full recenter, and only reallocate (Reallocate) when the buffer is out of
    /// slack outright.
    fn make_room(&mut self, at: usize, extra: usize) {
        if self.len + extra > self.buffer.len() {
            self.reallocate(self.len + extra);
        }

        let before = at;
        let after = self.len - at;
        if before <= after {
            // Move-A: the front is shorter — slide it backward into the slack that
            // now exists before `left`.
            for i in 0..before {
                let dst = self.slot_wrapping_back(extra, i);
                let src = self.slot(i);
                self.buffer[dst] = self.buffer[src].clone();
            }
            self.left = (self.left + self.buffer.len() - extra) % self.buffer.len();
        } else {
            // Move-C: the tail is shorter — slide it forward to open the gap.
            for i in (at..self.len).rev() {
                let dst = self.slot(i + extra);
                let src = self.slot(i);
                self.buffer[dst] = self.buffer[src].clone();
            }
        }
    }

    fn slot_wrapping_back(&self, back_by: usize, logical: usize) -> usize {
        (self.left + self.buffer.len() - back_by + logical) % self.buffer.len()
    }

    /// Re-center: grows the buffer to the next power of two that leaves at least
    /// `wiggle` slots of slack on both sides, so a handful of edge inserts right
    /// after a reallocation don't immediately force another one.
    fn reallocate(&mut self, min_len: usize) {
        let wiggle = (min_len.next_power_of_two() >> 17).max(4);
        let mut new_capacity = min_len.max(MIN_DEQUE_CAPACITY).next_power_of_two();
        while new_capacity < self.len + wiggle * 2 && new_capacity < MAX_DEQUE_CAPACITY {
            new_capacity *= 2;
        }

        let slack = new_capacity - self.len;
        let mut start = slack / 2;
        if slack % 2 == 1 {
            // Odd slack can't be split evenly; alternate which side absorbs the
            // extra slot using the sign of the last re-center.
            if self.bias >= 0 {
                start += 1;
                self.bias = -1;
            } else {
                self.bias = 1;
            }
        } else {
            self.bias = 0;
        }

        let mut new_buffer = vec![T::default(); new_capacity];
        for i in 0..self.len {
            new_buffer[start + i] = self.buffer[self.slot(i)].clone();
        }
        self.buffer = new_buffer;
        self.left = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_get_round_trip() {
        let mut d: Deque<i32> = Deque::new();
        d.insert_range(0, vec![1, 2, 3]);
        assert_eq!(d.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn repeated_front_inserts_preserve_order() {
        let mut d: Deque<i32> = Deque::new();
        for i in 0..5 {
            d.insert_range(0, vec![i]);
        }
        assert_eq!(d.to_vec(), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn insert_in_the_middle_keeps_neighbors() {
        let mut d = Deque::from_vec(vec![1, 2, 3, 4]);
        d.insert_range(2, vec![99]);
        assert_eq!(d.to_vec(), vec![1, 2, 99, 3, 4]);
    }

    #[test]
    fn delete_range_from_front_and_back() {
        let mut d = Deque::from_vec(vec![1, 2, 3, 4, 5]);
        d.delete_range(0, 2);
        assert_eq!(d.to_vec(), vec![3, 4, 5]);
        d.delete_range(1, 1);
        assert_eq!(d.to_vec(), vec![3, 5]);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut d: Deque<i32> = Deque::new();
        let values: Vec<i32> = (0..500).collect();
        d.insert_range(0, values.clone());
        assert_eq!(d.to_vec(), values);
        assert!(d.capacity() >= 500);
    }

    #[test]
    fn recenters_after_many_reverse_inserts_near_a_boundary() {
        let mut d: Deque<i32> = Deque::with_capacity_hint(8);
        for i in 0..5 {
            d.insert_range(0, vec![i]);
        }
        assert_eq!(d.to_vec(), vec![4, 3, 2, 1, 0]);
        d.insert_range(0, vec![-1]);
        assert_eq!(d.to_vec(), vec![-1, 4, 3, 2, 1, 0]);
    }
}
