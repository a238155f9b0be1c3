//! Bounded, seed-anchored turn history shared by both debaters.
//!
//! The seed turn is stored apart from the rest of the history so that no
//! eviction or trim can ever drop it. Non-seed turns are evicted FIFO once more
//! than `capacity` of them would be stored.

use std::collections::VecDeque;

use crate::core::types::Turn;

#[derive(Debug, Clone)]
pub struct ContextWindow {
    seed: Turn,
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ContextWindow {
    /// Create a window holding only `seed`, retaining at most `capacity` non-seed turns.
    pub fn new(seed: Turn, capacity: usize) -> Self {
        Self {
            seed,
            turns: VecDeque::new(),
            capacity,
        }
    }

    pub fn seed(&self) -> &Turn {
        &self.seed
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of stored turns, seed included.
    pub fn len(&self) -> usize {
        1 + self.turns.len()
    }

    /// Always false: the seed is never evicted.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Append `turn`, evicting the oldest non-seed turns beyond capacity.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Seed followed by the most recent `max_len - 1` non-seed turns, in order.
    ///
    /// `max_len <= 1` yields the seed alone.
    pub fn trimmed(&self, max_len: usize) -> Vec<&Turn> {
        let keep = max_len.saturating_sub(1).min(self.turns.len());
        let skip = self.turns.len() - keep;
        std::iter::once(&self.seed)
            .chain(self.turns.iter().skip(skip))
            .collect()
    }
}
