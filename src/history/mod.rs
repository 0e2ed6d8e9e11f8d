pub mod models;

use std::collections::VecDeque;

use crate::models::Track;
pub use models::HistoryEntry;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded record of recent plays, oldest first.
#[derive(Debug, Clone)]
pub struct ListeningHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for ListeningHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ListeningHistory {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record_play(&mut self, track: &Track) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry::from(track));
    }

    /// The `n` most recent entries, most recent first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev().take(n)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
