//! Shuffle play history
//!
//! Records the playlist indices visited while shuffle is on, so that a
//! shuffled pass never repeats an entry and "previous" can walk back.

/// Ordered list of playlist indices played under shuffle
#[derive(Debug, Clone)]
pub struct ShuffleHistory {
    /// Visit order (most recent = back)
    order: Vec<usize>,

    /// Occurrences of each index in `order`
    counts: Vec<usize>,
}

impl ShuffleHistory {
    /// Create an empty history for a playlist of `playlist_len` entries
    pub fn new(playlist_len: usize) -> Self {
        Self {
            order: Vec::with_capacity(playlist_len),
            counts: vec![0; playlist_len],
        }
    }

    /// Reset to a single entry
    pub fn reseed(&mut self, index: usize) {
        self.clear();
        self.push(index);
    }

    /// Record a visit
    pub fn push(&mut self, index: usize) {
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0);
        }
        self.counts[index] += 1;
        self.order.push(index);
    }

    /// Step back one visit
    ///
    /// Drops the most recent index and returns the one before it. Leaves
    /// the history untouched and returns `None` when fewer than two visits
    /// are recorded.
    pub fn step_back(&mut self) -> Option<usize> {
        if self.order.len() < 2 {
            return None;
        }
        if let Some(dropped) = self.order.pop() {
            self.counts[dropped] -= 1;
        }
        self.order.last().copied()
    }

    /// Whether `index` was visited in this pass
    pub fn contains(&self, index: usize) -> bool {
        self.counts.get(index).is_some_and(|&c| c > 0)
    }

    /// Indices of the playlist not yet visited, ascending
    pub fn unplayed(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Visit order, oldest first
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Most recent visit
    pub fn last(&self) -> Option<usize> {
        self.order.last().copied()
    }

    /// Number of recorded visits
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every visit
    pub fn clear(&mut self) {
        self.order.clear();
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}
