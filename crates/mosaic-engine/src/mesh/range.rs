use std::collections::VecDeque;

/// Queue of unit positions restricting the next draws to a sub-range.
///
/// Values are pushed in `(from, to)` pairs and popped two per render. A missing
/// value (empty or exhausted queue) resolves to the caller's default.
#[derive(Debug, Default)]
pub struct DrawRangeQueue {
    values: VecDeque<usize>,
}

impl DrawRangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_range(&mut self, from: usize, to: usize) {
        self.values.push_back(from);
        self.values.push_back(to);
    }

    /// Pushes a single endpoint.
    #[inline]
    pub fn push(&mut self, value: usize) {
        self.values.push_back(value);
    }

    #[inline]
    pub fn pop_or(&mut self, default: usize) -> usize {
        self.values.pop_front().unwrap_or(default)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
