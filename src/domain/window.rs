//! Walk-forward train/test window generation.
//!
//! Pair `j` trains on `[s, s + train)` and tests on `[s + train, s + train + test)`
//! with `s = j * offset`. Consecutive pairs overlap; a pair's train and test
//! slices never do.

use crate::domain::error::StudyError;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub train: usize,
    pub test: usize,
    pub offset: usize,
    pub max_windows: Option<usize>,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            train: 140,
            test: 14,
            offset: 1,
            max_windows: Some(31),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPair {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

impl WindowSpec {
    pub fn span(&self) -> usize {
        self.train + self.test
    }

    /// Number of pairs that fit in `rows` before the cap is applied.
    pub fn uncapped_count(&self, rows: usize) -> usize {
        if self.offset == 0 || rows < self.span() {
            0
        } else {
            (rows - self.span()) / self.offset + 1
        }
    }

    pub fn count(&self, rows: usize) -> usize {
        let n = self.uncapped_count(rows);
        match self.max_windows {
            Some(cap) => n.min(cap),
            None => n,
        }
    }

    pub fn generate(&self, rows: usize) -> Vec<WindowPair> {
        (0..self.count(rows))
            .map(|j| {
                let start = j * self.offset;
                let split = start + self.train;
                WindowPair {
                    train: start..split,
                    test: split..split + self.test,
                }
            })
            .collect()
    }

    /// Like [`generate`](Self::generate) but fails when no pair fits.
    pub fn require(&self, rows: usize) -> Result<Vec<WindowPair>, StudyError> {
        let windows = self.generate(rows);
        if windows.is_empty() {
            return Err(StudyError::InsufficientRows {
                rows,
                minimum: self.span(),
            });
        }
        Ok(windows)
    }
}
