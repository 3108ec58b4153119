//! Counters collected while an enumeration is pulled.

use serde::{Deserialize, Serialize};

/// Summary of what a walk has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Directories whose native handle was opened.
    pub directories_opened: u64,
    /// Directories that could not be opened and were skipped.
    pub directories_skipped: u64,
    /// Entries handed to the caller.
    pub entries_yielded: u64,
    /// Files rejected by the search pattern.
    pub entries_filtered: u64,
    /// Entries whose metadata could not be read.
    pub entries_unreadable: u64,
}

impl WalkStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory handle opened.
    pub fn record_opened(&mut self) {
        self.directories_opened += 1;
    }

    /// Record a directory that could not be opened.
    pub fn record_skipped(&mut self) {
        self.directories_skipped += 1;
    }

    /// Record an entry returned to the caller.
    pub fn record_yielded(&mut self) {
        self.entries_yielded += 1;
    }

    /// Record a file rejected by the pattern.
    pub fn record_filtered(&mut self) {
        self.entries_filtered += 1;
    }

    /// Record an entry whose metadata lookup failed.
    pub fn record_unreadable(&mut self) {
        self.entries_unreadable += 1;
    }

    /// Check if any directory or entry was skipped.
    pub fn has_skips(&self) -> bool {
        self.directories_skipped > 0 || self.entries_unreadable > 0
    }
}
