//! Pending directories of a walk.

/// Last-in-first-out stack of directories awaiting traversal.
///
/// Each entry is an owned native path buffer. The frontier owns it while it
/// is queued; [`WalkFrontier::pop`] moves it out to the walker, which drops
/// it once that directory's handle is closed. Queued entries own memory
/// only, never an OS handle, so dropping the frontier needs no cleanup
/// beyond freeing them.
#[derive(Debug)]
pub struct WalkFrontier<T> {
    pending: Vec<T>,
}

impl<T> WalkFrontier<T> {
    /// Create an empty frontier.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Create a frontier seeded with the walk root.
    pub fn with_root(root: T) -> Self {
        Self {
            pending: vec![root],
        }
    }

    /// Schedule a directory.
    pub fn push(&mut self, entry: T) {
        self.pending.push(entry);
    }

    /// Take the most recently scheduled directory.
    pub fn pop(&mut self) -> Option<T> {
        self.pending.pop()
    }

    /// Number of queued directories.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no directories are queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for WalkFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}
