//! Public entry points.

use std::path::Path;

use fswalk_core::{DepthMode, EnumerationOptions, FileMetadata, WalkError, WalkStats};

use crate::pattern::SearchPattern;
use crate::walker::{DirectoryWalker, NativeWalker, WalkEntries};

/// Lazy, single-pass sequence of entries from one traversal.
///
/// Nothing is read until the first call to `next`. Dropping the value at
/// any point closes the directory handle it has open.
pub struct Entries {
    inner: <NativeWalker as DirectoryWalker>::Entries,
}

impl Entries {
    /// Counters for the traversal so far.
    pub fn stats(&self) -> WalkStats {
        self.inner.stats()
    }
}

impl Iterator for Entries {
    type Item = FileMetadata;

    fn next(&mut self) -> Option<FileMetadata> {
        self.inner.next()
    }
}

impl std::iter::FusedIterator for Entries {}

impl std::fmt::Debug for Entries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entries").field("stats", &self.stats()).finish()
    }
}

/// Enumerate `root`, yielding files whose name matches `pattern` and every
/// directory.
///
/// A missing or unreadable root, or any unreadable subdirectory, simply
/// contributes no entries.
pub fn enumerate_entries(root: impl AsRef<Path>, pattern: &str, depth: DepthMode) -> Entries {
    Entries {
        inner: NativeWalker::default().walk(root.as_ref(), SearchPattern::new(pattern), depth),
    }
}

/// Enumerate according to `options`.
pub fn enumerate(options: &EnumerationOptions) -> Entries {
    enumerate_entries(&options.root, &options.pattern, options.depth)
}

/// Metadata for a single path, without enumerating it.
///
/// Links are reported as themselves, not followed.
pub fn file_metadata(path: impl AsRef<Path>) -> Result<FileMetadata, WalkError> {
    NativeWalker::default().metadata(path.as_ref())
}

/// Size in bytes of a single path (0 for directories).
pub fn file_size(path: impl AsRef<Path>) -> Result<u64, WalkError> {
    file_metadata(path).map(|metadata| metadata.size)
}
