//! The per-OS walker capability.

use std::path::{Path, PathBuf};

use fswalk_core::{DepthMode, FileMetadata, WalkError, WalkStats};

use crate::pattern::SearchPattern;

/// A native directory enumeration backend.
///
/// One implementation exists per operating system family and is picked at
/// compile time as [`NativeWalker`]; nothing above this trait branches on
/// the platform.
pub trait DirectoryWalker {
    /// Lazy iterator over one traversal.
    type Entries: WalkEntries;

    /// Start a traversal of `root`. Nothing is opened until the first pull.
    fn walk(&self, root: &Path, pattern: SearchPattern, depth: DepthMode) -> Self::Entries;

    /// Stat a single path without enumerating it.
    fn metadata(&self, path: &Path) -> Result<FileMetadata, WalkError>;
}

/// Pull-based iterator produced by a [`DirectoryWalker`].
pub trait WalkEntries: Iterator<Item = FileMetadata> {
    /// Counters for the traversal so far.
    fn stats(&self) -> WalkStats;
}

#[cfg(unix)]
pub type NativeWalker = crate::posix::PosixWalker;

#[cfg(windows)]
pub type NativeWalker = crate::win::WindowsWalker;

/// Collapse redundant separators and `.` components, and drop trailing
/// separators except on a filesystem root.
pub(crate) fn normalize_root(root: &Path) -> PathBuf {
    root.components().collect()
}
