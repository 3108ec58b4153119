//! Display-ready entries and listing filters.

use std::path::Path;

use bitflags::bitflags;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use fswalk_core::FileMetadata;

bitflags! {
    /// Which entries a folder listing shows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ListFlags: u8 {
        /// Show non-directory entries.
        const FILES = 1 << 0;
        /// Show directories.
        const FOLDERS = 1 << 1;
        /// Show hidden entries.
        const HIDDEN = 1 << 2;
    }
}

impl Default for ListFlags {
    fn default() -> Self {
        ListFlags::FILES | ListFlags::FOLDERS
    }
}

/// Snapshot of one entry as a file list shows it.
///
/// Built once at enumeration time; it does not follow later changes on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemItem {
    /// Display name (final path component).
    pub name: CompactString,
    /// Human-readable type, e.g. `"Text Document"` or `"File folder"`.
    pub type_name: String,
    /// Portable metadata the item was built from.
    pub metadata: FileMetadata,
}

impl FileSystemItem {
    /// Create an item from enumerated metadata and its resolved type.
    pub fn new(metadata: FileMetadata, type_name: impl Into<String>) -> Self {
        Self {
            name: CompactString::new(metadata.name()),
            type_name: type_name.into(),
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.metadata.path
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_hidden(&self) -> bool {
        self.metadata.is_hidden()
    }

    /// Whether the item passes `flags` and the extension allow-list.
    ///
    /// `allowed_extensions` is compared case-insensitively, ignores a leading
    /// dot, applies to files only, and allows everything when empty.
    pub fn is_visible(&self, flags: ListFlags, allowed_extensions: &[&str]) -> bool {
        if self.is_hidden() && !flags.contains(ListFlags::HIDDEN) {
            return false;
        }
        if self.is_dir() {
            return flags.contains(ListFlags::FOLDERS);
        }
        if !flags.contains(ListFlags::FILES) {
            return false;
        }
        if allowed_extensions.is_empty() {
            return true;
        }
        let Some(extension) = self.metadata.extension() else {
            return false;
        };
        allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}
