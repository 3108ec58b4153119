//! Portable file metadata records.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

bitflags! {
    /// OS-agnostic attribute set.
    ///
    /// Exactly one of `DIRECTORY`, `NORMAL`, `REPARSE_POINT` or `DEVICE`
    /// classifies the entry (see [`FileAttributes::primary`]); the remaining
    /// flags are modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FileAttributes: u32 {
        /// Entry is a directory.
        const DIRECTORY = 1 << 0;
        /// Entry cannot be written by its owner.
        const READ_ONLY = 1 << 1;
        /// Entry is hidden (Windows flag, or a leading `.` on POSIX).
        const HIDDEN = 1 << 2;
        /// Plain file with no special classification.
        const NORMAL = 1 << 3;
        /// Symbolic link, junction or other reparse point.
        const REPARSE_POINT = 1 << 4;
        /// Operating-system file.
        const SYSTEM = 1 << 5;
        /// Character or block device.
        const DEVICE = 1 << 6;
    }
}

impl FileAttributes {
    /// The primary type classification of this set.
    ///
    /// A reparse point wins over a directory so that junctions and links to
    /// directories are never treated as plain directories. Returns an empty
    /// set when no classifying flag is present.
    pub fn primary(self) -> FileAttributes {
        [
            FileAttributes::REPARSE_POINT,
            FileAttributes::DIRECTORY,
            FileAttributes::DEVICE,
            FileAttributes::NORMAL,
        ]
        .into_iter()
        .find(|flag| self.contains(*flag))
        .unwrap_or(FileAttributes::empty())
    }

    /// Whether the walker may descend into an entry with these attributes.
    pub fn is_traversable_dir(self) -> bool {
        self.primary() == FileAttributes::DIRECTORY
    }
}

/// File metadata timestamps, converted to local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Creation time (birth time where the platform has one).
    pub created: DateTime<Local>,
    /// Last access time.
    pub accessed: DateTime<Local>,
    /// Last write time.
    pub modified: DateTime<Local>,
}

impl Timestamps {
    /// Create timestamps from the three portable times.
    pub fn new(
        created: DateTime<Local>,
        accessed: DateTime<Local>,
        modified: DateTime<Local>,
    ) -> Self {
        Self {
            created,
            accessed,
            modified,
        }
    }

    /// Use the same time for every field.
    pub fn uniform(time: DateTime<Local>) -> Self {
        Self::new(time, time, time)
    }
}

/// A single enumerated entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Full path of the entry.
    pub path: PathBuf,

    /// Creation, access and write times.
    pub timestamps: Timestamps,

    /// Size in bytes (0 for directories).
    pub size: u64,

    /// Portable attribute set.
    pub attributes: FileAttributes,
}

impl FileMetadata {
    /// Create a metadata record. Directories always report a size of zero.
    pub fn new(
        path: impl Into<PathBuf>,
        timestamps: Timestamps,
        size: u64,
        attributes: FileAttributes,
    ) -> Self {
        let size = if attributes.contains(FileAttributes::DIRECTORY) {
            0
        } else {
            size
        };
        Self {
            path: path.into(),
            timestamps,
            size,
            attributes,
        }
    }

    /// Final component of the path, or the whole path for roots.
    pub fn name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }

    /// Full path of the entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.attributes.contains(FileAttributes::DIRECTORY)
    }

    /// Check if this entry is hidden.
    pub fn is_hidden(&self) -> bool {
        self.attributes.contains(FileAttributes::HIDDEN)
    }

    /// Check if this entry is read-only.
    pub fn is_read_only(&self) -> bool {
        self.attributes.contains(FileAttributes::READ_ONLY)
    }

    /// Check if this entry is a link or other reparse point.
    pub fn is_reparse_point(&self) -> bool {
        self.attributes.contains(FileAttributes::REPARSE_POINT)
    }
}
