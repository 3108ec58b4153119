//! Native directory enumeration engine for fswalk.
//!
//! Walks directories with the operating system's own primitives
//! (`opendir`/`readdir`/`lstat` on POSIX, `FindFirstFileW`/`FindNextFileW`
//! on Windows) and turns every entry into a portable [`FileMetadata`].
//!
//! # Overview
//!
//! - **Lazy**: entries are produced one `next()` at a time, with at most
//!   one native directory handle open per traversal.
//! - **Non-recursive**: pending directories live on an explicit
//!   [`WalkFrontier`] stack, so deep trees never grow the call stack.
//! - **Best effort**: unreadable directories are skipped, never reported as
//!   errors.
//! - **Filtered**: the search pattern only applies to files; directories
//!   are always yielded and always descended into in recursive mode.
//!
//! # Example
//!
//! ```rust,no_run
//! use fswalk_scan::{enumerate_entries, DepthMode};
//!
//! for entry in enumerate_entries("/var/log", "*.log", DepthMode::AllDirectories) {
//!     println!("{} ({} bytes)", entry.path.display(), entry.size);
//! }
//! ```
//!
//! Stopping early is fine: dropping the iterator closes the handle it has
//! open.
//!
//! ```rust,no_run
//! use fswalk_scan::{enumerate_entries, DepthMode};
//!
//! let first_dir = enumerate_entries("/", "*", DepthMode::TopOnly).find(|e| e.is_dir());
//! ```

pub mod attributes;
mod facade;
mod frontier;
mod pattern;
pub mod timestamps;
mod walker;

#[cfg(unix)]
mod posix;
#[cfg(windows)]
mod win;

pub use facade::{Entries, enumerate, enumerate_entries, file_metadata, file_size};
pub use frontier::WalkFrontier;
pub use pattern::SearchPattern;
pub use walker::{DirectoryWalker, NativeWalker, WalkEntries};

#[cfg(unix)]
pub use posix::{PosixEntries, PosixWalker};
#[cfg(windows)]
pub use win::{WindowsEntries, WindowsWalker};

// Re-export core types for convenience
pub use fswalk_core::{
    DepthMode, EnumerationOptions, FileAttributes, FileMetadata, Timestamps, WalkError, WalkStats,
};
