//! Folder listing cache and file type registry for fswalk.
//!
//! This is the layer a file list or file dialog talks to. It enumerates a
//! folder once, decorates every entry with a display name and a type label,
//! and serves later requests for the same folder from memory.
//!
//! ```rust,no_run
//! use fswalk_cache::{FileSystemCache, ListFlags};
//!
//! let cache = FileSystemCache::new();
//! for item in cache.file_system_entries("/home/user/src", ListFlags::default(), &["rs", "toml"]) {
//!     println!("{:<30} {}", item.name, item.type_name);
//! }
//!
//! // After renaming or deleting something:
//! cache.clear_cache();
//! ```

mod cache;
mod item;
mod places;
mod types;

pub use cache::FileSystemCache;
pub use item::{FileSystemItem, ListFlags};
pub use places::{Places, SpecialDirectory, SpecialDirectoryKind, drives, special_directories};
pub use types::{FOLDER_TYPE_NAME, FileTypeRegistry, PLAIN_FILE_TYPE_NAME};
