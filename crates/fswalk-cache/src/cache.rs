//! Per-folder listing cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use fswalk_scan::{DepthMode, enumerate_entries};

use crate::item::{FileSystemItem, ListFlags};
use crate::places::{Places, SpecialDirectory};
use crate::types::FileTypeRegistry;

/// Caches folder listings, the places snapshot and the type table.
///
/// Nothing here notices filesystem changes: call [`clear_cache`] after
/// anything that moves, renames or deletes entries.
///
/// All state sits behind one lock, so a cache can be shared between threads.
///
/// [`clear_cache`]: FileSystemCache::clear_cache
#[derive(Debug)]
pub struct FileSystemCache {
    state: Mutex<CacheState>,
}

#[derive(Debug)]
struct CacheState {
    folders: HashMap<PathBuf, Arc<Vec<FileSystemItem>>>,
    places: Option<Places>,
    types: FileTypeRegistry,
}

impl FileSystemCache {
    /// Create a cache with the bundled type table.
    pub fn new() -> Self {
        Self::with_registry(FileTypeRegistry::new())
    }

    /// Create a cache around an existing type table.
    pub fn with_registry(types: FileTypeRegistry) -> Self {
        Self {
            state: Mutex::new(CacheState {
                folders: HashMap::new(),
                places: None,
                types,
            }),
        }
    }

    /// Entries directly inside `folder` that pass `flags` and
    /// `allowed_extensions`.
    ///
    /// The first call for a folder enumerates it; later calls reuse the
    /// stored listing until [`clear_cache`](Self::clear_cache). Filters are
    /// applied on every call, so different flags share one listing.
    pub fn file_system_entries(
        &self,
        folder: impl AsRef<Path>,
        flags: ListFlags,
        allowed_extensions: &[&str],
    ) -> Vec<FileSystemItem> {
        let listing = self.listing(folder.as_ref());
        listing
            .iter()
            .filter(|item| item.is_visible(flags, allowed_extensions))
            .cloned()
            .collect()
    }

    fn listing(&self, folder: &Path) -> Arc<Vec<FileSystemItem>> {
        let key: PathBuf = folder.components().collect();
        let mut state = self.state.lock();

        if let Some(listing) = state.folders.get(&key) {
            return Arc::clone(listing);
        }

        let mut entries = enumerate_entries(&key, "*", DepthMode::TopOnly);
        let items: Vec<FileSystemItem> = entries
            .by_ref()
            .map(|metadata| {
                let type_name = state.types.describe(&metadata);
                FileSystemItem::new(metadata, type_name)
            })
            .collect();
        tracing::debug!(
            target: "fswalk::cache",
            folder = %key.display(),
            entries = items.len(),
            skipped = entries.stats().directories_skipped,
            "cached folder listing"
        );

        let listing = Arc::new(items);
        state.folders.insert(key, Arc::clone(&listing));
        listing
    }

    /// Drop every folder listing and the places snapshot.
    ///
    /// Type names, including synthesized ones, are kept.
    pub fn clear_cache(&self) {
        let mut state = self.state.lock();
        state.folders.clear();
        state.places = None;
        tracing::debug!(target: "fswalk::cache", "cache cleared");
    }

    /// Check if `folder` has a stored listing.
    pub fn is_cached(&self, folder: impl AsRef<Path>) -> bool {
        let key: PathBuf = folder.as_ref().components().collect();
        self.state.lock().folders.contains_key(&key)
    }

    /// Number of folders with a stored listing.
    pub fn cached_folder_count(&self) -> usize {
        self.state.lock().folders.len()
    }

    /// Well-known folders, resolved once until the cache is cleared.
    pub fn special_directories(&self) -> Vec<SpecialDirectory> {
        self.places().special_directories
    }

    /// Drive roots, resolved once until the cache is cleared.
    pub fn drives(&self) -> Vec<PathBuf> {
        self.places().drives
    }

    fn places(&self) -> Places {
        self.state
            .lock()
            .places
            .get_or_insert_with(Places::discover)
            .clone()
    }

    /// Set the label for `extension`, replacing any existing one.
    ///
    /// Listings already cached keep the label they were built with.
    pub fn register_file_type(&self, extension: &str, label: impl Into<String>) {
        self.state.lock().types.register_file_type(extension, label);
    }

    /// Label for `extension`, synthesizing `"<EXT> File"` when unknown.
    pub fn type_name(&self, extension: &str) -> String {
        self.state.lock().types.type_name(extension)
    }
}

impl Default for FileSystemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_listing_is_reused() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "x").unwrap();

        let cache = FileSystemCache::new();
        assert!(!cache.is_cached(temp.path()));
        assert_eq!(cache.file_system_entries(temp.path(), ListFlags::default(), &[]).len(), 1);
        assert!(cache.is_cached(temp.path()));

        fs::write(temp.path().join("b.txt"), "x").unwrap();
        assert_eq!(cache.file_system_entries(temp.path(), ListFlags::default(), &[]).len(), 1);

        cache.clear_cache();
        assert_eq!(cache.cached_folder_count(), 0);
        assert_eq!(cache.file_system_entries(temp.path(), ListFlags::default(), &[]).len(), 2);
    }

    #[test]
    fn test_trailing_separator_shares_key() {
        let temp = TempDir::new().unwrap();
        let cache = FileSystemCache::new();
        cache.file_system_entries(temp.path(), ListFlags::default(), &[]);
        cache.file_system_entries(temp.path().join(""), ListFlags::default(), &[]);
        assert_eq!(cache.cached_folder_count(), 1);
    }

    #[test]
    fn test_type_names_survive_clear() {
        let cache = FileSystemCache::with_registry(FileTypeRegistry::empty());
        cache.register_file_type("scene", "Scene File");
        cache.clear_cache();
        assert_eq!(cache.type_name("SCENE"), "Scene File");
    }
}
