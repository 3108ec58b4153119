//! Extension to human-readable type name table.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use fswalk_core::FileMetadata;

const BUNDLED_TYPES: &str = include_str!("../data/file_types.json");

/// Label used for directories.
pub const FOLDER_TYPE_NAME: &str = "File folder";
/// Label used for files without an extension.
pub const PLAIN_FILE_TYPE_NAME: &str = "File";

/// Maps file extensions to labels such as `"Text Document"`.
///
/// Keys are hashes of the lower-cased extension, so `TXT`, `txt` and `.txt`
/// share one entry. Unknown extensions get a synthesized `"<EXT> File"`
/// label that is stored on first use.
#[derive(Debug, Clone, Default)]
pub struct FileTypeRegistry {
    labels: HashMap<u64, String>,
}

impl FileTypeRegistry {
    /// Create a registry seeded with the bundled table.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        match serde_json::from_str::<HashMap<String, String>>(BUNDLED_TYPES) {
            Ok(table) => {
                for (extension, label) in table {
                    registry.register_file_type(&extension, label);
                }
            }
            Err(err) => {
                tracing::warn!(target: "fswalk::cache", error = %err, "bundled file type table is malformed");
            }
        }
        registry
    }

    /// Create a registry with no entries.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Set the label for `extension`, replacing any existing one.
    pub fn register_file_type(&mut self, extension: &str, label: impl Into<String>) {
        self.labels.insert(extension_key(extension), label.into());
    }

    /// Label for `extension` if one is registered or was synthesized.
    pub fn lookup(&self, extension: &str) -> Option<&str> {
        self.labels.get(&extension_key(extension)).map(String::as_str)
    }

    /// Label for `extension`, synthesizing and remembering one if needed.
    pub fn type_name(&mut self, extension: &str) -> String {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            return PLAIN_FILE_TYPE_NAME.to_string();
        }
        self.labels
            .entry(extension_key(extension))
            .or_insert_with(|| format!("{} File", extension.to_uppercase()))
            .clone()
    }

    /// Label for an enumerated entry.
    pub fn describe(&mut self, metadata: &FileMetadata) -> String {
        if metadata.is_dir() {
            return FOLDER_TYPE_NAME.to_string();
        }
        match metadata.extension() {
            Some(extension) => self.type_name(extension),
            None => PLAIN_FILE_TYPE_NAME.to_string(),
        }
    }

    /// Number of known extensions.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if no extensions are known.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn extension_key(extension: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    extension.trim_start_matches('.').to_lowercase().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_table_loads() {
        let registry = FileTypeRegistry::new();
        assert!(!registry.is_empty());
        assert_eq!(registry.lookup("txt"), Some("Text Document"));
    }

    #[test]
    fn test_lookup_ignores_case_and_dot() {
        let registry = FileTypeRegistry::new();
        assert_eq!(registry.lookup("TXT"), Some("Text Document"));
        assert_eq!(registry.lookup(".Txt"), Some("Text Document"));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = FileTypeRegistry::new();
        registry.register_file_type("txt", "Plain Text");
        assert_eq!(registry.type_name("txt"), "Plain Text");
    }

    #[test]
    fn test_unknown_extension_is_synthesized_once() {
        let mut registry = FileTypeRegistry::empty();
        assert_eq!(registry.lookup("blend"), None);
        assert_eq!(registry.type_name("blend"), "BLEND File");
        assert_eq!(registry.lookup("BLEND"), Some("BLEND File"));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.type_name("Blend"), "BLEND File");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_extension() {
        let mut registry = FileTypeRegistry::empty();
        assert_eq!(registry.type_name(""), PLAIN_FILE_TYPE_NAME);
        assert!(registry.is_empty());
    }
}
