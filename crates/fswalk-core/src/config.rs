//! Enumeration configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How far an enumeration descends below its root.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DepthMode {
    /// Only the immediate children of the root.
    #[default]
    TopOnly,
    /// Every entry reachable through subdirectories.
    AllDirectories,
}

impl DepthMode {
    /// Whether subdirectories are scheduled for traversal.
    pub fn is_recursive(self) -> bool {
        matches!(self, DepthMode::AllDirectories)
    }
}

/// Configuration for one enumeration.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EnumerationOptions {
    /// Directory to enumerate.
    pub root: PathBuf,

    /// Filename pattern applied to non-directory entries.
    #[builder(default = "default_pattern()")]
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Whether to recurse into subdirectories.
    #[builder(default)]
    #[serde(default)]
    pub depth: DepthMode,
}

fn default_pattern() -> String {
    "*".to_string()
}

impl EnumerationOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl EnumerationOptions {
    /// Create a new options builder.
    pub fn builder() -> EnumerationOptionsBuilder {
        EnumerationOptionsBuilder::default()
    }

    /// Enumerate every entry directly inside `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: default_pattern(),
            depth: DepthMode::TopOnly,
        }
    }
}
