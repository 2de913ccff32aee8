//! Bridge configuration
//!
//! Stored as JSON next to the host app's other settings. Every field has a
//! default so a missing or partial file still yields a usable config.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BridgeError, BridgeResult};

/// File name the Tauri plugin looks for in the app config directory.
pub const CONFIG_FILE_NAME: &str = "doctree_bridge.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Joins a parent virtual path and a child name.
    #[serde(default = "default_separator")]
    pub path_separator: String,
    /// Appended to directory names in listings.
    #[serde(default = "default_separator")]
    pub directory_marker: String,
    /// Use the unrestricted root when the host has no scoped storage.
    #[serde(default = "default_true")]
    pub allow_legacy: bool,
    /// Overrides host detection of the unrestricted root.
    #[serde(default)]
    pub legacy_root: Option<String>,
    /// Ask the host to keep the root grant across restarts.
    #[serde(default = "default_true")]
    pub persist_grants: bool,
}

fn default_separator() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            path_separator: default_separator(),
            directory_marker: default_separator(),
            allow_legacy: true,
            legacy_root: None,
            persist_grants: true,
        }
    }
}

impl BridgeConfig {
    /// Load config from disk, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> BridgeResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Save config to disk
    pub fn save(&self, path: &Path) -> BridgeResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BridgeError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
