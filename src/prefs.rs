//! Persisted user preferences
//!
//! Read at startup and written at shutdown, both best-effort: a missing or
//! broken config file never prevents the tool from running, it just means
//! defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User preferences, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    /// Last selected mapping name.
    pub last_mapping: String,
    /// Output next to each input file instead of a fixed directory.
    pub use_same_folder: bool,
    /// Explicit output directory, used when `use_same_folder` is false.
    pub output_dir: String,
    /// Output filename template.
    pub filename_template: String,
    /// Open the destination folder after a successful batch.
    pub open_explorer: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_mapping: String::new(),
            use_same_folder: true,
            output_dir: String::new(),
            filename_template: "{filename}_remap{ext}".to_string(),
            open_explorer: false,
        }
    }
}

impl Preferences {
    /// Default config file location: `config.json` next to the executable.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// Load preferences from `path`. Any failure (missing file, unreadable,
    /// malformed JSON) silently yields defaults; unknown or missing fields
    /// fall back individually.
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    /// Save preferences to `path`. Failures are reported as a warning only.
    pub fn save(&self, path: &Path) {
        let result = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            eprintln!("Warning: Failed to save config file: {}", e);
        }
    }
}
