//! Persistent configuration for methodref.
//!
//! Loads/saves a TOML config at `~/.methodref/config.toml`.

use crate::{CollisionPolicy, MethodRefError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level methodref configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodRefConfig {
    pub scan: ScanConfig,
    pub extract: ExtractConfig,
}

impl MethodRefConfig {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, MethodRefError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MethodRefError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| MethodRefError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), MethodRefError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MethodRefError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MethodRefError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| MethodRefError::io(path, e))?;
        Ok(())
    }

    /// Load from the default path, or return defaults if the file doesn't exist.
    pub fn load_or_default() -> Result<Self, MethodRefError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default config path: `~/.methodref/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".methodref")
            .join("config.toml")
    }
}

/// Directory scanning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File name suffix that marks a source file.
    pub suffix: String,
    /// Directory names that are never descended into (e.g. `node_modules`).
    pub ignore_dirs: Vec<String>,
    /// Honour `.gitignore` / `.ignore` files while walking.
    pub respect_gitignore: bool,
    /// Visit dot-files and dot-directories.
    pub include_hidden: bool,
    /// Follow symbolic links to files and directories.
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            suffix: ".js".to_string(),
            ignore_dirs: Vec::new(),
            respect_gitignore: false,
            include_hidden: true,
            follow_links: true,
        }
    }
}

/// Declaration extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Emit class constructors as methods named `constructor`.
    pub include_constructors: bool,
    /// Resolution of duplicate qualified keys within one file.
    pub collision_policy: CollisionPolicy,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            include_constructors: true,
            collision_policy: CollisionPolicy::default(),
        }
    }
}
