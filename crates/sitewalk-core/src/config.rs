//! Configuration management for the page record access layer.
//!
//! Configuration is stored in TOML format in the platform config directory
//! and falls back to defaults when no file exists.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [database]
//! path = "/var/lib/sitewalk/cms.db"
//! max_connections = 4
//! busy_timeout_secs = 5
//!
//! [tree]
//! depth_limit = 9999
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default ceiling for page-tree walks.
pub const DEFAULT_TREE_DEPTH_LIMIT: u32 = 9999;

/// Global configuration for sitewalk.
///
/// Loaded from `global.toml` in the platform config directory, or built from
/// defaults when the file is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Page-tree walk settings.
    #[serde(default)]
    pub tree: TreeConfig,
}

/// Settings for the SQLite database holding the `pages` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,

    /// Maximum number of pooled connections.
    ///
    /// SQLite permits limited concurrency; a small pool avoids persistent
    /// lock contention.
    pub max_connections: u32,

    /// Seconds to wait on a locked database before failing.
    pub busy_timeout_secs: u64,
}

/// Settings for subtree enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth a subtree walk descends below the root page.
    pub depth_limit: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sitewalk.db"),
            max_connections: 4,
            busy_timeout_secs: 5,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_TREE_DEPTH_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from the default location or create with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, or if
    /// the file exists but cannot be read or contains invalid TOML.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
        } else {
            Ok(Self::default())
        }
    }

    /// Save the configuration to the default location.
    ///
    /// Parent directories are created if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or the
    /// file cannot be written.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let parent = config_path
            .parent()
            .ok_or_else(|| Error::Config("Invalid config path".into()))?;

        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Get the path where the global configuration file is stored.
    fn config_path() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("dev", "sitewalk", "sitewalk")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;

        Ok(project_dirs.config_dir().join("global.toml"))
    }
}
