//! Global configuration for AssetGoblin.
//!
//! Settings that apply to every invocation live in an optional TOML file.
//! Only the `[upgrade]` table is read today; unknown tables are ignored so the
//! file can be shared with the asset server's own settings.
//!
//! # Location
//!
//! 1. `--config <path>` on the command line
//! 2. `ASSETGOBLIN_CONFIG_PATH` environment variable
//! 3. Platform default:
//!    - Unix/macOS: `~/.assetgoblin/config.toml`
//!    - Windows: `%LOCALAPPDATA%\assetgoblin\config.toml`
//!
//! A missing file is not an error; defaults are used.
//!
//! # File Format
//!
//! ```toml
//! [upgrade]
//! request_timeout = 120
//! connect_timeout = 10
//! install_dir = "/usr/local/bin"
//! show_progress = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::CONFIG_PATH_ENV;
use crate::upgrade::config::UpgradeConfig;

/// Global configuration loaded from the user's config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Self-update settings.
    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults if no file exists.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from [`Self::default_path`].
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(&path).await;
        }

        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.upgrade.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Location of the config file when no path is given explicitly.
    ///
    /// `ASSETGOBLIN_CONFIG_PATH` takes precedence over the platform default.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("assetgoblin")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".assetgoblin")
        };

        Ok(config_dir.join("config.toml"))
    }
}
