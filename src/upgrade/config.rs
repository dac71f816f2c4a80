use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_RELEASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::core::{UpgradeError, UpgradeResult};

/// Configuration settings for AssetGoblin self-update behavior.
///
/// `UpgradeConfig` controls where releases are discovered, how long network
/// operations may take, where the new executable is installed and whether a
/// progress bar is drawn during downloads.
///
/// # Default Behavior
///
/// - Releases come from the project's GitHub "latest release" endpoint
/// - Requests time out after 5 minutes, connections after 30 seconds
/// - The executable is replaced in the directory of the running binary
/// - A progress bar is shown when stderr is a terminal
///
/// # Examples
///
/// ```rust,no_run
/// use assetgoblin::upgrade::config::UpgradeConfig;
///
/// let config = UpgradeConfig::default();
/// assert_eq!(config.request_timeout, 300);
/// assert!(config.install_dir.is_none());
/// ```
///
/// ## TOML Example
/// ```toml
/// [upgrade]
/// release_url = "https://api.github.com/repos/sbolch/AssetGoblin/releases/latest"
/// request_timeout = 300
/// connect_timeout = 30
/// install_dir = "/usr/local/bin"
/// show_progress = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpgradeConfig {
    /// Endpoint returning the latest release as JSON.
    ///
    /// Mirrors and test servers can be used by pointing this elsewhere; the
    /// response must have the same shape as a GitHub release object.
    #[serde(default = "default_release_url")]
    pub release_url: String,

    /// Total time in seconds allowed for a single request, body included.
    ///
    /// # Default: `300`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Time in seconds allowed to establish a connection.
    ///
    /// # Default: `30`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Directory holding the production executable.
    ///
    /// When unset, the directory of the running executable is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Whether to draw a download progress bar.
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            release_url: default_release_url(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            install_dir: None,
            show_progress: default_show_progress(),
        }
    }
}

fn default_release_url() -> String {
    DEFAULT_RELEASE_URL.to_string()
}

const fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

const fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

const fn default_show_progress() -> bool {
    true
}

impl UpgradeConfig {
    /// Create a new `UpgradeConfig` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values that would make every update fail.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::Config`] for an empty release URL or a zero timeout.
    pub fn validate(&self) -> UpgradeResult<()> {
        if self.release_url.trim().is_empty() {
            return Err(UpgradeError::Config {
                message: "upgrade.release_url must not be empty".to_string(),
            });
        }
        if self.request_timeout == 0 {
            return Err(UpgradeError::Config {
                message: "upgrade.request_timeout must be greater than zero".to_string(),
            });
        }
        if self.connect_timeout == 0 {
            return Err(UpgradeError::Config {
                message: "upgrade.connect_timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}
