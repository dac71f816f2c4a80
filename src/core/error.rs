//! Error handling for AssetGoblin
//!
//! Two layers, mirroring how errors travel through the self-update pipeline:
//! 1. [`UpgradeError`] - strongly-typed failures returned by every pipeline stage
//! 2. [`ErrorContext`] - the user-facing rendering with details and a suggestion
//!
//! Stages return [`UpgradeResult`]. The CLI works with `anyhow` and converts
//! whatever reaches the top level through [`user_friendly_error`] before
//! printing it to stderr.
//!
//! # Error Categories
//!
//! - **Transport**: [`UpgradeError::Network`], [`UpgradeError::HttpStatus`], [`UpgradeError::Decode`]
//! - **Release contents**: [`UpgradeError::AssetNotFound`], [`UpgradeError::ChecksumAssetNotFound`]
//! - **Integrity**: [`UpgradeError::ChecksumMissing`], [`UpgradeError::ChecksumMismatch`]
//! - **Extraction**: [`UpgradeError::ArchiveFormat`], [`UpgradeError::FileWrite`]
//! - **Installation**: [`UpgradeError::BackupFailed`], [`UpgradeError::ActivationFailed`],
//!   [`UpgradeError::ActivationUnrecoverable`]
//! - **Warnings** (never abort): [`UpgradeError::PermissionSetFailed`],
//!   [`UpgradeError::BackupCleanupFailed`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetgoblin::core::{UpgradeError, user_friendly_error};
//!
//! let error = UpgradeError::AssetNotFound {
//!     name: "AssetGoblin_Linux_x64.tar.gz".to_string(),
//!     tag: "v1.2.0".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for self-update operations.
pub type UpgradeResult<T> = std::result::Result<T, UpgradeError>;

/// Every failure the self-update pipeline can produce.
///
/// All variants abort the pipeline except [`UpgradeError::PermissionSetFailed`]
/// and [`UpgradeError::BackupCleanupFailed`], which the installer reports as
/// warnings (see [`UpgradeError::is_warning`]).
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// Transport-level failure (DNS, connect, TLS, timeout, broken body).
    #[error("Network error while {operation}")]
    Network {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus {
        url: String,
        status: u16,
    },

    /// The release index body is not the expected JSON shape.
    #[error("Malformed release metadata from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// No release asset carries the computed artifact name.
    #[error("Release {tag} has no artifact named '{name}'")]
    AssetNotFound {
        name: String,
        tag: String,
    },

    /// No release asset looks like a checksum manifest.
    #[error("Release {tag} has no checksum manifest")]
    ChecksumAssetNotFound {
        tag: String,
    },

    /// The checksum manifest has no line for the artifact.
    #[error("Checksum manifest has no entry for '{name}'")]
    ChecksumMissing {
        name: String,
    },

    /// The downloaded artifact does not hash to the recorded digest.
    #[error("Checksum mismatch for '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// The archive is corrupt or contains entries that cannot be extracted safely.
    #[error("Invalid archive {}: {reason}", archive.display())]
    ArchiveFormat {
        archive: PathBuf,
        reason: String,
    },

    /// Writing an extracted or downloaded file failed.
    #[error("Failed to write {}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Renaming the production executable to its backup name failed.
    /// Nothing was changed.
    #[error("Failed to back up {} to {}", production.display(), backup.display())]
    BackupFailed {
        production: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving the staged executable into place failed; the backup was restored.
    #[error("Failed to activate {} as {}; previous version restored", staged.display(), production.display())]
    ActivationFailed {
        staged: PathBuf,
        production: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Activation failed and restoring the backup failed as well.
    #[error(
        "Failed to activate the new executable and could not restore the backup; \
         move {} to {} manually",
        backup.display(),
        production.display()
    )]
    ActivationUnrecoverable {
        backup: PathBuf,
        production: PathBuf,
        #[source]
        source: std::io::Error,
        restore_error: std::io::Error,
    },

    /// Marking the new executable as executable failed (warning).
    #[error("Could not set executable permissions on {}", path.display())]
    PermissionSetFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deleting the backup after a successful activation failed (warning).
    #[error("Could not remove backup {}", path.display())]
    BackupCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The running OS/architecture has no published artifacts.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        os: String,
        arch: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything outside the update taxonomy, already rendered with its cause chain.
    #[error("{message}")]
    Other {
        message: String,
    },
}

impl UpgradeError {
    /// Whether this error is reported as a warning rather than aborting the update.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::PermissionSetFailed { .. } | Self::BackupCleanupFailed { .. })
    }
}

/// User-facing rendering of an error: the error itself, optional details and
/// an optional suggestion for how to recover.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: UpgradeError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: UpgradeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error reaching the CLI into a user-friendly [`ErrorContext`].
///
/// [`UpgradeError`]s anywhere in the chain get a tailored suggestion; other
/// errors are shown with their full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain_message = render_chain(&error);

    match error.downcast::<UpgradeError>() {
        Ok(upgrade_error) => create_error_context(upgrade_error),
        Err(error) => {
            let ctx = ErrorContext::new(UpgradeError::Other {
                message: chain_message,
            });
            match error.chain().find_map(|e| e.downcast_ref::<UpgradeError>()) {
                Some(upgrade_error) => ctx.with_suggestion(suggestion_for(upgrade_error)),
                None => ctx,
            }
        }
    }
}

fn render_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn suggestion_for(error: &UpgradeError) -> String {
    match error {
        UpgradeError::Network { .. } => {
            "Check your internet connection or raise upgrade.request_timeout in the config file"
                .to_string()
        }
        UpgradeError::HttpStatus { status, .. } if *status == 403 || *status == 429 => {
            "The release server is rate limiting requests. Wait a few minutes and retry".to_string()
        }
        UpgradeError::HttpStatus { .. } => {
            "The release server rejected the request. Retry later or check upgrade.release_url"
                .to_string()
        }
        UpgradeError::Decode { .. } => {
            "Verify that upgrade.release_url points at a release index".to_string()
        }
        UpgradeError::AssetNotFound { .. } | UpgradeError::UnsupportedPlatform { .. } => {
            "No prebuilt binary is published for this platform. Download a release manually"
                .to_string()
        }
        UpgradeError::ChecksumAssetNotFound { .. } | UpgradeError::ChecksumMissing { .. } => {
            "The release cannot be verified, so it was not installed. Retry once the release is complete"
                .to_string()
        }
        UpgradeError::ChecksumMismatch { .. } => {
            "The download is corrupt or was tampered with. Nothing was installed; retry the update"
                .to_string()
        }
        UpgradeError::ArchiveFormat { .. } => {
            "The release archive is damaged. Nothing was installed; retry the update".to_string()
        }
        UpgradeError::FileWrite { .. }
        | UpgradeError::BackupFailed { .. }
        | UpgradeError::Io(_) => match cfg!(windows) {
            true => "Check free disk space and that the install directory is writable (run as Administrator if needed)".to_string(),
            false => "Check free disk space and that the install directory is writable (check ownership with 'ls -la')".to_string(),
        },
        UpgradeError::ActivationFailed { .. } => {
            "The previous version is still in place. Close other programs using the executable and retry"
                .to_string()
        }
        UpgradeError::ActivationUnrecoverable { backup, production, .. } => format!(
            "Restore the previous version manually: move {} to {}",
            backup.display(),
            production.display()
        ),
        UpgradeError::PermissionSetFailed { path, .. } => {
            format!("Run 'chmod 755 {}'", path.display())
        }
        UpgradeError::BackupCleanupFailed { path, .. } => {
            format!("The stale backup can be deleted: {}", path.display())
        }
        UpgradeError::Config { .. } => {
            "Fix the [upgrade] section of the configuration file".to_string()
        }
        UpgradeError::Other { .. } => "Run again with --verbose for more detail".to_string(),
    }
}

fn create_error_context(error: UpgradeError) -> ErrorContext {
    let suggestion = suggestion_for(&error);
    let details = match &error {
        UpgradeError::Network { source, .. } => Some(source.to_string()),
        UpgradeError::Decode { source, .. } => Some(source.to_string()),
        UpgradeError::FileWrite { source, .. }
        | UpgradeError::BackupFailed { source, .. }
        | UpgradeError::ActivationFailed { source, .. } => Some(source.to_string()),
        UpgradeError::ActivationUnrecoverable { source, restore_error, .. } => Some(format!(
            "activation: {source}; restore: {restore_error}"
        )),
        UpgradeError::ChecksumMismatch { expected, actual, .. } => Some(format!(
            "The manifest records {expected} but the downloaded file hashes to {actual}"
        )),
        _ => None,
    };

    let ctx = ErrorContext::new(error).with_suggestion(suggestion);
    match details {
        Some(details) => ctx.with_details(details),
        None => ctx,
    }
}
