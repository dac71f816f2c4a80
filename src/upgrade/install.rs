//! Swapping the staged executable into place.
//!
//! Installation is four ordered steps, each checked before the next:
//!
//! ```text
//! 1. production -> backup       (BackupFailed: nothing changed)
//! 2. staged     -> production   (ActivationFailed: backup renamed back)
//! 3. chmod 755 production       (warning only, non-Windows)
//! 4. remove backup              (warning only)
//! ```
//!
//! Up to step 2 the original executable stays runnable under its own name or,
//! after a failed activation, is put back there.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::{UpgradeError, UpgradeResult};

/// Filesystem operations used by the [`Installer`].
pub trait InstallFs: Send + Sync {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn set_executable(&self, path: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`InstallFs`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl InstallFs for StdFs {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    #[cfg(unix)]
    fn set_executable(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
    }

    #[cfg(not(unix))]
    fn set_executable(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// The three paths involved in one installation, all in the same directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub production: PathBuf,
    pub staged: PathBuf,
    pub backup: PathBuf,
}

impl InstallPlan {
    pub fn new(dir: &Path, production: &str, staged: &str, backup: &str) -> Self {
        Self {
            production: dir.join(production),
            staged: dir.join(staged),
            backup: dir.join(backup),
        }
    }
}

/// Result of a completed installation.
#[derive(Debug)]
pub struct InstallReport {
    pub production: PathBuf,
    /// Non-fatal problems: [`UpgradeError::PermissionSetFailed`] and
    /// [`UpgradeError::BackupCleanupFailed`].
    pub warnings: Vec<UpgradeError>,
}

/// Performs the backup, activate, chmod and cleanup sequence.
pub struct Installer {
    fs: Arc<dyn InstallFs>,
    make_executable: bool,
    restore_attempts: u32,
    restore_delay: Duration,
}

impl Installer {
    pub fn new(fs: Arc<dyn InstallFs>) -> Self {
        Self {
            fs,
            make_executable: true,
            restore_attempts: 3,
            restore_delay: Duration::from_secs(1),
        }
    }

    /// Whether step 3 runs. Defaults to `true`; Windows targets have no
    /// executable bit and turn it off.
    pub fn with_make_executable(mut self, make_executable: bool) -> Self {
        self.make_executable = make_executable;
        self
    }

    /// How often and how patiently a failed activation is rolled back.
    ///
    /// Retries matter on Windows, where a just-renamed executable can stay
    /// locked for a moment.
    pub fn with_restore_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.restore_attempts = attempts.max(1);
        self.restore_delay = delay;
        self
    }

    /// Run the installation sequence.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::BackupFailed`] if the production executable could not be moved aside
    /// - [`UpgradeError::ActivationFailed`] if the staged executable could not be moved
    ///   into place and the backup was restored
    /// - [`UpgradeError::ActivationUnrecoverable`] if restoring the backup failed too
    pub fn install(&self, plan: &InstallPlan) -> UpgradeResult<InstallReport> {
        self.remove_stale_backup(&plan.backup);

        debug!("Backing up {} to {}", plan.production.display(), plan.backup.display());
        self.fs.rename(&plan.production, &plan.backup).map_err(|source| {
            UpgradeError::BackupFailed {
                production: plan.production.clone(),
                backup: plan.backup.clone(),
                source,
            }
        })?;

        debug!("Activating {}", plan.staged.display());
        if let Err(source) = self.fs.rename(&plan.staged, &plan.production) {
            warn!("Activation failed: {source}. Restoring {}", plan.backup.display());
            return Err(match self.restore(plan) {
                Ok(()) => UpgradeError::ActivationFailed {
                    staged: plan.staged.clone(),
                    production: plan.production.clone(),
                    source,
                },
                Err(restore_error) => UpgradeError::ActivationUnrecoverable {
                    backup: plan.backup.clone(),
                    production: plan.production.clone(),
                    source,
                    restore_error,
                },
            });
        }
        info!("Activated {}", plan.production.display());

        let mut warnings = Vec::new();

        if self.make_executable {
            if let Err(source) = self.fs.set_executable(&plan.production) {
                let warning = UpgradeError::PermissionSetFailed {
                    path: plan.production.clone(),
                    source,
                };
                warn!("{warning}");
                warnings.push(warning);
            }
        }

        if let Err(source) = self.fs.remove_file(&plan.backup) {
            let warning = UpgradeError::BackupCleanupFailed {
                path: plan.backup.clone(),
                source,
            };
            warn!("{warning}");
            warnings.push(warning);
        }

        Ok(InstallReport {
            production: plan.production.clone(),
            warnings,
        })
    }

    fn remove_stale_backup(&self, backup: &Path) {
        match self.fs.remove_file(backup) {
            Ok(()) => debug!("Removed stale backup at {}", backup.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove stale backup {}: {e}", backup.display()),
        }
    }

    fn restore(&self, plan: &InstallPlan) -> io::Result<()> {
        let mut attempt = 1;
        loop {
            match self.fs.rename(&plan.backup, &plan.production) {
                Ok(()) => {
                    info!("Restored previous executable to {}", plan.production.display());
                    return Ok(());
                }
                Err(e) if attempt < self.restore_attempts => {
                    warn!("Restore attempt {attempt} failed: {e}. Retrying...");
                    std::thread::sleep(self.restore_delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
