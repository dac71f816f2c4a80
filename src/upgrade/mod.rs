//! Self-update functionality for AssetGoblin.
//!
//! This module lets a running AssetGoblin binary discover, download, verify and
//! install a newer release of itself. The running executable is never
//! overwritten in place: the new binary is extracted under a versioned name and
//! swapped in with renames, keeping the previous binary as a backup until the
//! new one is active.
//!
//! # Update Process Flow
//!
//! ```text
//! 1. Querying
//!    └── Fetch the latest release from the release index
//!
//! 2. Selecting
//!    ├── Compute AssetGoblin_<Platform>_<Arch>.tar.gz|.zip
//!    └── Find that asset and the checksum manifest in the release
//!
//! 3. Downloading
//!    └── Stream both assets into temporary files
//!
//! 4. VerifyingChecksum
//!    └── SHA-256 of the archive must match the manifest entry
//!
//! 5. Extracting
//!    └── Unpack into the install directory, executable as AssetGoblin_<tag>
//!
//! 6. Installing
//!    ├── AssetGoblin        -> AssetGoblin_<current>   (backup)
//!    ├── AssetGoblin_<tag>  -> AssetGoblin             (activation, rolled back on failure)
//!    ├── chmod 755 (non-Windows, warning only)
//!    └── remove backup (warning only)
//! ```
//!
//! # Safety Mechanisms
//!
//! - Verification gates extraction: a checksum mismatch or missing manifest
//!   entry aborts before any file in the install directory is touched
//! - Archive entries cannot escape the install directory
//! - A failed activation renames the backup back; if that fails too, the
//!   error names both paths for manual recovery
//!
//! # Module Structure
//!
//! - [`platform`]: OS/architecture labels and archive format
//! - [`release`]: release index client
//! - [`selector`]: artifact naming and asset lookup
//! - [`download`]: streaming downloads into temporary files
//! - [`manifest`]: checksum manifest parsing
//! - [`verification`]: SHA-256 verification
//! - [`extract`]: tar+gzip and zip extraction with executable staging
//! - [`install`]: backup, activation and cleanup
//! - [`self_updater`]: the orchestrating pipeline
//! - [`config`]: configuration structures and defaults
//!
//! # Error Handling
//!
//! ```rust,no_run
//! use assetgoblin::upgrade::{SelfUpdater, UpdateOutcome, config::UpgradeConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let updater = SelfUpdater::from_config(&UpgradeConfig::default())?;
//! match updater.update().await {
//!     Ok(UpdateOutcome::Updated(summary)) => println!("Updated to {}", summary.to),
//!     Ok(UpdateOutcome::UpToDate { .. }) => println!("Already up to date."),
//!     Err(aborted) => eprintln!("Update failed while {}: {}", aborted.stage, aborted.source),
//! }
//! # Ok(())
//! # }
//! ```

/// Configuration structures for upgrade behavior.
pub mod config;
/// Streaming downloads of release assets.
pub mod download;
/// Archive extraction for both release formats.
pub mod extract;
/// Backup, activation and cleanup of the executable.
pub mod install;
/// Checksum manifest parsing.
pub mod manifest;
/// Platform profile resolution.
pub mod platform;
/// Release index client.
pub mod release;
/// Release asset selection.
pub mod selector;
/// Core self-update implementation.
///
/// Contains the `SelfUpdater` pipeline that sequences every other module.
pub mod self_updater;
/// Download verification and integrity checking.
pub mod verification;

pub use extract::{Extractor, TarGzExtractor, ZipExtractor};
pub use install::{InstallFs, Installer, StdFs};
pub use manifest::ChecksumManifest;
pub use platform::{ArchiveFormat, PlatformProfile};
pub use release::{Asset, Release, ReleaseClient};
pub use self_updater::{SelfUpdater, UpdateAborted, UpdateOutcome, UpdateStage, UpdateSummary};
pub use verification::ChecksumVerifier;
