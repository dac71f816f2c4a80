//! Locating the platform artifact and checksum manifest in a release.

use tracing::debug;

use super::platform::PlatformProfile;
use super::release::{Asset, Release};
use crate::constants::CHECKSUM_ASSET_MARKER;
use crate::core::{UpgradeError, UpgradeResult};

/// The two assets an update needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAssets {
    pub artifact: Asset,
    pub checksums: Asset,
}

/// Artifact file name for `profile`: `<App>_<PlatformLabel>_<ArchLabel><Extension>`.
///
/// ```rust,no_run
/// use assetgoblin::upgrade::{PlatformProfile, selector::artifact_name};
///
/// let profile = PlatformProfile::resolve("macos", "aarch64").unwrap();
/// assert_eq!(artifact_name("AssetGoblin", &profile), "AssetGoblin_macOS_arm64.tar.gz");
/// ```
pub fn artifact_name(app: &str, profile: &PlatformProfile) -> String {
    format!(
        "{app}_{}_{}{}",
        profile.platform_label,
        profile.arch_label,
        profile.format.extension()
    )
}

/// Pick the artifact named `artifact` and the first checksum manifest from `release`.
///
/// Asset order is preserved; on duplicates the first entry wins.
///
/// # Errors
///
/// [`UpgradeError::AssetNotFound`] when no asset is named `artifact`,
/// [`UpgradeError::ChecksumAssetNotFound`] when no asset name contains `checksums`.
pub fn select_assets(release: &Release, artifact: &str) -> UpgradeResult<SelectedAssets> {
    let found = release.assets.iter().find(|asset| asset.name == artifact).ok_or_else(|| {
        UpgradeError::AssetNotFound {
            name: artifact.to_string(),
            tag: release.tag.clone(),
        }
    })?;

    let checksums = release
        .assets
        .iter()
        .find(|asset| asset.name.contains(CHECKSUM_ASSET_MARKER))
        .ok_or_else(|| UpgradeError::ChecksumAssetNotFound {
            tag: release.tag.clone(),
        })?;

    debug!("Selected {} (checksums: {})", found.name, checksums.name);

    Ok(SelectedAssets {
        artifact: found.clone(),
        checksums: checksums.clone(),
    })
}
