//! Platform resolution for release artifacts.
//!
//! Release archives are published per OS/architecture pair. [`PlatformProfile`]
//! captures everything that varies between them (label, architecture label,
//! archive format, executable suffix) so the rest of the pipeline never has to
//! inspect the host itself.
//!
//! # Architecture Labels
//!
//! | `std::env::consts::ARCH` | Label   |
//! |--------------------------|---------|
//! | `x86_64`                 | `x64`   |
//! | `x86`                    | `x86`   |
//! | `aarch64`                | `arm64` |
//! | `arm`                    | `arm`   |

use std::fmt;

use crate::core::{UpgradeError, UpgradeResult};

/// Archive container used for a platform's release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// gzip-compressed tarball, used everywhere except Windows.
    TarGz,
    /// zip archive, used on Windows.
    Zip,
}

impl ArchiveFormat {
    /// File extension including the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => ".tar.gz",
            Self::Zip => ".zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TarGz => write!(f, "tar+gzip"),
            Self::Zip => write!(f, "zip"),
        }
    }
}

/// The release-naming view of one OS/architecture pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Raw OS identifier, as in `std::env::consts::OS`.
    pub os: String,
    /// Label used in artifact names, e.g. `Linux` or `macOS`.
    pub platform_label: String,
    /// Architecture label used in artifact names, e.g. `x64`.
    pub arch_label: String,
    pub format: ArchiveFormat,
    /// `.exe` on Windows, empty elsewhere.
    pub exe_suffix: &'static str,
}

impl PlatformProfile {
    /// Resolve the profile of the host this binary was compiled for.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::UnsupportedPlatform`] when no artifacts are
    /// published for the host architecture.
    pub fn current() -> UpgradeResult<Self> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolve a profile from explicit OS and architecture identifiers.
    ///
    /// Identifiers use the spelling of `std::env::consts`.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::UnsupportedPlatform`] for an empty OS or an
    /// architecture outside the label table.
    pub fn resolve(os: &str, arch: &str) -> UpgradeResult<Self> {
        let unsupported = || UpgradeError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let arch_label = arch_label(arch).ok_or_else(unsupported)?;
        let platform_label = platform_label(os).ok_or_else(unsupported)?;
        let windows = os == "windows";

        Ok(Self {
            os: os.to_string(),
            platform_label,
            arch_label: arch_label.to_string(),
            format: if windows {
                ArchiveFormat::Zip
            } else {
                ArchiveFormat::TarGz
            },
            exe_suffix: if windows {
                ".exe"
            } else {
                ""
            },
        })
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Name of the production executable, e.g. `AssetGoblin.exe`.
    pub fn executable_name(&self, app: &str) -> String {
        format!("{app}{}", self.exe_suffix)
    }

    /// `file_name` without the executable suffix, e.g. `assetgoblin.exe` -> `assetgoblin`.
    pub fn executable_stem<'a>(&self, file_name: &'a str) -> &'a str {
        if self.exe_suffix.is_empty() {
            return file_name;
        }
        match file_name.len().checked_sub(self.exe_suffix.len()) {
            Some(split)
                if file_name.is_char_boundary(split)
                    && file_name[split..].eq_ignore_ascii_case(self.exe_suffix) =>
            {
                &file_name[..split]
            }
            _ => file_name,
        }
    }

    /// Name the new executable is extracted under, e.g. `AssetGoblin_v2.0.0`.
    pub fn staged_name(&self, app: &str, target_tag: &str) -> String {
        format!("{app}_{target_tag}{}", self.exe_suffix)
    }

    /// Name the previous executable is moved to during installation.
    pub fn backup_name(&self, app: &str, current_version: &str) -> String {
        format!("{app}_{current_version}{}", self.exe_suffix)
    }
}

fn arch_label(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" => Some("x64"),
        "x86" => Some("x86"),
        "aarch64" => Some("arm64"),
        "arm" => Some("arm"),
        _ => None,
    }
}

fn platform_label(os: &str) -> Option<String> {
    if os == "macos" {
        return Some("macOS".to_string());
    }

    let mut chars = os.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
