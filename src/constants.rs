//! Global constants used throughout the AssetGoblin codebase.
//!
//! Names, endpoints and default timeouts for the self-update pipeline live
//! here so the release-publishing conventions are discoverable in one place.

use std::time::Duration;

/// Application name, used as the prefix of every release artifact and as the
/// bare executable name inside release archives.
pub const APP_NAME: &str = "AssetGoblin";

/// Version of the running binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build timestamp injected by the release pipeline.
pub const BUILD_TIME: &str = match option_env!("ASSETGOBLIN_BUILD_TIME") {
    Some(time) => time,
    None => "unknown",
};

/// Git commit injected by the release pipeline.
pub const GIT_COMMIT: &str = match option_env!("ASSETGOBLIN_GIT_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

/// Project homepage shown in the usage banner.
pub const HOMEPAGE: &str = "https://github.com/sbolch/AssetGoblin";

/// Release index queried for the latest published version.
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/sbolch/AssetGoblin/releases/latest";

/// Substring identifying the checksum manifest among a release's assets.
pub const CHECKSUM_ASSET_MARKER: &str = "checksums";

/// Prefix for temporary download files.
pub const TEMP_FILE_PREFIX: &str = "AssetGoblin-update-";

/// Total time allowed for a single HTTP request, body included (5 minutes).
///
/// Release archives are a few megabytes; this bounds a stalled transfer
/// without cutting off slow links.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Time allowed to establish a TCP/TLS connection (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for the best-effort update notice in `--version` and the banner.
pub const UPDATE_NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "ASSETGOBLIN_CONFIG_PATH";

/// Environment variable disabling progress bars.
pub const NO_PROGRESS_ENV: &str = "ASSETGOBLIN_NO_PROGRESS";
