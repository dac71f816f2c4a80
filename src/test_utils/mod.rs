//! Test utilities for AssetGoblin
//!
//! Helpers shared by unit and integration tests: logging setup, in-memory
//! release archives and release index fixtures.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetgoblin::test_utils::{build_tar_gz, sha256_hex};
//!
//! let archive = build_tar_gz(&[("AssetGoblin", b"binary"), ("README.md", b"docs")]);
//! let digest = sha256_hex(&archive);
//! let manifest = format!("{digest}  AssetGoblin_Linux_x64.tar.gz\n");
//! ```

pub mod fixtures;

pub use fixtures::{ReleaseFixture, build_tar_gz, build_tar_gz_raw_names, build_zip};

use sha2::{Digest, Sha256};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; without either, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
