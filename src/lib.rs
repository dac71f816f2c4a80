//! AssetGoblin - static file and image server with built-in self-update
//!
//! This crate holds the self-update subsystem of AssetGoblin: the machinery
//! that lets a running binary find, download, verify and install a newer
//! release of itself without ever overwriting the file backing the running
//! process.
//!
//! # Architecture Overview
//!
//! - [`upgrade`] - the update pipeline and its stages
//! - [`core`] - error types and user-facing error rendering
//! - [`config`] - the optional global configuration file
//! - [`cli`] - flag parsing and terminal output
//! - [`utils`] - progress bars
//!
//! # Example
//!
//! ```rust,no_run
//! use assetgoblin::upgrade::{SelfUpdater, config::UpgradeConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let updater = SelfUpdater::from_config(&UpgradeConfig::default())?;
//! if let Some(release) = updater.check_for_update().await? {
//!     println!("{} is available", release.tag);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod upgrade;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
