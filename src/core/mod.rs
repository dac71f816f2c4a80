//! Core types for AssetGoblin
//!
//! This module holds the error model shared by every part of the crate.
//!
//! # Error Management
//!
//! - **Strongly-typed errors** ([`UpgradeError`]) returned by each update stage
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - **Conversion** of arbitrary `anyhow` errors via [`user_friendly_error`]
//!
//! # Example
//!
//! ```rust,no_run
//! use assetgoblin::core::{UpgradeError, UpgradeResult};
//!
//! fn require_manifest(found: bool) -> UpgradeResult<()> {
//!     if !found {
//!         return Err(UpgradeError::ChecksumAssetNotFound {
//!             tag: "v1.2.0".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, UpgradeError, UpgradeResult, user_friendly_error};
