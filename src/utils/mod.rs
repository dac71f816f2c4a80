//! Utility modules for AssetGoblin
//!
//! - [`progress`] - download progress bars built on `indicatif`

pub mod progress;

pub use progress::ProgressBar;
