//! Configuration management for AssetGoblin
//!
//! See [`GlobalConfig`] for file locations and format.

mod global;

pub use global::GlobalConfig;
