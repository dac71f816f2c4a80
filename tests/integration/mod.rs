//! Integration test suite for AssetGoblin
//!
//! End-to-end runs of the self-update pipeline and the `assetgoblin` binary
//! against a local mock release server. No test touches the real network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **update_flow**: the pipeline through the library API, including failure injection
//! - **cli**: the binary's flags, output and exit codes

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod update_flow;
