//! Checksum manifest parsing.
//!
//! Release manifests list one artifact per line as `<hex-digest> <filename>`.
//! Anything that is not exactly two whitespace-separated tokens (blank lines,
//! comments, trailing junk) is skipped rather than rejected.

use std::collections::HashMap;
use std::path::Path;

use crate::core::{UpgradeError, UpgradeResult};

/// Mapping from artifact file name to its lowercase hex digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, String>,
}

impl ChecksumManifest {
    /// Parse manifest text. Never fails; malformed lines are ignored and a
    /// later line for the same file name replaces an earlier one.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();

        for line in content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if let [digest, filename] = parts.as_slice() {
                entries.insert((*filename).to_string(), digest.to_lowercase());
            }
        }

        Self { entries }
    }

    /// Read and parse a downloaded manifest file.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::Io`] when the file cannot be read.
    pub async fn from_file(path: &Path) -> UpgradeResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Digest recorded for `filename`.
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.entries.get(filename).map(String::as_str)
    }

    /// Digest recorded for `filename`, or [`UpgradeError::ChecksumMissing`].
    pub fn require(&self, filename: &str) -> UpgradeResult<&str> {
        self.get(filename).ok_or_else(|| UpgradeError::ChecksumMissing {
            name: filename.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
