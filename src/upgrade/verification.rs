use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use super::manifest::ChecksumManifest;
use crate::core::{UpgradeError, UpgradeResult};

/// Verifies the integrity of a downloaded archive using SHA-256.
///
/// Verification gates the rest of the update: nothing is extracted or
/// installed unless the archive hashes to the digest recorded in the
/// release's checksum manifest.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the lowercase hex SHA-256 digest of a file.
    ///
    /// The file is streamed in 8 KiB blocks.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use assetgoblin::upgrade::verification::ChecksumVerifier;
    /// use std::path::Path;
    ///
    /// # async fn example() -> assetgoblin::core::UpgradeResult<()> {
    /// let checksum = ChecksumVerifier::compute_sha256(Path::new("/tmp/archive.tar.gz")).await?;
    /// println!("SHA256: {checksum}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn compute_sha256(file_path: &Path) -> UpgradeResult<String> {
        debug!("Computing SHA256 checksum for: {}", file_path.display());

        let mut file = tokio::fs::File::open(file_path).await?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 8192];

        loop {
            let n = file.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Verify `file_path` against the manifest entry for `artifact`.
    ///
    /// Returns the verified digest.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::ChecksumMissing`] if the manifest has no entry for `artifact`
    /// - [`UpgradeError::ChecksumMismatch`] if the digests differ
    pub async fn verify(
        file_path: &Path,
        manifest: &ChecksumManifest,
        artifact: &str,
    ) -> UpgradeResult<String> {
        info!("Verifying checksum for {artifact}");

        let expected = manifest.require(artifact)?.trim().to_lowercase();
        let actual = Self::compute_sha256(file_path).await?;

        if actual != expected {
            return Err(UpgradeError::ChecksumMismatch {
                name: artifact.to_string(),
                expected,
                actual,
            });
        }

        info!("Checksum verification successful");
        Ok(actual)
    }
}
