//! Streaming downloads into temporary files.

use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::constants::TEMP_FILE_PREFIX;
use crate::core::{UpgradeError, UpgradeResult};
use crate::utils::progress::ProgressBar;

/// Downloads release assets into temporary files.
///
/// Each download lands in a fresh [`NamedTempFile`]; the file is removed when
/// the returned handle is dropped, so callers get cleanup on every exit path
/// simply by letting the handle go out of scope.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    show_progress: bool,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            show_progress: false,
        }
    }

    /// Enable or disable the byte progress bar.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download `url` into a new temporary file inside `temp_dir`.
    ///
    /// The body is streamed chunk by chunk and never held in memory as a whole.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::Network`] for transport failures, including a body
    ///   that breaks off mid-transfer
    /// - [`UpgradeError::HttpStatus`] for a non-success response
    /// - [`UpgradeError::FileWrite`] when the temporary file cannot be written
    pub async fn fetch(&self, url: &str, temp_dir: &Path) -> UpgradeResult<NamedTempFile> {
        debug!("Downloading {url}");

        let mut response =
            self.client.get(url).send().await.map_err(|source| UpgradeError::Network {
                operation: format!("downloading {url}"),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpgradeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let temp = tempfile::Builder::new().prefix(TEMP_FILE_PREFIX).tempfile_in(temp_dir).map_err(
            |source| UpgradeError::FileWrite {
                path: temp_dir.to_path_buf(),
                source,
            },
        )?;
        let write_error = |source| UpgradeError::FileWrite {
            path: temp.path().to_path_buf(),
            source,
        };

        let handle = temp.as_file().try_clone().map_err(write_error)?;
        let mut file = tokio::fs::File::from_std(handle);

        let progress = ProgressBar::download(response.content_length(), self.show_progress);
        progress.set_prefix(file_name_of(url));

        while let Some(chunk) = response.chunk().await.map_err(|source| UpgradeError::Network {
            operation: format!("downloading {url}"),
            source,
        })? {
            file.write_all(&chunk).await.map_err(write_error)?;
            progress.inc(chunk.len() as u64);
        }

        file.flush().await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        progress.finish_and_clear();

        debug!("Downloaded {} bytes to {}", progress.position(), temp.path().display());
        Ok(temp)
    }
}

fn file_name_of(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}
