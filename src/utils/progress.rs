//! Progress indicators for long-running downloads.
//!
//! Thin wrapper over `indicatif` that renders nothing when progress output is
//! disabled, either explicitly (`--no-progress`, `ASSETGOBLIN_NO_PROGRESS`) or
//! because stderr is not a terminal.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;

use crate::constants::NO_PROGRESS_ENV;

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some() || !std::io::stderr().is_terminal()
}

/// Byte-oriented progress bar for a single download.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a download bar.
    ///
    /// `total` is the expected byte count when the server announced one; without
    /// it a spinner with a running byte count is drawn instead.
    pub fn download(total: Option<u64>, enabled: bool) -> Self {
        if !enabled || is_progress_disabled() {
            return Self::hidden();
        }

        let bar = match total {
            Some(len) => {
                let bar = IndicatifBar::new(len);
                bar.set_style(download_style());
                bar
            }
            None => {
                let bar = IndicatifBar::new_spinner();
                bar.set_style(spinner_style());
                bar
            }
        };
        Self { inner: bar }
    }

    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold.cyan} {spinner:.cyan} {bytes}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
