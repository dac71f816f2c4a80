//! Command-line interface for AssetGoblin.
//!
//! AssetGoblin is driven by flags rather than subcommands:
//!
//! ```bash
//! assetgoblin                 # describe the tool and show usage
//! assetgoblin --version       # version, build and update notice
//! assetgoblin --update        # install the latest release
//! ```
//!
//! # Global Options
//!
//! - `--verbose`: debug logging on stderr
//! - `--quiet` / `-q`: errors only, no progress lines
//! - `--config <PATH>`: configuration file (see [`crate::config::GlobalConfig`])
//! - `--no-progress`: no download progress bar
//!
//! `RUST_LOG` overrides the log level chosen by `--verbose` / `--quiet`.

mod info;
mod upgrade;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "assetgoblin",
    about = "AssetGoblin - serve static files and dynamically manipulated images",
    long_about = "AssetGoblin serves static files and on-the-fly manipulated images. \
                  Run with --update to replace this executable with the latest release.",
    disable_version_flag = true
)]
pub struct Cli {
    /// Check for a newer release and install it
    #[arg(long, conflicts_with = "version")]
    update: bool,

    /// Print version and build information
    #[arg(short = 'v', long)]
    version: bool,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable the download progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Install the stderr log subscriber. `RUST_LOG` takes precedence over the flags.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run the action selected by the flags.
    pub async fn execute(self) -> Result<()> {
        let config = GlobalConfig::load_with_optional(self.config.clone()).await?;
        let mut upgrade_config = config.upgrade;
        if self.no_progress || self.quiet {
            upgrade_config.show_progress = false;
        }

        if self.update {
            upgrade::execute(&upgrade_config, self.quiet).await
        } else if self.version {
            info::show_version(&upgrade_config).await;
            Ok(())
        } else {
            let help = Self::command().render_help().to_string();
            info::show_banner(&upgrade_config, &help).await;
            Ok(())
        }
    }
}
