//! AssetGoblin CLI entry point
//!
//! Parses flags, installs logging, runs the selected action and turns any
//! error into a colored diagnostic on stderr with a non-zero exit status.

use anyhow::Result;
use assetgoblin::cli;
use assetgoblin::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
