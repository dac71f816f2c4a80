//! Version output and the usage banner.

use colored::Colorize;
use tracing::debug;

use crate::constants::{
    APP_NAME, BUILD_TIME, CURRENT_VERSION, GIT_COMMIT, HOMEPAGE, UPDATE_NOTICE_TIMEOUT,
};
use crate::upgrade::SelfUpdater;
use crate::upgrade::config::UpgradeConfig;

pub async fn show_version(config: &UpgradeConfig) {
    println!("{APP_NAME} {CURRENT_VERSION}");
    println!("Build: {BUILD_TIME} #{GIT_COMMIT}");
    print_update_notice(config).await;
}

pub async fn show_banner(config: &UpgradeConfig, help: &str) {
    println!("{}", APP_NAME.bold().cyan());
    println!("Serve static files and dynamically manipulated images.");
    println!();
    print_update_notice(config).await;
    println!("{help}");
    println!("Homepage: {HOMEPAGE}");
    println!("Version:  {CURRENT_VERSION}");
}

/// Print a notice when a newer release exists. Failures are only logged.
async fn print_update_notice(config: &UpgradeConfig) {
    if let Some(tag) = latest_newer_tag(config).await {
        println!(
            "{}",
            format!("Update available: {CURRENT_VERSION} -> {tag}. Run `assetgoblin --update` to install it.")
                .yellow()
        );
        println!();
    }
}

async fn latest_newer_tag(config: &UpgradeConfig) -> Option<String> {
    let updater = match SelfUpdater::from_config(config) {
        Ok(updater) => updater,
        Err(e) => {
            debug!("Skipping update check: {e}");
            return None;
        }
    };

    match tokio::time::timeout(UPDATE_NOTICE_TIMEOUT, updater.check_for_update()).await {
        Ok(Ok(release)) => release.map(|release| release.tag),
        Ok(Err(e)) => {
            debug!("Update check failed: {e}");
            None
        }
        Err(_) => {
            debug!("Update check timed out");
            None
        }
    }
}
