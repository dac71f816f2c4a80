use anyhow::{Result, bail};
use colored::Colorize;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::upgrade::config::UpgradeConfig;
use crate::upgrade::{SelfUpdater, UpdateOutcome, UpdateStage};

/// Run the update pipeline and report the result.
///
/// Until installation starts the pipeline is raced against Ctrl-C and
/// dropped on interruption. Once the executable swap is under way Ctrl-C is
/// ignored so the swap always completes or rolls back.
pub async fn execute(config: &UpgradeConfig, quiet: bool) -> Result<()> {
    if !quiet {
        println!("{}", "Checking for updates...".cyan());
    }

    let gate = InstallGate::default();
    let observer_gate = gate.clone();
    let updater = SelfUpdater::from_config(config)?.with_stage_observer(move |stage| {
        observer_gate.observe(stage);
        if !quiet {
            report_stage(stage);
        }
    });

    let outcome = tokio::select! {
        outcome = updater.update() => outcome?,
        () = interrupted(&gate, tokio::signal::ctrl_c()) => {
            bail!("Update interrupted before installation; the executable was not changed")
        }
    };

    match outcome {
        UpdateOutcome::UpToDate { version } => {
            if !quiet {
                println!("{}", format!("Already up to date ({version}).").green());
            }
        }
        UpdateOutcome::Updated(summary) => {
            for warning in &summary.warnings {
                eprintln!("{}: {}", "warning".yellow().bold(), warning);
            }

            if !quiet {
                println!(
                    "{}",
                    format!("Update finished successfully. {} -> {}", summary.from, summary.to)
                        .green()
                );
                if !summary.notes.trim().is_empty() {
                    println!();
                    println!("{}", summary.notes.trim_end());
                }
            }
        }
    }

    Ok(())
}

fn report_stage(stage: UpdateStage) {
    let message = match stage {
        UpdateStage::Downloading => "Downloading update...",
        UpdateStage::VerifyingChecksum => "Verifying checksum...",
        UpdateStage::Extracting => "Extracting...",
        UpdateStage::Installing => "Installing...",
        _ => return,
    };
    println!("{}", message.cyan());
}

/// Records whether the installer has started.
#[derive(Debug, Clone, Default)]
struct InstallGate(Arc<AtomicBool>);

impl InstallGate {
    fn observe(&self, stage: UpdateStage) {
        if stage == UpdateStage::Installing {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn installing(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolves when `signal` fires before installation starts.
///
/// Never resolves if the handler cannot be installed or the signal arrives
/// during installation; the pipeline then runs to completion.
async fn interrupted(gate: &InstallGate, signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        debug!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }

    if gate.installing() {
        warn!("Ctrl-C ignored: the new executable is being installed");
        std::future::pending::<()>().await;
    }
}
