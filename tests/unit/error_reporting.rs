use anyhow::Context;
use assetgoblin::core::{UpgradeError, user_friendly_error};
use assetgoblin::upgrade::{UpdateAborted, UpdateStage};
use std::io;
use std::path::PathBuf;

fn mismatch() -> UpgradeError {
    UpgradeError::ChecksumMismatch {
        name: "AssetGoblin_Linux_x64.tar.gz".to_string(),
        expected: "aa".repeat(32),
        actual: "bb".repeat(32),
    }
}

/// An abort is rendered with its stage, the cause chain and the suggestion
/// for the underlying failure.
#[test]
fn test_aborted_update_rendering() {
    let error = anyhow::Error::new(UpdateAborted {
        stage: UpdateStage::VerifyingChecksum,
        source: mismatch(),
    });

    let rendered = user_friendly_error(error).to_string();

    assert!(rendered.starts_with("Update aborted while verifying the checksum"), "{rendered}");
    assert!(rendered.contains("Caused by:"), "{rendered}");
    assert!(rendered.contains("Checksum mismatch for 'AssetGoblin_Linux_x64.tar.gz'"));
    assert!(rendered.contains("Suggestion: The download is corrupt"), "{rendered}");
}

#[test]
fn test_unrecoverable_activation_names_both_paths() {
    let error = anyhow::Error::new(UpdateAborted {
        stage: UpdateStage::Installing,
        source: UpgradeError::ActivationUnrecoverable {
            backup: PathBuf::from("/opt/goblin/AssetGoblin_0.1.0"),
            production: PathBuf::from("/opt/goblin/AssetGoblin"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            restore_error: io::Error::new(io::ErrorKind::PermissionDenied, "denied again"),
        },
    });

    let ctx = user_friendly_error(error);
    let suggestion = ctx.suggestion.clone().unwrap_or_default();

    assert!(suggestion.contains("/opt/goblin/AssetGoblin_0.1.0"), "{suggestion}");
    assert!(suggestion.contains("/opt/goblin/AssetGoblin"), "{suggestion}");
    assert!(ctx.to_string().contains("Update aborted while installing the new executable"));
}

/// A bare update error keeps its variant and gains details.
#[test]
fn test_direct_error_keeps_variant() {
    let ctx = user_friendly_error(anyhow::Error::new(mismatch()));

    assert!(matches!(ctx.error, UpgradeError::ChecksumMismatch { .. }));
    let details = ctx.details.unwrap_or_default();
    assert!(details.contains(&"aa".repeat(32)), "{details}");
    assert!(details.contains(&"bb".repeat(32)), "{details}");
}

#[test]
fn test_unrelated_error_has_no_suggestion() {
    let error: anyhow::Result<()> =
        Err(io::Error::new(io::ErrorKind::NotFound, "gone")).context("Failed to read something");

    let ctx = user_friendly_error(error.unwrap_err());

    assert!(matches!(ctx.error, UpgradeError::Other { .. }));
    assert!(ctx.suggestion.is_none());
    let rendered = ctx.to_string();
    assert!(rendered.contains("Failed to read something"));
    assert!(rendered.contains("1: gone"), "{rendered}");
}

#[test]
fn test_warning_variants() {
    let permissions = UpgradeError::PermissionSetFailed {
        path: PathBuf::from("AssetGoblin"),
        source: io::Error::other("read-only filesystem"),
    };
    let cleanup = UpgradeError::BackupCleanupFailed {
        path: PathBuf::from("AssetGoblin_0.1.0"),
        source: io::Error::other("busy"),
    };

    assert!(permissions.is_warning());
    assert!(cleanup.is_warning());
    assert!(!mismatch().is_warning());
    assert!(!UpgradeError::UnsupportedPlatform {
        os: "freebsd".to_string(),
        arch: "riscv64".to_string(),
    }
    .is_warning());
}
