//! End-to-end runs of the update pipeline against a mock release server.

use anyhow::Result;
use assetgoblin::core::UpgradeError;
use assetgoblin::test_utils::{ReleaseFixture, build_tar_gz, build_zip, init_test_logging};
use assetgoblin::upgrade::config::UpgradeConfig;
use assetgoblin::upgrade::install::{InstallFs, StdFs};
use assetgoblin::upgrade::{ArchiveFormat, PlatformProfile, SelfUpdater, UpdateOutcome, UpdateStage};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::common::{ReleaseServer, dir_entries};

const LINUX_ARTIFACT: &str = "App_Linux_x64.tar.gz";

fn linux_updater(server: &ReleaseServer, install_dir: &Path) -> Result<SelfUpdater> {
    Ok(SelfUpdater::from_config(&server.config(install_dir))?
        .with_app_name("App")
        .with_current_version("v1.0.0")
        .with_profile(PlatformProfile::resolve("linux", "x86_64")?))
}

fn install_dir_with_original() -> Result<TempDir> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("App"), b"original binary")?;
    Ok(dir)
}

/// Fails renames whose source is `fail_from`, delegates everything else.
struct FailingRename {
    fail_from: PathBuf,
}

impl InstallFs for FailingRename {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from == self.fail_from {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "rename blocked"));
        }
        StdFs.rename(from, to)
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        StdFs.set_executable(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        StdFs.remove_file(path)
    }
}

/// Delegates to [`StdFs`] and records every `set_executable` call.
#[derive(Default)]
struct ChmodRecorder {
    calls: Mutex<Vec<PathBuf>>,
}

impl InstallFs for ChmodRecorder {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        StdFs.rename(from, to)
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        StdFs.set_executable(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        StdFs.remove_file(path)
    }
}

/// Release v2.0.0 with a valid tar.gz replaces the executable and leaves no
/// backup or staged file behind.
#[tokio::test]
async fn test_update_end_to_end() -> Result<()> {
    init_test_logging(None);
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;

    let archive = build_tar_gz(&[("App", b"brand new binary"), ("LICENSE", b"MIT")]);
    server.publish("v2.0.0", LINUX_ARTIFACT, archive, None).await;

    let stages = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&stages);
    let updater = linux_updater(&server, install_dir.path())?
        .with_stage_observer(move |stage| recorded.lock().unwrap().push(stage));

    let outcome = updater.update().await?;

    let summary = match outcome {
        UpdateOutcome::Updated(summary) => summary,
        other => panic!("expected an update, got {other:?}"),
    };
    assert_eq!(summary.from, "v1.0.0");
    assert_eq!(summary.to, "v2.0.0");
    assert_eq!(summary.notes, "Faster image resizing.");
    assert_eq!(summary.production, install_dir.path().join("App"));
    assert!(summary.warnings.is_empty(), "warnings: {:?}", summary.warnings);

    assert_eq!(std::fs::read(install_dir.path().join("App"))?, b"brand new binary");
    assert_eq!(dir_entries(install_dir.path()), vec!["App", "LICENSE"]);

    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            UpdateStage::Idle,
            UpdateStage::Querying,
            UpdateStage::Selecting,
            UpdateStage::Downloading,
            UpdateStage::VerifyingChecksum,
            UpdateStage::Extracting,
            UpdateStage::Installing,
            UpdateStage::Done,
        ]
    );

    Ok(())
}

/// A digest mismatch aborts before extraction: the install directory is untouched.
#[tokio::test]
async fn test_checksum_mismatch_never_installs() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;

    let archive = build_tar_gz(&[("App", b"tampered binary")]);
    let wrong = "0".repeat(64);
    server.publish("v2.0.0", LINUX_ARTIFACT, archive, Some(&wrong)).await;

    let err = linux_updater(&server, install_dir.path())?.update().await.unwrap_err();

    assert_eq!(err.stage, UpdateStage::VerifyingChecksum);
    match &err.source {
        UpgradeError::ChecksumMismatch { name, expected, actual } => {
            assert_eq!(name, LINUX_ARTIFACT);
            assert_eq!(expected, &wrong);
            assert_ne!(actual, &wrong);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(dir_entries(install_dir.path()), vec!["App"]);
    assert_eq!(std::fs::read(install_dir.path().join("App"))?, b"original binary");
    Ok(())
}

/// When activation fails the backup is renamed back to the production name.
#[tokio::test]
async fn test_activation_failure_restores_original() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;

    let archive = build_tar_gz(&[("App", b"brand new binary")]);
    server.publish("v2.0.0", LINUX_ARTIFACT, archive, None).await;

    let staged = install_dir.path().join("App_v2.0.0");
    let updater = linux_updater(&server, install_dir.path())?.with_install_fs(Arc::new(
        FailingRename {
            fail_from: staged.clone(),
        },
    ));

    let err = updater.update().await.unwrap_err();

    assert_eq!(err.stage, UpdateStage::Installing);
    assert!(
        matches!(err.source, UpgradeError::ActivationFailed { .. }),
        "unexpected error: {}",
        err.source
    );
    assert_eq!(std::fs::read(install_dir.path().join("App"))?, b"original binary");
    assert!(!install_dir.path().join("App_v1.0.0").exists());
    // The staged executable stays as recovery evidence
    assert_eq!(std::fs::read(&staged)?, b"brand new binary");
    Ok(())
}

/// Windows releases are zip archives with an `.exe` inside.
#[tokio::test]
async fn test_update_zip_release() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = TempDir::new()?;
    std::fs::write(install_dir.path().join("App.exe"), b"old exe")?;

    let archive = build_zip(&[("App.exe", b"new exe"), ("docs/", b""), ("docs/README.txt", b"hi")]);
    server.publish("v2.0.0", "App_Windows_x64.zip", archive, None).await;

    let updater = SelfUpdater::from_config(&server.config(install_dir.path()))?
        .with_app_name("App")
        .with_current_version("1.0.0")
        .with_profile(PlatformProfile::resolve("windows", "x86_64")?);

    let outcome = updater.update().await?;
    assert!(matches!(outcome, UpdateOutcome::Updated(_)));

    assert_eq!(std::fs::read(install_dir.path().join("App.exe"))?, b"new exe");
    assert_eq!(std::fs::read(install_dir.path().join("docs/README.txt"))?, b"hi");
    assert!(!install_dir.path().join("App_1.0.0.exe").exists());
    assert!(!install_dir.path().join("App_v2.0.0.exe").exists());
    Ok(())
}

/// Equal versions end the run before anything is downloaded.
#[tokio::test]
async fn test_already_up_to_date() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;

    let fixture = ReleaseFixture::new("v1.0.0")
        .asset(LINUX_ARTIFACT, server.download_url(LINUX_ARTIFACT))
        .asset("checksums.txt", server.download_url("checksums.txt"));
    server.mount_release(&fixture).await;
    server.mount_file(LINUX_ARTIFACT, Vec::new(), 0).await;

    let outcome = linux_updater(&server, install_dir.path())?.update().await?;

    assert!(matches!(outcome, UpdateOutcome::UpToDate { ref version } if version == "v1.0.0"));
    assert_eq!(dir_entries(install_dir.path()), vec!["App"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_platform_artifact() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;

    let fixture = ReleaseFixture::new("v2.0.0")
        .asset("App_macOS_arm64.tar.gz", server.download_url("App_macOS_arm64.tar.gz"))
        .asset("checksums.txt", server.download_url("checksums.txt"));
    server.mount_release(&fixture).await;

    let err = linux_updater(&server, install_dir.path())?.update().await.unwrap_err();

    assert_eq!(err.stage, UpdateStage::Selecting);
    assert!(matches!(err.source, UpgradeError::AssetNotFound { ref name, .. } if name == LINUX_ARTIFACT));
    Ok(())
}

#[tokio::test]
async fn test_release_index_http_error() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;
    server.mount_release_status(503).await;

    let err = linux_updater(&server, install_dir.path())?.update().await.unwrap_err();

    assert_eq!(err.stage, UpdateStage::Querying);
    assert!(matches!(err.source, UpgradeError::HttpStatus { status: 503, .. }));
    Ok(())
}

#[tokio::test]
async fn test_release_index_malformed_json() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;
    server.mount_release_body(r#"{"tag_name": 5, "assets": "nope"}"#).await;

    let err = linux_updater(&server, install_dir.path())?.update().await.unwrap_err();

    assert_eq!(err.stage, UpdateStage::Querying);
    assert!(matches!(err.source, UpgradeError::Decode { .. }));
    Ok(())
}

/// A verified archive without the executable aborts before installation.
#[tokio::test]
async fn test_archive_without_executable() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;

    let archive = build_tar_gz(&[("NOTES.txt", b"nothing to run")]);
    server.publish("v2.0.0", LINUX_ARTIFACT, archive, None).await;

    let err = linux_updater(&server, install_dir.path())?.update().await.unwrap_err();

    assert_eq!(err.stage, UpdateStage::Extracting);
    assert!(matches!(err.source, UpgradeError::ArchiveFormat { .. }));
    assert_eq!(std::fs::read(install_dir.path().join("App"))?, b"original binary");
    Ok(())
}

#[tokio::test]
async fn test_check_for_update() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = TempDir::new()?;
    server.mount_release(&ReleaseFixture::new("v2.0.0")).await;

    let newer = linux_updater(&server, install_dir.path())?.check_for_update().await?;
    assert_eq!(newer.map(|release| release.tag), Some("v2.0.0".to_string()));

    let current = linux_updater(&server, install_dir.path())?
        .with_current_version("2.0.0")
        .check_for_update()
        .await?;
    assert!(current.is_none());
    Ok(())
}

/// A release index that refuses connections aborts the query with a network error.
#[tokio::test]
async fn test_release_index_unreachable() -> Result<()> {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };
    let install_dir = install_dir_with_original()?;

    let config = UpgradeConfig {
        release_url: format!("http://127.0.0.1:{port}/releases/latest"),
        request_timeout: 5,
        connect_timeout: 2,
        install_dir: Some(install_dir.path().to_path_buf()),
        show_progress: false,
    };
    let err = SelfUpdater::from_config(&config)?
        .with_app_name("App")
        .with_current_version("v1.0.0")
        .with_profile(PlatformProfile::resolve("linux", "x86_64")?)
        .update()
        .await
        .unwrap_err();

    assert_eq!(err.stage, UpdateStage::Querying);
    assert!(matches!(err.source, UpgradeError::Network { .. }), "unexpected error: {}", err.source);
    assert_eq!(dir_entries(install_dir.path()), vec!["App"]);
    Ok(())
}

/// A manifest download answering 404 aborts while downloading and removes the
/// artifact that was already fetched.
#[tokio::test]
async fn test_download_http_error_removes_temp_files() -> Result<()> {
    let server = ReleaseServer::start().await;
    let install_dir = install_dir_with_original()?;
    let temp_dir = TempDir::new()?;

    let fixture = ReleaseFixture::new("v2.0.0")
        .asset(LINUX_ARTIFACT, server.download_url(LINUX_ARTIFACT))
        .asset("checksums.txt", server.download_url("checksums.txt"));
    server.mount_release(&fixture).await;
    server.mount_file(LINUX_ARTIFACT, build_tar_gz(&[("App", b"new")]), 1).await;

    let err = linux_updater(&server, install_dir.path())?
        .with_temp_dir(temp_dir.path())
        .update()
        .await
        .unwrap_err();

    assert_eq!(err.stage, UpdateStage::Downloading);
    match &err.source {
        UpgradeError::HttpStatus { url, status } => {
            assert_eq!(*status, 404);
            assert!(url.ends_with("/checksums.txt"), "url: {url}");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(dir_entries(temp_dir.path()).is_empty());
    assert_eq!(dir_entries(install_dir.path()), vec!["App"]);
    Ok(())
}

/// The executable bit is set for Unix profiles and skipped for Windows ones.
#[tokio::test]
async fn test_permissions_follow_profile() -> Result<()> {
    let cases = [
        ("linux", "App_Linux_x64.tar.gz", "App", 1),
        ("windows", "App_Windows_x64.zip", "App.exe", 0),
    ];

    for (os, artifact, executable, expected_calls) in cases {
        let server = ReleaseServer::start().await;
        let install_dir = TempDir::new()?;
        std::fs::write(install_dir.path().join(executable), b"old")?;

        let profile = PlatformProfile::resolve(os, "x86_64")?;
        let entries: [(&str, &[u8]); 1] = [(executable, b"new")];
        let archive = match profile.format {
            ArchiveFormat::TarGz => build_tar_gz(&entries),
            ArchiveFormat::Zip => build_zip(&entries),
        };
        server.publish("v2.0.0", artifact, archive, None).await;

        let recorder = Arc::new(ChmodRecorder::default());
        let updater = SelfUpdater::from_config(&server.config(install_dir.path()))?
            .with_app_name("App")
            .with_current_version("1.0.0")
            .with_profile(profile)
            .with_install_fs(recorder.clone());

        let outcome = updater.update().await?;
        assert!(matches!(outcome, UpdateOutcome::Updated(_)), "{os}");

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), expected_calls, "{os}: {calls:?}");
        if expected_calls == 1 {
            assert_eq!(calls[0], install_dir.path().join(executable));
        }
    }
    Ok(())
}
