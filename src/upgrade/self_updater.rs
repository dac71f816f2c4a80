use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::config::UpgradeConfig;
use super::download::Downloader;
use super::extract::{StagingRule, extractor_for};
use super::install::{InstallFs, InstallPlan, Installer, StdFs};
use super::manifest::ChecksumManifest;
use super::platform::PlatformProfile;
use super::release::{Release, ReleaseClient, build_http_client};
use super::selector::{artifact_name, select_assets};
use super::verification::ChecksumVerifier;
use crate::constants::{APP_NAME, CURRENT_VERSION};
use crate::core::{UpgradeError, UpgradeResult};

/// Pipeline position of a [`SelfUpdater::update`] run.
///
/// Stages are entered strictly in declaration order. A run either reaches
/// [`UpdateStage::Done`] or stops with an [`UpdateAborted`] naming the stage
/// that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateStage {
    Idle,
    Querying,
    Selecting,
    Downloading,
    VerifyingChecksum,
    Extracting,
    Installing,
    Done,
}

impl UpdateStage {
    /// Short present-participle description used in progress and error output.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Idle => "starting",
            Self::Querying => "querying the latest release",
            Self::Selecting => "selecting the release artifact",
            Self::Downloading => "downloading the release artifact",
            Self::VerifyingChecksum => "verifying the checksum",
            Self::Extracting => "extracting the archive",
            Self::Installing => "installing the new executable",
            Self::Done => "finished",
        }
    }
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// An update that stopped before completion.
#[derive(Debug, Error)]
#[error("Update aborted while {stage}")]
pub struct UpdateAborted {
    pub stage: UpdateStage,
    #[source]
    pub source: UpgradeError,
}

fn aborted(stage: UpdateStage) -> impl FnOnce(UpgradeError) -> UpdateAborted {
    move |source| UpdateAborted {
        stage,
        source,
    }
}

/// Details of a completed update.
#[derive(Debug)]
pub struct UpdateSummary {
    pub from: String,
    pub to: String,
    /// Release notes of the installed release.
    pub notes: String,
    /// Path of the replaced executable.
    pub production: PathBuf,
    /// Non-fatal installer warnings.
    pub warnings: Vec<UpgradeError>,
}

/// How a successful [`SelfUpdater::update`] run ended.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The running version is already the latest.
    UpToDate {
        version: String,
    },
    Updated(UpdateSummary),
}

type StageObserver = Box<dyn Fn(UpdateStage) + Send + Sync>;

/// Core self-update orchestrator for AssetGoblin.
///
/// `SelfUpdater` runs the whole update as one sequential pipeline:
///
/// ```text
/// Querying -> Selecting -> Downloading -> VerifyingChecksum -> Extracting -> Installing -> Done
/// ```
///
/// The [`Release`] returned by the query is passed explicitly to every later
/// stage. Downloads live in temporary files that disappear when the pipeline
/// returns or is dropped. Nothing is extracted before the archive checksum
/// matches the release manifest.
///
/// # Examples
///
/// ```rust,no_run
/// use assetgoblin::upgrade::{SelfUpdater, UpdateOutcome, config::UpgradeConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let updater = SelfUpdater::from_config(&UpgradeConfig::default())?;
/// match updater.update().await? {
///     UpdateOutcome::UpToDate { version } => println!("{version} is current"),
///     UpdateOutcome::Updated(summary) => println!("Updated to {}", summary.to),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SelfUpdater {
    app_name: String,
    current_version: String,
    profile: PlatformProfile,
    install_dir: Option<PathBuf>,
    temp_dir: PathBuf,
    release_client: ReleaseClient,
    downloader: Downloader,
    install_fs: Arc<dyn InstallFs>,
    observer: Option<StageObserver>,
}

/// The executable being replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InstallTarget {
    dir: PathBuf,
    /// File name of the production executable, e.g. `assetgoblin` or `AssetGoblin.exe`.
    file_name: String,
}

impl SelfUpdater {
    /// Build an updater for the running binary from configuration.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::Config`] for invalid settings,
    /// [`UpgradeError::UnsupportedPlatform`] when the host has no release artifacts,
    /// [`UpgradeError::Network`] if the HTTP client cannot be created.
    pub fn from_config(config: &UpgradeConfig) -> UpgradeResult<Self> {
        config.validate()?;

        let client = build_http_client(
            &format!("{APP_NAME}/{CURRENT_VERSION}"),
            config.request_timeout(),
            config.connect_timeout(),
        )?;

        Ok(Self {
            app_name: APP_NAME.to_string(),
            current_version: CURRENT_VERSION.to_string(),
            profile: PlatformProfile::current()?,
            install_dir: config.install_dir.clone(),
            temp_dir: std::env::temp_dir(),
            release_client: ReleaseClient::new(client.clone(), config.release_url.clone()),
            downloader: Downloader::new(client).with_progress(config.show_progress),
            install_fs: Arc::new(StdFs),
            observer: None,
        })
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    pub fn with_profile(mut self, profile: PlatformProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Install into `dir` as `<app>[.exe]` instead of replacing the running executable.
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Directory for the temporary downloads. Defaults to the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn with_install_fs(mut self, fs: Arc<dyn InstallFs>) -> Self {
        self.install_fs = fs;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.downloader = self.downloader.with_progress(show_progress);
        self
    }

    /// Register a callback invoked on every stage transition.
    pub fn with_stage_observer(
        mut self,
        observer: impl Fn(UpdateStage) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Query the release index and return the latest release if it is newer
    /// than the running version.
    pub async fn check_for_update(&self) -> UpgradeResult<Option<Release>> {
        let release = self.release_client.latest_release().await?;

        if needs_update(&self.current_version, &release.tag) {
            info!("Update available: {} -> {}", self.current_version, release.tag);
            Ok(Some(release))
        } else {
            debug!("Already on latest version {}", self.current_version);
            Ok(None)
        }
    }

    /// Run the full update pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateAborted`] carrying the failed stage and its error. All
    /// temporary downloads are removed; a staged or backup executable may be
    /// left in the install directory as recovery evidence.
    pub async fn update(&self) -> Result<UpdateOutcome, UpdateAborted> {
        self.enter(UpdateStage::Idle);

        self.enter(UpdateStage::Querying);
        let release =
            self.release_client.latest_release().await.map_err(aborted(UpdateStage::Querying))?;

        if !needs_update(&self.current_version, &release.tag) {
            info!("Already up to date ({})", self.current_version);
            self.enter(UpdateStage::Done);
            return Ok(UpdateOutcome::UpToDate {
                version: self.current_version.clone(),
            });
        }

        self.enter(UpdateStage::Selecting);
        let name = artifact_name(&self.app_name, &self.profile);
        let assets = select_assets(&release, &name).map_err(aborted(UpdateStage::Selecting))?;
        let target = self.install_target().map_err(aborted(UpdateStage::Selecting))?;

        self.enter(UpdateStage::Downloading);
        let archive = self
            .downloader
            .fetch(&assets.artifact.download_url, &self.temp_dir)
            .await
            .map_err(aborted(UpdateStage::Downloading))?;
        let manifest_file = self
            .downloader
            .fetch(&assets.checksums.download_url, &self.temp_dir)
            .await
            .map_err(aborted(UpdateStage::Downloading))?;

        self.enter(UpdateStage::VerifyingChecksum);
        let manifest = ChecksumManifest::from_file(manifest_file.path())
            .await
            .map_err(aborted(UpdateStage::VerifyingChecksum))?;
        drop(manifest_file);
        let digest = ChecksumVerifier::verify(archive.path(), &manifest, &name)
            .await
            .map_err(aborted(UpdateStage::VerifyingChecksum))?;
        debug!("{name} verified with sha256 {digest}");

        // The archive entry carries the release's own name; staged and backup
        // files are named after the executable actually being replaced.
        self.enter(UpdateStage::Extracting);
        let stem = self.profile.executable_stem(&target.file_name);
        let rule = StagingRule {
            executable_name: self.profile.executable_name(&self.app_name),
            staged_name: self.profile.staged_name(stem, &release.tag),
        };
        let staged = self
            .extract(archive.path(), &target.dir, rule)
            .await
            .map_err(aborted(UpdateStage::Extracting))?;
        drop(archive);

        self.enter(UpdateStage::Installing);
        let plan = InstallPlan {
            production: target.dir.join(&target.file_name),
            staged,
            backup: target.dir.join(self.profile.backup_name(stem, &self.current_version)),
        };
        let installer = Installer::new(Arc::clone(&self.install_fs))
            .with_make_executable(!self.profile.is_windows());
        let report = tokio::task::spawn_blocking(move || installer.install(&plan))
            .await
            .map_err(join_error)
            .and_then(|result| result)
            .map_err(aborted(UpdateStage::Installing))?;

        self.enter(UpdateStage::Done);
        info!("Updated {} from {} to {}", self.app_name, self.current_version, release.tag);

        Ok(UpdateOutcome::Updated(UpdateSummary {
            from: self.current_version.clone(),
            to: release.tag,
            notes: release.notes,
            production: report.production,
            warnings: report.warnings,
        }))
    }

    async fn extract(
        &self,
        archive: &Path,
        install_dir: &Path,
        rule: StagingRule,
    ) -> UpgradeResult<PathBuf> {
        let extractor = extractor_for(self.profile.format);
        let executable_name = rule.executable_name.clone();
        let archive_path = archive.to_path_buf();
        let dest = install_dir.to_path_buf();

        let report = tokio::task::spawn_blocking(move || extractor.extract(&archive_path, &dest, &rule))
            .await
            .map_err(join_error)??;
        debug!("Extracted {} files", report.files.len());

        report.staged_executable.ok_or_else(|| UpgradeError::ArchiveFormat {
            archive: archive.to_path_buf(),
            reason: format!("archive does not contain '{executable_name}'"),
        })
    }

    /// The configured install directory, or else the running executable.
    fn install_target(&self) -> UpgradeResult<InstallTarget> {
        match &self.install_dir {
            Some(dir) => Ok(InstallTarget {
                dir: dir.clone(),
                file_name: self.profile.executable_name(&self.app_name),
            }),
            None => install_target_of(&std::env::current_exe()?),
        }
    }

    fn enter(&self, stage: UpdateStage) {
        debug!("Update stage: {stage:?}");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }
}

fn install_target_of(exe: &Path) -> UpgradeResult<InstallTarget> {
    let unresolvable = || UpgradeError::Config {
        message: format!("cannot determine the location of {}", exe.display()),
    };

    let dir = exe.parent().ok_or_else(unresolvable)?;
    let file_name = exe.file_name().and_then(|name| name.to_str()).ok_or_else(unresolvable)?;

    Ok(InstallTarget {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
    })
}

fn join_error(error: tokio::task::JoinError) -> UpgradeError {
    UpgradeError::Io(std::io::Error::other(error))
}

/// Whether `latest` should replace `current`.
///
/// A leading `v` is ignored on both sides. When both parse as semantic
/// versions only a strictly newer release counts; otherwise any difference does.
pub fn needs_update(current: &str, latest: &str) -> bool {
    let current = current.trim().trim_start_matches('v');
    let latest = latest.trim().trim_start_matches('v');

    match (semver::Version::parse(current), semver::Version::parse(latest)) {
        (Ok(current), Ok(latest)) => latest > current,
        _ => current != latest,
    }
}
