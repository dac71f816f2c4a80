//! Archive extraction with executable staging.
//!
//! Both release formats are unpacked entry by entry into the install
//! directory. The entry carrying the application executable is redirected to
//! its staged, version-qualified name so extraction can never touch the file
//! backing the running process.
//!
//! Entry paths are sanitized before anything is written: absolute paths,
//! drive prefixes and `..` components abort extraction with
//! [`UpgradeError::ArchiveFormat`]. Symlinks and other special entries are
//! skipped.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::platform::ArchiveFormat;
use crate::core::{UpgradeError, UpgradeResult};

/// How the application executable is renamed during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingRule {
    /// Bare executable name as stored in the archive, e.g. `AssetGoblin`.
    pub executable_name: String,
    /// Name it is written under, e.g. `AssetGoblin_v2.0.0`.
    pub staged_name: String,
}

/// What an extraction produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Path of the staged executable, if the archive contained one.
    pub staged_executable: Option<PathBuf>,
    /// Every regular file written, in archive order.
    pub files: Vec<PathBuf>,
}

/// Unpacks one archive format.
pub trait Extractor: Send + Sync {
    /// Extract `archive` into `dest`, applying `rule` to the executable entry.
    ///
    /// Files written before a failure are left in place.
    fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        rule: &StagingRule,
    ) -> UpgradeResult<ExtractionReport>;
}

/// Extractor for the given archive format.
pub fn extractor_for(format: ArchiveFormat) -> Arc<dyn Extractor> {
    match format {
        ArchiveFormat::TarGz => Arc::new(TarGzExtractor),
        ArchiveFormat::Zip => Arc::new(ZipExtractor),
    }
}

/// `.tar.gz` extraction via `tar` and `flate2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        rule: &StagingRule,
    ) -> UpgradeResult<ExtractionReport> {
        debug!("Extracting {} into {}", archive.display(), dest.display());

        let file = File::open(archive)?;
        let mut tarball = tar::Archive::new(flate2::read::GzDecoder::new(file));
        let mut writer = EntryWriter::new(archive, dest, rule);

        let entries = tarball.entries().map_err(|e| malformed(archive, &e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| malformed(archive, &e))?;
            let name = entry.path().map_err(|e| malformed(archive, &e))?.into_owned();
            let kind = entry.header().entry_type();

            if kind.is_dir() {
                writer.directory(&name)?;
            } else if kind.is_file() {
                writer.file(&name, &mut entry)?;
            } else {
                warn!("Skipping special archive entry {} ({kind:?})", name.display());
            }
        }

        Ok(writer.finish())
    }
}

/// `.zip` extraction via `zip`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        rule: &StagingRule,
    ) -> UpgradeResult<ExtractionReport> {
        debug!("Extracting {} into {}", archive.display(), dest.display());

        let file = File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| malformed(archive, &e))?;
        let mut writer = EntryWriter::new(archive, dest, rule);

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index).map_err(|e| malformed(archive, &e))?;
            let name = PathBuf::from(entry.name());

            if entry.is_dir() {
                writer.directory(&name)?;
            } else if entry.is_symlink() {
                warn!("Skipping symlink archive entry {}", name.display());
            } else {
                writer.file(&name, &mut entry)?;
            }
        }

        Ok(writer.finish())
    }
}

/// Shared write path for both formats.
struct EntryWriter<'a> {
    archive: &'a Path,
    dest: &'a Path,
    rule: &'a StagingRule,
    report: ExtractionReport,
}

impl<'a> EntryWriter<'a> {
    fn new(archive: &'a Path, dest: &'a Path, rule: &'a StagingRule) -> Self {
        Self {
            archive,
            dest,
            rule,
            report: ExtractionReport::default(),
        }
    }

    fn directory(&mut self, name: &Path) -> UpgradeResult<()> {
        let Some(relative) = sanitize(self.archive, name)? else {
            return Ok(());
        };
        let path = self.dest.join(relative);
        fs::create_dir_all(&path).map_err(|source| UpgradeError::FileWrite {
            path,
            source,
        })
    }

    fn file(&mut self, name: &Path, reader: &mut impl Read) -> UpgradeResult<()> {
        let Some(relative) = sanitize(self.archive, name)? else {
            return Ok(());
        };

        let is_executable = relative == Path::new(&self.rule.executable_name);
        let target = if is_executable {
            self.dest.join(&self.rule.staged_name)
        } else {
            self.dest.join(&relative)
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| UpgradeError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let bytes = copy_entry(self.archive, reader, &target)?;
        debug!("Wrote {} ({bytes} bytes)", target.display());

        if is_executable {
            self.report.staged_executable = Some(target.clone());
        }
        self.report.files.push(target);
        Ok(())
    }

    fn finish(self) -> ExtractionReport {
        self.report
    }
}

/// Turn an archive entry name into a path relative to the destination.
///
/// `Ok(None)` for names that reduce to nothing (such as `./`).
fn sanitize(archive: &Path, name: &Path) -> UpgradeResult<Option<PathBuf>> {
    let mut relative = PathBuf::new();

    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(UpgradeError::ArchiveFormat {
                    archive: archive.to_path_buf(),
                    reason: format!("entry '{}' escapes the extraction directory", name.display()),
                });
            }
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}

/// Copy one entry to `target`. Read failures mean a corrupt archive, write
/// failures a filesystem problem.
fn copy_entry(archive: &Path, reader: &mut impl Read, target: &Path) -> UpgradeResult<u64> {
    let write_error = |source| UpgradeError::FileWrite {
        path: target.to_path_buf(),
        source,
    };

    let mut out = File::create(target).map_err(write_error)?;
    let mut buffer = [0u8; 8192];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buffer).map_err(|e| malformed(archive, &e))?;
        if n == 0 {
            break;
        }
        out.write_all(&buffer[..n]).map_err(write_error)?;
        total += n as u64;
    }

    out.flush().map_err(write_error)?;
    Ok(total)
}

fn malformed(archive: &Path, error: &dyn std::fmt::Display) -> UpgradeError {
    UpgradeError::ArchiveFormat {
        archive: archive.to_path_buf(),
        reason: error.to_string(),
    }
}
