//! Archive packaging
//!
//! Produces `game.zip` next to the converted tree and, in split mode, one
//! `subpkg/<name>.zip` per declared subpackage.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::list_files;
use crate::error::{ConvertError, Result};
use crate::path_utils::path_to_string;
use crate::types::{GameConfig, SubpackageDescriptor};

pub const MAIN_ARCHIVE: &str = "game.zip";
pub const SUBPACKAGE_DIR: &str = "subpkg";

const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// One written archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub entries: usize,
}

/// Result of the packaging stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackReport {
    pub main: Option<ArchiveInfo>,
    pub subpackages: Vec<(String, ArchiveInfo)>,
    /// Subpackages declared but not found on disk
    pub skipped: Vec<String>,
}

/// Package the converted tree at `root` into archives beside it
pub fn pack(root: &Path, config: &GameConfig, split: bool) -> Result<PackReport> {
    let output_dir = root.parent().ok_or_else(|| ConvertError::InvalidPath {
        path: root.to_path_buf(),
        reason: "project tree has no parent directory for the archives".to_string(),
    })?;

    // Subpackage declarations only matter in split mode
    let declared = if split { config.subpackages() } else { Vec::new() };
    let roots: Vec<&str> = declared
        .iter()
        .map(SubpackageDescriptor::trimmed_root)
        .filter(|r| !r.is_empty())
        .collect();

    let mut report = PackReport::default();

    let main_path = output_dir.join(MAIN_ARCHIVE);
    tracing::info!("Creating main package: {}", main_path.display());
    let main_files: Vec<PathBuf> = list_files(root)?
        .into_iter()
        .filter(|file| {
            let relative = relative_name(root, file);
            !roots.iter().any(|r| relative.contains(r))
        })
        .collect();
    let entries = write_archive(&main_path, root, &main_files)?;
    report.main = Some(ArchiveInfo {
        path: main_path,
        entries,
    });

    if !split || declared.is_empty() {
        return Ok(report);
    }

    tracing::info!("Found {} subpackage(s)", declared.len());
    let subpkg_dir = output_dir.join(SUBPACKAGE_DIR);
    fs::create_dir_all(&subpkg_dir).map_err(|e| ConvertError::io(&subpkg_dir, e))?;

    for subpackage in declared {
        let trimmed = subpackage.trimmed_root();
        let sub_root = root.join(trimmed);
        if trimmed.is_empty() || !sub_root.is_dir() {
            tracing::warn!(
                "Skipping missing subpackage: {} (root '{}')",
                subpackage.name,
                subpackage.root
            );
            report.skipped.push(subpackage.name.clone());
            continue;
        }

        let archive = subpkg_dir.join(format!("{}.zip", subpackage.name));
        tracing::info!("Creating subpackage: {}", archive.display());
        let files = list_files(&sub_root)?;
        let entries = write_archive(&archive, &sub_root, &files)?;
        report.subpackages.push((
            subpackage.name.clone(),
            ArchiveInfo {
                path: archive,
                entries,
            },
        ));
    }

    Ok(report)
}

/// Archive member name: path relative to `base`, always with `/`
fn relative_name(base: &Path, file: &Path) -> String {
    path_to_string(file.strip_prefix(base).unwrap_or(file))
}

/// Write `files` into a deflate-compressed archive, named relative to `base`
fn write_archive(path: &Path, base: &Path, files: &[PathBuf]) -> Result<usize> {
    let archive_err = |source: zip::result::ZipError| ConvertError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for source in files {
        let mut reader = File::open(source).map_err(|e| ConvertError::io(source, e))?;
        let size = reader
            .metadata()
            .map_err(|e| ConvertError::io(source, e))?
            .len();
        // Zip64 extra fields only where the 4 GiB limit requires them
        zip.start_file(
            relative_name(base, source),
            options.large_file(size >= ZIP64_THRESHOLD),
        )
        .map_err(archive_err)?;
        io::copy(&mut reader, &mut zip).map_err(|e| ConvertError::io(path, e))?;
    }

    zip.finish().map_err(archive_err)?;
    tracing::debug!("Wrote {} entries to {}", files.len(), path.display());
    Ok(files.len())
}
