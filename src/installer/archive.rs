//! Package archive handling

use std::fs::File;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{Result, fs};

const STAGING_PREFIX: &str = ".mbo-extract";
const PREVIOUS_DIR: &str = ".previous";

fn open(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| fs::extract_failed(path, e.to_string()))?;
    ZipArchive::new(file).map_err(|e| fs::extract_failed(path, e.to_string()))
}

/// Check that a downloaded package is a readable, non-empty zip archive.
/// Returns the number of entries.
pub fn validate(path: &Path) -> Result<usize> {
    let archive = open(path)?;
    if archive.is_empty() {
        return Err(fs::extract_failed(path, "archive is empty"));
    }
    Ok(archive.len())
}

/// Extract the `<module_name>/` tree of a package archive into `destination`.
///
/// The archive is unpacked into a staging directory inside `destination` first and the
/// module directory is renamed into place only once every entry was written, so a
/// corrupt archive never leaves a partial module behind. An existing module directory
/// is replaced. Entries outside `<module_name>/` are discarded.
pub fn extract_module(path: &Path, module_name: &str, destination: &Path) -> Result<PathBuf> {
    let mut archive = open(path)?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(destination)
        .map_err(|e| fs::temp_file_failed(destination, e.to_string()))?;

    archive
        .extract(staging.path())
        .map_err(|e| fs::extract_failed(path, e.to_string()))?;

    let extracted = staging.path().join(module_name);
    if !extracted.is_dir() {
        return Err(fs::extract_failed(
            path,
            format!("archive does not contain a '{module_name}/' directory"),
        ));
    }

    let target = destination.join(module_name);
    let previous = staging.path().join(PREVIOUS_DIR);
    let replaced = target.exists();
    if replaced {
        std::fs::rename(&target, &previous)
            .map_err(|e| fs::extract_failed(path, format!("cannot move {}: {e}", target.display())))?;
    }
    if let Err(e) = std::fs::rename(&extracted, &target) {
        if replaced {
            let _ = std::fs::rename(&previous, &target);
        }
        return Err(fs::extract_failed(
            path,
            format!("cannot move module into {}: {e}", target.display()),
        ));
    }

    tracing::debug!(
        "extracted {} entries from {} into {}",
        archive.len(),
        path.display(),
        target.display()
    );
    Ok(target)
}
