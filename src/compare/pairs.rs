use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::{CompareConfig, FilePair, file_name};
use crate::error::{Error, Result};

/// Regular files directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Name of the candidate export for a reference export.
///
/// Every occurrence of the marker is removed, so `newR=100,.csv` maps to
/// `R=100,.csv`.
pub fn candidate_name(reference_name: &str, marker: &str) -> String {
    reference_name.replace(marker, "")
}

/// Pair every marked reference export with its candidate export.
///
/// A reference without a candidate is an error, not a skipped file.
pub fn find_pairs(cfg: &CompareConfig) -> Result<Vec<FilePair>> {
    let mut pairs = Vec::new();

    for reference in list_files(&cfg.reference_dir)? {
        let name = file_name(&reference);
        if cfg.marker.is_empty() || !name.contains(&cfg.marker) {
            continue;
        }

        let candidate = cfg.candidate_dir.join(candidate_name(&name, &cfg.marker));
        if !candidate.is_file() {
            return Err(Error::NoMatchingFile {
                reference,
                expected: candidate,
            });
        }

        debug!(
            reference = %reference.display(),
            candidate = %candidate.display(),
            "paired exports"
        );
        pairs.push(FilePair::new(reference, candidate));
    }

    Ok(pairs)
}
