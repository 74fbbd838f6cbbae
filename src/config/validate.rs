//! Config validation logic.
//! Verifies the source root, prepares the destination root, and rejects overlapping trees.
//! Every failure here is a configuration error and is raised before any scanning.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info};

use crate::errors::SortError;

use super::types::Config;

/// Validate the roots and replace them with their canonical forms.
///
/// - source_root must exist, be a directory, and be readable.
/// - destination_root is created (with parents) if missing; it must not be a non-directory.
/// - Neither root may equal or contain the other.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<(), SortError> {
    let src = cfg.source_root.clone();
    let dest = cfg.destination_root.clone();

    ensure_source(&src)?;
    let src_real = dunce::canonicalize(&src).map_err(|e| setup_error(&src, "canonicalize", e))?;

    // Rejected before the destination is created, so a refused run leaves nothing behind.
    let dest_planned = resolve_planned(&dest)?;
    reject_overlap(&src_real, &dest_planned)?;

    ensure_destination(&dest)?;
    let dest_real =
        dunce::canonicalize(&dest).map_err(|e| setup_error(&dest, "canonicalize", e))?;
    reject_overlap(&src_real, &dest_real)?;

    info!(
        "Config validated: source='{}' destination='{}' strategy={}",
        src_real.display(),
        dest_real.display(),
        cfg.strategy
    );
    cfg.source_root = src_real;
    cfg.destination_root = dest_real;
    Ok(())
}

fn reject_overlap(src_real: &Path, dest_real: &Path) -> Result<(), SortError> {
    if src_real == dest_real || src_real.starts_with(dest_real) || dest_real.starts_with(src_real) {
        error!(
            source = %src_real.display(),
            destination = %dest_real.display(),
            "source and destination overlap"
        );
        return Err(SortError::Overlap {
            source_root: src_real.to_path_buf(),
            destination: dest_real.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonical form of `path` without creating it: the nearest existing
/// ancestor is canonicalised and the missing tail is appended as written.
fn resolve_planned(path: &Path) -> Result<PathBuf, SortError> {
    let abs = std::path::absolute(path).map_err(|e| setup_error(path, "resolve", e))?;
    for ancestor in abs.ancestors() {
        if !ancestor.exists() {
            continue;
        }
        let base =
            dunce::canonicalize(ancestor).map_err(|e| setup_error(ancestor, "canonicalize", e))?;
        let tail = abs.strip_prefix(ancestor).unwrap_or(Path::new(""));
        let mut planned = base;
        for part in tail.components() {
            match part {
                Component::ParentDir => {
                    planned.pop();
                }
                Component::CurDir => {}
                other => planned.push(other),
            }
        }
        return Ok(planned);
    }
    Ok(abs)
}

fn setup_error(path: &Path, op: &str, e: std::io::Error) -> SortError {
    SortError::Setup {
        path: path.to_path_buf(),
        context: format!("{op}: {e}"),
    }
}

fn ensure_source(path: &Path) -> Result<(), SortError> {
    if !path.exists() {
        error!("source does not exist: {}", path.display());
        return Err(SortError::SourceNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        error!("source is not a directory: {}", path.display());
        return Err(SortError::SourceNotDirectory(path.to_path_buf()));
    }
    fs::read_dir(path).map_err(|e| setup_error(path, "read source directory", e))?;
    debug!("source readable: {}", path.display());
    Ok(())
}

fn ensure_destination(path: &Path) -> Result<(), SortError> {
    if path.exists() {
        if !path.is_dir() {
            error!("destination exists but isn't a directory: {}", path.display());
            return Err(SortError::DestinationNotDirectory(path.to_path_buf()));
        }
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| setup_error(path, "create destination directory", e))?;
    info!("Created destination directory: {}", path.display());
    Ok(())
}
