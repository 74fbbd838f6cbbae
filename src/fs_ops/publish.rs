//! No-clobber copy publish:
//! - Copies to a hidden temp file in the destination directory
//! - Publishes temp -> dest only if dest is still free
//! - Removes the temp file on every failure path
//!
//! A reader of the destination directory therefore only ever sees complete files
//! under their final names; an interrupted copy leaves at most a temp file, which
//! is cleaned up before returning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

use super::io_copy;

/// Prefix of transient files written by this crate.
pub const TEMP_PREFIX: &str = ".sortcopy.";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique hidden temp path inside `dst_dir`.
/// Pattern: .sortcopy.<pid>.<nanos>.<seq>.tmp
pub(crate) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    dst_dir.join(format!("{TEMP_PREFIX}{pid}.{nanos}.{seq}.tmp"))
}

/// Copy `src` to `dest` without ever replacing an existing `dest`.
///
/// Returns the number of bytes copied. If `dest` already exists (before or after
/// the copy), returns an `AlreadyExists` error and leaves `dest` untouched.
pub fn publish_copy(src: &Path, dest: &Path) -> io::Result<u64> {
    let dest_dir = dest.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent")
    })?;

    let tmp_path = unique_temp_path(dest_dir);
    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    match link_no_clobber(&tmp_path, dest) {
        Ok(()) => {
            trace!(tmp = %tmp_path.display(), dest = %dest.display(), bytes, "published");
            Ok(bytes)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

/// Give `tmp` the name `dest` unless `dest` exists.
///
/// A hard link is atomic and refuses to replace an existing name. Filesystems
/// without hard links fall back to an existence check plus rename; callers
/// serialise access to `dest` within the process so that window stays closed
/// for this run.
fn link_no_clobber(tmp: &Path, dest: &Path) -> io::Result<()> {
    match fs::hard_link(tmp, dest) {
        Ok(()) => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            trace!(error = %e, dest = %dest.display(), "hard link unavailable; using rename");
            if fs::symlink_metadata(dest).is_ok() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", dest.display()),
                ));
            }
            fs::rename(tmp, dest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use tempfile::tempdir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn publishes_and_cleans_tmp() {
        let td = tempdir().unwrap();
        let src = td.path().join("src.txt");
        fs::write(&src, "hello world").unwrap();
        let dest_dir = td.path().join("out");
        fs::create_dir_all(&dest_dir).unwrap();
        let dest = dest_dir.join("dest.txt");

        let n = publish_copy(&src, &dest).unwrap();
        assert_eq!(n, 11);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "hello world");
        assert!(leftovers(&dest_dir).is_empty());
    }

    #[test]
    fn refuses_to_replace_existing() {
        let td = tempdir().unwrap();
        let src = td.path().join("src.txt");
        fs::write(&src, "new").unwrap();
        let dest_dir = td.path().join("out");
        fs::create_dir_all(&dest_dir).unwrap();
        let dest = dest_dir.join("dest.txt");
        fs::write(&dest, "old").unwrap();

        let err = publish_copy(&src, &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
        assert!(leftovers(&dest_dir).is_empty());
    }

    #[test]
    fn missing_source_leaves_nothing_behind() {
        let td = tempdir().unwrap();
        let dest = td.path().join("dest.txt");
        let err = publish_copy(&td.path().join("gone"), &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!dest.exists());
        assert!(leftovers(td.path()).is_empty());
    }

    #[test]
    fn temp_names_unique_across_threads() {
        let dir = PathBuf::from("d");
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let d = dir.clone();
                thread::spawn(move || unique_temp_path(&d))
            })
            .collect();
        let set: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(set.len(), 32);
        assert!(set.iter().all(|p| {
            let name = p.file_name().unwrap().to_string_lossy();
            name.starts_with(TEMP_PREFIX) && name.ends_with(".tmp")
        }));
    }
}
