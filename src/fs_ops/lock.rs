//! Advisory destination lock.
//! Uses a sidecar lock file so only one sortcopy run writes into a destination root at a time.
//!
//! Design:
//! - We lock by opening/holding a file `.sortcopy.lock` inside the destination root.
//! - Unix: flock(LOCK_EX | LOCK_NB) on the file descriptor.
//! - Windows: open the file without sharing (exclusive); a sharing violation means "held".
//!
//! Notes:
//! - The lock is released when the DirLock guard is dropped.
//! - This module returns io::Result to keep low-level errors precise.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

#[cfg(unix)]
use std::os::fd::AsRawFd;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// RAII guard held while a directory-level lock is active.
pub struct DirLock {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: File,
    path: PathBuf,
}

impl DirLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            // flock releases on fd close anyway; unlock explicitly first. Best-effort.
            let _ = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        }
        // Completed runs should not leave stale lock files behind; ignore failures.
        let _ = std::fs::remove_file(&self.path);
    }
}

fn lock_file_path(dir: &Path) -> PathBuf {
    dir.join(".sortcopy.lock")
}

/// Try to acquire an exclusive lock for `dir` without blocking.
/// Returns Ok(Some(DirLock)) on success, Ok(None) if another process holds the lock,
/// or Err on unexpected errors.
pub fn try_acquire_dir_lock(dir: &Path) -> io::Result<Option<DirLock>> {
    let lock_path = lock_file_path(dir);

    #[cfg(unix)]
    {
        let f = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .custom_flags(libc::O_CLOEXEC)
            .mode(0o600)
            .open(&lock_path)?;

        let rc = unsafe { libc::flock(f.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc == 0 {
            trace!(path = %lock_path.display(), "try-lock success");
            return Ok(Some(DirLock { file: f, path: lock_path }));
        }
        let err = io::Error::last_os_error();
        if let Some(code) = err.raw_os_error()
            && code == libc::EWOULDBLOCK
        {
            trace!(path = %lock_path.display(), "try-lock would block");
            return Ok(None);
        }
        Err(err)
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;

        match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .share_mode(0)
            .open(&lock_path)
        {
            Ok(f) => {
                trace!(path = %lock_path.display(), "try-lock success");
                Ok(Some(DirLock { file: f, path: lock_path }))
            }
            // ERROR_SHARING_VIOLATION => already locked
            Err(e) if e.raw_os_error() == Some(32) => {
                trace!(path = %lock_path.display(), "try-lock would block");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
