//! I/O hint helpers.
//!
//! Maps an io::Error to a short, actionable hint for the per-failure log line.
//!
//! Usage:
//!   warn!(error = %e, hint = io_hint(&source).unwrap_or(""), "copy failed");

use std::io;

/// Human-friendly hint for common failure causes, by raw OS code first, then by kind.
pub fn io_hint(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let hint = match code {
                libc::EACCES | libc::EPERM => Some("permission denied; check ownership and read/write permissions"),
                libc::ENOENT => Some("path vanished while the run was in progress"),
                libc::ENOSPC => Some("insufficient space on device"),
                libc::EROFS => Some("read-only filesystem; cannot write here"),
                libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
                libc::ENAMETOOLONG => Some("filename or path too long"),
                libc::EMFILE => Some("process file descriptor limit reached; lower --jobs or raise limits"),
                libc::ENFILE => Some("system-wide file table overflow; lower --jobs"),
                libc::EIO => Some("low-level I/O error; check the device"),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
        #[cfg(windows)]
        {
            let hint = match code {
                5 => Some("access denied; check permissions"),
                2 | 3 => Some("path vanished while the run was in progress"),
                32 => Some("sharing violation; file is in use"),
                112 => Some("insufficient disk space"),
                206 => Some("filename or path too long (MAX_PATH exceeded)"),
                4 => Some("too many open files; lower --jobs"),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
    }

    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and read/write permissions"),
        io::ErrorKind::NotFound => Some("path vanished while the run was in progress"),
        io::ErrorKind::AlreadyExists => Some("destination name already taken"),
        io::ErrorKind::UnexpectedEof => Some("file shrank while being read"),
        _ => None,
    }
}
