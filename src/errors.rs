//! Typed error definitions for sortcopy.
//! Configuration errors are fatal and raised before any scanning; every other
//! variant is contained to the directory subtree or file that produced it.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("Source root not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Source root is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("Destination exists but is not a directory: {0}")]
    DestinationNotDirectory(PathBuf),

    #[error("Source '{source_root}' and destination '{destination}' must not overlap")]
    Overlap {
        source_root: PathBuf,
        destination: PathBuf,
    },

    #[error("Another sortcopy run holds the lock on {0}")]
    DestinationLocked(PathBuf),

    #[error("Setup failed for {path}: {context}")]
    Setup { path: PathBuf, context: String },

    #[error("Permission denied to {op} {path}")]
    Access { path: PathBuf, op: &'static str },

    #[error("Failed to {op} {path}: {source}")]
    Transient {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Not a regular file or directory: {path}")]
    TypeMismatch { path: PathBuf },

    #[error("Unexpected failure to {op} {path}: {source}")]
    Unclassified {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl SortError {
    /// Map an io::Error raised while performing `op` on `path` into the
    /// contained-failure taxonomy.
    pub fn from_io(op: &'static str, path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => SortError::Access { path, op },
            io::ErrorKind::NotFound
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock => SortError::Transient { path, op, source },
            _ => SortError::Unclassified { path, op, source },
        }
    }

    /// Closure adapter for `.map_err(SortError::io(op, path))`.
    pub fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |e| SortError::from_io(op, path, e)
    }

    /// Stable numeric code used in structured log lines.
    pub fn code(&self) -> u16 {
        match self {
            SortError::SourceNotFound(_) => 10,
            SortError::SourceNotDirectory(_) => 11,
            SortError::DestinationNotDirectory(_) => 12,
            SortError::Overlap { .. } => 13,
            SortError::DestinationLocked(_) => 14,
            SortError::Setup { .. } => 15,
            SortError::Access { .. } => 20,
            SortError::Transient { .. } => 21,
            SortError::TypeMismatch { .. } => 22,
            SortError::Unclassified { .. } => 23,
            SortError::Interrupted => 130,
        }
    }

    /// Short machine-friendly kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            SortError::SourceNotFound(_)
            | SortError::SourceNotDirectory(_)
            | SortError::DestinationNotDirectory(_)
            | SortError::Overlap { .. }
            | SortError::DestinationLocked(_)
            | SortError::Setup { .. } => "configuration",
            SortError::Access { .. } => "access",
            SortError::Transient { .. } => "transient_io",
            SortError::TypeMismatch { .. } => "type_mismatch",
            SortError::Unclassified { .. } => "unclassified",
            SortError::Interrupted => "interrupted",
        }
    }

    /// Fatal errors abort the run before work starts.
    pub fn is_configuration(&self) -> bool {
        self.kind() == "configuration"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_access() {
        let e = SortError::from_io(
            "read directory",
            Path::new("/x"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(e, SortError::Access { .. }));
        assert_eq!(e.kind(), "access");
        assert!(!e.is_configuration());
    }

    #[test]
    fn vanished_file_is_transient() {
        let e = SortError::from_io(
            "open",
            Path::new("/gone.txt"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(e, SortError::Transient { .. }));
        assert_eq!(e.code(), 21);
    }

    #[test]
    fn other_kinds_are_unclassified() {
        let e = SortError::from_io(
            "copy",
            Path::new("/a"),
            io::Error::other("boom"),
        );
        assert!(matches!(e, SortError::Unclassified { .. }));
        assert!(format!("{e}").contains("boom"));
    }

    #[test]
    fn configuration_family() {
        assert!(SortError::SourceNotFound(PathBuf::from("src")).is_configuration());
        assert!(SortError::DestinationLocked(PathBuf::from("d")).is_configuration());
        assert!(!SortError::Interrupted.is_configuration());
    }
}
