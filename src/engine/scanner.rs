//! Recursive discovery of the source tree.
//!
//! Every subdirectory is explored by its own task spawned into a
//! `rayon::Scope`; the scan is complete when the scope returns. Regular files
//! are handed to a [`FileSink`], which either collects them or spawns their
//! copy right away.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::SortError;
use crate::progress::TaskTracker;
use crate::shutdown;

use super::index::{lock, RunState};
use super::layout::NO_EXTENSION;
use super::log_contained;

/// A regular file found in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: OsString,
    /// Text after the final `.`, or `unknown_suffix`.
    pub extension: String,
}

impl FileEntry {
    pub fn new(path: PathBuf, name: OsString) -> Self {
        let extension = extension_of(&name);
        Self {
            path,
            name,
            extension,
        }
    }
}

/// Extension folder name for a file name. Case is preserved; dotfiles and
/// names ending in `.` have none.
pub fn extension_of(name: &OsStr) -> String {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Receives every discovered file.
pub trait FileSink: Sync {
    fn accept<'s>(&'s self, scope: &rayon::Scope<'s>, entry: FileEntry);
}

/// Keeps entries for a later phase.
#[derive(Debug, Default)]
pub struct Collect {
    entries: std::sync::Mutex<Vec<FileEntry>>,
}

impl Collect {
    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries.into_inner().unwrap_or_else(|p| p.into_inner())
    }
}

impl FileSink for Collect {
    fn accept<'s>(&'s self, _scope: &rayon::Scope<'s>, entry: FileEntry) {
        lock(&self.entries).push(entry);
    }
}

pub struct Scanner<'a, S: FileSink> {
    state: &'a RunState,
    tracker: &'a TaskTracker,
    sink: &'a S,
}

impl<'a, S: FileSink> Scanner<'a, S> {
    pub fn new(state: &'a RunState, tracker: &'a TaskTracker, sink: &'a S) -> Self {
        Self {
            state,
            tracker,
            sink,
        }
    }

    /// Scan `root` and everything below it inside `scope`.
    pub fn start<'s>(&'s self, scope: &rayon::Scope<'s>, root: PathBuf) {
        self.tracker.add(1);
        self.scan(scope, root);
    }

    fn scan<'s>(&'s self, scope: &rayon::Scope<'s>, dir: PathBuf) {
        self.read_dir(scope, &dir);
        self.tracker.complete();
    }

    fn read_dir<'s>(&'s self, scope: &rayon::Scope<'s>, dir: &Path) {
        if shutdown::is_requested() {
            trace!(dir = %dir.display(), "shutdown requested; directory not read");
            return;
        }
        self.state.folder_visited();

        let entries = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => {
                self.state.scan_failed();
                log_contained(&SortError::from_io("read directory", dir, e));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(en) => en,
                Err(e) => {
                    self.state.scan_failed();
                    log_contained(&SortError::from_io("read directory entry", dir, e));
                    continue;
                }
            };
            let path = entry.path();
            // DirEntry::file_type does not follow symlinks.
            let ft = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    self.state.scan_failed();
                    log_contained(&SortError::from_io("stat", &path, e));
                    continue;
                }
            };

            if ft.is_dir() {
                self.tracker.add(1);
                scope.spawn(move |s| self.scan(s, path));
            } else if ft.is_file() {
                let file = FileEntry::new(path, entry.file_name());
                self.state.file_discovered(&file.extension);
                self.sink.accept(scope, file);
            } else {
                self.state.entry_skipped();
                log_contained(&SortError::TypeMismatch { path });
            }
        }
        debug!(dir = %dir.display(), "directory scanned");
    }
}
