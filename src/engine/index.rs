//! Shared run state: extension set, duplicate index and counters.
//!
//! Every mutation goes through a method here; tasks never see the raw
//! containers. Maps are behind `Mutex`es, counters are atomics.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::config::Strategy;
use crate::errors::SortError;
use crate::fs_ops::ContentFingerprint;

use super::copier::CopyOutcome;

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

/// Distinct extensions observed during a run.
#[derive(Debug, Default)]
pub struct ExtensionSet {
    inner: Mutex<BTreeSet<String>>,
}

impl ExtensionSet {
    /// Returns true if `ext` was not seen before.
    pub fn insert(&self, ext: &str) -> bool {
        let mut set = lock(&self.inner);
        if set.contains(ext) {
            return false;
        }
        set.insert(ext.to_string())
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> BTreeSet<String> {
        lock(&self.inner).clone()
    }
}

/// Content duplicates and name collisions, appended from many tasks.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    by_fingerprint: Mutex<BTreeMap<String, Vec<PathBuf>>>,
    by_name: Mutex<BTreeMap<OsString, Vec<PathBuf>>>,
}

impl DuplicateIndex {
    /// `source` had the same content as the file already in its slot.
    pub fn record_duplicate(&self, fingerprint: &ContentFingerprint, source: PathBuf) {
        lock(&self.by_fingerprint)
            .entry(fingerprint.to_hex())
            .or_default()
            .push(source);
    }

    /// `source` shared its destination name with different content.
    pub fn record_name_collision(&self, name: OsString, source: PathBuf) {
        lock(&self.by_name).entry(name).or_default().push(source);
    }

    pub fn duplicates(&self) -> BTreeMap<String, Vec<PathBuf>> {
        lock(&self.by_fingerprint).clone()
    }

    pub fn duplicated_names(&self) -> BTreeMap<OsString, Vec<PathBuf>> {
        lock(&self.by_name).clone()
    }
}

/// Everything a run mutates concurrently.
#[derive(Debug, Default)]
pub struct RunState {
    pub extensions: ExtensionSet,
    pub index: DuplicateIndex,
    folders: AtomicUsize,
    discovered: AtomicUsize,
    copied: AtomicUsize,
    renamed: AtomicUsize,
    duplicate_files: AtomicUsize,
    failed: AtomicUsize,
    unprocessed: AtomicUsize,
    scan_failures: AtomicUsize,
    skipped: AtomicUsize,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder_visited(&self) {
        self.folders.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_discovered(&self, extension: &str) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
        self.extensions.insert(extension);
    }

    /// A directory or entry could not be read; nothing below it was discovered.
    pub fn scan_failed(&self) {
        self.scan_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// An entry that is neither a regular file nor a directory was left alone.
    pub fn entry_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// A discovered file was never attempted because shutdown was requested.
    pub fn file_unprocessed(&self) {
        self.unprocessed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the result of one CopyEngine invocation.
    pub fn record(&self, result: &Result<CopyOutcome, SortError>) {
        match result {
            Ok(CopyOutcome::Copied { .. }) => {
                self.copied.fetch_add(1, Ordering::Relaxed);
            }
            Ok(CopyOutcome::Renamed { .. }) => {
                self.copied.fetch_add(1, Ordering::Relaxed);
                self.renamed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(CopyOutcome::Duplicate { .. }) => {
                self.duplicate_files.fetch_add(1, Ordering::Relaxed);
            }
            Err(SortError::Interrupted) => {
                self.unprocessed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Freeze the state into a read-only report. Call only after every task joined.
    pub fn finish(&self, strategy: Strategy, elapsed: Duration, interrupted: bool) -> RunStats {
        RunStats {
            strategy,
            elapsed,
            interrupted,
            folders_visited: self.folders.load(Ordering::Acquire),
            files_discovered: self.discovered.load(Ordering::Acquire),
            files_copied: self.copied.load(Ordering::Acquire),
            files_renamed: self.renamed.load(Ordering::Acquire),
            duplicate_files: self.duplicate_files.load(Ordering::Acquire),
            files_failed: self.failed.load(Ordering::Acquire),
            files_unprocessed: self.unprocessed.load(Ordering::Acquire),
            scan_failures: self.scan_failures.load(Ordering::Acquire),
            entries_skipped: self.skipped.load(Ordering::Acquire),
            extensions: self.extensions.snapshot(),
            duplicates: self.index.duplicates(),
            duplicated_names: self.index.duplicated_names(),
        }
    }
}

/// Read-only summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub strategy: Strategy,
    pub elapsed: Duration,
    pub interrupted: bool,
    pub folders_visited: usize,
    pub files_discovered: usize,
    /// Includes renamed copies.
    pub files_copied: usize,
    pub files_renamed: usize,
    /// Files skipped because identical content already sat in their slot.
    pub duplicate_files: usize,
    pub files_failed: usize,
    pub files_unprocessed: usize,
    /// Directories or entries that could not be read.
    pub scan_failures: usize,
    /// Symlinks, sockets and other non-regular entries.
    pub entries_skipped: usize,
    pub extensions: BTreeSet<String>,
    /// fingerprint -> sources skipped as content duplicates
    pub duplicates: BTreeMap<String, Vec<PathBuf>>,
    /// original name -> sources stored under a fingerprint-prefixed name
    pub duplicated_names: BTreeMap<OsString, Vec<PathBuf>>,
}

impl RunStats {
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    pub fn duplicate_fingerprint_groups(&self) -> usize {
        self.duplicates.len()
    }

    pub fn duplicate_name_groups(&self) -> usize {
        self.duplicated_names.len()
    }

    /// True when some file or directory could not be processed.
    pub fn had_failures(&self) -> bool {
        self.files_failed > 0 || self.scan_failures > 0
    }
}
