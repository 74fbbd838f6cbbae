//! Destination layout: `<root>/<extension>/<name>`.
//!
//! Extension folders are created lazily and idempotently. Each destination
//! slot (final file path) can be held under an in-process lock so the
//! check, fingerprint and copy sequence for that slot is never interleaved.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::errors::SortError;

use super::index::lock;

/// Folder name for files without an extension.
pub const NO_EXTENSION: &str = "unknown_suffix";

#[derive(Debug)]
pub struct DestinationLayout {
    root: PathBuf,
    ensured: Mutex<HashSet<String>>,
    slots: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DestinationLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ensured: Mutex::new(HashSet::new()),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder for `extension`, without touching the filesystem.
    pub fn extension_dir(&self, extension: &str) -> PathBuf {
        self.root.join(extension)
    }

    /// `<root>/<extension>/<name>`; pure.
    pub fn resolve_path(&self, extension: &str, name: &OsStr) -> PathBuf {
        self.extension_dir(extension).join(name)
    }

    /// Make sure the folder for `extension` exists.
    ///
    /// Succeeds if the folder already exists, whoever created it. Concurrent
    /// callers for the same extension may both reach `create_dir_all`; both succeed.
    pub fn ensure_extension_dir(&self, extension: &str) -> Result<PathBuf, SortError> {
        let dir = self.extension_dir(extension);
        if lock(&self.ensured).contains(extension) {
            return Ok(dir);
        }

        match fs::create_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(e) => return Err(SortError::from_io("create extension folder", &dir, e)),
        }
        if lock(&self.ensured).insert(extension.to_string()) {
            debug!(dir = %dir.display(), "extension folder ready");
        }
        Ok(dir)
    }

    /// Run `f` while holding the in-process lock for destination `slot`.
    ///
    /// The lock entry is dropped again once no other task holds or waits on it.
    pub fn with_slot<R>(&self, slot: &Path, f: impl FnOnce() -> R) -> R {
        let cell = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(slot.to_path_buf()).or_default())
        };
        let out = {
            let _held = lock(&*cell);
            f()
        };

        let mut slots = lock(&self.slots);
        // One count for the map, one for `cell`; waiters hold their own clone.
        if Arc::strong_count(&cell) == 2 {
            slots.remove(slot);
        }
        out
    }

    #[cfg(test)]
    fn live_slots(&self) -> usize {
        lock(&self.slots).len()
    }
}
