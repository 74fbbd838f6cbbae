//! Placement of a single file.
//!
//! The destination slot for a file is `<ext>/<name>`. A free slot gets the
//! bytes. An occupied slot is compared by fingerprint: identical content is a
//! duplicate and is not copied, different content goes to
//! `<ext>/<fingerprint>__<name>` instead. Existing bytes are never replaced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::SortError;
use crate::fs_ops::{collision_name, fingerprint_file, publish_copy, ContentFingerprint};
use crate::shutdown;

use super::index::DuplicateIndex;
use super::layout::DestinationLayout;
use super::scanner::FileEntry;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Copied under its own name.
    Copied { dest: PathBuf },
    /// Name taken by different content; copied under a fingerprint-prefixed name.
    Renamed {
        dest: PathBuf,
        fingerprint: ContentFingerprint,
    },
    /// Identical content already present at `existing`; nothing written.
    Duplicate {
        fingerprint: ContentFingerprint,
        existing: PathBuf,
    },
}

enum Slot {
    Filled(PathBuf),
    Occupied {
        source: ContentFingerprint,
        existing: ContentFingerprint,
    },
}

pub struct CopyEngine<'a> {
    layout: &'a DestinationLayout,
    index: &'a DuplicateIndex,
}

impl<'a> CopyEngine<'a> {
    pub fn new(layout: &'a DestinationLayout, index: &'a DuplicateIndex) -> Self {
        Self { layout, index }
    }

    /// Place `entry` in the destination tree.
    ///
    /// Returns `Interrupted` without touching anything once shutdown was requested.
    pub fn copy_entry(&self, entry: &FileEntry) -> Result<CopyOutcome, SortError> {
        if shutdown::is_requested() {
            return Err(SortError::Interrupted);
        }
        self.layout.ensure_extension_dir(&entry.extension)?;

        let candidate = self.layout.resolve_path(&entry.extension, &entry.name);
        let slot = self
            .layout
            .with_slot(&candidate, || fill_or_compare(&entry.path, &candidate))?;

        match slot {
            Slot::Filled(dest) => {
                trace!(src = %entry.path.display(), dest = %dest.display(), "copied");
                Ok(CopyOutcome::Copied { dest })
            }
            Slot::Occupied { source, existing } if source == existing => {
                debug!(
                    src = %entry.path.display(),
                    existing = %candidate.display(),
                    fingerprint = %source,
                    "duplicate content; not copied"
                );
                self.index.record_duplicate(&source, entry.path.clone());
                Ok(CopyOutcome::Duplicate {
                    fingerprint: source,
                    existing: candidate,
                })
            }
            Slot::Occupied { source, .. } => self.place_renamed(entry, source),
        }
    }

    fn place_renamed(
        &self,
        entry: &FileEntry,
        fingerprint: ContentFingerprint,
    ) -> Result<CopyOutcome, SortError> {
        let renamed = self
            .layout
            .resolve_path(&entry.extension, &collision_name(&fingerprint, &entry.name));

        self.layout.with_slot(&renamed, || -> Result<CopyOutcome, SortError> {
            if slot_taken(&renamed)? {
                // Same fingerprint prefix; only identical content belongs here.
                let existing =
                    fingerprint_file(&renamed).map_err(SortError::io("fingerprint", &renamed))?;
                if existing != fingerprint {
                    return Err(SortError::Unclassified {
                        path: renamed.clone(),
                        op: "place renamed copy",
                        source: io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            "occupied by different content",
                        ),
                    });
                }
                debug!(
                    src = %entry.path.display(),
                    existing = %renamed.display(),
                    fingerprint = %fingerprint,
                    "duplicate of a renamed copy; not copied"
                );
                self.index.record_duplicate(&fingerprint, entry.path.clone());
                return Ok(CopyOutcome::Duplicate {
                    fingerprint,
                    existing: renamed.clone(),
                });
            }

            publish_copy(&entry.path, &renamed).map_err(SortError::io("copy", &entry.path))?;
            debug!(
                src = %entry.path.display(),
                dest = %renamed.display(),
                "name collision; copied under fingerprint-prefixed name"
            );
            self.index
                .record_name_collision(entry.name.clone(), entry.path.clone());
            Ok(CopyOutcome::Renamed {
                dest: renamed.clone(),
                fingerprint,
            })
        })
    }
}

/// Copy into a free `candidate`, or fingerprint both sides when it is taken.
fn fill_or_compare(src: &Path, candidate: &Path) -> Result<Slot, SortError> {
    if !slot_taken(candidate)? {
        match publish_copy(src, candidate) {
            Ok(_) => return Ok(Slot::Filled(candidate.to_path_buf())),
            // Filled by someone outside this run since the check.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(SortError::from_io("copy", src, e)),
        }
    }
    let source = fingerprint_file(src).map_err(SortError::io("fingerprint", src))?;
    let existing = fingerprint_file(candidate).map_err(SortError::io("fingerprint", candidate))?;
    Ok(Slot::Occupied { source, existing })
}

fn slot_taken(path: &Path) -> Result<bool, SortError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SortError::from_io("stat", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    struct Fixture {
        _td: TempDir,
        src: PathBuf,
        layout: DestinationLayout,
        index: DuplicateIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let td = tempfile::tempdir().unwrap();
            let src = td.path().join("src");
            fs::create_dir_all(&src).unwrap();
            let layout = DestinationLayout::new(td.path().join("dest"));
            Self {
                _td: td,
                src,
                layout,
                index: DuplicateIndex::default(),
            }
        }

        fn file(&self, rel: &str, body: &str) -> FileEntry {
            let path = self.src.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, body).unwrap();
            let name = path.file_name().unwrap().to_os_string();
            FileEntry::new(path, name)
        }

        fn engine(&self) -> CopyEngine<'_> {
            CopyEngine::new(&self.layout, &self.index)
        }
    }

    #[test]
    fn free_slot_is_copied() {
        let fx = Fixture::new();
        let e = fx.file("a/notes.txt", "hello");
        let out = fx.engine().copy_entry(&e).unwrap();
        let dest = fx.layout.root().join("txt/notes.txt");
        assert_eq!(out, CopyOutcome::Copied { dest: dest.clone() });
        assert_eq!(fs::read_to_string(dest).unwrap(), "hello");
    }

    #[test]
    fn identical_content_is_a_duplicate() {
        let fx = Fixture::new();
        let a = fx.file("a/x.txt", "same");
        let b = fx.file("b/x.txt", "same");
        let eng = fx.engine();
        eng.copy_entry(&a).unwrap();
        let out = eng.copy_entry(&b).unwrap();
        assert!(matches!(out, CopyOutcome::Duplicate { .. }));

        let dups = fx.index.duplicates();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups.values().next().unwrap(), &vec![b.path.clone()]);
        assert_eq!(fs::read_dir(fx.layout.root().join("txt")).unwrap().count(), 1);
    }

    #[test]
    fn different_content_is_renamed() {
        let fx = Fixture::new();
        let a = fx.file("a/x.txt", "first");
        let b = fx.file("b/x.txt", "second");
        let eng = fx.engine();
        eng.copy_entry(&a).unwrap();
        let out = eng.copy_entry(&b).unwrap();

        let fp = fingerprint_file(&b.path).unwrap();
        let expected = fx.layout.root().join(format!("txt/{}__x.txt", fp.to_hex()));
        assert_eq!(
            out,
            CopyOutcome::Renamed {
                dest: expected.clone(),
                fingerprint: fp
            }
        );
        assert_eq!(fs::read_to_string(&expected).unwrap(), "second");
        assert_eq!(
            fs::read_to_string(fx.layout.root().join("txt/x.txt")).unwrap(),
            "first"
        );
        assert_eq!(
            fx.index.duplicated_names()[&OsString::from("x.txt")],
            vec![b.path.clone()]
        );
    }

    #[test]
    fn renamed_slot_taken_by_same_content_is_a_duplicate() {
        let fx = Fixture::new();
        let a = fx.file("a/x.txt", "first");
        let b = fx.file("b/x.txt", "second");
        let c = fx.file("c/x.txt", "second");
        let eng = fx.engine();
        eng.copy_entry(&a).unwrap();
        assert!(matches!(eng.copy_entry(&b).unwrap(), CopyOutcome::Renamed { .. }));
        assert!(matches!(eng.copy_entry(&c).unwrap(), CopyOutcome::Duplicate { .. }));
        assert_eq!(fs::read_dir(fx.layout.root().join("txt")).unwrap().count(), 2);
    }

    #[test]
    fn missing_source_is_contained() {
        let fx = Fixture::new();
        let ghost = FileEntry::new(fx.src.join("gone.bin"), OsString::from("gone.bin"));
        let err = fx.engine().copy_entry(&ghost).unwrap_err();
        assert!(matches!(err, SortError::Transient { .. }));
        assert!(!fx.layout.root().join("bin/gone.bin").exists());
    }

    #[test]
    fn concurrent_same_name_never_overwrites() {
        let fx = Fixture::new();
        // 16 files named the same: 4 distinct contents, 4 copies each.
        let entries: Vec<_> = (0..16)
            .map(|i| fx.file(&format!("d{i}/same.dat"), &format!("content-{}", i % 4)))
            .collect();
        let eng = fx.engine();
        let outcomes: Vec<_> = entries
            .par_iter()
            .map(|e| eng.copy_entry(e).unwrap())
            .collect();

        let copied = outcomes
            .iter()
            .filter(|o| !matches!(o, CopyOutcome::Duplicate { .. }))
            .count();
        assert_eq!(copied, 4);
        let on_disk = fs::read_dir(fx.layout.root().join("dat")).unwrap().count();
        assert_eq!(on_disk, 4);
    }
}
