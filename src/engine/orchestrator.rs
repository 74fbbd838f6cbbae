//! Scheduling of scan and copy work under a [`Strategy`].
//!
//! Staged: scan everything, create every extension folder, then copy; each
//! phase waits for the previous one. Immediate: every discovered file spawns
//! its copy task inside the scan scope.

use std::path::PathBuf;
use std::time::Duration;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, warn};

use crate::config::Strategy;
use crate::errors::SortError;
use crate::progress::{watch, ProgressSink, TaskTracker};
use crate::shutdown;

use super::copier::CopyEngine;
use super::index::RunState;
use super::layout::DestinationLayout;
use super::log_contained;
use super::scanner::{Collect, FileEntry, FileSink, Scanner};

pub const LABEL_SCAN: &str = "scanning folders";
pub const LABEL_MKDIR: &str = "creating extension folders";
pub const LABEL_COPY: &str = "copying files";
pub const LABEL_IMMEDIATE: &str = "processing folders";

pub struct Orchestrator<'a> {
    pub(super) state: &'a RunState,
    pub(super) layout: &'a DestinationLayout,
    pub(super) pool: &'a ThreadPool,
    pub(super) progress: &'a dyn ProgressSink,
    pub(super) poll_interval: Duration,
    pub(super) source_root: PathBuf,
}

impl Orchestrator<'_> {
    pub fn run(&self, strategy: Strategy) {
        match strategy {
            Strategy::Staged => self.run_staged(),
            Strategy::Immediate => self.run_immediate(),
        }
    }

    fn engine(&self) -> CopyEngine<'_> {
        CopyEngine::new(self.layout, &self.state.index)
    }

    fn run_staged(&self) {
        let collect = Collect::default();
        let scan_tasks = TaskTracker::new();
        let scanner = Scanner::new(self.state, &scan_tasks, &collect);
        watch(&scan_tasks, self.progress, LABEL_SCAN, self.poll_interval, || {
            self.pool
                .scope(|s| scanner.start(s, self.source_root.clone()))
        });
        let entries = collect.into_entries();
        debug!(files = entries.len(), "scan phase finished");

        if shutdown::is_requested() {
            for _ in &entries {
                self.state.file_unprocessed();
            }
            warn!(unprocessed = entries.len(), "shutdown requested; copy phase skipped");
            return;
        }

        let extensions: Vec<String> = self.state.extensions.snapshot().into_iter().collect();
        let mkdir_tasks = TaskTracker::new();
        mkdir_tasks.add(extensions.len());
        watch(&mkdir_tasks, self.progress, LABEL_MKDIR, self.poll_interval, || {
            self.pool.install(|| {
                extensions.par_iter().for_each(|ext| {
                    // A failure here resurfaces, per file, in the copy phase.
                    if let Err(e) = self.layout.ensure_extension_dir(ext) {
                        log_contained(&e);
                    }
                    mkdir_tasks.complete();
                })
            })
        });

        let copy_tasks = TaskTracker::new();
        copy_tasks.add(entries.len());
        let engine = self.engine();
        watch(&copy_tasks, self.progress, LABEL_COPY, self.poll_interval, || {
            self.pool.install(|| {
                entries.par_iter().for_each(|entry| {
                    self.process(&engine, entry);
                    copy_tasks.complete();
                })
            })
        });
    }

    fn run_immediate(&self) {
        let tasks = TaskTracker::new();
        let sink = CopyNow {
            orchestrator: self,
            engine: self.engine(),
            tasks: &tasks,
        };
        let scanner = Scanner::new(self.state, &tasks, &sink);
        watch(&tasks, self.progress, LABEL_IMMEDIATE, self.poll_interval, || {
            self.pool
                .scope(|s| scanner.start(s, self.source_root.clone()))
        });
    }

    fn process(&self, engine: &CopyEngine<'_>, entry: &FileEntry) {
        let result = engine.copy_entry(entry);
        self.state.record(&result);
        // Outcomes are logged by the copier; only failures surface here.
        match &result {
            Ok(_) | Err(SortError::Interrupted) => {}
            Err(e) => log_contained(e),
        }
    }
}

/// Spawns the copy of each discovered file straight into the scan scope.
struct CopyNow<'a> {
    orchestrator: &'a Orchestrator<'a>,
    engine: CopyEngine<'a>,
    tasks: &'a TaskTracker,
}

impl FileSink for CopyNow<'_> {
    fn accept<'s>(&'s self, scope: &rayon::Scope<'s>, entry: FileEntry) {
        self.tasks.add(1);
        scope.spawn(move |_| {
            self.orchestrator.process(&self.engine, &entry);
            self.tasks.complete();
        });
    }
}
