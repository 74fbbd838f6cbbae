//! The scan-and-copy engine.
//!
//! [`run`] validates a [`Config`], takes the destination lock, builds a
//! bounded rayon pool and drives the [`Orchestrator`] under the configured
//! strategy. Contained failures are logged and counted; only configuration
//! problems make `run` itself fail.

mod copier;
mod index;
mod layout;
mod orchestrator;
mod scanner;

pub use copier::{CopyEngine, CopyOutcome};
pub use index::{DuplicateIndex, ExtensionSet, RunState, RunStats};
pub use layout::{DestinationLayout, NO_EXTENSION};
pub use orchestrator::{LABEL_COPY, LABEL_IMMEDIATE, LABEL_MKDIR, LABEL_SCAN};
pub use scanner::{extension_of, FileEntry};

use std::error::Error as _;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{validate_and_normalize, Config, Strategy};
use crate::errors::SortError;
use crate::fs_ops::{io_hint, try_acquire_dir_lock};
use crate::progress::{NoProgress, ProgressSink};
use crate::shutdown;

use orchestrator::Orchestrator;

/// Sort `cfg.source_root` into `cfg.destination_root`.
///
/// Returns configuration errors before any file is touched. Once work has
/// started, the result is always `Ok`; failures are reflected in the stats,
/// and `interrupted` is set if shutdown was requested during the run.
pub fn run(cfg: &Config, progress: &dyn ProgressSink) -> Result<RunStats, SortError> {
    let mut cfg = cfg.clone();
    validate_and_normalize(&mut cfg)?;

    let dest = cfg.destination_root.clone();
    let _run_lock = match try_acquire_dir_lock(&dest) {
        Ok(Some(lock)) => lock,
        Ok(None) => return Err(SortError::DestinationLocked(dest)),
        Err(e) => {
            return Err(SortError::Setup {
                path: dest,
                context: format!("acquire run lock: {e}"),
            });
        }
    };

    let jobs = cfg.effective_jobs();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("sortcopy-{i}"))
        .build()
        .map_err(|e| SortError::Setup {
            path: cfg.destination_root.clone(),
            context: format!("build worker pool: {e}"),
        })?;

    info!(
        source = %cfg.source_root.display(),
        destination = %cfg.destination_root.display(),
        strategy = %cfg.strategy,
        jobs,
        "run started"
    );

    let started = Instant::now();
    let state = RunState::new();
    let layout = DestinationLayout::new(&cfg.destination_root);
    let orchestrator = Orchestrator {
        state: &state,
        layout: &layout,
        pool: &pool,
        progress,
        poll_interval: cfg.poll_interval,
        source_root: cfg.source_root.clone(),
    };
    orchestrator.run(cfg.strategy);

    let interrupted = shutdown::is_requested();
    let stats = state.finish(cfg.strategy, started.elapsed(), interrupted);
    info!(
        elapsed_ms = stats.elapsed.as_millis() as u64,
        folders = stats.folders_visited,
        discovered = stats.files_discovered,
        copied = stats.files_copied,
        renamed = stats.files_renamed,
        duplicates = stats.duplicate_files,
        failed = stats.files_failed,
        unprocessed = stats.files_unprocessed,
        interrupted,
        "run finished"
    );
    Ok(stats)
}

/// Run with default settings and no progress output.
pub fn sort_tree(
    source_root: &Path,
    destination_root: &Path,
    strategy: Strategy,
) -> Result<RunStats, SortError> {
    let mut cfg = Config::new(source_root, destination_root);
    cfg.strategy = strategy;
    run(&cfg, &NoProgress)
}

/// One warn line per contained failure, with its code, kind and a hint.
pub(crate) fn log_contained(err: &SortError) {
    let hint = match err {
        SortError::Access { .. } => io_hint(&io::Error::from(io::ErrorKind::PermissionDenied)),
        _ => err
            .source()
            .and_then(|s| s.downcast_ref::<io::Error>())
            .and_then(io_hint),
    };
    warn!(
        code = err.code(),
        kind = err.kind(),
        hint = hint.unwrap_or(""),
        "{err}"
    );
}
