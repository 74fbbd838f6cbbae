//! Progress reporting.
//!
//! The engine never renders anything itself. It counts tasks in a [`TaskTracker`]
//! and a monitor thread polls those counters at a fixed interval, forwarding
//! changes to a [`ProgressSink`]. [`BarProgress`] renders them with indicatif.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receiver of batch progress events.
pub trait ProgressSink: Send + Sync {
    /// A batch of `total` tasks begins.
    ///
    /// Batches whose tasks are discovered while they run (the scan, and the
    /// whole of an immediate run) start at 0 and grow through `on_batch_total`.
    fn on_batch_start(&self, total: usize, label: &str);

    /// The batch now holds `total` tasks. Always announced before the
    /// completions it covers.
    fn on_batch_total(&self, total: usize);

    /// Exactly one task of the current batch completed.
    fn on_task_done(&self);

    /// The current batch finished.
    fn on_batch_end(&self);
}

/// Sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_batch_start(&self, _total: usize, _label: &str) {}
    fn on_batch_total(&self, _total: usize) {}
    fn on_task_done(&self) {}
    fn on_batch_end(&self) {}
}

/// Outstanding/completed counters for one batch.
#[derive(Debug, Default)]
pub struct TaskTracker {
    total: AtomicUsize,
    done: AtomicUsize,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `n` more tasks.
    pub fn add(&self, n: usize) {
        self.total.fetch_add(n, Ordering::AcqRel);
    }

    /// Mark one task complete.
    pub fn complete(&self) {
        self.done.fetch_add(1, Ordering::AcqRel);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Acquire)
    }

    pub fn outstanding(&self) -> usize {
        self.total().saturating_sub(self.done())
    }
}

/// Run `work` while a monitor thread reports `tracker` to `sink` every `interval`.
///
/// `on_task_done` is emitted once per completed task: each tick forwards the
/// difference between the completed counter and what was already reported, and
/// a final flush after `work` returns covers the remainder.
pub fn watch<R>(
    tracker: &TaskTracker,
    sink: &dyn ProgressSink,
    label: &str,
    interval: Duration,
    work: impl FnOnce() -> R,
) -> R {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    thread::scope(|s| {
        s.spawn(move || {
            let mut reported_total = tracker.total();
            let mut reported_done = 0usize;
            sink.on_batch_start(reported_total, label);

            let mut flush = |reported_total: &mut usize| {
                // Tasks are added before they complete, so reading `done`
                // first keeps every reported completion inside the total.
                let done = tracker.done();
                let total = tracker.total();
                if total != *reported_total {
                    *reported_total = total;
                    sink.on_batch_total(total);
                }
                while reported_done < done {
                    sink.on_task_done();
                    reported_done += 1;
                }
            };

            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => flush(&mut reported_total),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            flush(&mut reported_total);
            sink.on_batch_end();
        });

        let out = work();
        let _ = stop_tx.send(());
        out
    })
}

/// Terminal progress bars rendered with indicatif; one bar per batch.
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl BarProgress {
    /// `hidden` suppresses all drawing (quiet mode, non-TTY output).
    pub fn new(hidden: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            hidden,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg:<28} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

impl ProgressSink for BarProgress {
    fn on_batch_start(&self, total: usize, label: &str) {
        let bar = ProgressBar::new(total as u64);
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(Self::style());
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        let mut slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(prev) = slot.replace(bar) {
            prev.finish();
        }
    }

    fn on_batch_total(&self, total: usize) {
        self.with_bar(|b| b.set_length(total as u64));
    }

    fn on_task_done(&self) {
        self.with_bar(|b| b.inc(1));
    }

    fn on_batch_end(&self) {
        let mut slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = slot.take() {
            bar.finish();
        }
    }
}
