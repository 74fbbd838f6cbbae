//! Core library for `sortcopy`.
//!
//! Copies a directory tree into `<destination>/<extension>/<name>`, detecting
//! content duplicates and name collisions so nothing is overwritten.
//! The binary is a thin wrapper: it merges config and CLI flags, sets up
//! logging and signals, then calls [`engine::run`].

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod progress;
pub mod shutdown;

pub use config::{default_config_path, path_has_symlink_ancestor, Config, LogLevel, Strategy};
pub use engine::{run, sort_tree, CopyOutcome, FileEntry, RunStats};
pub use errors::SortError;
pub use progress::{BarProgress, NoProgress, ProgressSink};
