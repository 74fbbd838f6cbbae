//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - Strategy selects how scanning and copying are scheduled.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;

use super::{DESTINATION_DEFAULT, POLL_INTERVAL_DEFAULT, SOURCE_DEFAULT};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Scheduling strategy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Scan the whole tree, create every extension folder, then copy.
    #[default]
    Staged,
    /// Copy each file as soon as the scanner finds it.
    Immediate,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staged" | "scan-then-copy" => Some(Strategy::Staged),
            "immediate" | "copy-during-scan" => Some(Strategy::Immediate),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Staged => "staged",
            Strategy::Immediate => "immediate",
        })
    }
}

/// Runtime configuration for a sorting run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tree to read from
    pub source_root: PathBuf,
    /// Root of the per-extension layout
    pub destination_root: PathBuf,
    /// Staged or immediate scheduling
    pub strategy: Strategy,
    /// Worker threads; None means available parallelism
    pub jobs: Option<usize>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// How often progress counters are polled
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(SOURCE_DEFAULT),
            destination_root: PathBuf::from(DESTINATION_DEFAULT),
            strategy: Strategy::default(),
            jobs: None,
            log_level: LogLevel::Normal,
            log_file: None,
            poll_interval: POLL_INTERVAL_DEFAULT,
        }
    }
}

impl Config {
    /// Construct a Config with explicit roots; other fields use defaults.
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            ..Default::default()
        }
    }

    /// Effective worker count (at least one).
    pub fn effective_jobs(&self) -> usize {
        self.jobs
            .filter(|n| *n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(4)
    }
}
