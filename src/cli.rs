//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Flags left unset fall back to the config file, then to built-in defaults.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::{Config, LogLevel, Strategy};

/// Copy a directory tree into per-extension folders without losing or overwriting anything.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Sort a directory tree into per-extension folders")]
pub struct Args {
    /// Source tree to read (default: ./src).
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub src: Option<PathBuf>,

    /// Destination root for the per-extension layout (default: ./dest).
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub dest: Option<PathBuf>,

    /// Scheduling strategy.
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Worker threads (default: available parallelism).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(
        long,
        value_name = "LEVEL",
        value_parser = parse_log_level,
        help = "Set log level: quiet, normal, info, debug"
    )]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Do not draw progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Print where sortcopy looks for its config file, then exit.
    #[arg(long, help = "Print the config file location used by sortcopy and exit")]
    pub print_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.clone()
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.src {
            cfg.source_root = p.clone();
        }
        if let Some(p) = &self.dest {
            cfg.destination_root = p.clone();
        }
        if let Some(s) = self.strategy {
            cfg.strategy = s;
        }
        if let Some(j) = self.jobs.filter(|j| *j > 0) {
            cfg.jobs = Some(j);
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
    }
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

pub fn parse() -> Args {
    Args::parse()
}
