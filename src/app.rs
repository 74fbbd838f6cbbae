//! Application orchestrator.
//! Loads/merges config, initializes logging, installs signal handlers and runs
//! the engine. Returns the process exit code.

use anyhow::{Context, Result};
use tracing::{debug, error};

use sortcopy::cli::Args;
use sortcopy::config::paths::CONFIG_ENV;
use sortcopy::config::{load_config_from_xml, default_config_path};
use sortcopy::output as out;
use sortcopy::{engine, shutdown, BarProgress, Config, LogLevel};

use crate::logging::init_tracing;

pub const EXIT_OK: u8 = 0;
pub const EXIT_CONFIG: u8 = 1;
pub const EXIT_PARTIAL: u8 = 2;
pub const EXIT_INTERRUPTED: u8 = 130;

/// Run the CLI application.
pub fn run(args: Args) -> Result<u8> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(EXIT_OK);
    }

    // defaults < XML < CLI
    let mut cfg = Config::default();
    if let Some(file_cfg) = load_config_from_xml().context("load config file")? {
        file_cfg.apply(&mut cfg);
    }
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // The engine drains in-flight copies after an interrupt; the file writer
    // must outlive them, so the guard is only released once run() returns.
    ctrlc::set_handler(on_interrupt).context("install signal handler")?;

    debug!(?args, "starting sortcopy");

    let hidden = args.no_progress
        || cfg.log_level == LogLevel::Quiet
        || !atty::is(atty::Stream::Stderr);
    let progress = BarProgress::new(hidden);

    let code = match engine::run(&cfg, &progress) {
        Ok(stats) => {
            if cfg.log_level != LogLevel::Quiet {
                out::print_report(&stats);
            }
            if stats.interrupted {
                EXIT_INTERRUPTED
            } else if stats.had_failures() {
                EXIT_PARTIAL
            } else {
                EXIT_OK
            }
        }
        Err(e) => {
            error!(code = e.code(), kind = e.kind(), "{e}");
            out::print_error(&e.to_string());
            EXIT_CONFIG
        }
    };

    // Flush the file appender before exit
    drop(guard_opt);
    Ok(code)
}

/// Signal handler body: stop taking new work and tell the user.
fn on_interrupt() {
    shutdown::request();
    out::print_warn("Received interrupt; finishing in-flight copies...");
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default sortcopy config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info(
                    "No config file exists there; built-in defaults and CLI flags are used. Example:\n\n<config>\n  <source>/path/to/unsorted</source>\n  <destination>/path/to/sorted</destination>\n  <strategy>staged</strategy>\n  <jobs>8</jobs>\n  <log_level>normal</log_level>\n</config>\n",
                );
            }
        }
        None => out::print_error("Could not determine a default config path."),
    }
}
