//! User-facing console output.
//! Colored prefixes when stdout is a TTY, plain text otherwise.

use owo_colors::OwoColorize;

use crate::engine::RunStats;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain line (no prefix).
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// Lines of the end-of-run report, one `label: value` per line.
pub fn report_lines(stats: &RunStats) -> Vec<String> {
    let mut lines = vec![
        format!("elapsed: {:.3}s", stats.elapsed.as_secs_f64()),
        format!("strategy: {}", stats.strategy),
        format!("extensions: {}", stats.extension_count()),
        format!("duplicate names: {}", stats.duplicate_name_groups()),
        format!("duplicate contents: {}", stats.duplicate_fingerprint_groups()),
        format!("folders: {}", stats.folders_visited),
        format!("files found: {}", stats.files_discovered),
        format!("files copied: {}", stats.files_copied),
        format!("  renamed: {}", stats.files_renamed),
        format!("duplicates skipped: {}", stats.duplicate_files),
        format!("files failed: {}", stats.files_failed),
    ];
    if stats.scan_failures > 0 {
        lines.push(format!("unreadable entries: {}", stats.scan_failures));
    }
    if stats.entries_skipped > 0 {
        lines.push(format!("skipped (not a regular file): {}", stats.entries_skipped));
    }
    if stats.interrupted {
        lines.push(format!("unprocessed (interrupted): {}", stats.files_unprocessed));
    }
    lines
}

/// Print the end-of-run report.
pub fn print_report(stats: &RunStats) {
    for line in report_lines(stats) {
        print_user(&line);
    }
    if stats.interrupted {
        print_warn("Run interrupted; the report above is partial.");
    } else if stats.had_failures() {
        print_warn("Some files or folders could not be processed; see the log for details.");
    } else {
        print_success("All files sorted.");
    }
}
