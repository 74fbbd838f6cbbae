use clap::Parser;
use sortcopy::cli::Args;
use sortcopy::{Config, LogLevel, Strategy};
use std::path::PathBuf;

#[test]
fn no_flags_leave_config_untouched() {
    let args = Args::try_parse_from(["sortcopy"]).unwrap();
    let mut cfg = Config::new("from-file-src", "from-file-dest");
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.source_root, PathBuf::from("from-file-src"));
    assert_eq!(cfg.destination_root, PathBuf::from("from-file-dest"));
    assert_eq!(cfg.strategy, Strategy::Staged);
    assert_eq!(cfg.jobs, None);
}

#[test]
fn flags_override_config() {
    let args = Args::try_parse_from([
        "sortcopy",
        "--src",
        "in",
        "--dest",
        "out",
        "--strategy",
        "immediate",
        "-j",
        "5",
        "--log-level",
        "info",
        "--log-file",
        "run.log",
    ])
    .unwrap();
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.source_root, PathBuf::from("in"));
    assert_eq!(cfg.destination_root, PathBuf::from("out"));
    assert_eq!(cfg.strategy, Strategy::Immediate);
    assert_eq!(cfg.jobs, Some(5));
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert_eq!(cfg.log_file, Some(PathBuf::from("run.log")));
}

#[test]
fn debug_beats_log_level() {
    let args = Args::try_parse_from(["sortcopy", "--log-level", "quiet", "--debug"]).unwrap();
    assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
}

#[test]
fn unknown_log_level_is_rejected() {
    let err = Args::try_parse_from(["sortcopy", "--log-level", "loud"]).unwrap_err();
    assert!(err.to_string().contains("loud"), "{err}");
}

#[test]
fn log_level_aliases_are_accepted() {
    let args = Args::try_parse_from(["sortcopy", "--log-level", "Verbose"]).unwrap();
    assert_eq!(args.effective_log_level(), Some(LogLevel::Info));
}

#[test]
fn bad_strategy_is_rejected() {
    assert!(Args::try_parse_from(["sortcopy", "--strategy", "later"]).is_err());
}

#[test]
fn switches_parse() {
    let args = Args::try_parse_from(["sortcopy", "--json", "--no-progress", "--print-config"]).unwrap();
    assert!(args.json && args.no_progress && args.print_config);
}
