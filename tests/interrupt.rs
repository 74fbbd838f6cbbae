use serial_test::serial;
use sortcopy::engine::LABEL_SCAN;
use sortcopy::{run, shutdown, sort_tree, Config, ProgressSink, Strategy};
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

/// Requests shutdown as soon as the scan batch ends.
#[derive(Default)]
struct StopAfterScan {
    label: Mutex<String>,
}

impl ProgressSink for StopAfterScan {
    fn on_batch_start(&self, _total: usize, label: &str) {
        *self.label.lock().unwrap() = label.to_string();
    }
    fn on_batch_total(&self, _total: usize) {}
    fn on_task_done(&self) {}
    fn on_batch_end(&self) {
        if *self.label.lock().unwrap() == LABEL_SCAN {
            shutdown::request();
        }
    }
}

fn populate(src: &std::path::Path, n: usize) {
    for i in 0..n {
        let d = src.join(format!("d{}", i % 4));
        fs::create_dir_all(&d).unwrap();
        fs::write(d.join(format!("f{i}.txt")), i.to_string()).unwrap();
    }
}

#[test]
#[serial]
fn interrupt_between_phases_leaves_files_unprocessed() {
    shutdown::reset();
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    populate(&src, 20);
    let dest = td.path().join("dest");

    let cfg = Config::new(&src, &dest);
    let stats = run(&cfg, &StopAfterScan::default()).unwrap();
    shutdown::reset();

    assert!(stats.interrupted);
    assert_eq!(stats.files_discovered, 20);
    assert_eq!(stats.files_unprocessed, 20);
    assert_eq!(stats.files_copied, 0);
    assert_eq!(
        stats.files_discovered,
        stats.files_copied + stats.duplicate_files + stats.files_failed + stats.files_unprocessed
    );
    // Lock released, nothing half-written.
    assert!(!dest.join(".sortcopy.lock").exists());
    assert!(!dest.join("txt").exists());
}

#[test]
#[serial]
fn interrupt_before_start_returns_empty_report() {
    shutdown::reset();
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    populate(&src, 5);

    shutdown::request();
    let stats = sort_tree(&src, &td.path().join("dest"), Strategy::Immediate).unwrap();
    shutdown::reset();

    assert!(stats.interrupted);
    assert_eq!(stats.files_discovered, 0);
    assert_eq!(stats.folders_visited, 0);
}

#[test]
#[serial]
fn flag_is_clear_after_reset() {
    shutdown::request();
    assert!(shutdown::is_requested());
    shutdown::reset();
    assert!(!shutdown::is_requested());
}
