//! Idempotence, convergence and tie-break properties of a reconcile pass

use super::test_utils::{at, dir_snapshot, file_snapshot, write_at, Fixture};
use foldersync::compare::CompareMode;
use foldersync::reconcile::{ReconcileOptions, Reconciler};
use foldersync::MemorySink;
use std::fs;
use std::sync::Arc;

fn populate(fx: &Fixture) {
    write_at(&fx.source.join("root.txt"), "root", at(1_000));
    write_at(&fx.source.join("a/one.txt"), "one", at(1_000));
    write_at(&fx.source.join("a/b/two.txt"), "two", at(2_000));
    write_at(&fx.source.join("c/three.bin"), "\u{0}\u{1}\u{2}", at(3_000));
    write_at(&fx.replica.join("a/stale.txt"), "stale", at(500));
    write_at(&fx.replica.join("root.txt"), "old root", at(10));
    fs::create_dir_all(fx.replica.join("z/y/x")).unwrap();
}

#[test]
fn test_single_pass_converges() {
    let fx = Fixture::new();
    populate(&fx);

    let sink = Arc::new(MemorySink::new());
    Reconciler::local(sink, ReconcileOptions::default())
        .reconcile(&fx.source, &fx.replica)
        .unwrap();

    assert_eq!(file_snapshot(&fx.replica), file_snapshot(&fx.source));
}

#[test]
fn test_second_pass_is_noop() {
    let fx = Fixture::new();
    populate(&fx);

    let sink = Arc::new(MemorySink::new());
    let reconciler = Reconciler::local(sink.clone(), ReconcileOptions::default());
    reconciler.reconcile(&fx.source, &fx.replica).unwrap();
    let files_after_first = file_snapshot(&fx.replica);
    let dirs_after_first = dir_snapshot(&fx.replica);
    sink.clear();

    let report = reconciler.reconcile(&fx.source, &fx.replica).unwrap();

    assert!(report.is_noop(), "second pass changed something: {:?}", report);
    assert!(sink.mutations().is_empty());
    assert_eq!(file_snapshot(&fx.replica), files_after_first);
    assert_eq!(dir_snapshot(&fx.replica), dirs_after_first);
}

#[test]
fn test_second_pass_is_noop_in_checksum_mode() {
    let fx = Fixture::new();
    populate(&fx);

    let sink = Arc::new(MemorySink::new());
    let options = ReconcileOptions {
        compare: CompareMode::Checksum,
        ..Default::default()
    };
    let reconciler = Reconciler::local(sink, options);
    reconciler.reconcile(&fx.source, &fx.replica).unwrap();

    assert_eq!(file_snapshot(&fx.replica), file_snapshot(&fx.source));
    assert!(reconciler
        .reconcile(&fx.source, &fx.replica)
        .unwrap()
        .is_noop());
}

#[test]
fn test_deleted_source_file_is_pruned_next_pass() {
    let fx = Fixture::new();
    populate(&fx);

    let sink = Arc::new(MemorySink::new());
    let reconciler = Reconciler::local(sink, ReconcileOptions::default());
    reconciler.reconcile(&fx.source, &fx.replica).unwrap();

    fs::remove_file(fx.source.join("a/b/two.txt")).unwrap();
    let report = reconciler.reconcile(&fx.source, &fx.replica).unwrap();

    assert!(!fx.replica.join("a/b/two.txt").exists());
    // a/b held only two.txt, so it goes as well
    assert!(!fx.replica.join("a/b").exists());
    assert_eq!(report.files_deleted, 1);
    assert_eq!(report.dirs_deleted, 1);
}

#[test]
fn test_timestamp_tie_does_not_recopy() {
    let fx = Fixture::new();
    write_at(&fx.source.join("tie.txt"), "from source", at(5_000));
    write_at(&fx.replica.join("tie.txt"), "replica marker", at(5_000));

    let sink = Arc::new(MemorySink::new());
    let report = Reconciler::local(sink.clone(), ReconcileOptions::default())
        .reconcile(&fx.source, &fx.replica)
        .unwrap();

    assert_eq!(report.files_copied, 0);
    assert!(sink.mutations().is_empty());
    assert_eq!(
        fs::read_to_string(fx.replica.join("tie.txt")).unwrap(),
        "replica marker"
    );
}
