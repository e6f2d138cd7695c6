//! End-to-end reconcile passes over small, hand-built trees

use super::test_utils::{at, dir_snapshot, file_snapshot, mtime, write_at, Fixture};
use foldersync::reconcile::{ReconcileOptions, Reconciler};
use foldersync::{MemorySink, SyncEvent};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn local(sink: &Arc<MemorySink>) -> Reconciler {
    Reconciler::local(sink.clone(), ReconcileOptions::default())
}

/// Stale file updated, new file copied, orphan file and empty directory removed
#[test]
fn test_mixed_update_scenario() {
    let fx = Fixture::new();
    write_at(&fx.source.join("a.txt"), "a v2", at(100));
    write_at(&fx.source.join("sub/b.txt"), "b", at(100));
    write_at(&fx.replica.join("a.txt"), "a v1", at(50));
    write_at(&fx.replica.join("sub/c.txt"), "c", at(100));
    fs::create_dir(fx.replica.join("empty")).unwrap();

    let sink = Arc::new(MemorySink::new());
    let report = local(&sink).reconcile(&fx.source, &fx.replica).unwrap();

    assert_eq!(fs::read_to_string(fx.replica.join("a.txt")).unwrap(), "a v2");
    assert_eq!(mtime(&fx.replica.join("a.txt")), at(100));
    assert_eq!(fs::read_to_string(fx.replica.join("sub/b.txt")).unwrap(), "b");
    assert!(!fx.replica.join("sub/c.txt").exists());
    assert!(!fx.replica.join("empty").exists());
    assert_eq!(dir_snapshot(&fx.replica), vec![PathBuf::from("sub")]);

    assert_eq!(report.files_copied, 2);
    assert_eq!(report.files_deleted, 1);
    assert_eq!(report.dirs_deleted, 1);
    assert_eq!(report.dirs_created, 0);

    let events = sink.mutations();
    assert!(events.contains(&SyncEvent::FileCopied {
        from: fx.source.join("a.txt"),
        to: fx.replica.join("a.txt"),
    }));
    assert!(events.contains(&SyncEvent::FileDeleted(fx.replica.join("sub/c.txt"))));
    assert!(events.contains(&SyncEvent::DirectoryDeleted(fx.replica.join("empty"))));
}

/// An empty source empties the replica completely, root excepted
#[test]
fn test_empty_source_empties_replica() {
    let fx = Fixture::new();
    write_at(&fx.replica.join("x.txt"), "x", at(100));
    write_at(&fx.replica.join("dir/y.txt"), "y", at(100));

    let sink = Arc::new(MemorySink::new());
    let report = local(&sink).reconcile(&fx.source, &fx.replica).unwrap();

    assert!(file_snapshot(&fx.replica).is_empty());
    assert!(dir_snapshot(&fx.replica).is_empty());
    assert!(fx.replica.is_dir());
    assert_eq!(report.files_deleted, 2);
    assert_eq!(report.dirs_deleted, 1);
}

/// Source-side empty directories are not mirrored; only files carry structure
#[test]
fn test_empty_source_directory_not_created() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.source.join("hollow/inner")).unwrap();

    let sink = Arc::new(MemorySink::new());
    let report = local(&sink).reconcile(&fx.source, &fx.replica).unwrap();

    assert!(report.is_noop());
    assert!(dir_snapshot(&fx.replica).is_empty());
}

/// Directory creation is logged once per directory actually created
#[test]
fn test_directory_creation_logged_once() {
    let fx = Fixture::new();
    write_at(&fx.source.join("d/one.txt"), "1", at(100));
    write_at(&fx.source.join("d/two.txt"), "2", at(100));

    let sink = Arc::new(MemorySink::new());
    local(&sink).reconcile(&fx.source, &fx.replica).unwrap();

    let created: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::DirectoryCreated(_)))
        .collect();
    assert_eq!(created, vec![SyncEvent::DirectoryCreated(fx.replica.join("d"))]);
}

/// The source tree is never modified by a pass
#[test]
fn test_source_untouched() {
    let fx = Fixture::new();
    write_at(&fx.source.join("keep/a.txt"), "a", at(100));
    fs::create_dir(fx.source.join("empty")).unwrap();
    write_at(&fx.replica.join("extra.txt"), "extra", at(300));

    let before_files = file_snapshot(&fx.source);
    let before_dirs = dir_snapshot(&fx.source);
    let before_mtime = mtime(&fx.source.join("keep/a.txt"));

    let sink = Arc::new(MemorySink::new());
    local(&sink).reconcile(&fx.source, &fx.replica).unwrap();

    assert_eq!(file_snapshot(&fx.source), before_files);
    assert_eq!(dir_snapshot(&fx.source), before_dirs);
    assert_eq!(mtime(&fx.source.join("keep/a.txt")), before_mtime);
}
