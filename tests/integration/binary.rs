//! Runs the compiled `foldersync` binary end to end

use super::test_utils::{at, file_snapshot, write_at, Fixture};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary with an isolated home so no user config is picked up
fn run(home: &Path, args: &[&OsStr]) -> Output {
    let bin = env!("CARGO_BIN_EXE_foldersync");
    Command::new(bin)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("FOLDERSYNC_LOG")
        .env_remove("FOLDERSYNC_LOG_OUTPUT")
        .env_remove("FOLDERSYNC_LOG_FORMAT")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_missing_arguments_print_usage() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &[OsStr::new("only-source")]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "stdout: {}", stdout);
}

#[test]
fn test_once_mirrors_and_logs_to_file() {
    let home = TempDir::new().unwrap();
    let fx = Fixture::new();
    write_at(&fx.source.join("a.txt"), "a", at(100));
    write_at(&fx.source.join("sub/b.txt"), "b", at(100));
    write_at(&fx.replica.join("orphan.txt"), "orphan", at(100));
    let log = home.path().join("logs").join("sync.log");

    let output = run(
        home.path(),
        &[
            fx.source.as_os_str(),
            fx.replica.as_os_str(),
            OsStr::new("--once"),
            OsStr::new("--log"),
            log.as_os_str(),
        ],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(file_snapshot(&fx.replica), file_snapshot(&fx.source));

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Copied/Updated"), "log: {}", contents);
    assert!(contents.contains("Directory created"), "log: {}", contents);
    assert!(contents.contains("Deleted"), "log: {}", contents);
}

#[test]
fn test_missing_source_logs_error_and_exits_cleanly() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("no-such-source");
    let replica = home.path().join("replica");
    let log = home.path().join("sync.log");

    let output = run(
        home.path(),
        &[
            source.as_os_str(),
            replica.as_os_str(),
            OsStr::new("--once"),
            OsStr::new("--log"),
            log.as_os_str(),
        ],
    );

    assert!(output.status.success());
    assert!(!replica.exists());
    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Source directory does not exist"));
    assert!(contents.contains("ERROR"));
}

#[test]
fn test_replica_created_when_missing() {
    let home = TempDir::new().unwrap();
    let fx = Fixture::new();
    write_at(&fx.source.join("a.txt"), "a", at(100));
    let replica = home.path().join("fresh").join("replica");
    let log = home.path().join("sync.log");

    let output = run(
        home.path(),
        &[
            fx.source.as_os_str(),
            replica.as_os_str(),
            OsStr::new("--once"),
            OsStr::new("--log"),
            log.as_os_str(),
        ],
    );

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(replica.join("a.txt")).unwrap(), "a");
    assert!(fs::read_to_string(&log)
        .unwrap()
        .contains("Replica directory created"));
}

#[test]
fn test_zero_interval_rejected() {
    let home = TempDir::new().unwrap();
    let fx = Fixture::new();

    let output = run(
        home.path(),
        &[
            fx.source.as_os_str(),
            fx.replica.as_os_str(),
            OsStr::new("--interval"),
            OsStr::new("0"),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Interval"));
}
