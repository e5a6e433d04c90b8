//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status behavior and the state files one
//! start leaves on disk.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_running_after_start() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running");
}

#[test]
fn daemon_status_shows_version() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Version:");
}

#[test]
fn daemon_status_shows_the_protocol() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Protocol:");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
}

#[test]
fn daemon_status_reports_not_running_after_stop() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();
    temp.sluice().args(&["daemon", "stop"]).passes();

    temp.sluice()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_stop_reports_not_running_without_a_daemon() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_creates_the_version_file() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    let has_version = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.daemon_state_dir()
            .map(|dir| dir.join("sluiced.version").exists())
            .unwrap_or(false)
    });

    assert!(has_version, "sluiced.version file should exist");
}

#[test]
fn daemon_start_creates_the_lock_file() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    let has_lock = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.daemon_state_dir()
            .map(|dir| dir.join("sluiced.lock").exists())
            .unwrap_or(false)
    });

    assert!(has_lock, "sluiced.lock file should exist");
}

#[test]
fn daemon_start_creates_the_socket() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    // Socket lives in SLUICE_SOCKET_DIR, which specs point at the state home
    let has_socket = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_dir(temp.state_path())
            .ok()
            .map(|entries| {
                entries.filter_map(|e| e.ok()).any(|entry| {
                    entry
                        .path()
                        .extension()
                        .map(|ext| ext == "sock")
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    });

    assert!(has_socket, "daemon socket file should exist");
}

#[test]
fn daemon_start_shows_a_config_error() {
    let temp = Project::empty();
    temp.file("sluice.toml", "[store]\nbackend = \"cloud\"\n");

    temp.sluice()
        .args(&["daemon", "start"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn daemon_start_error_log_shows_in_cli() {
    // Force the socket path past SUN_LEN so the bind fails, then check
    // the bind error reaches the CLI instead of a generic timeout
    let temp = Project::empty();

    let long_suffix =
        "this_is_a_very_long_path_segment_to_ensure_socket_path_exceeds_sun_len_limits";
    let long_socket_dir = temp.state_path().join(long_suffix).join(long_suffix);
    std::fs::create_dir_all(&long_socket_dir).unwrap();

    temp.sluice()
        .env("SLUICE_SOCKET_DIR", &long_socket_dir)
        .args(&["daemon", "start"])
        .fails()
        .stderr_has("path must be shorter than SUN_LEN")
        .stderr_lacks("Connection timeout");
}

#[test]
fn a_stale_version_file_restarts_the_daemon() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    let state_dir = temp.daemon_state_dir().expect("daemon state dir");
    std::fs::write(state_dir.join("sluiced.version"), "0.0.0").unwrap();

    // The next command notices the stale version and cycles the daemon
    temp.sluice().args(&["read"]).passes().stdout_has("No events");

    let version = std::fs::read_to_string(state_dir.join("sluiced.version")).unwrap();
    assert_eq!(version.trim(), env!("CARGO_PKG_VERSION"));
}
