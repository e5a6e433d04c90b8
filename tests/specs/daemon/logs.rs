//! Daemon logs specs
//!
//! Verify daemon logs command behavior.

use crate::prelude::*;

#[test]
fn daemon_logs_shows_the_startup_marker() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["daemon", "logs", "--lines", "10"])
        .passes()
        .stdout_has("sluiced: starting");
}

#[test]
fn daemon_logs_shows_the_ready_line() {
    let temp = Project::empty();
    temp.sluice().args(&["daemon", "start"]).passes();

    // The log file is written through a non-blocking appender, so give
    // the ready line a moment to land before reading it back
    let ready = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.daemon_log()
            .map(|log| log.contains("Daemon ready"))
            .unwrap_or(false)
    });
    assert!(ready, "daemon log should record readiness");

    temp.sluice()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("Daemon ready");
}
