//! Watch specs
//!
//! Follow the stream over a long-lived connection: replay history from
//! a sequence, then keep receiving live appends.

use crate::prelude::*;
use std::io::BufRead;
use std::time::Duration;

#[test]
fn watch_replays_history_then_follows_live() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    for (id, subject) in [("orders-1", "orders/1"), ("orders-2", "orders/2")] {
        temp.sluice()
            .args(&["emit", "-"])
            .stdin(&order_event(id, "order.created", subject))
            .passes();
    }

    let mut child = temp
        .sluice_raw()
        .args(["watch", "--from", "1", "--json"])
        .stdout(std::process::Stdio::piped())
        .spawn()
        .expect("spawn watch");

    let stdout = child.stdout.take().expect("watch stdout");
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::BufReader::new(stdout).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let next_id = || {
        let line = rx
            .recv_timeout(Duration::from_millis(SPEC_WAIT_MAX_MS))
            .expect("a watched record");
        let record: serde_json::Value = serde_json::from_str(&line).expect("records are JSON");
        record["event"]["id"].as_str().unwrap_or_default().to_string()
    };

    // History first, in order
    assert_eq!(next_id(), "orders-1");
    assert_eq!(next_id(), "orders-2");

    // Then a live append arrives over the same connection
    temp.sluice()
        .args(&["emit", "-"])
        .stdin(&order_event("orders-3", "order.created", "orders/3"))
        .passes();
    assert_eq!(next_id(), "orders-3");

    let _ = child.kill();
    let _ = child.wait();
}
