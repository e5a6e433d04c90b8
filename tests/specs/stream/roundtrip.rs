//! Stream roundtrip specs
//!
//! Emit events through the gateway, then read the stream and its
//! partitions back through the CLI.

use crate::prelude::*;

/// A project with a running daemon and three ingested order events:
/// two `order.created`, one `order.shipped`.
fn seeded_project() -> Project {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    for (id, event_type, subject) in [
        ("orders-1", "order.created", "orders/1"),
        ("orders-2", "order.shipped", "orders/2"),
        ("orders-3", "order.created", "orders/3"),
    ] {
        temp.sluice()
            .args(&["emit", "-"])
            .stdin(&order_event(id, event_type, subject))
            .passes();
    }

    temp
}

#[test]
fn emit_reports_the_assigned_sequence() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice()
        .args(&["emit", "-"])
        .stdin(&order_event("orders-1", "order.created", "orders/1"))
        .passes()
        .stdout_has("Ingested: sequence 1");

    temp.sluice()
        .args(&["emit", "-"])
        .stdin(&order_event("orders-2", "order.created", "orders/2"))
        .passes()
        .stdout_has("Ingested: sequence 2");
}

#[test]
fn emit_fills_in_a_missing_id() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    let document = r#"{"specversion":"1.0","source":"https://orders.example/web","type":"order.created"}"#;

    temp.sluice()
        .args(&["emit", "-"])
        .stdin(document)
        .passes()
        .stdout_has("Ingested: sequence 1");
}

#[test]
fn a_duplicate_event_is_refused() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    let document = order_event("orders-1", "order.created", "orders/1");
    temp.sluice().args(&["emit", "-"]).stdin(&document).passes();

    temp.sluice()
        .args(&["emit", "-"])
        .stdin(&document)
        .fails()
        .stderr_has("duplicate event");
}

#[test]
fn an_invalid_event_is_refused() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    // Structurally a CloudEvent, but the empty source fails validation
    let document = r#"{"specversion":"1.0","id":"orders-1","source":"","type":"order.created"}"#;

    temp.sluice()
        .args(&["emit", "-"])
        .stdin(document)
        .fails()
        .stderr_has("Refused")
        .stderr_has("validation-failed");
}

#[test]
fn read_returns_the_whole_stream() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["read"])
        .passes()
        .stdout_has("orders/1")
        .stdout_has("orders/2")
        .stdout_has("orders/3");
}

#[test]
fn read_scopes_to_a_partition() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["read", "--partition", "by-type:order.created"])
        .passes()
        .stdout_has("orders/1")
        .stdout_has("orders/3")
        .stdout_lacks("orders/2");
}

#[test]
fn read_backwards_returns_the_newest_first() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["read", "--backwards", "--length", "1"])
        .passes()
        .stdout_has("orders/3")
        .stdout_lacks("orders/1");
}

#[test]
fn read_reports_an_empty_stream() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice().args(&["read"]).passes().stdout_has("No events");
}

#[test]
fn meta_reports_stream_totals() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["meta"])
        .passes()
        .stdout_has("First sequence: 1")
        .stdout_has("Last sequence: 3")
        .stdout_has("Length: 3");
}

#[test]
fn meta_reports_partition_totals() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["meta", "--partition", "by-type:order.created"])
        .passes()
        .stdout_has("Partition: by-type:order.created")
        .stdout_has("Length: 2");
}

#[test]
fn partitions_lists_populated_ids() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["partitions", "by-type"])
        .passes()
        .stdout_has("order.created")
        .stdout_has("order.shipped");
}

#[test]
fn subs_reports_none_without_documents() {
    let temp = seeded_project();

    temp.sluice()
        .args(&["subs"])
        .passes()
        .stdout_has("No subscriptions");
}

#[test]
fn json_read_is_parseable() {
    let temp = seeded_project();

    let assert = temp.sluice().args(&["read", "--json"]).passes();
    let records: serde_json::Value =
        serde_json::from_str(&assert.stdout_text()).expect("JSON output parses");

    let records = records.as_array().expect("a JSON array of records");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["sequence"], 1);
    assert_eq!(records[0]["event"]["id"], "orders-1");
    assert_eq!(records[2]["event"]["type"], "order.created");
}
