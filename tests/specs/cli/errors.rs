//! CLI error specs
//!
//! Verify error reporting for invocations that never reach the daemon,
//! or that hand the daemon a document it cannot accept.

use crate::prelude::*;

#[test]
fn an_unknown_subcommand_is_rejected() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn a_malformed_partition_reference_is_rejected() {
    let temp = Project::empty();

    // Value parsing fails before any daemon is involved
    temp.sluice()
        .args(&["read", "--partition", "order.created"])
        .fails()
        .stderr_has("expected <type>:<id>");
}

#[test]
fn an_unknown_partition_type_is_rejected() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["partitions", "sideways"])
        .fails()
        .stderr_has("unknown partition type");
}

#[test]
fn emit_rejects_a_document_that_is_not_json() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);

    temp.sluice()
        .args(&["emit", "-"])
        .stdin("{not json")
        .fails()
        .stderr_has("parsing event document");
}

#[test]
fn emit_rejects_a_document_that_is_not_a_cloudevent() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);

    temp.sluice()
        .args(&["emit", "-"])
        .stdin(r#"{"id": "orders-1"}"#)
        .fails()
        .stderr_has("not a CloudEvent document");
}

#[test]
fn emit_reports_an_unreadable_file() {
    let temp = Project::empty();
    temp.file("sluice.toml", MEMORY_CONFIG);

    temp.sluice()
        .args(&["emit", "no-such-event.json"])
        .fails()
        .stderr_has("no-such-event.json");
}
