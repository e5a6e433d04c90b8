//! Subscription listing specs
//!
//! Load subscription documents from disk and report their phases
//! through the CLI.

use crate::prelude::*;

const SUBSCRIPTION_DOC: &str = "id = \"analytics\"\nsink = \"http://127.0.0.1:9/hook\"\n";

/// Config pointing the daemon at a subscriptions directory inside the
/// project root, with a fast reconcile poll so specs settle quickly.
fn subscriptions_config(temp: &Project) -> String {
    format!(
        "[store]\nbackend = \"memory\"\n\n\
         [broker]\npoll-interval = \"100ms\"\n\n\
         [subscriptions]\ndir = \"{}\"\n",
        temp.path().join("subscriptions").display()
    )
}

#[test]
fn subs_lists_a_loaded_subscription() {
    let temp = Project::empty();
    temp.file("sluice.toml", &subscriptions_config(&temp));
    temp.file("subscriptions/analytics.toml", SUBSCRIPTION_DOC);
    temp.sluice().args(&["daemon", "start"]).passes();

    let listed = wait_for(SPEC_WAIT_MAX_MS, || {
        let out = temp.sluice().args(&["subs"]).passes().stdout_text();
        out.contains("analytics") && out.contains("active")
    });

    assert!(listed, "subscription should be listed as active");
}

#[test]
fn a_new_document_is_picked_up_by_the_next_poll() {
    let temp = Project::empty();
    temp.file("sluice.toml", &subscriptions_config(&temp));
    temp.sluice().args(&["daemon", "start"]).passes();

    temp.sluice().args(&["subs"]).passes().stdout_has("No subscriptions");

    temp.file("subscriptions/analytics.toml", SUBSCRIPTION_DOC);

    let listed = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.sluice()
            .args(&["subs"])
            .passes()
            .stdout_text()
            .contains("analytics")
    });

    assert!(listed, "new document should appear after a poll");
}

#[test]
fn a_removed_document_stops_its_subscription() {
    let temp = Project::empty();
    temp.file("sluice.toml", &subscriptions_config(&temp));
    temp.file("subscriptions/analytics.toml", SUBSCRIPTION_DOC);
    temp.sluice().args(&["daemon", "start"]).passes();

    let listed = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.sluice()
            .args(&["subs"])
            .passes()
            .stdout_text()
            .contains("analytics")
    });
    assert!(listed, "subscription should be listed before removal");

    std::fs::remove_file(temp.path().join("subscriptions/analytics.toml")).unwrap();

    // The phase table outlives the task, so the entry stays visible
    // with a stopped phase rather than vanishing
    let stopped = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.sluice()
            .args(&["subs"])
            .passes()
            .stdout_text()
            .contains("stopped")
    });

    assert!(stopped, "subscription should report stopped after its document goes");
}
