//! CLI help specs
//!
//! Verify help output, version reporting, and completion generation.

use crate::prelude::*;

#[test]
fn help_lists_the_commands() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["--help"])
        .passes()
        .stdout_has("emit")
        .stdout_has("read")
        .stdout_has("watch")
        .stdout_has("daemon");
}

#[test]
fn help_describes_the_tool() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["--help"])
        .passes()
        .stdout_has("CloudEvents gateway");
}

#[test]
fn version_matches_the_build() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn emit_help_shows_the_file_argument() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["emit", "--help"])
        .passes()
        .stdout_has("FILE")
        .stdout_has("stdin");
}

#[test]
fn completions_generate_a_bash_function() {
    let temp = Project::empty();

    temp.sluice()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("_sluice");
}
