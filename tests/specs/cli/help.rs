//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_command_groups() {
    let ws = Workspace::empty();
    let run = ws.cg().args(&["--help"]).passes();
    for group in ["project", "pipeline", "job", "runner", "queue", "artifacts"] {
        assert!(run.stdout().contains(group), "missing {group}");
    }
}

#[test]
fn job_help_lists_transitions() {
    let ws = Workspace::empty();
    ws.cg()
        .args(&["job", "--help"])
        .passes()
        .stdout_has("succeed")
        .stdout_has("retry")
        .stdout_has("variables");
}

#[test]
fn missing_subcommand_fails() {
    let ws = Workspace::empty();
    ws.cg().args(&["pipeline"]).fails();
}
