//! Error reporting specs

use crate::prelude::*;

#[test]
fn unknown_build_is_reported() {
    let ws = Workspace::empty();
    ws.cg()
        .args(&["job", "run", "99"])
        .fails()
        .stderr_has("not found: build 99");
}

#[test]
fn pipeline_for_unknown_project_is_rejected() {
    let ws = Workspace::empty();
    ws.file("plan.toml", PLAN);
    ws.cg()
        .args(&["pipeline", "create", "plan.toml", "--project", "7", "--sha", "abc"])
        .fails()
        .stderr_has("not found: project 7");
}

#[test]
fn terminal_build_rejects_transitions() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["job", "cancel", "2"])
        .passes()
        .stdout_eq("Build 2 compile: pending -> canceled\n");

    ws.cg()
        .args(&["job", "run", "2"])
        .fails()
        .stderr_has("build 2 is already canceled; cannot run");
}

#[test]
fn pending_build_cannot_succeed() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["job", "succeed", "2"])
        .fails()
        .stderr_has("build 2 cannot succeed while pending");
}

#[test]
fn plan_with_unknown_stage_is_rejected() {
    let ws = Workspace::empty();
    ws.cg().args(&["project", "add", "1", "acme/widgets"]).passes();
    ws.file("bad.toml", "[job.x]\nstage = \"nope\"\n");
    ws.cg()
        .args(&["pipeline", "create", "bad.toml", "--project", "1", "--sha", "abc"])
        .fails()
        .stderr_has("unknown stage");

    ws.cg()
        .args(&["pipeline", "list"])
        .passes()
        .stdout_eq("No pipelines\n");
}

#[test]
fn invalid_config_is_reported() {
    let ws = Workspace::empty();
    ws.file("config.toml", "default_artifacts_expire_in = \"someday\"\n");
    ws.cg()
        .args(&["project", "list"])
        .fails()
        .stderr_has("invalid duration");
}
