//! Pipeline status specs
//!
//! Verify the status fold across stages as builds move.

use crate::prelude::*;

#[test]
fn fresh_pipeline_is_pending() {
    let ws = Workspace::with_pipeline();
    assert_eq!(ws.status(), "pending");
}

#[test]
fn running_build_makes_pipeline_running() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["job", "run", "2"])
        .passes()
        .stdout_eq("Build 2 compile: pending -> running\n");
    assert_eq!(ws.status(), "running");
}

#[test]
fn allowed_failure_does_not_fail_the_stage() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.finish("3", "fail");
    ws.finish("4", "succeed");

    ws.cg()
        .args(&["pipeline", "status", "1", "--stage", "test"])
        .passes()
        .stdout_eq("success\n");
    ws.cg()
        .args(&["job", "show", "3"])
        .passes()
        .stdout_has("(allowed to fail)");

    // the manual deploy job is still pending
    assert_eq!(ws.status(), "pending");
    ws.cg().args(&["job", "skip", "5"]).passes();
    assert_eq!(ws.status(), "success");
}

#[test]
fn failure_dominates_the_fold() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.finish("4", "fail");
    ws.cg().args(&["job", "run", "3"]).passes();

    assert_eq!(ws.status(), "failed");
}

#[test]
fn canceled_pipeline_reports_canceled() {
    let ws = Workspace::with_pipeline();
    for id in ["2", "3", "4", "5"] {
        ws.cg().args(&["job", "cancel", id]).passes();
    }
    assert_eq!(ws.status(), "canceled");
}

#[test]
fn unknown_stage_is_an_error() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["pipeline", "status", "1", "--stage", "nope"])
        .fails()
        .stderr_has("no stage named nope");
}

#[test]
fn json_status_names_the_pipeline() {
    let ws = Workspace::with_pipeline();
    let json = ws
        .cg()
        .json()
        .args(&["pipeline", "status", "1"])
        .passes()
        .json();
    assert_eq!(json, serde_json::json!({ "id": 1, "status": "pending" }));
}
