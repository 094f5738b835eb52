//! Retry specs
//!
//! A retry inserts a new attempt; the original stays as history and
//! dependents resolve to the newest attempt.

use crate::prelude::*;

fn ids(json: &serde_json::Value) -> Vec<u64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_u64().unwrap())
        .collect()
}

#[test]
fn retry_creates_new_latest_attempt() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.finish("4", "fail");
    assert_eq!(ws.status(), "failed");

    ws.cg()
        .args(&["job", "retry", "4"])
        .passes()
        .stdout_eq("Retried build 4 as 6\n");
    assert_eq!(ws.status(), "pending");

    ws.cg()
        .args(&["pipeline", "show", "1"])
        .passes()
        .stdout_has("Retried:");
    let retried = ws.cg().json().args(&["job", "show", "4"]).passes().json();
    assert_eq!(retried["retried"], true);
    assert_eq!(retried["status"], "failed");
}

#[test]
fn dependencies_follow_the_latest_attempt() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.finish("4", "fail");
    ws.cg().args(&["job", "retry", "4"]).passes();

    let deps = ws.cg().json().args(&["job", "deps", "5"]).passes().json();
    assert_eq!(ids(&deps), vec![2, 3, 6]);

    ws.cg()
        .args(&["job", "deps", "2"])
        .passes()
        .stdout_eq("No dependencies\n");
}

#[test]
fn active_build_cannot_be_retried() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["job", "retry", "2"])
        .fails()
        .stderr_has("cannot be retried");
}
