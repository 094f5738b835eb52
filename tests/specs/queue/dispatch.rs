//! Dispatch queue specs
//!
//! Ready builds respect stage order, runners match on tags and scope, and
//! stuck builds are those no online runner can pick.

use crate::prelude::*;

fn names(json: &serde_json::Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn only_unblocked_builds_are_ready() {
    let ws = Workspace::with_pipeline();
    let ready = ws.cg().json().args(&["queue", "ready"]).passes().json();
    assert_eq!(names(&ready), vec!["compile"]);

    ws.finish("2", "succeed");
    let ready = ws.cg().json().args(&["queue", "ready"]).passes().json();
    assert_eq!(names(&ready), vec!["lint", "rspec"]);
}

#[test]
fn manual_builds_are_never_ready() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.finish("3", "succeed");
    ws.finish("4", "succeed");

    ws.cg()
        .args(&["queue", "ready"])
        .passes()
        .stdout_eq("No builds ready\n");
}

#[test]
fn runner_tags_must_cover_build_tags() {
    let ws = Workspace::with_pipeline();
    ws.cg().args(&["runner", "add", "50", "--tag", "linux"]).passes();
    ws.cg().args(&["runner", "add", "51"]).passes();

    ws.cg()
        .args(&["queue", "next", "--runner", "51"])
        .passes()
        .stdout_eq("No builds ready for runner 51\n");
    ws.cg()
        .args(&["queue", "next", "--runner", "50"])
        .passes()
        .stdout_has("compile");
}

#[test]
fn next_with_start_runs_the_build() {
    let ws = Workspace::with_pipeline();
    ws.cg().args(&["runner", "add", "50", "--tag", "linux"]).passes();

    let started = ws
        .cg()
        .json()
        .args(&["queue", "next", "--runner", "50", "--start"])
        .passes()
        .json();
    assert_eq!(started["id"], 2);
    assert_eq!(started["status"], "running");
    assert_eq!(started["runner_id"], 50);
    assert_eq!(ws.status(), "running");
}

#[test]
fn project_runner_ignores_other_projects() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["runner", "add", "60", "--project", "2", "--tag", "linux"])
        .passes();

    ws.cg()
        .args(&["queue", "next", "--runner", "60"])
        .passes()
        .stdout_eq("No builds ready for runner 60\n");
}

#[test]
fn builds_without_online_runners_are_stuck() {
    let ws = Workspace::with_pipeline();
    let stuck = ws.cg().json().args(&["queue", "stuck"]).passes().json();
    assert_eq!(names(&stuck), vec!["compile", "lint", "rspec", "ship"]);

    ws.cg().args(&["runner", "add", "50"]).passes();
    let stuck = ws.cg().json().args(&["queue", "stuck"]).passes().json();
    assert_eq!(names(&stuck), vec!["compile"]);

    ws.cg().args(&["runner", "add", "51", "--tag", "linux", "--paused"]).passes();
    ws.cg()
        .args(&["queue", "stuck"])
        .passes()
        .stdout_has("compile");

    ws.cg().args(&["runner", "add", "52", "--tag", "linux"]).passes();
    ws.cg()
        .args(&["queue", "stuck"])
        .passes()
        .stdout_eq("No stuck builds\n");
}

#[test]
fn shared_runners_can_be_refused() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["project", "add", "1", "acme/widgets", "--no-shared-runners"])
        .passes();
    ws.cg().args(&["runner", "add", "50", "--tag", "linux"]).passes();

    ws.cg()
        .args(&["runner", "list"])
        .passes()
        .stdout_has("online");
    ws.cg()
        .args(&["queue", "next", "--runner", "50"])
        .passes()
        .stdout_eq("No builds ready for runner 50\n");
}
