//! Pipeline creation specs
//!
//! Verify plans are seeded into ordered, pending builds.

use crate::prelude::*;

#[test]
fn pipeline_list_empty() {
    let ws = Workspace::empty();
    ws.cg()
        .args(&["pipeline", "list"])
        .passes()
        .stdout_eq("No pipelines\n");
}

#[test]
fn created_pipeline_groups_builds_by_stage() {
    let ws = Workspace::with_pipeline();

    ws.cg()
        .args(&["pipeline", "show", "1"])
        .passes()
        .stdout_has("Pipeline: 1")
        .stdout_has("Ref: main (branch) abc123def")
        .stdout_has("Status: pending")
        .stdout_has("Stage 0 (build): pending")
        .stdout_has("Stage 1 (test): pending")
        .stdout_has("Stage 2 (deploy): pending")
        .stdout_lacks("Retried:");
}

#[test]
fn json_create_returns_the_seeded_pipeline() {
    let ws = Workspace::empty();
    ws.file("plan.toml", PLAN);
    ws.cg().args(&["project", "add", "1", "acme/widgets"]).passes();

    let json = ws
        .cg()
        .json()
        .args(&["pipeline", "create", "plan.toml", "--project", "1", "--sha", "abc"])
        .passes()
        .json();

    assert_eq!(json["id"], 1);
    assert_eq!(json["status"], "pending");
    let stages = json["stages"].as_array().unwrap();
    let names: Vec<&str> = stages.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["build", "test", "deploy"]);

    let test_builds: Vec<&str> = stages[1]["builds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(test_builds, vec!["lint", "rspec"]);
    assert_eq!(stages[2]["builds"][0]["when"], "manual");
}

#[test]
fn default_stages_apply_without_a_stage_list() {
    let ws = Workspace::empty();
    ws.cg().args(&["project", "add", "1", "acme/widgets"]).passes();
    ws.file("plan.toml", "[job.unit]\n\n[job.package]\nstage = \"build\"\n");
    ws.cg()
        .args(&["pipeline", "create", "plan.toml", "--project", "1", "--sha", "abc"])
        .passes()
        .stdout_eq("Created pipeline 1 (2 builds)\n");

    ws.cg()
        .args(&["job", "show", "2"])
        .passes()
        .stdout_has("package");
    ws.cg()
        .args(&["job", "show", "3"])
        .passes()
        .stdout_has("unit")
        .stdout_has("test");
}

#[test]
fn pipelines_survive_between_invocations() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["pipeline", "list"])
        .passes()
        .stdout_has("project=1")
        .stdout_has("pending");
    assert!(ws.state().join("wal.jsonl").is_file());
}
