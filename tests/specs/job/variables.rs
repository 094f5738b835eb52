//! Variable resolution specs
//!
//! Groups are concatenated in order: system, project, pipeline, declared,
//! secret. Secrets are masked.

use crate::prelude::*;

fn position(lines: &[&str], prefix: &str) -> usize {
    lines
        .iter()
        .position(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix}"))
}

#[test]
fn variables_are_ordered_by_group() {
    let ws = Workspace::with_pipeline();
    ws.file(
        "state/secrets.toml",
        "[projects.1]\nDEPLOY_TOKEN = \"hunter2\"\n",
    );

    let run = ws
        .cg()
        .args(&["job", "variables", "4"])
        .passes()
        .stdout_has("CI_JOB_NAME=rspec")
        .stdout_has("CI_PROJECT_PATH=acme/widgets")
        .stdout_has("CI_COMMIT_REF_NAME=main")
        .stdout_has("RAILS_ENV=test")
        .stdout_has("DEPLOY_TOKEN=[MASKED]")
        .stdout_lacks("hunter2");

    let stdout = run.stdout();
    let lines: Vec<&str> = stdout.lines().collect();
    let system = position(&lines, "CI_JOB_NAME=");
    let project = position(&lines, "CI_PROJECT_PATH=");
    let pipeline = position(&lines, "CI_COMMIT_SHA=");
    let declared = position(&lines, "RAILS_ENV=");
    let secret = position(&lines, "DEPLOY_TOKEN=");
    assert!(system < project);
    assert!(project < pipeline);
    assert!(pipeline < declared);
    assert!(declared < secret);
}

#[test]
fn secrets_are_scoped_to_their_project() {
    let ws = Workspace::with_pipeline();
    ws.file("state/secrets.toml", "[projects.2]\nOTHER = \"x\"\n");

    ws.cg()
        .args(&["job", "variables", "2"])
        .passes()
        .stdout_lacks("OTHER");
}

#[test]
fn json_variables_mask_secret_values() {
    let ws = Workspace::with_pipeline();
    ws.file("state/secrets.toml", "[projects.1]\nTOKEN = \"hunter2\"\n");

    let json = ws
        .cg()
        .json()
        .args(&["job", "variables", "2"])
        .passes()
        .json();
    let token = json
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["key"] == "TOKEN")
        .unwrap();
    assert_eq!(token["value"], "[MASKED]");
    assert_eq!(token["public"], false);
}
