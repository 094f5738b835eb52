//! Pipeline-wide cancel and retry specs

use crate::prelude::*;

fn ids(json: &serde_json::Value) -> Vec<u64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_u64().unwrap())
        .collect()
}

#[test]
fn cancel_stops_every_active_build() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.cg().args(&["job", "run", "3"]).passes();

    ws.cg()
        .args(&["pipeline", "cancel", "1"])
        .passes()
        .stdout_eq("Canceled 3 builds in pipeline 1\n");
    assert_eq!(ws.status(), "canceled");

    ws.cg()
        .args(&["pipeline", "cancel", "1"])
        .passes()
        .stdout_eq("Canceled 0 builds in pipeline 1\n");
}

#[test]
fn retry_reruns_failed_and_canceled_builds() {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.finish("4", "fail");
    ws.cg().args(&["pipeline", "cancel", "1"]).passes();

    let retries = ws
        .cg()
        .json()
        .args(&["pipeline", "retry", "1"])
        .passes()
        .json();
    assert_eq!(ids(&retries), vec![6, 7, 8]);
    assert_eq!(ws.status(), "pending");

    ws.cg()
        .args(&["pipeline", "retry", "1"])
        .passes()
        .stdout_eq("Retried 0 builds in pipeline 1\n");
}

#[test]
fn show_reports_duration_once_builds_ran() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["pipeline", "show", "1"])
        .passes()
        .stdout_lacks("Duration:");

    ws.finish("2", "succeed");
    ws.cg()
        .args(&["pipeline", "show", "1"])
        .passes()
        .stdout_has("Duration:");
}

#[test]
fn unknown_pipeline_cannot_be_canceled() {
    let ws = Workspace::with_pipeline();
    ws.cg()
        .args(&["pipeline", "cancel", "9"])
        .fails()
        .stderr_has("not found: pipeline 9");
}
