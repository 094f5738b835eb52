//! Artifact lifecycle specs
//!
//! Attach, expire, keep, erase, and clean up archives on disk.

use crate::prelude::*;

fn with_finished_compile() -> Workspace {
    let ws = Workspace::with_pipeline();
    ws.finish("2", "succeed");
    ws.file("state/artifacts/2/a.zip", "zip");
    ws
}

#[test]
fn attach_without_expiry_keeps_forever() {
    let ws = with_finished_compile();
    ws.cg()
        .args(&["artifacts", "attach", "2", "2/a.zip", "--size", "3"])
        .passes()
        .stdout_eq("Build 2 artifacts: 2/a.zip (expires never)\n");
}

#[test]
fn configured_default_expiry_applies_on_attach() {
    let ws = with_finished_compile();
    ws.file("config.toml", "default_artifacts_expire_in = \"1 day\"\n");
    let json = ws
        .cg()
        .json()
        .args(&["artifacts", "attach", "2", "2/a.zip"])
        .passes()
        .json();
    assert!(json["expire_at"].is_string());
}

#[test]
fn expire_and_keep() {
    let ws = with_finished_compile();
    ws.cg()
        .args(&["artifacts", "attach", "2", "2/a.zip"])
        .passes();

    ws.cg()
        .args(&["artifacts", "expire", "2", "1 week"])
        .passes()
        .stdout_lacks("never");
    ws.cg()
        .args(&["artifacts", "expire", "2", "soon"])
        .fails()
        .stderr_has("invalid duration");
    ws.cg()
        .args(&["artifacts", "keep", "2"])
        .passes()
        .stdout_has("(expires never)");
}

#[test]
fn erase_deletes_blobs_once() {
    let ws = with_finished_compile();
    ws.cg()
        .args(&["artifacts", "attach", "2", "2/a.zip"])
        .passes();
    ws.cg().args(&["job", "trace", "2", "$ make"]).passes();

    ws.cg()
        .args(&["artifacts", "erase", "2", "--user", "7"])
        .passes()
        .stdout_eq("Erased build 2\n");
    assert!(!ws.state().join("artifacts/2/a.zip").exists());

    ws.cg()
        .args(&["artifacts", "erase", "2"])
        .passes()
        .stdout_eq("Build 2 has nothing to erase\n");
}

#[test]
fn erased_build_rejects_new_output() {
    let ws = with_finished_compile();
    ws.cg().args(&["job", "trace", "2", "$ make"]).passes();
    ws.cg()
        .args(&["artifacts", "erase", "2", "--user", "7"])
        .passes();

    ws.cg()
        .args(&["job", "trace", "2", "late output"])
        .fails()
        .stderr_has("build 2 has been erased");
    ws.cg()
        .args(&["artifacts", "attach", "2", "2/a.zip"])
        .fails()
        .stderr_has("build 2 has been erased");
    ws.cg()
        .args(&["artifacts", "erase", "2"])
        .passes()
        .stdout_eq("Build 2 has nothing to erase\n");
}

#[test]
fn running_build_is_not_erasable() {
    let ws = Workspace::with_pipeline();
    ws.cg().args(&["job", "run", "2"]).passes();
    ws.cg().args(&["job", "trace", "2", "building"]).passes();

    ws.cg()
        .args(&["artifacts", "erase", "2"])
        .passes()
        .stdout_eq("Build 2 has nothing to erase\n");
}

#[test]
fn cleanup_removes_expired_archives() {
    let ws = with_finished_compile();
    ws.cg()
        .args(&["artifacts", "attach", "2", "2/a.zip"])
        .passes();
    ws.cg().args(&["artifacts", "expire", "2", "0"]).passes();

    ws.cg()
        .args(&["artifacts", "cleanup"])
        .passes()
        .stdout_eq("Removed expired artifacts of 1 builds\n");
    assert!(!ws.state().join("artifacts/2/a.zip").exists());

    ws.cg()
        .args(&["artifacts", "cleanup"])
        .passes()
        .stdout_eq("Removed expired artifacts of 0 builds\n");
}
