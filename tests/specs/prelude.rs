//! Shared helpers for CLI specs

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Plan used by most specs. Ids on a fresh state: pipeline 1, then
/// compile 2, lint 3, rspec 4, ship 5.
pub const PLAN: &str = r#"
stages = ["build", "test", "deploy"]

[job.compile]
stage = "build"
tags = ["linux"]

[job.lint]
stage = "test"
allow_failure = true

[job.rspec]
stage = "test"
[job.rspec.variables]
RAILS_ENV = "test"

[job.ship]
stage = "deploy"
when = "manual"
"#;

/// Isolated state directory and config for one spec
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Project 1 and a pipeline seeded from [`PLAN`]
    pub fn with_pipeline() -> Self {
        let ws = Self::empty();
        ws.file("plan.toml", PLAN);
        ws.cg().args(&["project", "add", "1", "acme/widgets"]).passes();
        ws.cg()
            .args(&[
                "pipeline", "create", "plan.toml", "--project", "1", "--sha", "abc123def",
            ])
            .passes()
            .stdout_eq("Created pipeline 1 (4 builds)\n");
        ws
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state(&self) -> PathBuf {
        self.path().join("state")
    }

    pub fn file(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// `cg` pointed at this workspace's state and config
    pub fn cg(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("cg").unwrap();
        cmd.current_dir(self.path())
            .env_remove("CG_LOG")
            .arg("--state")
            .arg(self.state())
            .arg("--config")
            .arg(self.path().join("config.toml"));
        CliBuilder { cmd }
    }

    /// Drive a build to `last` through running
    pub fn finish(&self, id: &str, last: &str) {
        self.cg().args(&["job", "run", id]).passes();
        self.cg().args(&["job", last, id]).passes();
    }

    pub fn status(&self) -> String {
        self.cg()
            .args(&["pipeline", "status", "1"])
            .passes()
            .stdout()
            .trim()
            .to_string()
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn json(mut self) -> Self {
        self.cmd.args(["--format", "json"]);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status,
            run.stdout(),
            run.stderr()
        );
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}",
            run.stdout()
        );
        run
    }
}

pub struct RunAssert {
    output: std::process::Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(needle),
            "stdout missing {needle:?}:\n{stdout}"
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(needle),
            "stdout unexpectedly has {needle:?}:\n{stdout}"
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(needle),
            "stderr missing {needle:?}:\n{stderr}"
        );
        self
    }
}
