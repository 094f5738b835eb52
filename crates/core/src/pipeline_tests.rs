// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::runner::Runner;
use crate::test_support::{build, epoch, pipeline, project};
use chrono::TimeDelta;
use std::time::Duration;

fn ids(builds: &[&Build]) -> Vec<u64> {
    builds.iter().map(|b| b.id.0).collect()
}

/// compile (build) -> rspec (test, retried) -> ship (deploy)
fn rows() -> Vec<Build> {
    vec![
        build(1, "compile", "build", 0, Status::Success),
        build(2, "rspec", "test", 1, Status::Failed),
        build(3, "ship", "deploy", 2, Status::Pending),
        build(4, "rspec", "test", 1, Status::Running),
    ]
}

#[test]
fn view_ignores_other_pipelines() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let mut rows = rows();
    let mut foreign = build(9, "compile", "build", 0, Status::Failed);
    foreign.pipeline_id = PipelineId(2);
    rows.push(foreign);

    let view = PipelineView::new(&pipeline, &rows);
    assert_eq!(ids(view.builds()), vec![1, 2, 3, 4]);
    assert_eq!(view.status(), Status::Running);
}

#[test]
fn view_exposes_stages_latest_and_retried() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let rows = rows();
    let view = PipelineView::new(&pipeline, &rows);

    let names: Vec<&str> = view.stages().iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["build", "test", "deploy"]);
    assert_eq!(view.stage_status("test"), Status::Running);
    assert_eq!(ids(&view.latest()), vec![1, 3, 4]);
    assert_eq!(ids(&view.retried()), vec![2]);
}

#[test]
fn view_resolves_dependencies_and_blocking() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let rows = rows();
    let view = PipelineView::new(&pipeline, &rows);
    let ship = &rows[2];

    assert_eq!(ids(&view.depends_on(ship)), vec![1, 4]);
    assert_eq!(ids(&view.dependency_graph().depends_on(ship).into_iter().copied().collect::<Vec<_>>()), vec![1, 4]);
    assert!(view.is_blocked(ship));
    assert!(!view.is_blocked(&rows[3]));
}

#[test]
fn retryable_and_cancelable_follow_latest_attempts() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);

    let rows = rows();
    let view = PipelineView::new(&pipeline, &rows);
    assert!(view.is_cancelable());
    // the failed rspec was retried, so it no longer counts
    assert!(!view.is_retryable());

    let done = vec![
        build(1, "compile", "build", 0, Status::Success),
        build(2, "rspec", "test", 1, Status::Canceled),
    ];
    let view = PipelineView::new(&pipeline, &done);
    assert!(view.is_retryable());
    assert!(!view.is_cancelable());
}

#[test]
fn stuck_when_no_runner_can_take_pending_work() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let project = project();
    let rows = rows();
    let view = PipelineView::new(&pipeline, &rows);

    let offline: Vec<Runner> = vec![Runner::shared(1)];
    let matcher = RunnerMatcher::new(&offline, Duration::from_secs(3600), &clock);
    assert!(view.is_stuck(&matcher, &project));

    let online = vec![Runner::shared(1).with_contacted_at(clock.now())];
    let matcher = RunnerMatcher::new(&online, Duration::from_secs(3600), &clock);
    assert!(!view.is_stuck(&matcher, &project));
}

#[test]
fn coverage_is_mean_of_reporting_builds() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let mut rows = rows();
    rows[0].coverage = Some(80.0);
    rows[1].coverage = Some(10.0);
    rows[3].coverage = Some(90.0);

    let view = PipelineView::new(&pipeline, &rows);
    assert_eq!(view.coverage(), Some(85.0));

    let empty: Vec<Build> = Vec::new();
    assert_eq!(PipelineView::new(&pipeline, &empty).coverage(), None);
}

#[test]
fn predefined_variables_describe_the_commit() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock).with_before_sha("ffffffffffffffffffffffffffffffffffffffff");
    let variables = pipeline.predefined_variables();

    assert_eq!(variables.get("CI_PIPELINE_ID"), Some("1"));
    assert_eq!(variables.get("CI_COMMIT_SHORT_SHA"), Some("01234567"));
    assert_eq!(
        variables.get("CI_COMMIT_BEFORE_SHA"),
        Some("ffffffffffffffffffffffffffffffffffffffff")
    );
    assert_eq!(variables.get("CI_COMMIT_BRANCH"), Some("main"));
    assert_eq!(variables.get("CI_COMMIT_TAG"), None);
}

#[test]
fn tag_pipelines_expose_the_tag() {
    let clock = FakeClock::new();
    let pipeline = Pipeline::new(2, 1, "v1.2.0", "abc", &clock).with_tag(true);
    let variables = pipeline.predefined_variables();

    assert_eq!(variables.get("CI_COMMIT_TAG"), Some("v1.2.0"));
    assert_eq!(variables.get("CI_COMMIT_BRANCH"), None);
    assert_eq!(variables.get("CI_COMMIT_REF_SLUG"), Some("v1-2-0"));
    assert_eq!(pipeline.short_sha(), "abc");
}

#[test]
fn pipeline_serializes_ref_field() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let json = serde_json::to_value(&pipeline).unwrap();
    assert_eq!(json["ref"], "main");
    let back: Pipeline = serde_json::from_value(json).unwrap();
    assert_eq!(back, pipeline);
}

#[test]
fn pipeline_wide_retry_and_cancel_candidates() {
    let clock = FakeClock::new();
    let pipeline = pipeline(&clock);
    let mut rows = rows();
    rows.push(build(5, "lint", "test", 1, Status::Canceled));
    let view = PipelineView::new(&pipeline, &rows);

    // the failed rspec row is superseded by a running retry
    assert_eq!(ids(&view.retryable_builds()), vec![5]);
    assert_eq!(ids(&view.cancelable_builds()), vec![3, 4]);
    assert!(view.is_retryable());
    assert!(view.is_cancelable());
}

fn timed(id: u64, name: &str, started: i64, finished: Option<i64>) -> Build {
    let at = |secs: i64| epoch() + TimeDelta::seconds(secs);
    let mut build = build(id, name, "test", 1, Status::Success);
    build.started_at = Some(at(started));
    build.finished_at = finished.map(at);
    if finished.is_none() {
        build.status = Status::Running;
    }
    build
}

#[test]
fn durations_merge_overlapping_runs() {
    let clock = FakeClock::at(epoch());
    let pipeline = pipeline(&clock);
    // 10..40 and 30..50 overlap, 100..110 stands alone
    let rows = vec![
        timed(1, "a", 10, Some(40)),
        timed(2, "b", 30, Some(50)),
        timed(3, "c", 100, Some(110)),
    ];
    let view = PipelineView::new(&pipeline, &rows);

    assert_eq!(view.queued_duration(), Some(Duration::from_secs(10)));
    assert_eq!(view.duration(), Some(Duration::from_secs(50)));
    assert_eq!(
        view.finished_at(),
        Some(epoch() + TimeDelta::seconds(110))
    );
}

#[test]
fn durations_while_running_or_unstarted() {
    let clock = FakeClock::at(epoch());
    let pipeline = pipeline(&clock);

    let fresh = rows();
    let view = PipelineView::new(&pipeline, &fresh);
    assert_eq!(view.started_at(), None);
    assert_eq!(view.queued_duration(), None);
    assert_eq!(view.duration(), None);

    let running = vec![timed(1, "a", 0, Some(20)), timed(2, "b", 5, None)];
    let view = PipelineView::new(&pipeline, &running);
    assert_eq!(view.queued_duration(), None);
    assert_eq!(view.finished_at(), None);
    assert_eq!(view.duration(), Some(Duration::from_secs(20)));
}
