// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::test_support::{build, pipeline};

fn pending(clock: &FakeClock) -> Build {
    Build::new(10, &pipeline(clock), "rspec", "test", 1, clock)
}

#[test]
fn new_build_is_pending_and_inherits_pipeline_ref() {
    let clock = FakeClock::new();
    let build = pending(&clock);

    assert_eq!(build.status, Status::Pending);
    assert_eq!(build.git_ref, "main");
    assert_eq!(build.created_at, clock.now());
    assert!(build.is_active());
    assert!(!build.is_complete());
    assert!(!build.is_started());
}

#[test]
fn run_then_succeed() {
    let clock = FakeClock::new();
    let build = pending(&clock);

    let (running, effects) = build
        .transition(
            BuildEvent::Run {
                runner_id: Some(RunnerId(4)),
            },
            &clock,
        )
        .unwrap();
    assert_eq!(running.status, Status::Running);
    assert_eq!(running.runner_id, Some(RunnerId(4)));
    assert!(running.is_started());
    assert_eq!(
        effects,
        vec![Effect::Emit(Event::BuildStatusChanged {
            id: BuildId(10),
            pipeline_id: PipelineId(1),
            from: Status::Pending,
            to: Status::Running,
        })]
    );

    clock.advance(Duration::from_secs(90));
    let (done, _) = running.transition(BuildEvent::Succeed, &clock).unwrap();
    assert_eq!(done.status, Status::Success);
    assert_eq!(done.duration(), Some(Duration::from_secs(90)));
    assert!(done.is_complete());
    assert!(done.is_started());
}

#[test]
fn drop_marks_failed() {
    let clock = FakeClock::new();
    let (running, _) = pending(&clock)
        .transition(BuildEvent::Run { runner_id: None }, &clock)
        .unwrap();
    let (failed, _) = running.transition(BuildEvent::Drop, &clock).unwrap();

    assert_eq!(failed.status, Status::Failed);
    assert!(!failed.is_ignored());
    assert!(failed.clone().with_allow_failure(true).is_ignored());
}

#[test]
fn cancel_from_pending_and_running() {
    let clock = FakeClock::new();
    let build = pending(&clock);

    let (canceled, _) = build.transition(BuildEvent::Cancel, &clock).unwrap();
    assert_eq!(canceled.status, Status::Canceled);
    assert!(!canceled.is_started());

    let (running, _) = build
        .transition(BuildEvent::Run { runner_id: None }, &clock)
        .unwrap();
    let (canceled, _) = running.transition(BuildEvent::Cancel, &clock).unwrap();
    assert_eq!(canceled.status, Status::Canceled);
    assert!(!canceled.is_started());
}

#[test]
fn skip_only_from_pending() {
    let clock = FakeClock::new();
    let (skipped, _) = pending(&clock).transition(BuildEvent::Skip, &clock).unwrap();
    assert_eq!(skipped.status, Status::Skipped);
    assert!(skipped.is_complete());
}

#[test]
fn run_on_canceled_build_is_a_conflict() {
    let clock = FakeClock::new();
    let canceled = build(3, "lint", "test", 1, Status::Canceled);

    let err = canceled
        .transition(BuildEvent::Run { runner_id: None }, &clock)
        .unwrap_err();
    assert_eq!(
        err,
        ConflictError::Terminal {
            id: BuildId(3),
            status: Status::Canceled,
            event: "run",
        }
    );
}

#[test]
fn succeed_while_pending_is_invalid() {
    let clock = FakeClock::new();
    let err = pending(&clock)
        .transition(BuildEvent::Succeed, &clock)
        .unwrap_err();
    assert!(matches!(err, ConflictError::InvalidTransition { .. }));
}

#[test]
fn retry_creates_new_pending_row_and_leaves_original() {
    let clock = FakeClock::new();
    let mut original = build(5, "rspec", "test", 1, Status::Failed)
        .with_tags(["docker"])
        .with_variables(vec![Variable::new("SUITE", "unit")]);
    original.trace = Some("boom".to_string());
    original.runner_id = Some(RunnerId(2));
    let before = original.clone();

    clock.advance(Duration::from_secs(5));
    let (retry, effects) = original.retry(9, &clock).unwrap();

    assert_eq!(original, before);
    assert_eq!(retry.id, BuildId(9));
    assert_eq!(retry.status, Status::Pending);
    assert_eq!(retry.name, "rspec");
    assert_eq!(retry.stage_idx, 1);
    assert_eq!(retry.tags, before.tags);
    assert_eq!(retry.variables, before.variables);
    assert_eq!(retry.created_at, clock.now());
    assert!(retry.trace.is_none());
    assert!(retry.runner_id.is_none());
    assert_eq!(
        effects,
        vec![Effect::Emit(Event::BuildRetried {
            original: BuildId(5),
            retry: BuildId(9),
            pipeline_id: PipelineId(1),
        })]
    );
}

#[test]
fn retry_of_active_build_is_rejected() {
    let clock = FakeClock::new();
    let running = build(5, "rspec", "test", 1, Status::Running);
    assert!(matches!(
        running.retry(6, &clock),
        Err(CoreError::Conflict(ConflictError::NotRetryable { .. }))
    ));
}

#[test]
fn retry_id_must_supersede_original() {
    let clock = FakeClock::new();
    let failed = build(5, "rspec", "test", 1, Status::Failed);
    assert!(matches!(
        failed.retry(5, &clock),
        Err(CoreError::Validation(ValidationError::NonMonotonicRetry { .. }))
    ));
}

#[test]
fn queued_duration_measures_wait_for_runner() {
    let clock = FakeClock::new();
    let build = pending(&clock);
    clock.advance(Duration::from_secs(12));
    let (running, _) = build
        .transition(BuildEvent::Run { runner_id: None }, &clock)
        .unwrap();
    assert_eq!(running.queued_duration(), Some(Duration::from_secs(12)));
    assert_eq!(running.duration(), None);
}

#[test]
fn build_round_trips_through_json() {
    let clock = FakeClock::new();
    let build = pending(&clock)
        .with_when(When::Manual)
        .with_kind(BuildKind::Bridge {
            downstream: Some(PipelineId(8)),
        });
    let json = serde_json::to_string(&build).unwrap();
    assert!(json.contains("\"ref\":\"main\""));
    let back: Build = serde_json::from_str(&json).unwrap();
    assert_eq!(back, build);
}

#[test]
fn when_parses_known_conditions() {
    assert_eq!("on_failure".parse::<When>().unwrap(), When::OnFailure);
    assert_eq!(
        "sometimes".parse::<When>(),
        Err(ValidationError::UnknownWhen("sometimes".to_string()))
    );
}

#[test]
fn predefined_variables_describe_the_job() {
    let clock = FakeClock::new();
    let config = Config::default();
    let variables = pending(&clock).with_when(When::Manual).predefined_variables(&config);

    assert_eq!(variables.get("CI"), Some("true"));
    assert_eq!(variables.get("CI_JOB_ID"), Some("10"));
    assert_eq!(variables.get("CI_JOB_NAME"), Some("rspec"));
    assert_eq!(variables.get("CI_JOB_STAGE"), Some("test"));
    assert_eq!(variables.get("CI_JOB_MANUAL"), Some("true"));
    assert_eq!(variables.get("CI_RUNNER_ID"), None);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_event() -> impl Strategy<Value = BuildEvent> {
        prop_oneof![
            Just(BuildEvent::Run { runner_id: None }),
            Just(BuildEvent::Succeed),
            Just(BuildEvent::Drop),
            Just(BuildEvent::Cancel),
            Just(BuildEvent::Skip),
        ]
    }

    proptest! {
        #[test]
        fn complete_is_never_active(events in proptest::collection::vec(arb_event(), 0..12)) {
            let clock = FakeClock::new();
            let mut build = pending(&clock);
            for event in events {
                let was_complete = build.is_complete();
                match build.transition(event, &clock) {
                    Ok((next, _)) => {
                        prop_assert!(!was_complete, "terminal build transitioned");
                        build = next;
                    }
                    Err(_) => {}
                }
                prop_assert_eq!(build.is_complete(), !build.is_active());
                prop_assert_eq!(build.is_retryable(), build.is_complete());
            }
        }
    }
}
