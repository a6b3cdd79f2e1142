//! End-to-end behavior of `PhaseRunner` through its public API.
//!
//! Covers registration order, range selection, context threading between
//! phases, failure propagation and repeatability of runs.

use phase_runner::core::context::SharedContext;
use phase_runner::core::phase::{Phase, PhaseOutput, PhaseStatus};
use phase_runner::core::range::PhaseRange;
use phase_runner::error::RunnerError;
use phase_runner::io::config::load_config;
use phase_runner::runner::PhaseRunner;
use phase_runner::test_support::{CallLog, ConfigFixture, recording_phase};
use serde_json::json;

fn five_phase_runner(log: &CallLog) -> PhaseRunner {
    let mut runner = PhaseRunner::new();
    for name in ["Phase A", "Phase B", "Phase C", "Phase D", "Phase E"] {
        runner
            .register(recording_phase(name, log))
            .expect("register");
    }
    runner
}

#[test]
fn registration_order_is_execution_order() {
    let log = CallLog::default();
    let runner = five_phase_runner(&log);

    assert_eq!(
        runner.phase_names(),
        vec!["Phase A", "Phase B", "Phase C", "Phase D", "Phase E"]
    );
    runner.run(None, None, None).expect("run");
    assert_eq!(
        log.calls(),
        vec!["Phase A", "Phase B", "Phase C", "Phase D", "Phase E"]
    );
}

#[test]
fn ranged_run_executes_contiguous_subsequence() {
    let log = CallLog::default();
    let runner = five_phase_runner(&log);

    let ctx = runner
        .run(Some("phase b"), Some("Phase D"), None)
        .expect("run");
    assert_eq!(log.calls(), vec!["Phase B", "Phase C", "Phase D"]);
    assert_eq!(
        ctx.keys().collect::<Vec<_>>(),
        vec!["ran_Phase B", "ran_Phase C", "ran_Phase D"]
    );
}

#[test]
fn unknown_start_invokes_nothing() {
    let log = CallLog::default();
    let mut runner = five_phase_runner(&log);
    let hook_log = log.clone();
    runner.set_pre_run(move |_| {
        hook_log.record("pre-run");
        Ok(PhaseOutput::pass().with("pre", true))
    });

    let err = runner
        .run(Some("nonexistent"), None, None)
        .expect_err("unknown");
    assert!(matches!(err, RunnerError::UnknownPhase { .. }));
    assert!(log.calls().is_empty());
}

#[test]
fn inverted_range_invokes_nothing() {
    let log = CallLog::default();
    let mut runner = five_phase_runner(&log);
    let hook_log = log.clone();
    runner.set_post_run(move |_| {
        hook_log.record("post-run");
        Ok(PhaseOutput::pass())
    });

    let err = runner
        .run(Some("Phase D"), Some("Phase B"), None)
        .expect_err("inverted");
    assert!(matches!(err, RunnerError::InvalidRange { .. }));
    assert!(log.calls().is_empty());
}

#[test]
fn outputs_flow_into_later_phases() {
    let mut runner = PhaseRunner::new();
    runner
        .register(
            Phase::new("Phase A", |ctx| {
                let number: i64 = ctx.require_as("number")?;
                Ok(PhaseOutput::pass().with("a_string", format!("got {}", number)))
            })
            .requires(["number"])
            .outputs(["a_string"]),
        )
        .expect("register a");
    runner
        .register(
            Phase::new("Phase C", |ctx| {
                let text: String = ctx.require_as("a_string")?;
                Ok(PhaseOutput::pass().with("length", text.len()))
            })
            .requires(["a_string"]),
        )
        .expect("register c");

    let initial: SharedContext = [("number", json!(19))].into_iter().collect();
    let ctx = runner.run(None, None, Some(initial)).expect("run");
    assert_eq!(ctx.get("a_string"), Some(&json!("got 19")));
    assert_eq!(ctx.get("length"), Some(&json!(6)));
}

#[test]
fn later_writes_win_including_initial_context() {
    let mut runner = PhaseRunner::new();
    runner
        .add_phase("first", |_| Ok(PhaseOutput::pass().with("k", "first")))
        .expect("add");
    runner
        .add_phase("second", |_| Ok(PhaseOutput::pass().with("k", "second")))
        .expect("add");

    let initial: SharedContext = [("k", json!("initial"))].into_iter().collect();
    let ctx = runner.run(None, None, Some(initial)).expect("run");
    assert_eq!(ctx.get("k"), Some(&json!("second")));
}

#[test]
fn missing_parameter_hides_partial_context() {
    let mut runner = PhaseRunner::new();
    runner
        .add_phase("one", |_| Ok(PhaseOutput::pass().with("bar", 1)))
        .expect("add");
    runner
        .add_phase("two", |ctx| {
            let foo = ctx.require("foo")?;
            Ok(PhaseOutput::pass().with("copy", foo.clone()))
        })
        .expect("add");

    let result = runner.run(None, None, None);
    match result {
        Err(RunnerError::MissingParameter { phase, keys }) => {
            assert_eq!(phase, "two");
            assert_eq!(keys, vec!["foo"]);
        }
        other => panic!("expected missing parameter, got {other:?}"),
    }
}

#[test]
fn repeated_runs_produce_same_context() {
    let mut runner = PhaseRunner::new();
    runner
        .add_phase("load", |_| Ok(PhaseOutput::pass().with("n", 5)))
        .expect("add");
    runner
        .add_phase("double", |ctx| {
            let n: i64 = ctx.require_as("n")?;
            Ok(PhaseOutput::pass().with("n2", n * 2))
        })
        .expect("add");

    let initial: SharedContext = [("seed", json!("x"))].into_iter().collect();
    let first = runner.run(None, None, Some(initial.clone())).expect("first");
    let second = runner.run(None, None, Some(initial)).expect("second");
    assert_eq!(first, second);
}

#[test]
fn stop_on_fail_toggles_between_runs() {
    let log = CallLog::default();
    let mut runner = PhaseRunner::new();
    runner
        .add_phase("Phase C", |_| Ok(PhaseOutput::fail()))
        .expect("add");
    runner
        .register(recording_phase("Phase D", &log))
        .expect("register");

    runner.set_stop_on_fail(false);
    let report = runner
        .run_range(&PhaseRange::all(), None)
        .expect("continue");
    assert_eq!(
        report
            .phases
            .iter()
            .map(|record| record.status)
            .collect::<Vec<_>>(),
        vec![PhaseStatus::Failed, PhaseStatus::Passed]
    );
    assert_eq!(log.take(), vec!["Phase D"]);

    runner.set_stop_on_fail(true);
    let err = runner
        .run_range(&PhaseRange::all(), None)
        .expect_err("stop");
    assert!(matches!(err, RunnerError::Stopped { ref phase } if phase == "Phase C"));
    assert!(log.calls().is_empty());
}

#[test]
fn runner_from_config_uses_seed_and_selection() {
    let fixture = ConfigFixture::new(
        r#"
stop_on_fail = false
end = "Phase B"

[seed]
number = 2
"#,
    )
    .expect("fixture");
    let config = load_config(&fixture.path).expect("load");

    let log = CallLog::default();
    let mut runner = PhaseRunner::from_config(&config);
    assert!(!runner.stop_on_fail());
    for name in ["Phase A", "Phase B", "Phase C"] {
        runner
            .register(recording_phase(name, &log))
            .expect("register");
    }

    let ctx = runner.run(None, None, None).expect("run");
    assert_eq!(log.calls(), vec!["Phase A", "Phase B"]);
    assert_eq!(ctx.get("number"), Some(&json!(2)));
}

#[test]
fn soft_failure_skips_declared_output_check() {
    let log = CallLog::default();
    let mut runner = PhaseRunner::new();
    runner.set_stop_on_fail(false);
    runner
        .register(Phase::new("fetch", |_| Ok(PhaseOutput::fail())).outputs(["payload"]))
        .expect("register fetch");
    runner
        .register(recording_phase("report", &log))
        .expect("register report");

    let report = runner
        .run_range(&PhaseRange::all(), None)
        .expect("failed phase is not held to its outputs");
    assert_eq!(report.phases[0].status, PhaseStatus::Failed);
    assert_eq!(log.calls(), vec!["report"]);
    assert_eq!(report.context.get("payload"), None);
}
