//! Property tests for timeline determinism
//!
//! Random scripts built from waits, traces, transmits and listens must:
//! - Produce identical traces and final state on every run
//! - Never move the clock backwards
//! - Trace exactly at the sum of the preceding waits

use proptest::prelude::*;

use histrion::{
    Action, EntityView, Expr, Interval, Pattern, Simulation, TimeUnit, TraceRecord,
    TraceRecorder,
};

const TAGS: [&str; 2] = ["north", "south"];

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u32..5).prop_map(|n| Action::Wait(Interval::of(n, TimeUnit::Sec))),
        (0i32..100).prop_map(|n| Action::Trace(Expr::num(n))),
        (0usize..2).prop_map(|t| Action::transmit(TAGS[t], vec![Expr::Myself])),
        (0usize..2).prop_map(|t| Action::Listen(Pattern::bare(TAGS[t]))),
    ]
}

fn timeline() -> impl Strategy<Value = Vec<Vec<Action>>> {
    prop::collection::vec(prop::collection::vec(action(), 0..8), 1..6)
}

fn build(scripts: &[Vec<Action>]) -> (Simulation, TraceRecorder) {
    let mut sim = Simulation::new();
    let recorder = TraceRecorder::new();
    sim.trace_records(recorder.sink());
    for (i, script) in scripts.iter().enumerate() {
        sim.spawn(format!("Actor {}", i), script.clone()).unwrap();
    }
    (sim, recorder)
}

/// Outcome, traces and final entity views of one full run
fn execute(scripts: &[Vec<Action>]) -> (String, Vec<TraceRecord>, Vec<EntityView>) {
    let (mut sim, recorder) = build(scripts);
    let outcome = format!("{:?}", sim.run());
    let views = sim
        .entities()
        .map(|id| sim.inspect(id).unwrap())
        .collect();
    (outcome, recorder.records(), views)
}

proptest! {
    #[test]
    fn test_runs_are_reproducible(scripts in timeline()) {
        let first = execute(&scripts);
        let second = execute(&scripts);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_time_never_decreases(scripts in timeline()) {
        let (mut sim, recorder) = build(&scripts);
        let mut last = sim.now();
        while let Ok(true) = sim.step() {
            prop_assert!(sim.now() >= last, "Clock moved from {} to {}", last, sim.now());
            last = sim.now();
        }

        let records = recorder.records();
        for pair in records.windows(2) {
            prop_assert!(pair[0].at <= pair[1].at);
        }
    }

    #[test]
    fn test_traces_land_after_cumulative_waits(waits in prop::collection::vec(0u32..10_000, 1..20)) {
        let script: Vec<Action> = waits
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| {
                vec![
                    Action::Wait(Interval::of(w, TimeUnit::Sec)),
                    Action::Trace(Expr::num(i as i32)),
                ]
            })
            .collect();

        let (mut sim, recorder) = build(&[script]);
        sim.run().unwrap();

        let mut expected = 0.0;
        let records = recorder.records();
        prop_assert_eq!(records.len(), waits.len());
        for (record, &w) in records.iter().zip(&waits) {
            expected += w as f64;
            prop_assert_eq!(record.at.as_secs(), expected);
        }
    }
}
