//! Integration tests for event delivery between entities
//!
//! Verifies:
//! - Listeners are woken at the instant of transmission
//! - Fan-out wakes every matching listener in entity-id order
//! - Payload captures bind into the listener's locals
//! - Events are never delivered retroactively
//! - Arity and nested-tag matching
//! - The muster scenario

use std::cell::RefCell;
use std::rc::Rc;

use histrion::scenarios;
use histrion::{
    Action, EntityId, EntityStatus, Expr, HaltReason, Instant, Interval, Pattern, SimError,
    Simulation, Slot, TimeUnit, TraceRecorder, Value,
};

fn recording(sim: &mut Simulation) -> TraceRecorder {
    let recorder = TraceRecorder::new();
    sim.trace_records(recorder.sink());
    recorder
}

/// Collects (tag, woken ids) for each transmitted event
fn watch_events(sim: &mut Simulation) -> Rc<RefCell<Vec<(String, Vec<EntityId>)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink_seen = Rc::clone(&seen);
    sim.event_sink(move |event, woken| {
        sink_seen
            .borrow_mut()
            .push((event.tag.to_string(), woken.to_vec()));
    });
    seen
}

// ============================================================================
// Fan-out
// ============================================================================

#[test]
fn test_fan_out_wakes_listeners_in_id_order() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    let events = watch_events(&mut sim);

    sim.spawn(
        "Crier",
        vec![
            Action::Wait(Interval::of(1, TimeUnit::Min)),
            Action::transmit("news", vec![]),
        ],
    )
    .unwrap();
    // Registered on the bus in reverse id order
    for (name, delay) in [("Late", 30), ("Middle", 10), ("Early", 0)] {
        sim.spawn(
            name,
            vec![
                Action::Wait(Interval::of(delay, TimeUnit::Sec)),
                Action::Listen(Pattern::bare("news")),
                Action::Trace(Expr::Myself),
            ],
        )
        .unwrap();
    }

    sim.run().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![(
            "news".to_string(),
            vec![EntityId(1), EntityId(2), EntityId(3)]
        )]
    );
    assert_eq!(
        recorder.values(),
        vec![
            Value::EntityRef(EntityId(1)),
            Value::EntityRef(EntityId(2)),
            Value::EntityRef(EntityId(3)),
        ]
    );
    for record in recorder.records() {
        assert_eq!(record.at.as_secs(), 60.0, "Woken at the transmission instant");
    }
}

#[test]
fn test_non_matching_listener_stays_blocked() {
    let mut sim = Simulation::new();
    sim.spawn("Crier", vec![Action::transmit("news", vec![])]).unwrap();
    sim.spawn("Other", vec![Action::Listen(Pattern::bare("gossip"))])
        .unwrap();

    // Crier runs before Other listens, and Other awaits a different tag anyway
    match sim.run() {
        Err(SimError::Deadlock { blocked, .. }) => assert_eq!(blocked, vec![EntityId(1)]),
        other => panic!("Expected deadlock, got {:?}", other),
    }
}

#[test]
fn test_sender_keeps_running_after_transmit() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    sim.spawn(
        "Listener",
        vec![Action::Listen(Pattern::bare("ping")), Action::Trace(Expr::num(2))],
    )
    .unwrap();
    sim.spawn(
        "Sender",
        vec![Action::transmit("ping", vec![]), Action::Trace(Expr::num(1))],
    )
    .unwrap();

    sim.run().unwrap();

    // The sender finishes its zero-time actions before the woken listener runs
    assert_eq!(recorder.values(), vec![Value::from(1), Value::from(2)]);
}

#[test]
fn test_listener_consumes_one_event() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    let events = watch_events(&mut sim);
    sim.spawn(
        "Listener",
        vec![Action::Listen(Pattern::bare("ping")), Action::Trace(Expr::num(1))],
    )
    .unwrap();
    sim.spawn(
        "Sender",
        vec![
            Action::transmit("ping", vec![]),
            Action::transmit("ping", vec![]),
        ],
    )
    .unwrap();

    sim.run().unwrap();

    assert_eq!(recorder.values(), vec![Value::from(1)]);
    let events = events.borrow();
    assert_eq!(events[0].1, vec![EntityId(0)]);
    assert!(events[1].1.is_empty(), "Second event is dropped");
}

// ============================================================================
// Timing
// ============================================================================

#[test]
fn test_no_retroactive_delivery() {
    let mut sim = Simulation::new();
    sim.spawn("Sender", vec![Action::transmit("ping", vec![])]).unwrap();
    sim.spawn("Listener", vec![Action::Listen(Pattern::bare("ping"))])
        .unwrap();

    let err = sim.run().unwrap_err();
    match err {
        SimError::Deadlock { at, blocked } => {
            assert_eq!(at, Instant::epoch());
            assert_eq!(blocked, vec![EntityId(1)]);
        }
        other => panic!("Expected deadlock, got {:?}", other),
    }
}

#[test]
fn test_same_instant_delivery_when_listener_runs_first() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    sim.spawn(
        "Listener",
        vec![Action::Listen(Pattern::bare("ping")), Action::Trace(Expr::num(1))],
    )
    .unwrap();
    sim.spawn("Sender", vec![Action::transmit("ping", vec![])]).unwrap();

    sim.run().unwrap();

    let records = recorder.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].at, Instant::epoch());
}

#[test]
fn test_payload_evaluated_at_transmission() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    sim.spawn(
        "Listener",
        vec![
            Action::Listen(Pattern::new("count", vec![Slot::capture("n")])),
            Action::Trace(Expr::var("n")),
        ],
    )
    .unwrap();
    sim.spawn(
        "Counter",
        vec![
            Action::assign("n", Expr::num(1)),
            Action::Wait(Interval::of(1, TimeUnit::Sec)),
            Action::assign("n", Expr::num(2)),
            Action::transmit("count", vec![Expr::var("n")]),
        ],
    )
    .unwrap();

    sim.run().unwrap();

    assert_eq!(recorder.values(), vec![Value::from(2)]);
}

// ============================================================================
// Matching and captures
// ============================================================================

#[test]
fn test_captures_bind_into_locals() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    let listener = sim
        .spawn(
            "Recipient",
            vec![
                Action::Listen(Pattern::new("gift", vec![Slot::capture("what"), Slot::Any])),
                Action::Trace(Expr::var("what")),
            ],
        )
        .unwrap();
    sim.spawn(
        "Giver",
        vec![Action::transmit("gift", vec![Expr::num(7), Expr::num(8)])],
    )
    .unwrap();

    sim.run().unwrap();

    assert_eq!(recorder.values(), vec![Value::from(7)]);
    let view = sim.inspect(listener).unwrap();
    assert_eq!(view.binding("what"), Some(&Value::from(7)));
    assert_eq!(view.status, EntityStatus::Halted(HaltReason::Finished));
}

#[test]
fn test_arity_mismatch_never_matches() {
    let mut sim = Simulation::new();
    sim.spawn(
        "Listener",
        vec![Action::Listen(Pattern::new("pair", vec![Slot::Any, Slot::Any]))],
    )
    .unwrap();
    sim.spawn("Sender", vec![Action::transmit("pair", vec![Expr::num(1)])])
        .unwrap();

    assert!(matches!(sim.run(), Err(SimError::Deadlock { .. })));
}

#[test]
fn test_nested_tag_equality() {
    let planet = |n| Expr::tag("planet", vec![Expr::num(n)]);

    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    sim.spawn(
        "Observer",
        vec![
            Action::Listen(Pattern::new("sighted", vec![Slot::Equals(planet(4))])),
            Action::Trace(Expr::num(4)),
        ],
    )
    .unwrap();
    sim.spawn(
        "Telescope",
        vec![
            Action::transmit("sighted", vec![planet(5)]),
            Action::Wait(Interval::of(1, TimeUnit::Sec)),
            Action::transmit("sighted", vec![planet(4)]),
        ],
    )
    .unwrap();

    sim.run().unwrap();

    let records = recorder.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].at.as_secs(), 1.0);
}

#[test]
fn test_equals_slot_resolved_when_listening() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    sim.spawn(
        "Watcher",
        vec![
            Action::assign("target", Expr::num(1)),
            Action::Listen(Pattern::new("signal", vec![Slot::Equals(Expr::var("target"))])),
            Action::Trace(Expr::var("target")),
        ],
    )
    .unwrap();
    sim.spawn(
        "Signaller",
        vec![
            Action::transmit("signal", vec![Expr::num(2)]),
            Action::transmit("signal", vec![Expr::num(1)]),
        ],
    )
    .unwrap();

    sim.run().unwrap();
    assert_eq!(recorder.values(), vec![Value::from(1)]);
}

// ============================================================================
// Muster scenario
// ============================================================================

#[test]
fn test_muster_scenario() {
    let mut sim = Simulation::new();
    let recorder = recording(&mut sim);
    let events = watch_events(&mut sim);
    let ids = scenarios::muster(3).install(&mut sim).unwrap();
    let herald = ids[0];

    let report = sim.run().unwrap();
    assert!(!report.halted_globally);
    assert_eq!(report.faults, 0);

    let day = 86_400.0;
    let records = recorder.records();
    assert_eq!(records.len(), 3);
    for (rank, record) in (1..=3).zip(&records) {
        let vassal = ids[rank as usize];
        assert_eq!(record.entity, vassal);
        assert_eq!(record.at.as_secs(), day + 3600.0 * rank as f64);
        assert_eq!(
            record.value,
            Value::tag("ready", vec![Value::EntityRef(vassal), Value::from(rank)])
        );
        let view = sim.inspect(vassal).unwrap();
        assert_eq!(view.binding("liege"), Some(&Value::EntityRef(herald)));
    }

    let events = events.borrow();
    assert_eq!(events[0], ("muster".to_string(), ids[1..].to_vec()));
    // Nobody listens for the answers
    assert!(events[1..].iter().all(|(tag, woken)| tag == "ready" && woken.is_empty()));
    assert_eq!(
        sim.inspect(herald).unwrap().status,
        EntityStatus::Halted(HaltReason::Requested)
    );
}
