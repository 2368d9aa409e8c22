//! Canned timelines used by the CLI, the integration tests and the benchmark

use std::sync::Arc;

use crate::core::error::Result;
use crate::core::time::{Interval, TimeUnit};
use crate::core::types::EntityId;
use crate::script::{Action, Expr, HaltScope, Pattern, Script, Slot, Value};
use crate::simulation::Simulation;

/// Global bindings plus entities to spawn, in order
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub globals: Vec<(Arc<str>, Value)>,
    pub entities: Vec<(Arc<str>, Script)>,
}

impl Scenario {
    /// Bind the globals and spawn every entity, returning ids in spawn order
    pub fn install(&self, sim: &mut Simulation) -> Result<Vec<EntityId>> {
        for (name, value) in &self.globals {
            sim.set_global(name.clone(), value.clone());
        }
        self.entities
            .iter()
            .map(|(name, script)| sim.spawn(name.clone(), script.clone()))
            .collect()
    }

    /// Every entity rendered as a `spawn Name do ... done` block
    pub fn pretty_print(&self) -> String {
        let spawns: Script = self
            .entities
            .iter()
            .map(|(name, script)| Action::spawn(name.clone(), script.clone()))
            .collect();
        spawns.pretty_print()
    }
}

/// Look up a built-in scenario by CLI name
pub fn by_name(name: &str) -> Option<Scenario> {
    match name {
        "mars" => Some(mars_arrival()),
        "muster" => Some(muster(5)),
        _ => None,
    }
}

pub fn names() -> &'static [&'static str] {
    &["mars", "muster"]
}

/// Mars travels for an hour, traces `foo` and announces its arrival; Earth
/// waits for the announcement and stops the timeline.
pub fn mars_arrival() -> Scenario {
    let mars = Script::from(vec![
        Action::Wait(Interval::of(1, TimeUnit::Hour)),
        Action::Trace(Expr::var("foo")),
        Action::transmit("arrived", vec![Expr::var("Mars")]),
    ]);
    let earth = Script::from(vec![
        Action::Listen(Pattern::new("arrived", vec![Slot::Equals(Expr::var("Mars"))])),
        Action::Halt(HaltScope::All),
    ]);

    Scenario {
        name: "mars",
        globals: vec![("foo".into(), Value::from(2))],
        entities: vec![("Mars".into(), mars), ("Earth".into(), earth)],
    }
}

/// A herald calls `vassals` lords to muster after a day; each answers after
/// a delay proportional to its rank.
pub fn muster(vassals: u32) -> Scenario {
    let herald = Script::from(vec![
        Action::Wait(Interval::of(1, TimeUnit::Day)),
        Action::transmit("muster", vec![Expr::Myself]),
        Action::Halt(HaltScope::Myself),
    ]);

    let mut entities = vec![(Arc::from("Herald"), herald)];
    for rank in 1..=vassals {
        let vassal = Script::from(vec![
            Action::assign("rank", Expr::num(rank as i32)),
            Action::Listen(Pattern::new("muster", vec![Slot::capture("liege")])),
            Action::Wait(Interval::of(rank, TimeUnit::Hour)),
            Action::Trace(Expr::tag("ready", vec![Expr::Myself, Expr::var("rank")])),
            Action::transmit("ready", vec![Expr::Myself, Expr::var("liege")]),
        ]);
        entities.push((Arc::from(format!("Vassal {}", rank)), vassal));
    }

    Scenario {
        name: "muster",
        globals: Vec::new(),
        entities,
    }
}
