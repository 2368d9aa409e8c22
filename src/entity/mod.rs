//! Entities: named actors executing a fixed script
//!
//! An entity is a small state machine driven by the simulation context one
//! step at a time:
//!
//! - `Ready` runs its current action
//! - `Wait(d)` moves it to `Waiting(now + d)`
//! - `Listen(p)` moves it to `Blocked(p)` until the bus delivers a match
//! - `Halt`, a fault, or running off the end of the script moves it to
//!   `Halted`, which is terminal
//!
//! Everything else (`Trace`, `Transmit`, `Assign`, `Spawn`, `Define`,
//! `Call`, `Return`) takes zero simulated time and leaves it `Ready` at the
//! next action.
//!
//! `Call` pushes a frame running the method's script; `Return`, or running
//! off the end of that script, pops it and the caller carries on after its
//! `Call`.

pub mod status;
pub mod step;
pub mod view;

use ahash::AHashMap;
use std::sync::Arc;

use crate::core::time::Instant;
use crate::core::types::EntityId;
use crate::events::pattern::Captures;
use crate::script::{Action, HaltScope, Method, Script, Value};

pub use status::{EntityStatus, HaltReason};
pub use step::{resolve, Effect, Step};
pub use view::EntityView;

/// A method invocation in progress
#[derive(Debug, Clone)]
struct Frame {
    method: Arc<str>,
    script: Script,
    cursor: usize,
    locals: AHashMap<Arc<str>, Value>,
}

/// A named actor with local bindings and a cursor into its script
///
/// Owned by the simulation context. Entities never hold references to each
/// other; they refer to one another through `Value::EntityRef`.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    name: Arc<str>,
    script: Script,
    cursor: usize,
    bindings: AHashMap<Arc<str>, Value>,
    calls: Vec<Frame>,
    status: EntityStatus,
    spawned_at: Instant,
}

impl Entity {
    /// A new entity, `Ready` at script position 0
    pub fn new(id: EntityId, name: impl Into<Arc<str>>, script: Script, spawned_at: Instant) -> Self {
        Self {
            id,
            name: name.into(),
            script,
            cursor: 0,
            bindings: AHashMap::new(),
            calls: Vec::new(),
            status: EntityStatus::Ready,
            spawned_at,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Position in the entity's own script; method frames keep their own
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> &EntityStatus {
        &self.status
    }

    pub fn spawned_at(&self) -> Instant {
        self.spawned_at
    }

    pub fn is_halted(&self) -> bool {
        self.status.is_halted()
    }

    /// Number of method calls in progress
    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    /// Names of the methods in progress, outermost first
    pub fn call_stack(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().map(|frame| &*frame.method)
    }

    /// An entity-level binding, as other entities see it through `Field`
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Entity-level bindings in no particular order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (&**name, value))
    }

    /// A binding of the innermost frame: call locals inside a method,
    /// entity bindings otherwise
    pub fn local(&self, name: &str) -> Option<&Value> {
        match self.calls.last() {
            Some(frame) => frame.locals.get(name),
            None => self.bindings.get(name),
        }
    }

    /// The action the innermost frame points at; `None` past its end
    pub fn current_action(&self) -> Option<&Action> {
        match self.calls.last() {
            Some(frame) => frame.script.get(frame.cursor),
            None => self.script.get(self.cursor),
        }
    }

    /// Apply a resolved step and report what the context must do next
    ///
    /// Only valid while `Ready`; a halted entity ignores every step.
    pub fn apply(&mut self, step: Step) -> Effect {
        if self.is_halted() {
            return Effect::Halted;
        }
        debug_assert!(
            self.status == EntityStatus::Ready,
            "Step applied to a suspended entity"
        );

        match step {
            Step::Wait { until } => {
                self.advance();
                self.status = EntityStatus::Waiting { until };
                Effect::Suspend { until }
            }
            Step::Trace(value) => {
                self.advance();
                Effect::Trace(value)
            }
            Step::Transmit { tag, payload } => {
                self.advance();
                Effect::Transmit { tag, payload }
            }
            Step::Listen(pattern) => {
                self.advance();
                self.status = EntityStatus::Blocked {
                    pattern: pattern.clone(),
                };
                Effect::Block(pattern)
            }
            Step::Assign { name, value } => {
                self.advance();
                self.set_local(name, value);
                Effect::Continue
            }
            Step::Spawn { name, script } => {
                self.advance();
                Effect::Spawn { name, script }
            }
            Step::Define { name, method } => {
                self.advance();
                Effect::Define { name, method }
            }
            Step::Call { name, method, args } => {
                self.advance();
                self.enter(name, method, args);
                Effect::Continue
            }
            Step::Halt(scope) => {
                self.advance();
                self.status = EntityStatus::Halted(HaltReason::Requested);
                match scope {
                    HaltScope::Myself => Effect::Halted,
                    HaltScope::All => Effect::HaltAll,
                }
            }
            Step::Return => {
                if self.calls.is_empty() {
                    self.advance();
                }
                self.leave()
            }
            Step::Finish => self.leave(),
        }
    }

    /// `Waiting` → `Ready` when the scheduler pops its resumption
    pub fn resume(&mut self) {
        if self.status.is_waiting() {
            self.status = EntityStatus::Ready;
        }
    }

    /// `Blocked` → `Ready` on delivery of a matching event, binding any
    /// captured payload values in the innermost frame
    pub fn wake(&mut self, captures: Captures) {
        if !self.status.is_blocked() {
            return;
        }
        for (name, value) in captures {
            self.set_local(name, value);
        }
        self.status = EntityStatus::Ready;
    }

    /// Force the terminal state; no-op if already halted
    pub fn halt(&mut self, reason: HaltReason) {
        if !self.is_halted() {
            self.status = EntityStatus::Halted(reason);
        }
    }

    /// Pop the innermost call, or finish the entity outside any call
    fn leave(&mut self) -> Effect {
        if self.calls.pop().is_some() {
            return Effect::Continue;
        }
        self.status = EntityStatus::Halted(HaltReason::Finished);
        Effect::Halted
    }

    fn advance(&mut self) {
        match self.calls.last_mut() {
            Some(frame) => frame.cursor += 1,
            None => self.cursor += 1,
        }
    }

    fn set_local(&mut self, name: Arc<str>, value: Value) {
        match self.calls.last_mut() {
            Some(frame) => frame.locals.insert(name, value),
            None => self.bindings.insert(name, value),
        };
    }

    fn enter(&mut self, name: Arc<str>, method: Method, args: Vec<Value>) {
        let locals = method.params().iter().cloned().zip(args).collect();
        self.calls.push(Frame {
            method: name,
            script: method.script().clone(),
            cursor: 0,
            locals,
        });
    }
}
