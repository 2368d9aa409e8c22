//! Simulation context
//!
//! The aggregate root an embedding program drives: entity registry, event
//! bus, scheduler, global bindings and output sinks. All interaction between
//! entities goes through here, by id.

use ahash::AHashMap;
use std::sync::Arc;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::time::Instant;
use crate::core::types::EntityId;
use crate::entity::{resolve, Effect, Entity, EntityView, HaltReason, Step};
use crate::events::{Event, EventBus, ListenPattern};
use crate::scheduler::Scheduler;
use crate::script::{Method, Script, Value};
use crate::simulation::report::{Fault, RunReport};
use crate::simulation::scope::EntityScope;
use crate::simulation::sinks::{EventSink, TraceRecord, TraceSink, ValueSink};

/// A deterministic timeline of cooperating entities
///
/// Single-threaded: one entity executes at a time, and entities resumed at
/// the same instant run in the order their resumptions were enqueued.
pub struct Simulation {
    config: SimulationConfig,
    scheduler: Scheduler,
    bus: EventBus,
    /// Indexed by `EntityId`; ids are dense and assigned in spawn order
    entities: Vec<Entity>,
    globals: AHashMap<Arc<str>, Value>,
    methods: AHashMap<Arc<str>, Method>,
    faults: Vec<Fault>,
    halted_at: Option<Instant>,
    value_sink: Option<ValueSink>,
    trace_sink: Option<TraceSink>,
    event_sink: Option<EventSink>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config,
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            entities: Vec::new(),
            globals: AHashMap::new(),
            methods: AHashMap::new(),
            faults: Vec::new(),
            halted_at: None,
            value_sink: None,
            trace_sink: None,
            event_sink: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current simulated time
    pub fn now(&self) -> Instant {
        self.scheduler.now()
    }

    /// Number of live resumptions
    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    /// Time of the `Halt(All)` that stopped the simulation, if any
    pub fn halted_at(&self) -> Option<Instant> {
        self.halted_at
    }

    /// Entity-local failures recorded so far, in occurrence order
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    // === SINKS ===

    /// Receive one call per executed `Trace`, in execution order
    ///
    /// Replaces an earlier `trace_sink`; a `trace_records` sink keeps
    /// receiving alongside it.
    pub fn trace_sink(&mut self, sink: impl FnMut(EntityId, Value) + 'static) {
        self.value_sink = Some(Box::new(sink));
    }

    /// Like `trace_sink`, with the simulated time of each trace
    ///
    /// Replaces an earlier `trace_records` sink; a `trace_sink` keeps
    /// receiving alongside it.
    pub fn trace_records(&mut self, sink: impl FnMut(&TraceRecord) + 'static) {
        self.trace_sink = Some(Box::new(sink));
    }

    /// Receive every transmitted event with the ids it woke
    pub fn event_sink(&mut self, sink: impl FnMut(&Event, &[EntityId]) + 'static) {
        self.event_sink = Some(Box::new(sink));
    }

    // === REGISTRY ===

    /// Create an entity `Ready` at the current instant
    ///
    /// Fails with `SimulationHalted` after a global halt, and with
    /// `DuplicateName` when `unique_names` is set and the name is taken.
    pub fn spawn(&mut self, name: impl Into<Arc<str>>, script: impl Into<Script>) -> Result<EntityId> {
        if self.halted_at.is_some() {
            return Err(SimError::SimulationHalted);
        }
        let name = name.into();
        if self.config.unique_names && self.find(&name).is_some() {
            return Err(SimError::DuplicateName(name.to_string()));
        }

        let id = EntityId::new(self.entities.len() as u64);
        let now = self.now();
        self.entities.push(Entity::new(id, name.clone(), script.into(), now));
        self.scheduler.schedule(id, now);

        if self.config.bind_entity_names {
            self.globals.insert(name.clone(), Value::EntityRef(id));
        }

        tracing::debug!(entity = %id, name = %name, at = %now, "Entity spawned");
        Ok(id)
    }

    /// Bind a global name visible to every entity's expressions
    pub fn set_global(&mut self, name: impl Into<Arc<str>>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Register a global method callable from every script
    ///
    /// Replaces any method already defined under `name`.
    pub fn define_method(&mut self, name: impl Into<Arc<str>>, method: Method) {
        let name = name.into();
        tracing::debug!(method = %name, params = method.arity(), "Method defined");
        self.methods.insert(name, method);
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// First entity (lowest id) with this name
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|entity| entity.name() == name)
            .map(Entity::id)
    }

    /// All entity ids in spawn order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(Entity::id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        usize::try_from(id.index())
            .ok()
            .and_then(|index| self.entities.get(index))
    }

    /// Read-only snapshot of an entity's status, bindings and cursor
    pub fn inspect(&self, id: EntityId) -> Result<EntityView> {
        self.entity(id)
            .map(EntityView::from)
            .ok_or(SimError::UnknownEntityReference(id))
    }

    /// Entities currently blocked on a listen pattern, in id order
    pub fn blocked(&self) -> Vec<EntityId> {
        self.bus.blocked().collect()
    }

    /// The pattern an entity is blocked on
    pub fn listening(&self, id: EntityId) -> Option<&ListenPattern> {
        self.bus.listener(id)
    }

    /// True when no entity has a pending resumption
    pub fn is_quiescent(&self) -> bool {
        self.scheduler.is_empty()
    }

    /// An independent copy of the timeline state
    ///
    /// Sinks and recorded faults are not carried over. Use this to analyse or
    /// step a copy while the original keeps running.
    pub fn fork(&self) -> Simulation {
        Simulation {
            config: self.config.clone(),
            scheduler: self.scheduler.clone(),
            bus: self.bus.clone(),
            entities: self.entities.clone(),
            globals: self.globals.clone(),
            methods: self.methods.clone(),
            faults: Vec::new(),
            halted_at: self.halted_at,
            value_sink: None,
            trace_sink: None,
            event_sink: None,
        }
    }

    // === DRIVING ===

    /// Run one scheduler step
    ///
    /// Pops the earliest resumption and runs its entity until it suspends or
    /// halts. Returns `Ok(false)` on clean quiescence and `Deadlock` when
    /// quiescent with entities still blocked.
    pub fn step(&mut self) -> Result<bool> {
        let Some(next) = self.scheduler.pop() else {
            return self.quiescent();
        };

        tracing::trace!(entity = %next.entity, at = %next.at, seq = next.seq, "Resuming entity");
        self.run_entity(next.entity);
        Ok(true)
    }

    /// Step until quiescent, the step limit, or the configured horizon
    pub fn run(&mut self) -> Result<RunReport> {
        match self.config.horizon() {
            Some(horizon) => self.run_until(horizon),
            None => self.drive(None),
        }
    }

    /// Step while the next resumption is due at or before `limit`, then move
    /// the clock to `limit`
    pub fn run_until(&mut self, limit: Instant) -> Result<RunReport> {
        let report = self.drive(Some(limit))?;
        self.scheduler.advance_to(limit);
        Ok(RunReport {
            final_time: self.now(),
            ..report
        })
    }

    fn drive(&mut self, limit: Option<Instant>) -> Result<RunReport> {
        let start_steps = self.scheduler.steps();
        let mut truncated = false;

        loop {
            if let Some(max) = self.config.max_steps {
                if self.scheduler.steps() - start_steps >= max && !self.is_quiescent() {
                    truncated = true;
                    break;
                }
            }
            if let (Some(limit), Some(due)) = (limit, self.scheduler.peek_time()) {
                if due > limit {
                    truncated = true;
                    break;
                }
            }
            if !self.step()? {
                break;
            }
        }

        let report = RunReport {
            steps: self.scheduler.steps() - start_steps,
            final_time: self.now(),
            halted_globally: self.halted_at.is_some(),
            truncated,
            faults: self.faults.len(),
        };
        tracing::info!(steps = report.steps, final_time = %report.final_time, "Run finished");
        Ok(report)
    }

    fn quiescent(&self) -> Result<bool> {
        if self.bus.is_empty() {
            return Ok(false);
        }
        let blocked = self.blocked();
        tracing::warn!(at = %self.now(), blocked = blocked.len(), "Deadlock detected");
        Err(SimError::Deadlock {
            at: self.now(),
            blocked,
        })
    }

    /// Execute `id`'s actions until it suspends or halts
    ///
    /// Zero-time actions never yield back to the scheduler loop.
    fn run_entity(&mut self, id: EntityId) {
        let Ok(index) = usize::try_from(id.index()) else {
            return;
        };
        match self.entities.get_mut(index) {
            Some(entity) => entity.resume(),
            None => return,
        }

        loop {
            let now = self.now();
            let step = {
                let me = &self.entities[index];
                let scope = EntityScope {
                    me,
                    entities: &self.entities,
                    globals: &self.globals,
                    methods: &self.methods,
                };
                resolve(me.current_action(), &scope, now).and_then(|step| {
                    let limit = self.config.max_call_depth;
                    match step {
                        Step::Call { .. } if me.call_depth() >= limit => {
                            Err(SimError::CallDepthExceeded { entity: id, limit })
                        }
                        step => Ok(step),
                    }
                })
            };

            let step = match step {
                Ok(step) => step,
                Err(error) => {
                    self.fault(id, error);
                    return;
                }
            };

            let effect = self.entities[index].apply(step);
            match effect {
                Effect::Continue => {}
                Effect::Trace(value) => self.emit_trace(id, value),
                Effect::Transmit { tag, payload } => {
                    self.transmit(Event::new(tag, payload, id, now));
                }
                Effect::Spawn { name, script } => {
                    if let Err(error) = self.spawn(name, script) {
                        self.fault(id, error);
                        return;
                    }
                }
                Effect::Define { name, method } => self.define_method(name, method),
                Effect::Suspend { until } => {
                    self.scheduler.schedule(id, until);
                    tracing::trace!(entity = %id, until = %until, "Entity waiting");
                    return;
                }
                Effect::Block(pattern) => {
                    self.scheduler.cancel(id);
                    tracing::trace!(entity = %id, tag = %pattern.tag, "Entity blocked");
                    self.bus.listen(id, pattern);
                    return;
                }
                Effect::Halted => {
                    self.scheduler.cancel(id);
                    tracing::debug!(entity = %id, at = %now, "Entity halted");
                    return;
                }
                Effect::HaltAll => {
                    self.halt_all(id);
                    return;
                }
            }
        }
    }

    fn emit_trace(&mut self, entity: EntityId, value: Value) {
        let record = TraceRecord {
            at: self.now(),
            entity,
            value,
        };
        if self.config.log_traces {
            tracing::info!(entity = %entity, at = %record.at, "trace {}", record.value);
        }
        if let Some(sink) = self.value_sink.as_mut() {
            sink(entity, record.value.clone());
        }
        if let Some(sink) = self.trace_sink.as_mut() {
            sink(&record);
        }
    }

    /// Deliver to every matching listener at the current instant
    ///
    /// Woken listeners are enqueued in entity-id order. Never blocks the
    /// sender and never fails.
    fn transmit(&mut self, event: Event) {
        let deliveries = self.bus.deliver(&event);
        let mut woken = Vec::with_capacity(deliveries.len());

        for delivery in deliveries {
            let Some(listener) = usize::try_from(delivery.entity.index())
                .ok()
                .and_then(|index| self.entities.get_mut(index))
            else {
                continue;
            };
            listener.wake(delivery.captures);
            self.scheduler.schedule(delivery.entity, event.at);
            woken.push(delivery.entity);
        }

        tracing::debug!(
            tag = %event.tag,
            origin = %event.origin,
            at = %event.at,
            woken = woken.len(),
            "Event transmitted"
        );
        if let Some(sink) = self.event_sink.as_mut() {
            sink(&event, &woken);
        }
    }

    /// Stop everything immediately; no entity runs another action
    fn halt_all(&mut self, by: EntityId) {
        let now = self.now();
        self.scheduler.drain();
        self.bus.clear();
        for entity in self.entities.iter_mut() {
            entity.halt(HaltReason::Interrupted { by });
        }
        self.halted_at = Some(now);
        tracing::info!(by = %by, at = %now, "Global halt");
    }

    fn fault(&mut self, entity: EntityId, error: SimError) {
        let now = self.now();
        if error.is_entity_local() {
            tracing::warn!(entity = %entity, at = %now, error = %error, "Entity faulted");
        } else {
            tracing::error!(entity = %entity, at = %now, error = %error, "Entity action rejected by the context");
        }

        self.scheduler.cancel(entity);
        self.bus.unlisten(entity);
        if let Some(target) = usize::try_from(entity.index())
            .ok()
            .and_then(|index| self.entities.get_mut(index))
        {
            target.halt(HaltReason::Faulted {
                message: error.to_string(),
            });
        }
        self.faults.push(Fault {
            entity,
            at: now,
            error,
        });
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
