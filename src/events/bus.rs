//! Event Bus
//!
//! A routing table from blocked entities to the pattern each one awaits. The
//! bus has no thread of control of its own: the simulation context calls
//! `deliver` synchronously at the instant an event is transmitted.

use std::collections::BTreeMap;

use crate::core::types::EntityId;
use crate::events::pattern::{Captures, ListenPattern};
use crate::events::Event;

/// A listener woken by an event
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub entity: EntityId,
    pub captures: Captures,
}

/// Routing table of blocked listeners
///
/// Keyed by `EntityId` in a `BTreeMap` so fan-out always happens in
/// entity-id order.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    listeners: BTreeMap<EntityId, ListenPattern>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entity` as blocked on `pattern`, replacing any earlier
    /// registration
    pub fn listen(&mut self, entity: EntityId, pattern: ListenPattern) {
        self.listeners.insert(entity, pattern);
    }

    pub fn unlisten(&mut self, entity: EntityId) -> Option<ListenPattern> {
        self.listeners.remove(&entity)
    }

    pub fn listener(&self, entity: EntityId) -> Option<&ListenPattern> {
        self.listeners.get(&entity)
    }

    /// Deliver an event to every matching listener
    ///
    /// Matched listeners are removed (each consumes the event) and returned
    /// in entity-id order. Unmatched events are dropped.
    pub fn deliver(&mut self, event: &Event) -> Vec<Delivery> {
        let deliveries: Vec<Delivery> = self
            .listeners
            .iter()
            .filter_map(|(&entity, pattern)| {
                pattern
                    .matches(event)
                    .map(|captures| Delivery { entity, captures })
            })
            .collect();

        for delivery in &deliveries {
            self.listeners.remove(&delivery.entity);
        }

        deliveries
    }

    /// Blocked entities in id order
    pub fn blocked(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.listeners.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
