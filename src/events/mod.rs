//! Events and the bus that routes them to blocked listeners

pub mod bus;
pub mod pattern;

use serde::Serialize;
use std::sync::Arc;

use crate::core::time::Instant;
use crate::core::types::EntityId;
use crate::script::value::Value;

pub use bus::{Delivery, EventBus};
pub use pattern::{ListenPattern, SlotMatcher};

/// A transmitted event
///
/// Lives only for the instant of its delivery; the bus keeps no backlog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    pub tag: Arc<str>,
    pub payload: Arc<[Value]>,
    pub origin: EntityId,
    pub at: Instant,
}

impl Event {
    pub fn new(
        tag: impl Into<Arc<str>>,
        payload: impl Into<Arc<[Value]>>,
        origin: EntityId,
        at: Instant,
    ) -> Self {
        Self {
            tag: tag.into(),
            payload: payload.into(),
            origin,
            at,
        }
    }

    pub fn arity(&self) -> usize {
        self.payload.len()
    }
}
