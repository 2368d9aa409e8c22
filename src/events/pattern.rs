//! Resolved listen patterns and the matching rule

use serde::Serialize;
use std::sync::Arc;

use crate::events::Event;
use crate::script::value::Value;

/// A pattern slot after its expression has been evaluated
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SlotMatcher {
    Any,
    Capture(Arc<str>),
    Equals(Value),
}

/// What a blocked entity is waiting for
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListenPattern {
    pub tag: Arc<str>,
    pub slots: Vec<SlotMatcher>,
}

/// Bindings produced by `Capture` slots, in slot order
pub type Captures = Vec<(Arc<str>, Value)>;

impl ListenPattern {
    /// Match an event, returning the captured bindings on success
    ///
    /// Tags must be equal and arities must agree. An arity mismatch is not an
    /// error; the pattern simply never matches events of that shape.
    pub fn matches(&self, event: &Event) -> Option<Captures> {
        if self.tag != event.tag || self.slots.len() != event.arity() {
            return None;
        }

        let mut captures = Vec::new();
        for (slot, value) in self.slots.iter().zip(event.payload.iter()) {
            match slot {
                SlotMatcher::Any => {}
                SlotMatcher::Capture(name) => captures.push((name.clone(), value.clone())),
                SlotMatcher::Equals(expected) => {
                    if expected != value {
                        return None;
                    }
                }
            }
        }

        Some(captures)
    }
}
