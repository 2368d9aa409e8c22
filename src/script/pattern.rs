//! Listen patterns as written in scripts

use std::sync::Arc;

use crate::core::error::Result;
use crate::events::{ListenPattern, SlotMatcher};
use crate::script::expr::{Expr, Scope};

/// One payload position of a pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Matches anything
    Any,
    /// Matches anything and binds it to a local name on delivery
    Capture(Arc<str>),
    /// Matches a value equal to the expression, evaluated when `Listen` runs
    Equals(Expr),
}

/// `#tag(slot, ...)` awaiting events
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub tag: Arc<str>,
    pub slots: Vec<Slot>,
}

impl Pattern {
    pub fn new(tag: impl Into<Arc<str>>, slots: Vec<Slot>) -> Self {
        Self {
            tag: tag.into(),
            slots,
        }
    }

    /// Pattern matching any event with this tag and an empty payload
    pub fn bare(tag: impl Into<Arc<str>>) -> Self {
        Self::new(tag, Vec::new())
    }

    /// Evaluate `Equals` slots against the listener's scope
    pub fn resolve(&self, scope: &dyn Scope) -> Result<ListenPattern> {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                Ok(match slot {
                    Slot::Any => SlotMatcher::Any,
                    Slot::Capture(name) => SlotMatcher::Capture(name.clone()),
                    Slot::Equals(expr) => SlotMatcher::Equals(expr.eval(scope)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ListenPattern {
            tag: self.tag.clone(),
            slots,
        })
    }
}

impl Slot {
    pub fn capture(name: impl Into<Arc<str>>) -> Self {
        Slot::Capture(name.into())
    }
}

impl From<Expr> for Slot {
    fn from(expr: Expr) -> Self {
        Slot::Equals(expr)
    }
}
