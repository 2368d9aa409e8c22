//! Actions and the immutable scripts built from them

use std::sync::Arc;

use crate::core::time::Interval;
use crate::script::expr::Expr;
use crate::script::pattern::Pattern;

/// Which entities a `Halt` stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltScope {
    /// Only the issuing entity
    Myself,
    /// Every entity; the simulation stops at once
    All,
}

/// One step of an entity's script
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Suspend for a span of simulated time
    Wait(Interval),
    /// Evaluate and hand the result to the trace sink
    Trace(Expr),
    /// Broadcast `#tag(payload...)` at the current instant
    Transmit { tag: Arc<str>, payload: Vec<Expr> },
    /// Block until a matching event is delivered
    Listen(Pattern),
    Halt(HaltScope),
    /// Update a local binding
    Assign { name: Arc<str>, value: Expr },
    /// Start a new entity at the current instant
    Spawn { name: Arc<str>, script: Script },
    /// Register a global method, replacing any earlier one with this name
    Define { name: Arc<str>, method: Method },
    /// Run a global method with its parameters bound to `args`
    Call { name: Arc<str>, args: Vec<Expr> },
    /// Leave the current method and resume the caller
    Return,
}

impl Action {
    pub fn transmit(tag: impl Into<Arc<str>>, payload: Vec<Expr>) -> Self {
        Action::Transmit {
            tag: tag.into(),
            payload,
        }
    }

    pub fn assign(name: impl Into<Arc<str>>, value: Expr) -> Self {
        Action::Assign {
            name: name.into(),
            value,
        }
    }

    pub fn spawn(name: impl Into<Arc<str>>, script: impl Into<Script>) -> Self {
        Action::Spawn {
            name: name.into(),
            script: script.into(),
        }
    }

    pub fn define(name: impl Into<Arc<str>>, method: Method) -> Self {
        Action::Define {
            name: name.into(),
            method,
        }
    }

    pub fn call(name: impl Into<Arc<str>>, args: Vec<Expr>) -> Self {
        Action::Call {
            name: name.into(),
            args,
        }
    }
}

/// A named subroutine shared by every entity
///
/// The body runs in its own frame: parameters and assignments are local to
/// the call, and names it does not bind resolve to globals. Running off the
/// end of the body returns like `Return`.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    params: Arc<[Arc<str>]>,
    script: Script,
}

impl Method {
    pub fn new<P: Into<Arc<str>>>(
        params: impl IntoIterator<Item = P>,
        script: impl Into<Script>,
    ) -> Self {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            script: script.into(),
        }
    }

    pub fn params(&self) -> &[Arc<str>] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

/// An entity's ordered, immutable action sequence
///
/// Cheap to clone; entities spawned from the same script share it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub(crate) body: Arc<[Action]>,
}

impl Script {
    pub fn new(body: impl Into<Arc<[Action]>>) -> Self {
        Self { body: body.into() }
    }

    pub fn get(&self, cursor: usize) -> Option<&Action> {
        self.body.get(cursor)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.body
    }
}

impl From<Vec<Action>> for Script {
    fn from(body: Vec<Action>) -> Self {
        Script::new(body)
    }
}

impl FromIterator<Action> for Script {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Script::new(iter.into_iter().collect::<Vec<_>>())
    }
}
