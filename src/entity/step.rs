//! Resolving a script action into a concrete step
//!
//! Evaluation needs read access to the whole context (globals, other
//! entities' bindings, global methods) while applying a step needs
//! `&mut Entity`. Splitting the two keeps the borrows apart: `resolve` runs
//! against a `Scope`, then `Entity::apply` performs the state transition.

use std::sync::Arc;

use crate::core::error::{Result, SimError};
use crate::core::time::Instant;
use crate::events::ListenPattern;
use crate::script::{eval_all, Action, HaltScope, Method, Scope, Script, Value};

/// An action with every expression evaluated
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Wait { until: Instant },
    Trace(Value),
    Transmit { tag: Arc<str>, payload: Vec<Value> },
    Listen(ListenPattern),
    Halt(HaltScope),
    Assign { name: Arc<str>, value: Value },
    Spawn { name: Arc<str>, script: Script },
    Define { name: Arc<str>, method: Method },
    Call { name: Arc<str>, method: Method, args: Vec<Value> },
    Return,
    /// The cursor is past the end of the current script
    Finish,
}

/// What the context must do after a step was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Zero-time step fully handled by the entity; keep running
    Continue,
    /// Hand the value to the trace sink, then keep running
    Trace(Value),
    /// Route the event through the bus, then keep running
    Transmit { tag: Arc<str>, payload: Vec<Value> },
    /// Start a new entity, then keep running
    Spawn { name: Arc<str>, script: Script },
    /// Register a global method, then keep running
    Define { name: Arc<str>, method: Method },
    /// Entity is waiting; schedule its resumption
    Suspend { until: Instant },
    /// Entity is blocked; register the pattern with the bus
    Block(ListenPattern),
    /// Entity halted itself
    Halted,
    /// Entity halted and requested a global stop
    HaltAll,
}

/// Evaluate the expressions of `action` against `scope` at time `now`
///
/// Fails with `InvalidInterval` when a wait would end past the last finite
/// instant, and with `UnknownMethod` / `ArityMismatch` for a bad call.
pub fn resolve(action: Option<&Action>, scope: &dyn Scope, now: Instant) -> Result<Step> {
    let Some(action) = action else {
        return Ok(Step::Finish);
    };

    Ok(match action {
        Action::Wait(interval) => Step::Wait {
            until: now
                .checked_add(*interval)
                .ok_or(SimError::InvalidInterval(interval.as_secs()))?,
        },
        Action::Trace(expr) => Step::Trace(expr.eval(scope)?),
        Action::Transmit { tag, payload } => Step::Transmit {
            tag: tag.clone(),
            payload: eval_all(payload, scope)?,
        },
        Action::Listen(pattern) => Step::Listen(pattern.resolve(scope)?),
        Action::Halt(halt) => Step::Halt(*halt),
        Action::Assign { name, value } => Step::Assign {
            name: name.clone(),
            value: value.eval(scope)?,
        },
        Action::Spawn { name, script } => Step::Spawn {
            name: name.clone(),
            script: script.clone(),
        },
        Action::Define { name, method } => Step::Define {
            name: name.clone(),
            method: method.clone(),
        },
        Action::Call { name, args } => {
            let method = scope
                .method(name)
                .ok_or_else(|| SimError::UnknownMethod(name.to_string()))?;
            if method.arity() != args.len() {
                return Err(SimError::ArityMismatch {
                    method: name.to_string(),
                    expected: method.arity(),
                    found: args.len(),
                });
            }
            Step::Call {
                name: name.clone(),
                method,
                args: eval_all(args, scope)?,
            }
        }
        Action::Return => Step::Return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EntityId;
    use crate::script::expr::tests::TestScope;
    use crate::core::time::{Interval, TimeUnit};
    use crate::script::{Expr, Pattern, Slot};

    #[test]
    fn test_resolve_end_of_script() {
        let scope = TestScope::new(0);
        assert_eq!(resolve(None, &scope, Instant::epoch()).unwrap(), Step::Finish);
    }

    #[test]
    fn test_resolve_transmit_uses_current_bindings() {
        let mut scope = TestScope::new(0);
        scope.locals.insert("fuel".into(), Value::from(40));

        let action = Action::transmit("status", vec![Expr::Myself, Expr::var("fuel")]);
        let step = resolve(Some(&action), &scope, Instant::epoch()).unwrap();
        assert_eq!(
            step,
            Step::Transmit {
                tag: "status".into(),
                payload: vec![Value::EntityRef(EntityId(0)), Value::from(40)],
            }
        );
    }

    #[test]
    fn test_resolve_listen_evaluates_pattern() {
        let mut scope = TestScope::new(1);
        scope.locals.insert("Mars".into(), Value::EntityRef(EntityId(0)));

        let action = Action::Listen(Pattern::new("arrived", vec![Slot::Equals(Expr::var("Mars"))]));
        match resolve(Some(&action), &scope, Instant::epoch()).unwrap() {
            Step::Listen(pattern) => assert_eq!(&*pattern.tag, "arrived"),
            other => panic!("Expected Listen step, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_propagates_unbound_variable() {
        let scope = TestScope::new(2);
        let action = Action::Trace(Expr::var("foo"));
        assert!(matches!(
            resolve(Some(&action), &scope, Instant::epoch()),
            Err(SimError::UnboundVariable { .. })
        ));
    }

    #[test]
    fn test_resolve_wait_computes_deadline() {
        let scope = TestScope::new(0);
        let action = Action::Wait(Interval::of(1, TimeUnit::Hour));
        let now = Instant::from_secs(60.0).unwrap();
        assert_eq!(
            resolve(Some(&action), &scope, now).unwrap(),
            Step::Wait { until: Instant::from_secs(3660.0).unwrap() }
        );
    }

    #[test]
    fn test_resolve_wait_rejects_overflow() {
        let scope = TestScope::new(0);
        let action = Action::Wait(Interval::try_from_secs(f64::MAX).unwrap());
        let now = Instant::from_secs(f64::MAX).unwrap();
        assert!(matches!(
            resolve(Some(&action), &scope, now),
            Err(SimError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_resolve_call_binds_method_and_args() {
        let mut scope = TestScope::new(0);
        let method = Method::new(["what"], vec![Action::Trace(Expr::var("what"))]);
        scope.methods.insert("report".into(), method.clone());

        let action = Action::call("report", vec![Expr::num(3)]);
        assert_eq!(
            resolve(Some(&action), &scope, Instant::epoch()).unwrap(),
            Step::Call {
                name: "report".into(),
                method,
                args: vec![Value::from(3)],
            }
        );
    }

    #[test]
    fn test_resolve_call_errors() {
        let mut scope = TestScope::new(0);
        let unknown = Action::call("report", vec![]);
        assert!(matches!(
            resolve(Some(&unknown), &scope, Instant::epoch()),
            Err(SimError::UnknownMethod(name)) if name == "report"
        ));

        scope
            .methods
            .insert("report".into(), Method::new(["what"], Vec::<Action>::new()));
        match resolve(Some(&unknown), &scope, Instant::epoch()) {
            Err(SimError::ArityMismatch { expected, found, .. }) => {
                assert_eq!((expected, found), (1, 0));
            }
            other => panic!("Expected ArityMismatch, got {:?}", other),
        }
    }
}
