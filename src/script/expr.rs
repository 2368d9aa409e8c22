//! Expression AST and evaluation against an entity's scope

use std::sync::Arc;

use crate::core::error::{Result, SimError};
use crate::core::types::EntityId;
use crate::script::action::Method;
use crate::script::value::Value;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value
    Const(Value),
    /// A binding, looked up locally first and then globally
    Var(Arc<str>),
    /// Reference to the evaluating entity
    Myself,
    /// A binding of another entity (e.g. `mars.orbit`)
    Field { subject: Box<Expr>, name: Arc<str> },
    /// Builds a `Value::Tag` from evaluated arguments
    Tag { name: Arc<str>, args: Vec<Expr> },
}

/// Name resolution for expression evaluation
///
/// Implemented by the simulation context for the entity currently executing.
pub trait Scope {
    /// The entity the expression is evaluated for
    fn myself(&self) -> EntityId;

    /// Local binding, falling back to global bindings
    fn lookup(&self, name: &str) -> Option<Value>;

    /// A binding of some other entity
    fn field(&self, entity: EntityId, name: &str) -> Result<Value>;

    /// A global method by name
    fn method(&self, name: &str) -> Option<Method>;
}

impl Expr {
    pub fn var(name: impl Into<Arc<str>>) -> Self {
        Expr::Var(name.into())
    }

    pub fn num(value: i32) -> Self {
        Expr::Const(Value::from(value))
    }

    pub fn field(subject: Expr, name: impl Into<Arc<str>>) -> Self {
        Expr::Field {
            subject: Box::new(subject),
            name: name.into(),
        }
    }

    pub fn tag(name: impl Into<Arc<str>>, args: Vec<Expr>) -> Self {
        Expr::Tag {
            name: name.into(),
            args,
        }
    }

    /// Evaluate to a value. Never mutates the scope.
    pub fn eval(&self, scope: &dyn Scope) -> Result<Value> {
        match self {
            Expr::Const(value) => Ok(value.clone()),

            Expr::Var(name) => scope.lookup(name).ok_or_else(|| SimError::UnboundVariable {
                entity: scope.myself(),
                name: name.to_string(),
            }),

            Expr::Myself => Ok(Value::EntityRef(scope.myself())),

            Expr::Field { subject, name } => {
                let subject = subject.eval(scope)?;
                let id = subject.as_entity().ok_or_else(|| SimError::TypeMismatch {
                    expected: "entity",
                    found: subject.kind().to_string(),
                })?;
                scope.field(id, name)
            }

            Expr::Tag { name, args } => {
                let payload = eval_all(args, scope)?;
                Ok(Value::tag(name.clone(), payload))
            }
        }
    }
}

/// Evaluate a list of expressions left to right, stopping at the first error
pub fn eval_all(exprs: &[Expr], scope: &dyn Scope) -> Result<Vec<Value>> {
    exprs.iter().map(|expr| expr.eval(scope)).collect()
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Const(value)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ahash::AHashMap;

    /// Minimal scope: one entity's locals plus a table of other entities
    pub(crate) struct TestScope {
        pub me: EntityId,
        pub locals: AHashMap<String, Value>,
        pub others: AHashMap<EntityId, AHashMap<String, Value>>,
        pub methods: AHashMap<String, Method>,
    }

    impl TestScope {
        pub fn new(me: u64) -> Self {
            Self {
                me: EntityId(me),
                locals: AHashMap::new(),
                others: AHashMap::new(),
                methods: AHashMap::new(),
            }
        }
    }

    impl Scope for TestScope {
        fn myself(&self) -> EntityId {
            self.me
        }

        fn lookup(&self, name: &str) -> Option<Value> {
            self.locals.get(name).cloned()
        }

        fn field(&self, entity: EntityId, name: &str) -> Result<Value> {
            let bindings = self
                .others
                .get(&entity)
                .ok_or(SimError::UnknownEntityReference(entity))?;
            bindings.get(name).cloned().ok_or_else(|| SimError::UnboundVariable {
                entity,
                name: name.to_string(),
            })
        }

        fn method(&self, name: &str) -> Option<Method> {
            self.methods.get(name).cloned()
        }
    }

    #[test]
    fn test_eval_const_and_var() {
        let mut scope = TestScope::new(0);
        scope.locals.insert("foo".into(), Value::from(2));

        assert_eq!(Expr::num(5).eval(&scope).unwrap(), Value::from(5));
        assert_eq!(Expr::var("foo").eval(&scope).unwrap(), Value::from(2));
    }

    #[test]
    fn test_eval_unbound_variable() {
        let scope = TestScope::new(3);
        let err = Expr::var("missing").eval(&scope).unwrap_err();
        match err {
            SimError::UnboundVariable { entity, name } => {
                assert_eq!(entity, EntityId(3));
                assert_eq!(name, "missing");
            }
            other => panic!("Expected UnboundVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_eval_myself() {
        let scope = TestScope::new(8);
        assert_eq!(Expr::Myself.eval(&scope).unwrap(), Value::EntityRef(EntityId(8)));
    }

    #[test]
    fn test_eval_field_of_other_entity() {
        let mut scope = TestScope::new(0);
        let mut mars = AHashMap::new();
        mars.insert("moons".to_string(), Value::from(2));
        scope.others.insert(EntityId(1), mars);
        scope.locals.insert("target".into(), Value::EntityRef(EntityId(1)));

        let expr = Expr::field(Expr::var("target"), "moons");
        assert_eq!(expr.eval(&scope).unwrap(), Value::from(2));
    }

    #[test]
    fn test_eval_field_errors() {
        let mut scope = TestScope::new(0);
        scope.locals.insert("n".into(), Value::from(1));

        let unknown = Expr::field(Expr::Const(Value::EntityRef(EntityId(99))), "x");
        assert!(matches!(
            unknown.eval(&scope),
            Err(SimError::UnknownEntityReference(EntityId(99)))
        ));

        let not_entity = Expr::field(Expr::var("n"), "x");
        assert!(matches!(
            not_entity.eval(&scope),
            Err(SimError::TypeMismatch { expected: "entity", .. })
        ));
    }

    #[test]
    fn test_eval_tag_builds_payload() {
        let mut scope = TestScope::new(4);
        scope.locals.insert("speed".into(), Value::from(3));

        let expr = Expr::tag("moving", vec![Expr::Myself, Expr::var("speed")]);
        let expected = Value::tag(
            "moving",
            vec![Value::EntityRef(EntityId(4)), Value::from(3)],
        );
        assert_eq!(expr.eval(&scope).unwrap(), expected);
    }
}
