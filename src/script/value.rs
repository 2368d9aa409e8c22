//! Values an entity can bind to a name or attach to an event payload

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::time::Interval;
use crate::core::types::EntityId;

/// Immutable tagged variant
///
/// Payloads are shared slices that are never mutated after construction,
/// so cloning a `Value` behaves like a deep copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Number(NotNan<f64>),
    Duration(Interval),
    EntityRef(EntityId),
    Tag { name: Arc<str>, payload: Arc<[Value]> },
    #[default]
    Unit,
}

impl Value {
    /// Number value; `None` for NaN
    pub fn number(value: f64) -> Option<Self> {
        NotNan::new(value).ok().map(Value::Number)
    }

    pub fn tag(name: impl Into<Arc<str>>, payload: impl Into<Arc<[Value]>>) -> Self {
        Value::Tag {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Name of the variant, used in type mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Duration(_) => "duration",
            Value::EntityRef(_) => "entity",
            Value::Tag { .. } => "tag",
            Value::Unit => "unit",
        }
    }

    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Value::EntityRef(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        // Every i32 is exactly representable and never NaN.
        Value::Number(NotNan::from(value))
    }
}

impl From<NotNan<f64>> for Value {
    fn from(value: NotNan<f64>) -> Self {
        Value::Number(value)
    }
}

impl From<Interval> for Value {
    fn from(value: Interval) -> Self {
        Value::Duration(value)
    }
}

impl From<EntityId> for Value {
    fn from(value: EntityId) -> Self {
        Value::EntityRef(value)
    }
}
