//! Expression scope of the entity currently executing

use ahash::AHashMap;
use std::sync::Arc;

use crate::core::error::{Result, SimError};
use crate::core::types::EntityId;
use crate::entity::Entity;
use crate::script::{Method, Scope, Value};

/// Locals of one entity's innermost frame over the context's globals, with
/// read access to every other entity's bindings and the method table
pub(crate) struct EntityScope<'a> {
    pub me: &'a Entity,
    pub entities: &'a [Entity],
    pub globals: &'a AHashMap<Arc<str>, Value>,
    pub methods: &'a AHashMap<Arc<str>, Method>,
}

impl Scope for EntityScope<'_> {
    fn myself(&self) -> EntityId {
        self.me.id()
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.me
            .local(name)
            .or_else(|| self.globals.get(name))
            .cloned()
    }

    fn field(&self, entity: EntityId, name: &str) -> Result<Value> {
        let target = usize::try_from(entity.index())
            .ok()
            .and_then(|index| self.entities.get(index))
            .ok_or(SimError::UnknownEntityReference(entity))?;

        target
            .binding(name)
            .cloned()
            .ok_or_else(|| SimError::UnboundVariable {
                entity,
                name: name.to_string(),
            })
    }

    fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }
}
