//! Read-only entity snapshots for inspection

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::time::Instant;
use crate::core::types::EntityId;
use crate::entity::status::EntityStatus;
use crate::entity::Entity;
use crate::script::Value;

/// A snapshot of one entity, detached from the context
///
/// Bindings are sorted by name so two snapshots of equal state compare and
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub name: String,
    pub status: EntityStatus,
    pub bindings: BTreeMap<String, Value>,
    pub cursor: usize,
    pub script_len: usize,
    /// Methods in progress, outermost first
    pub calls: Vec<String>,
    pub spawned_at: Instant,
}

impl EntityView {
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

impl From<&Entity> for EntityView {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            name: entity.name().to_string(),
            status: entity.status().clone(),
            bindings: entity
                .bindings()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            cursor: entity.cursor(),
            script_len: entity.script().len(),
            calls: entity.call_stack().map(str::to_string).collect(),
            spawned_at: entity.spawned_at(),
        }
    }
}
