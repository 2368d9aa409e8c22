use thiserror::Error;

use crate::core::time::Instant;
use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown entity reference: {0}")]
    UnknownEntityReference(EntityId),

    #[error("Unbound variable '{name}' in entity {entity}")]
    UnboundVariable { entity: EntityId, name: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    #[error("Method '{method}' takes {expected} arguments, got {found}")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("Entity {entity} exceeded the call depth limit of {limit}")]
    CallDepthExceeded { entity: EntityId, limit: usize },

    #[error("Entity name already in use: {0}")]
    DuplicateName(String),

    #[error("Deadlock at {at}: {} entities blocked with no pending resumptions", blocked.len())]
    Deadlock { at: Instant, blocked: Vec<EntityId> },

    #[error("Invalid interval: {0} seconds")]
    InvalidInterval(f64),

    #[error("Simulation already halted")]
    SimulationHalted,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    /// True for failures that halt only the entity that raised them
    pub fn is_entity_local(&self) -> bool {
        matches!(
            self,
            SimError::UnboundVariable { .. }
                | SimError::UnknownEntityReference(_)
                | SimError::TypeMismatch { .. }
                | SimError::UnknownMethod(_)
                | SimError::ArityMismatch { .. }
                | SimError::CallDepthExceeded { .. }
                | SimError::InvalidInterval(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
