//! Entity lifecycle states

use serde::Serialize;

use crate::core::time::Instant;
use crate::core::types::EntityId;
use crate::events::ListenPattern;

/// Where an entity is in its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntityStatus {
    /// Has a resumption due and may execute its current action
    Ready,
    /// Suspended until simulated time reaches `until`
    Waiting { until: Instant },
    /// Suspended until a matching event is delivered
    Blocked { pattern: ListenPattern },
    /// Terminal
    Halted(HaltReason),
}

/// Why an entity stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HaltReason {
    /// Executed `Halt(Myself)` or `Halt(All)`
    Requested,
    /// Ran past the last action of its script
    Finished,
    /// Stopped by another entity's `Halt(All)`
    Interrupted { by: EntityId },
    /// An action failed to evaluate
    Faulted { message: String },
}

impl EntityStatus {
    pub fn is_halted(&self) -> bool {
        matches!(self, EntityStatus::Halted(_))
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, EntityStatus::Blocked { .. })
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, EntityStatus::Waiting { .. })
    }

    pub fn halt_reason(&self) -> Option<&HaltReason> {
        match self {
            EntityStatus::Halted(reason) => Some(reason),
            _ => None,
        }
    }
}
