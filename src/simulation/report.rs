//! Run reports and fault records

use serde::Serialize;

use crate::core::error::SimError;
use crate::core::time::Instant;
use crate::core::types::EntityId;

/// Summary of one `run()` / `run_until()` call
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Scheduler steps executed during this call
    pub steps: u64,
    /// Simulated time when the call returned
    pub final_time: Instant,
    /// A `Halt(All)` has stopped the simulation
    pub halted_globally: bool,
    /// Stopped by `max_steps` or the horizon before reaching quiescence
    pub truncated: bool,
    /// Entity faults recorded so far
    pub faults: usize,
}

impl RunReport {
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} steps, final time {}",
            self.steps, self.final_time
        );
        if self.halted_globally {
            s.push_str(", halted");
        }
        if self.truncated {
            s.push_str(", truncated");
        }
        if self.faults > 0 {
            s.push_str(&format!(", {} faults", self.faults));
        }
        s
    }
}

/// An entity-local failure
///
/// The entity was halted; the rest of the simulation kept running.
#[derive(Debug)]
pub struct Fault {
    pub entity: EntityId,
    pub at: Instant,
    pub error: SimError,
}
