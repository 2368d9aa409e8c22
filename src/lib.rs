//! Histrion - deterministic discrete-event engine for narrative timelines
//!
//! Entities (planets, factions, characters) run fixed scripts on a shared
//! simulated clock and talk to each other through tagged, broadcast events.

pub mod core;
pub mod entity;
pub mod events;
pub mod scenarios;
pub mod scheduler;
pub mod script;
pub mod simulation;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, SimError};
pub use crate::core::time::{Instant, Interval, TimeUnit};
pub use crate::core::types::EntityId;
pub use crate::entity::{EntityStatus, EntityView, HaltReason};
pub use crate::events::Event;
pub use crate::script::{Action, Expr, HaltScope, Method, Pattern, Script, Slot, Value};
pub use crate::simulation::{RunReport, Simulation, TraceRecord, TraceRecorder};
