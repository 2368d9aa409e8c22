//! Simulation context: the one interface front ends drive

pub mod context;
pub mod report;
mod scope;
pub mod sinks;

pub use context::Simulation;
pub use report::{Fault, RunReport};
pub use sinks::{TraceRecord, TraceRecorder};
