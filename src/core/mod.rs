//! Core types shared by every module: ids, time, errors and configuration

pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use config::SimulationConfig;
pub use error::{Result, SimError};
pub use time::{Instant, Interval, TimeUnit};
pub use types::EntityId;
