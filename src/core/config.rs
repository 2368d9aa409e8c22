//! Simulation configuration
//!
//! The embedding program builds a `SimulationConfig` (by hand or from a TOML
//! file) and hands it to `Simulation::with_config`. There is no global copy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::core::time::Instant;

/// Configuration for a simulation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Reject a `spawn` whose name is already used by another entity
    pub unique_names: bool,

    /// Bind each spawned entity's name as a global `EntityRef`
    ///
    /// Lets scripts refer to `Mars` instead of a numeric id. When two
    /// entities share a name the latest spawn wins.
    pub bind_entity_names: bool,

    /// Stop `run()` after this many scheduler steps
    ///
    /// A truncated run is reported through `RunReport::truncated`, not as an
    /// error.
    pub max_steps: Option<u64>,

    /// Stop `run()` before any resumption later than this many seconds
    pub horizon_secs: Option<f64>,

    /// Also emit every traced value through `tracing` at info level
    pub log_traces: bool,

    /// Deepest chain of nested method calls an entity may build
    pub max_call_depth: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            unique_names: false,
            bind_entity_names: true,
            max_steps: None,
            horizon_secs: None,
            log_traces: false,
            max_call_depth: 64,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(horizon) = self.horizon_secs {
            if !horizon.is_finite() || horizon < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "horizon_secs ({}) must be finite and non-negative",
                    horizon
                )));
            }
        }

        if self.max_steps == Some(0) {
            return Err(SimError::InvalidConfig(
                "max_steps must be at least 1 when set".into(),
            ));
        }

        if self.max_call_depth == 0 {
            return Err(SimError::InvalidConfig(
                "max_call_depth must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// The horizon as a timeline instant, if one is configured
    pub fn horizon(&self) -> Option<Instant> {
        self.horizon_secs.and_then(Instant::from_secs)
    }
}
