//! Run configuration: tank, usage bounds and optimizer settings.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Defaults describe a 100 m² roof feeding a 3000 L tank that
//! starts half full, with 300–800 L/day of demand.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::optimizer::OptimizerConfig;
use crate::tank::{TankParameters, UsageBounds};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub tank: TankParameters,
    pub bounds: UsageBounds,
    pub optimizer: OptimizerConfig,
}

impl RunConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| PlanError::invalid(format!("config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let json = fs::read_to_string(path).map_err(|err| {
            PlanError::invalid(format!("cannot read config {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        self.tank.validate()?;
        self.bounds.validate()?;
        self.optimizer.validate()
    }
}
