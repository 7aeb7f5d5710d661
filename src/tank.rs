//! Tank geometry and the daily usage limits a plan must respect.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Physical parameters of one harvesting tank, fixed for a run.
///
/// - `catchment_area_m2`: roof or surface area draining into the tank [m²]
/// - `runoff_coefficient`: fraction of rainfall that reaches the tank [-]
/// - `tank_capacity_liters`: maximum storage [L]
/// - `initial_storage_liters`: storage at the start of day one [L]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankParameters {
    pub catchment_area_m2: f64,
    pub runoff_coefficient: f64,
    pub tank_capacity_liters: f64,
    pub initial_storage_liters: f64,
}

impl Default for TankParameters {
    fn default() -> Self {
        Self {
            catchment_area_m2: 100.0,
            runoff_coefficient: 0.85,
            tank_capacity_liters: 3000.0,
            initial_storage_liters: 1500.0,
        }
    }
}

impl TankParameters {
    /// Create validated parameters.
    pub fn new(
        catchment_area_m2: f64,
        runoff_coefficient: f64,
        tank_capacity_liters: f64,
        initial_storage_liters: f64,
    ) -> Result<Self, PlanError> {
        let tank = Self {
            catchment_area_m2,
            runoff_coefficient,
            tank_capacity_liters,
            initial_storage_liters,
        };
        tank.validate()?;
        Ok(tank)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.catchment_area_m2.is_finite() || self.catchment_area_m2 <= 0.0 {
            return Err(PlanError::invalid(format!(
                "catchment_area_m2 must be > 0, got {}",
                self.catchment_area_m2
            )));
        }
        if !(0.0..=1.0).contains(&self.runoff_coefficient) {
            return Err(PlanError::invalid(format!(
                "runoff_coefficient must be within [0, 1], got {}",
                self.runoff_coefficient
            )));
        }
        if !self.tank_capacity_liters.is_finite() || self.tank_capacity_liters <= 0.0 {
            return Err(PlanError::invalid(format!(
                "tank_capacity_liters must be > 0, got {}",
                self.tank_capacity_liters
            )));
        }
        if !(0.0..=self.tank_capacity_liters).contains(&self.initial_storage_liters) {
            return Err(PlanError::invalid(format!(
                "initial_storage_liters must be within [0, {}], got {}",
                self.tank_capacity_liters, self.initial_storage_liters
            )));
        }
        Ok(())
    }

    /// Liters collected from `rainfall_mm` over the catchment.
    ///
    /// One millimetre over one square metre is one litre.
    #[inline]
    pub fn inflow_liters(&self, rainfall_mm: f64) -> f64 {
        rainfall_mm * self.catchment_area_m2 * self.runoff_coefficient
    }
}

/// Allowed daily usage range, liters/day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageBounds {
    pub usage_min: f64,
    pub usage_max: f64,
}

impl Default for UsageBounds {
    fn default() -> Self {
        Self {
            usage_min: 300.0,
            usage_max: 800.0,
        }
    }
}

impl UsageBounds {
    pub fn new(usage_min: f64, usage_max: f64) -> Result<Self, PlanError> {
        let bounds = Self {
            usage_min,
            usage_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.usage_min.is_finite() || self.usage_min < 0.0 {
            return Err(PlanError::invalid(format!(
                "usage_min must be >= 0, got {}",
                self.usage_min
            )));
        }
        if !self.usage_max.is_finite() || self.usage_max < self.usage_min {
            return Err(PlanError::invalid(format!(
                "usage_max ({}) must be >= usage_min ({})",
                self.usage_max, self.usage_min
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, usage: f64) -> bool {
        (self.usage_min..=self.usage_max).contains(&usage)
    }
}
