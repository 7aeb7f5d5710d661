//! Daily trace of the chosen plan.
//!
//! The trace is produced with [`reporting_step`], which spills before usage.
//! Values are rounded to 2 decimals when a record is written; the running
//! storage stays unrounded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::balance::{BalanceState, reporting_step};
use crate::error::PlanError;
use crate::forecast::RainfallSeries;
use crate::plan::UsagePlan;
use crate::tank::TankParameters;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One reported day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBalanceRecord {
    pub date: NaiveDate,
    pub rainfall_mm: f64,
    pub inflow_liters: f64,
    pub usage_liters: f64,
    pub storage_liters: f64,
    pub overflow_liters: f64,
    pub shortage_liters: f64,
}

/// Simulate `plan` against `forecast` from the tank's initial storage.
pub fn report(
    plan: &UsagePlan,
    forecast: &RainfallSeries,
    tank: &TankParameters,
) -> Result<Vec<DailyBalanceRecord>, PlanError> {
    tank.validate()?;
    PlanError::check_horizon(forecast.len(), plan.len())?;

    let mut state = BalanceState::initialize(tank);
    let mut records = Vec::with_capacity(forecast.len());

    for (day, &usage) in forecast.days().iter().zip(plan.usage()) {
        let (next, flows) = reporting_step(&state, tank, day.rainfall_mm, usage);
        records.push(DailyBalanceRecord {
            date: day.date,
            rainfall_mm: round2(day.rainfall_mm),
            inflow_liters: round2(flows.inflow),
            usage_liters: round2(usage),
            storage_liters: round2(next.storage),
            overflow_liters: round2(flows.overflow),
            shortage_liters: round2(flows.shortage),
        });
        state = next;
    }

    Ok(records)
}

/// A forecast day paired with the plan's usage for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub date: NaiveDate,
    pub predicted_rainfall_mm: f64,
    pub usage_liters: f64,
}

/// Pair each forecast day with the plan's usage, rounded to 2 decimals.
pub fn schedule(
    plan: &UsagePlan,
    forecast: &RainfallSeries,
) -> Result<Vec<PlannedDay>, PlanError> {
    PlanError::check_horizon(forecast.len(), plan.len())?;
    Ok(forecast
        .days()
        .iter()
        .zip(plan.usage())
        .map(|(day, &usage)| PlannedDay {
            date: day.date,
            predicted_rainfall_mm: day.rainfall_mm,
            usage_liters: round2(usage),
        })
        .collect())
}

/// Totals and extremes over a reported trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub days: usize,
    pub total_rainfall_mm: f64,
    pub mean_rainfall_mm: f64,
    pub total_inflow_liters: f64,
    pub total_usage_liters: f64,
    pub mean_usage_liters: f64,
    /// Mean daily usage as a fraction of `usage_max`.
    pub usage_efficiency: f64,
    pub min_storage_liters: f64,
    pub max_storage_liters: f64,
    pub final_storage_liters: f64,
    pub total_overflow_liters: f64,
    pub total_shortage_liters: f64,
    pub overflow_days: usize,
    pub shortage_days: usize,
}

impl TraceSummary {
    /// Summarize a trace. Returns `None` for an empty trace.
    pub fn from_records(records: &[DailyBalanceRecord], usage_max: f64) -> Option<Self> {
        let last = records.last()?;
        let days = records.len();
        let n = days as f64;

        let total_rainfall_mm: f64 = records.iter().map(|r| r.rainfall_mm).sum();
        let total_usage_liters: f64 = records.iter().map(|r| r.usage_liters).sum();
        let mean_usage_liters = total_usage_liters / n;
        let usage_efficiency = if usage_max > 0.0 {
            mean_usage_liters / usage_max
        } else {
            0.0
        };

        Some(Self {
            days,
            total_rainfall_mm,
            mean_rainfall_mm: total_rainfall_mm / n,
            total_inflow_liters: records.iter().map(|r| r.inflow_liters).sum(),
            total_usage_liters,
            mean_usage_liters,
            usage_efficiency,
            min_storage_liters: records
                .iter()
                .map(|r| r.storage_liters)
                .fold(f64::INFINITY, f64::min),
            max_storage_liters: records
                .iter()
                .map(|r| r.storage_liters)
                .fold(f64::NEG_INFINITY, f64::max),
            final_storage_liters: last.storage_liters,
            total_overflow_liters: records.iter().map(|r| r.overflow_liters).sum(),
            total_shortage_liters: records.iter().map(|r| r.shortage_liters).sum(),
            overflow_days: records.iter().filter(|r| r.overflow_liters > 0.0).count(),
            shortage_days: records.iter().filter(|r| r.shortage_liters > 0.0).count(),
        })
    }
}
