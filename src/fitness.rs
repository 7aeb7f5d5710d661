//! Plan scoring.
//!
//! A plan starts from 1000 points and loses weighted penalties for every
//! liter spilled or short across the horizon. Scores are unbounded below.

use serde::{Deserialize, Serialize};

use crate::balance::{BalanceOrdering, BalanceState, Penalties};
use crate::error::PlanError;
use crate::forecast::RainfallSeries;
use crate::plan::UsagePlan;
use crate::tank::TankParameters;
use crate::Evaluator;

/// Score of a plan with no overflow and no shortage.
pub const BASE_SCORE: f64 = 1000.0;

/// Penalty totals behind a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub penalties: Penalties,
    pub final_storage: f64,
}

impl ScoreBreakdown {
    pub fn score(&self) -> f64 {
        BASE_SCORE - self.penalties.total()
    }
}

/// Score `plan` against `forecast` with the scoring ordering.
pub fn evaluate(
    plan: &UsagePlan,
    forecast: &RainfallSeries,
    tank: &TankParameters,
) -> Result<f64, PlanError> {
    Ok(score_breakdown(plan, forecast, tank, BalanceOrdering::UsageThenOverflow)?.score())
}

/// Run the balance under `ordering` and return the accumulated penalties.
pub fn score_breakdown(
    plan: &UsagePlan,
    forecast: &RainfallSeries,
    tank: &TankParameters,
    ordering: BalanceOrdering,
) -> Result<ScoreBreakdown, PlanError> {
    PlanError::check_horizon(forecast.len(), plan.len())?;
    Ok(accumulate(plan.usage(), forecast, tank, ordering))
}

fn accumulate(
    usage: &[f64],
    forecast: &RainfallSeries,
    tank: &TankParameters,
    ordering: BalanceOrdering,
) -> ScoreBreakdown {
    let mut state = BalanceState::initialize(tank);
    let mut penalties = Penalties::default();

    for (rainfall_mm, &day_usage) in forecast.rainfall().zip(usage) {
        let (next, flows) = ordering.step(&state, tank, rainfall_mm, day_usage);
        penalties = penalties.accumulate(&flows);
        state = next;
    }

    ScoreBreakdown {
        penalties,
        final_storage: state.storage,
    }
}

/// [`Evaluator`] binding a forecast and tank for the optimizer.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    forecast: RainfallSeries,
    tank: TankParameters,
    ordering: BalanceOrdering,
}

impl FitnessEvaluator {
    pub fn new(forecast: RainfallSeries, tank: TankParameters) -> Result<Self, PlanError> {
        tank.validate()?;
        Ok(Self {
            forecast,
            tank,
            ordering: BalanceOrdering::default(),
        })
    }

    /// Score with a different event ordering than the default.
    pub fn with_ordering(mut self, ordering: BalanceOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn forecast(&self) -> &RainfallSeries {
        &self.forecast
    }

    pub fn tank(&self) -> &TankParameters {
        &self.tank
    }

    pub fn ordering(&self) -> BalanceOrdering {
        self.ordering
    }

    /// Score with a horizon check.
    pub fn score(&self, plan: &UsagePlan) -> Result<f64, PlanError> {
        Ok(score_breakdown(plan, &self.forecast, &self.tank, self.ordering)?.score())
    }
}

impl Evaluator<UsagePlan> for FitnessEvaluator {
    /// Plans reaching the optimizer are built from the forecast length,
    /// so the horizon is only checked in debug builds here.
    fn evaluate(&self, genotype: &UsagePlan) -> f64 {
        debug_assert_eq!(genotype.len(), self.forecast.len());
        accumulate(genotype.usage(), &self.forecast, &self.tank, self.ordering).score()
    }
}
