//! Daily usage plans: the genotype the optimizer evolves.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Genotype;
use crate::error::PlanError;
use crate::tank::UsageBounds;

/// One liters/day value per forecast day, each within `bounds`.
///
/// Values only ever come from a uniform draw within the bounds or are copied
/// from another plan, so every operator preserves the bound invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsagePlan {
    usage: Vec<f64>,
    bounds: UsageBounds,
}

impl UsagePlan {
    /// Wrap caller-supplied usage values after checking the bounds.
    pub fn new(usage: Vec<f64>, bounds: UsageBounds) -> Result<Self, PlanError> {
        bounds.validate()?;
        if let Some((day, value)) = usage
            .iter()
            .enumerate()
            .find(|(_, v)| !bounds.contains(**v))
        {
            return Err(PlanError::invalid(format!(
                "usage {value} on day {day} is outside [{}, {}]",
                bounds.usage_min, bounds.usage_max
            )));
        }
        Ok(Self { usage, bounds })
    }

    /// Draw every day independently and uniformly from the bounds.
    pub fn random<R: Rng>(days: usize, bounds: UsageBounds, rng: &mut R) -> Self {
        let usage = (0..days).map(|_| draw(&bounds, rng)).collect();
        Self { usage, bounds }
    }

    pub fn usage(&self) -> &[f64] {
        &self.usage
    }

    pub fn bounds(&self) -> UsageBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.usage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }
}

fn draw<R: Rng>(bounds: &UsageBounds, rng: &mut R) -> f64 {
    rng.random_range(bounds.usage_min..=bounds.usage_max)
}

impl Genotype for UsagePlan {
    /// Redraw one uniformly chosen day.
    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        if self.usage.is_empty() {
            return;
        }
        let day = rng.random_range(0..self.usage.len());
        self.usage[day] = draw(&self.bounds, rng);
    }

    /// Single-point crossover with the cut in `[1, len - 1]`.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> (Self, Self) {
        let len = self.usage.len().min(other.usage.len());
        if len < 2 {
            return (self.clone(), other.clone());
        }
        let cut = rng.random_range(1..len);

        let mut a = self.usage[..cut].to_vec();
        a.extend_from_slice(&other.usage[cut..]);
        let mut b = other.usage[..cut].to_vec();
        b.extend_from_slice(&self.usage[cut..]);

        (
            Self {
                usage: a,
                bounds: self.bounds,
            },
            Self {
                usage: b,
                bounds: other.bounds,
            },
        )
    }
}
