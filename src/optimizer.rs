//! Usage-plan optimization entry points.
//!
//! [`optimize`] validates every input, seeds a `Pcg64`, draws the initial
//! population and runs a [`TruncationGA`] for a fixed number of generations.
//! Nothing runs if any input is rejected.

use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::algorithms::truncation::TruncationGA;
use crate::balance::BalanceOrdering;
use crate::error::PlanError;
use crate::fitness::FitnessEvaluator;
use crate::forecast::RainfallSeries;
use crate::plan::UsagePlan;
use crate::tank::{TankParameters, UsageBounds};
use crate::{Evolver, ScoredPlan};

/// Generations between progress log lines.
const LOG_INTERVAL: usize = 10;

/// What happens to the offspring built in the last generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalGeneration {
    /// Return the best of the last evaluated ranking. The final offspring
    /// are built but never scored, matching the established planner.
    #[default]
    DiscardOffspring,
    /// Score the final offspring once more and return the best of them.
    EvaluateOffspring,
}

/// Stop once the best fitness stalls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyStop {
    /// Consecutive generations without improvement before stopping.
    pub patience: usize,
    /// Gain in best fitness that counts as an improvement.
    pub min_improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub seed: u64,
    pub final_generation: FinalGeneration,
    /// Event ordering used for fitness. Reporting always spills first.
    pub scoring_ordering: BalanceOrdering,
    pub early_stop: Option<EarlyStop>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            seed: 42,
            final_generation: FinalGeneration::default(),
            scoring_ordering: BalanceOrdering::default(),
            early_stop: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.population_size < 4 {
            return Err(PlanError::degenerate(format!(
                "population_size must be at least 4 so the mating pool holds two parents, got {}",
                self.population_size
            )));
        }
        if self.generations == 0 {
            return Err(PlanError::degenerate("generations must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(PlanError::invalid(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if let Some(stop) = self.early_stop {
            if stop.patience == 0 {
                return Err(PlanError::invalid("early_stop.patience must be at least 1"));
            }
            if !stop.min_improvement.is_finite() || stop.min_improvement < 0.0 {
                return Err(PlanError::invalid(format!(
                    "early_stop.min_improvement must be >= 0, got {}",
                    stop.min_improvement
                )));
            }
        }
        Ok(())
    }
}

/// Fitness spread of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub worst_fitness: f64,
}

impl GenerationStats {
    fn from_ranking(generation: usize, ranking: &[ScoredPlan]) -> Self {
        let mean_fitness = if ranking.is_empty() {
            f64::NAN
        } else {
            ranking.iter().map(|p| p.fitness).sum::<f64>() / ranking.len() as f64
        };
        Self {
            generation,
            best_fitness: ranking.first().map_or(f64::NAN, |p| p.fitness),
            mean_fitness,
            worst_fitness: ranking.last().map_or(f64::NAN, |p| p.fitness),
        }
    }
}

/// Result of one optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct Optimization {
    pub best: ScoredPlan,
    /// The ranking `best` was taken from, best first.
    pub ranking: Vec<ScoredPlan>,
    /// Population held when the run ended. Unscored under
    /// [`FinalGeneration::DiscardOffspring`].
    pub final_population: Vec<UsagePlan>,
    pub history: Vec<GenerationStats>,
    pub generations_run: usize,
    pub stopped_early: bool,
}

impl Optimization {
    pub fn plan(&self) -> &UsagePlan {
        &self.best.genotype
    }

    pub fn fitness(&self) -> f64 {
        self.best.fitness
    }
}

/// Search for the best usage plan, seeding the generator from `config.seed`.
pub fn optimize(
    forecast: &RainfallSeries,
    tank: &TankParameters,
    bounds: &UsageBounds,
    config: &OptimizerConfig,
) -> Result<Optimization, PlanError> {
    optimize_with_rng(
        forecast,
        tank,
        bounds,
        config,
        Pcg64::seed_from_u64(config.seed),
    )
}

/// Search for the best usage plan with a caller-supplied generator.
///
/// `config.seed` is ignored.
pub fn optimize_with_rng(
    forecast: &RainfallSeries,
    tank: &TankParameters,
    bounds: &UsageBounds,
    config: &OptimizerConfig,
    mut rng: Pcg64,
) -> Result<Optimization, PlanError> {
    tank.validate()?;
    bounds.validate()?;
    config.validate()?;
    if forecast.len() < 2 {
        return Err(PlanError::degenerate(format!(
            "crossover needs a horizon of at least 2 days, got {}",
            forecast.len()
        )));
    }

    let evaluator =
        FitnessEvaluator::new(forecast.clone(), *tank)?.with_ordering(config.scoring_ordering);
    let initial_pop: Vec<UsagePlan> = (0..config.population_size)
        .map(|_| UsagePlan::random(forecast.len(), *bounds, &mut rng))
        .collect();
    let mut ga = TruncationGA::with_rng(initial_pop, config.mutation_rate, rng);

    let mut history = Vec::with_capacity(config.generations + 1);
    let mut best_so_far = f64::NEG_INFINITY;
    let mut stale = 0;
    let mut stopped_early = false;

    for generation in 0..config.generations {
        ga.step(&evaluator);
        let stats = GenerationStats::from_ranking(generation, ga.ranking());
        if generation % LOG_INTERVAL == 0 {
            debug!(
                generation,
                best_fitness = stats.best_fitness,
                mean_fitness = stats.mean_fitness,
                "generation evaluated"
            );
        }
        history.push(stats);

        if let Some(stop) = config.early_stop {
            if stats.best_fitness > best_so_far + stop.min_improvement {
                best_so_far = stats.best_fitness;
                stale = 0;
            } else {
                stale += 1;
            }
            if stale >= stop.patience {
                warn!(
                    generation,
                    patience = stop.patience,
                    best_fitness = best_so_far,
                    "best fitness stalled; stopping early"
                );
                stopped_early = true;
                break;
            }
        }
    }
    let generations_run = ga.generation();

    if config.final_generation == FinalGeneration::EvaluateOffspring {
        let ranking = ga.evaluate_population(&evaluator);
        history.push(GenerationStats::from_ranking(generations_run, ranking));
    }

    let ranking = ga.ranking().to_vec();
    let best = ranking
        .first()
        .cloned()
        .ok_or_else(|| PlanError::degenerate("population is empty"))?;

    if best.fitness.is_nan() {
        warn!("best plan has NaN fitness");
    }
    info!(
        generations = generations_run,
        best_fitness = best.fitness,
        stopped_early,
        "optimization complete"
    );

    Ok(Optimization {
        best,
        ranking,
        final_population: ga.population().to_vec(),
        history,
        generations_run,
        stopped_early,
    })
}
