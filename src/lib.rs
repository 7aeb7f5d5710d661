use rand::Rng;
use serde::{Deserialize, Serialize};

/// The 'DNA' of an individual.
/// Defined by how it changes, not what it does.
pub trait Genotype: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync {
    /// Apply one mutation event. Callers decide how often this happens.
    fn mutate<R: Rng>(&mut self, rng: &mut R);

    /// Produce two children that splice the parents' genes.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> (Self, Self);
}

/// The 'Body' expressed from DNA.
/// Holds the result of evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "G: Genotype")]
pub struct Phenotype<G: Genotype> {
    pub genotype: G,
    pub fitness: f64,
}

/// A trait for systems that can turn DNA into a Body and evaluate it.
pub trait Evaluator<G: Genotype>: Send + Sync {
    /// Score a genotype. Higher is better; there is no fixed range.
    fn evaluate(&self, genotype: &G) -> f64;
}

/// The master engine trait.
pub trait Evolver<G: Genotype> {
    fn step<E: Evaluator<G>>(&mut self, evaluator: &E);

    /// The current (not yet evaluated) population.
    fn population(&self) -> &[G];

    /// The most recent evaluated ranking, best first.
    fn ranking(&self) -> &[Phenotype<G>];
}

pub mod algorithms {
    pub mod truncation;
}

pub mod balance;
pub mod config;
pub mod error;
pub mod fitness;
pub mod forecast;
pub mod optimizer;
pub mod plan;
pub mod report;
pub mod tank;

pub use balance::{BalanceOrdering, BalanceState, DayFlows, Penalties};
pub use config::RunConfig;
pub use error::PlanError;
pub use fitness::{FitnessEvaluator, ScoreBreakdown, evaluate};
pub use forecast::{DailyRainfall, RainfallSeries};
pub use optimizer::{
    EarlyStop, FinalGeneration, GenerationStats, Optimization, OptimizerConfig, optimize,
    optimize_with_rng,
};
pub use plan::UsagePlan;
pub use report::{DailyBalanceRecord, PlannedDay, TraceSummary, report, schedule};
pub use tank::{TankParameters, UsageBounds};

/// A usage plan paired with its fitness.
pub type ScoredPlan = Phenotype<UsagePlan>;
