//! Truncation-selection genetic algorithm.
//!
//! Each [`Evolver::step`]:
//! 1. Evaluates the current population and ranks it best first
//! 2. Keeps the top half as the mating pool
//! 3. Breeds pairs of distinct pool members with crossover, mutating each
//!    child independently with probability `mutation_rate`
//! 4. Replaces the population with the children
//!
//! The children built in a step are not evaluated until the next step (or
//! an explicit [`TruncationGA::evaluate_population`]), so after a step
//! [`Evolver::ranking`] describes the population *before* the step's
//! offspring.
//!
//! # Determinism
//!
//! All randomness comes from the engine's own `Pcg64`, which is serialized
//! with it. Evaluation draws no random numbers and results are ranked in
//! population order, so the `parallel` feature does not change results.

use crate::{Evaluator, Evolver, Genotype, Phenotype};
use rand::Rng;
use rand::prelude::{IndexedRandom, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compare two f64 values, treating NaN as less than all other values.
/// This ensures NaN fitness individuals sort to the end (lowest priority).
fn cmp_f64_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "G: Genotype")]
pub struct TruncationGA<G: Genotype> {
    population: Vec<G>,
    /// Last evaluated population, best first.
    ranking: Vec<Phenotype<G>>,
    pop_size: usize,
    mutation_rate: f64,
    generation: usize,
    rng: Pcg64,
}

impl<G: Genotype> TruncationGA<G> {
    pub fn new(initial_pop: Vec<G>, mutation_rate: f64, seed: u64) -> Self {
        Self::with_rng(initial_pop, mutation_rate, Pcg64::seed_from_u64(seed))
    }

    /// Continue from a generator that already drew the initial population.
    pub fn with_rng(initial_pop: Vec<G>, mutation_rate: f64, rng: Pcg64) -> Self {
        Self {
            pop_size: initial_pop.len(),
            population: initial_pop,
            ranking: vec![],
            mutation_rate,
            generation: 0,
            rng,
        }
    }

    pub fn pop_size(&self) -> usize {
        self.pop_size
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn set_mutation_rate(&mut self, rate: f64) {
        self.mutation_rate = rate;
    }

    /// Number of completed steps.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best individual of the last evaluated ranking.
    pub fn best(&self) -> Option<&Phenotype<G>> {
        self.ranking.first()
    }

    /// Evaluate and rank the current population without breeding.
    pub fn evaluate_population<E: Evaluator<G>>(&mut self, evaluator: &E) -> &[Phenotype<G>] {
        #[cfg(feature = "parallel")]
        let scores: Vec<f64> = self
            .population
            .par_iter()
            .map(|g| evaluator.evaluate(g))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let scores: Vec<f64> = self
            .population
            .iter()
            .map(|g| evaluator.evaluate(g))
            .collect();

        let mut ranking: Vec<Phenotype<G>> = self
            .population
            .iter()
            .cloned()
            .zip(scores)
            .map(|(genotype, fitness)| Phenotype { genotype, fitness })
            .collect();

        // Stable sort: equal scores keep population order
        ranking.sort_by(|a, b| cmp_f64_nan_last(b.fitness, a.fitness));
        self.ranking = ranking;
        &self.ranking
    }

    fn breed(&mut self) {
        let pool_size = (self.pop_size / 2).max(1).min(self.ranking.len());
        if pool_size == 0 {
            return;
        }
        let pool = &self.ranking[..pool_size];

        let mut next_gen = Vec::with_capacity(self.pop_size + 1);
        while next_gen.len() < self.pop_size {
            let parents: Vec<&Phenotype<G>> = pool.choose_multiple(&mut self.rng, 2).collect();
            // A single-member pool mates with itself
            let (p_a, p_b) = match parents.as_slice() {
                [a, b] => (*a, *b),
                [a] => (*a, *a),
                _ => break,
            };
            let (mut child_a, mut child_b) = p_a.genotype.crossover(&p_b.genotype, &mut self.rng);
            if self.rng.random::<f64>() < self.mutation_rate {
                child_a.mutate(&mut self.rng);
            }
            if self.rng.random::<f64>() < self.mutation_rate {
                child_b.mutate(&mut self.rng);
            }
            next_gen.push(child_a);
            next_gen.push(child_b);
        }
        next_gen.truncate(self.pop_size);
        self.population = next_gen;
    }
}

impl<G: Genotype> Evolver<G> for TruncationGA<G> {
    fn step<E: Evaluator<G>>(&mut self, evaluator: &E) {
        if self.population.is_empty() {
            return;
        }
        self.evaluate_population(evaluator);
        self.breed();
        self.generation += 1;
    }

    fn population(&self) -> &[G] {
        &self.population
    }

    fn ranking(&self) -> &[Phenotype<G>] {
        &self.ranking
    }
}
