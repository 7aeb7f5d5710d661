use chrono::NaiveDate;
use rainplan::{
    EarlyStop, Evaluator, Evolver, FinalGeneration, FitnessEvaluator, Optimization,
    OptimizerConfig, RainfallSeries, TankParameters, UsageBounds, UsagePlan,
    algorithms::truncation::TruncationGA, evaluate, optimize,
};
use rand::prelude::SeedableRng;
use rand_pcg::Pcg64;

// --- Reference setup: 100 m² roof, 3000 L tank, 300-800 L/day ---

fn forecast() -> RainfallSeries {
    RainfallSeries::from_amounts(
        NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
        &[0.0, 1.2, 18.5, 42.0, 9.3, 0.4, 0.0],
    )
    .unwrap()
}

fn config(generations: usize, final_generation: FinalGeneration) -> OptimizerConfig {
    OptimizerConfig {
        population_size: 50,
        generations,
        mutation_rate: 0.1,
        seed: 1234,
        final_generation,
        ..OptimizerConfig::default()
    }
}

fn run(generations: usize, final_generation: FinalGeneration) -> Optimization {
    optimize(
        &forecast(),
        &TankParameters::default(),
        &UsageBounds::default(),
        &config(generations, final_generation),
    )
    .unwrap()
}

/// Rebuild the engine exactly as `optimize` does.
fn manual_engine(cfg: &OptimizerConfig) -> (TruncationGA<UsagePlan>, FitnessEvaluator) {
    let fc = forecast();
    let mut rng = Pcg64::seed_from_u64(cfg.seed);
    let initial: Vec<UsagePlan> = (0..cfg.population_size)
        .map(|_| UsagePlan::random(fc.len(), UsageBounds::default(), &mut rng))
        .collect();
    let ga = TruncationGA::with_rng(initial, cfg.mutation_rate, rng);
    let eval = FitnessEvaluator::new(fc, TankParameters::default()).unwrap();
    (ga, eval)
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn same_seed_gives_bit_identical_plans() {
    let a = run(100, FinalGeneration::DiscardOffspring);
    let b = run(100, FinalGeneration::DiscardOffspring);

    let bits = |o: &Optimization| -> Vec<u64> {
        o.plan().usage().iter().map(|u| u.to_bits()).collect()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.fitness().to_bits(), b.fitness().to_bits());
    assert_eq!(a.ranking, b.ranking);
    assert_eq!(a.history, b.history);
}

#[test]
fn different_seeds_explore_differently() {
    let a = run(20, FinalGeneration::DiscardOffspring);
    let mut cfg = config(20, FinalGeneration::DiscardOffspring);
    cfg.seed = 4321;
    let b = optimize(&forecast(), &TankParameters::default(), &UsageBounds::default(), &cfg)
        .unwrap();
    assert_ne!(a.final_population, b.final_population);
}

#[test]
fn reported_fitness_matches_independent_evaluation() {
    let outcome = run(100, FinalGeneration::DiscardOffspring);
    let recomputed = evaluate(outcome.plan(), &forecast(), &TankParameters::default()).unwrap();
    assert_eq!(recomputed, outcome.fitness());

    for scored in &outcome.ranking {
        let fitness = evaluate(&scored.genotype, &forecast(), &TankParameters::default()).unwrap();
        assert_eq!(fitness, scored.fitness);
    }
}

// ============================================================================
// Final generation handling
// ============================================================================

#[test]
fn discarded_offspring_returns_best_of_population_before_last_breeding() {
    let cfg = config(100, FinalGeneration::DiscardOffspring);
    let outcome = run(100, FinalGeneration::DiscardOffspring);

    let (mut ga, eval) = manual_engine(&cfg);
    for _ in 0..100 {
        ga.step(&eval);
    }
    // The ranking was built before the last offspring were bred.
    assert_eq!(&outcome.best, &ga.ranking()[0]);
    assert_eq!(outcome.ranking, ga.ranking());
    assert_eq!(outcome.final_population, ga.population());

    // The final offspring were never scored; their best can differ.
    let offspring_best = ga
        .population()
        .iter()
        .map(|p| eval.evaluate(p))
        .fold(f64::NEG_INFINITY, f64::max);
    let evaluated = run(100, FinalGeneration::EvaluateOffspring);
    assert_eq!(evaluated.fitness(), offspring_best);
}

#[test]
fn discarded_offspring_equals_one_fewer_generation_with_trailing_evaluation() {
    let discard = run(100, FinalGeneration::DiscardOffspring);
    let trailing = run(99, FinalGeneration::EvaluateOffspring);
    assert_eq!(discard.best, trailing.best);
    assert_eq!(discard.ranking, trailing.ranking);
}

#[test]
fn trailing_evaluation_equals_one_more_generation_discarded() {
    let trailing = run(100, FinalGeneration::EvaluateOffspring);
    let discard = run(101, FinalGeneration::DiscardOffspring);
    assert_eq!(trailing.best, discard.best);
    assert_eq!(trailing.generations_run, 100);
    assert_eq!(trailing.history.len(), 101);
    assert_eq!(discard.history.len(), 101);
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn history_tracks_each_evaluated_generation() {
    let outcome = run(30, FinalGeneration::DiscardOffspring);
    assert_eq!(outcome.generations_run, 30);
    assert_eq!(outcome.history.len(), 30);
    assert!(!outcome.stopped_early);
    for (i, stats) in outcome.history.iter().enumerate() {
        assert_eq!(stats.generation, i);
        assert!(stats.best_fitness + 1e-9 >= stats.mean_fitness);
        assert!(stats.mean_fitness + 1e-9 >= stats.worst_fitness);
    }
    let last = outcome.history.last().unwrap();
    assert_eq!(last.best_fitness, outcome.fitness());
    assert_eq!(last.worst_fitness, outcome.ranking.last().unwrap().fitness);
}

#[test]
fn ranking_is_sorted_best_first() {
    let outcome = run(10, FinalGeneration::DiscardOffspring);
    assert_eq!(outcome.ranking.len(), 50);
    assert!(outcome.ranking.windows(2).all(|w| w[0].fitness >= w[1].fitness));
}

#[test]
fn early_stop_ends_run_once_best_fitness_stalls() {
    let mut cfg = config(100, FinalGeneration::DiscardOffspring);
    // No gain can ever exceed this, so only the first generation counts.
    cfg.early_stop = Some(EarlyStop {
        patience: 3,
        min_improvement: 1.0e12,
    });
    let outcome = optimize(&forecast(), &TankParameters::default(), &UsageBounds::default(), &cfg)
        .unwrap();
    assert!(outcome.stopped_early);
    assert_eq!(outcome.generations_run, 4);
    assert_eq!(outcome.history.len(), 4);

    // The stopped run is a prefix of the full run.
    let full = run(4, FinalGeneration::DiscardOffspring);
    assert_eq!(outcome.best, full.best);
}

// ============================================================================
// Checkpointing
// ============================================================================

#[test]
fn checkpointed_engine_resumes_identically() {
    let cfg = config(20, FinalGeneration::DiscardOffspring);
    let (mut ga, eval) = manual_engine(&cfg);
    for _ in 0..10 {
        ga.step(&eval);
    }

    let bytes = bincode::serialize(&ga).expect("Serialization failed");
    let mut resumed: TruncationGA<UsagePlan> =
        bincode::deserialize(&bytes).expect("Deserialization failed");
    assert_eq!(resumed.generation(), 10);

    for _ in 0..10 {
        ga.step(&eval);
        resumed.step(&eval);
    }
    assert_eq!(ga.ranking(), resumed.ranking());
    assert_eq!(ga.population(), resumed.population());

    let outcome = run(20, FinalGeneration::DiscardOffspring);
    assert_eq!(&outcome.best, &resumed.ranking()[0]);
}
