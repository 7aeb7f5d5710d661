use chrono::NaiveDate;
use rainplan::{
    Evolver, FitnessEvaluator, RainfallSeries, TankParameters, UsageBounds, UsagePlan,
    algorithms::truncation::TruncationGA, report,
};
use rand::SeedableRng;
use rand_pcg::Pcg64;

// A monsoon week: dry start, a heavy burst mid-week, tapering off.
const RAINFALL_MM: [f64; 7] = [0.0, 1.2, 18.5, 42.0, 9.3, 0.4, 0.0];

fn main() {
    let start = NaiveDate::from_ymd_opt(2025, 7, 14).expect("valid date");
    let forecast = RainfallSeries::from_amounts(start, &RAINFALL_MM).expect("valid forecast");
    let tank = TankParameters::default();
    let bounds = UsageBounds::default();

    let mut rng = Pcg64::seed_from_u64(42);
    let initial_pop: Vec<UsagePlan> = (0..50)
        .map(|_| UsagePlan::random(forecast.len(), bounds, &mut rng))
        .collect();

    let mut ga = TruncationGA::with_rng(initial_pop, 0.1, rng);
    let eval = FitnessEvaluator::new(forecast.clone(), tank).expect("valid tank");

    for generation in 0..100 {
        ga.step(&eval);
        let best = &ga.ranking()[0];

        if generation % 20 == 0 {
            println!("Gen {}: fitness {:.2}", generation, best.fitness);
        }
    }

    let best = &ga.ranking()[0];
    println!("\nBest plan (fitness {:.2}):", best.fitness);
    for record in report(&best.genotype, &forecast, &tank).expect("matching horizon") {
        println!(
            "{}  rain {:>5.1} mm  use {:>6.1} L  store {:>7.1} L  spill {:>6.1} L  short {:>6.1} L",
            record.date,
            record.rainfall_mm,
            record.usage_liters,
            record.storage_liters,
            record.overflow_liters,
            record.shortage_liters
        );
    }
}
