//! Simulated experiment evaluated once per day.
//!
//! Run with: `RUST_LOG=basemath=debug cargo run --example daily_batches`

use basemath::{Batch, Config, SequentialTest};
use rand::SeedableRng;
use rand_distr::{Binomial, Distribution};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing_subscriber::EnvFilter;

const VISITORS_PER_DAY: u64 = 2_500;

fn main() -> Result<(), basemath::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 10% baseline, looking for a 10% relative uplift; the true uplift is 12%
    let config = Config::binary(0.10, 0.10).seed("daily-batches-demo");
    let (control_rate, treatment_rate) = (0.10, 0.112);

    let mut test = SequentialTest::new(&config)?;
    println!("{}", test.plan());

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
    let control = Binomial::new(VISITORS_PER_DAY, control_rate).expect("valid rate");
    let treatment = Binomial::new(VISITORS_PER_DAY, treatment_rate).expect("valid rate");

    let mut day = 0;
    while !test.is_concluded() {
        day += 1;
        let change = treatment.sample(&mut rng) as f64 - control.sample(&mut rng) as f64;
        let state = test.state();
        let batch = Batch::new(
            state.cumulative_outcome_delta,
            change,
            state.cumulative_samples,
            VISITORS_PER_DAY,
        );
        let report = test.evaluate_batch(batch)?;
        println!("day {:>3}: {}", day, report);
    }

    println!(
        "concluded after {} days with {} visitors per arm: {}",
        day,
        test.state().cumulative_samples,
        test.state().decision
    );
    Ok(())
}
