//! Eliminates a seeded 8×8 matrix with four workers under every mapping and
//! backend, verifies each result against the serial reference and prints the
//! timings.
//!
//! Run with `RUST_LOG=stria=debug cargo run --example eliminate` for step
//! logs.

use stria::prelude::*;
use tracing_subscriber::EnvFilter;

const ORDER: usize = 8;
const WORKERS: usize = 4;

fn main() -> Result<(), HarnessError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clock = SystemClock::new();
    let input: Matrix<f32> = UniformSource::new(DEFAULT_SEED).init(ORDER);
    println!("Input:\n{input}");

    for backend in Backend::ALL {
        for mapping in Mapping::ALL {
            let config = EliminationConfig::new(ORDER, WORKERS)
                .with_mapping(mapping)
                .with_backend(backend);
            let outcome = eliminate_and_verify(input.clone(), &config, &clock, &Verifier::default())?;

            println!("{backend} / {mapping}:\n{}", outcome.report.matrix);
            println!(
                "Parallel time: {:?}\nSerial time: {:?}\nMax difference: {}\n",
                outcome.report.elapsed, outcome.serial_elapsed, outcome.verification.max_difference
            );
        }
    }
    Ok(())
}
