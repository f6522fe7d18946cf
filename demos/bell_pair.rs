//! Prepares a Bell pair, prints its amplitudes, then samples it repeatedly.
//!
//! Run with `RUST_LOG=statevec=debug cargo run --example bell_pair` to see
//! each dispatched operation.

use statevec::{CircuitBuilder, Simulator, SimulatorConfig, SimError};
use tracing_subscriber::EnvFilter;

const SHOTS: u64 = 1000;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "statevec=warn".into()))
        .init();

    let mut circuit = CircuitBuilder::new(2).h(0).cx(0, 1).build();
    let config = SimulatorConfig::deterministic(0).with_state_capture(true);
    let result = Simulator::with_config(config).run(&mut circuit)?;

    println!("Circuit:\n{}", circuit);
    println!("{}", result);

    let mut counts = [0u64; 4];
    for seed in 0..SHOTS {
        let mut shot = CircuitBuilder::new(2).h(0).cx(0, 1).measure(0).measure(1).build();
        let result = Simulator::with_config(SimulatorConfig::deterministic(seed)).run(&mut shot)?;
        let bits = result.outcome_bits(0);
        counts[usize::from(bits[0]) | usize::from(bits[1]) << 1] += 1;
    }
    println!("{} shots:", SHOTS);
    for (index, count) in counts.iter().enumerate() {
        println!("  |{:02b}>: {}", index, count);
    }
    Ok(())
}
