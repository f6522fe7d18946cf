//! Runs one circuit on the rayon backend and on the serial reference, then
//! compares the final amplitudes elementwise.
//!
//! Usage: `cargo run --release --example cross_check -- [qubits] [threads]`

use statevec::{BackendKind, CircuitBuilder, SimError, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "statevec=info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let num_qubits: usize = args.next().and_then(|a| a.parse().ok()).unwrap_or(18);
    let threads: Option<usize> = args.next().and_then(|a| a.parse().ok());

    let mut builder = CircuitBuilder::new(num_qubits);
    for q in 0..num_qubits {
        builder = builder.h(q);
    }
    for q in 1..num_qubits {
        builder = builder.cx(q - 1, q).cz(q, q - 1);
    }
    // an empty register is left for the simulator to reject
    if let Some(last) = num_qubits.checked_sub(1) {
        builder = builder.probe(last).measure(num_qubits / 2).x(0).h(last);
    }
    let circuit = builder.build();

    let config = SimulatorConfig::new()
        .with_seed(7)
        .with_backend(BackendKind::Parallel { threads })
        .with_parallel_threshold(1);
    let report = Simulator::with_config(config).cross_check(&circuit)?;

    println!("{}", report);
    for m in &report.first_mismatches {
        println!("  [{}] {} != {}", m.index, m.actual, m.expected);
    }
    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}
