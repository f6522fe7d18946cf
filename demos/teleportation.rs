//! Teleports |-> from q0 to q2 using deferred measurement.
//!
//! The classically controlled corrections become CX and CZ gates, so the
//! final state of q2 is |-> whatever q0 and q1 read. Rotating q2 back with
//! H turns |-> into |1>, which a forced measurement then reads with
//! certainty.

use statevec::{CircuitBuilder, Outcome, Simulator, SimulatorConfig, SimError};

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt::init();

    for seed in 0..8 {
        let mut circuit = CircuitBuilder::new(3)
            // payload: |-> on q0
            .h(0)
            .z(0)
            // shared pair on q1, q2
            .h(1)
            .cx(1, 2)
            // Bell-basis rotation of q0, q1
            .cx(0, 1)
            .h(0)
            // deferred corrections
            .cx(1, 2)
            .cz(0, 2)
            .measure(0)
            .measure(1)
            .h(2)
            .measure_forced(2, 0.5)
            .build();

        let result = Simulator::with_config(SimulatorConfig::deterministic(seed)).run(&mut circuit)?;
        let bits = result.outcome_bits(0);
        println!("seed {}: q0={} q1={} q2={}", seed, bits[0], bits[1], bits[2]);
        if result.outcome(2) != Some(Outcome::One) {
            return Err(SimError::Incoherence { message: format!("teleportation failed for seed {}", seed) });
        }
        if seed == 0 {
            println!("{}", circuit);
        }
    }
    println!("q2 received |-> on every run");
    Ok(())
}
