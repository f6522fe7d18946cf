// src/lib.rs

//! `statevec` - State-vector simulation of n-qubit registers
//!
//! A register of `n` qubits is held as `2^n` complex amplitudes. Circuits
//! are ordered lists of H, X, Z, CX, CZ gates and measurements; each
//! operation runs as a data-parallel pass over the amplitudes, and
//! operations run strictly one after another.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{AmplitudeStore, Outcome, Qubit, Result, SimError};
pub use operations::{GateKind, OpParams, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{
    BackendKind, ExecutionBackend, FixedThresholds, RandomSource, SeededRandom, SimulationResult, Simulator,
    SimulatorConfig, VerificationReport,
};
pub use validation::{check_normalization, validate_state};

// Example 1: Bell pair
// Builds the entangled pair (|00> + |11>)/√2 and reads back the amplitudes.
/// ```
/// use statevec::{CircuitBuilder, Simulator, SimulatorConfig, SimError};
///
/// let mut circuit = CircuitBuilder::new(2).h(0).cx(0, 1).build();
/// let config = SimulatorConfig::deterministic(7).with_state_capture(true);
/// let result = Simulator::with_config(config).run(&mut circuit)?;
///
/// let amps = result.final_amplitudes().unwrap_or_default();
/// let s = std::f64::consts::FRAC_1_SQRT_2;
/// assert!((amps[0].re - s).abs() < 1e-7);
/// assert!(amps[1].norm() < 1e-7);
/// assert!(amps[2].norm() < 1e-7);
/// assert!((amps[3].re - s).abs() < 1e-7);
/// # Ok::<(), SimError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Controlled flip with forced measurement
// Prepares the control in |1>, applies CX and collapses the target with a
// fixed threshold so the outcome is reproducible.
/// ```
/// use statevec::{CircuitBuilder, Outcome, Simulator, SimError};
///
/// let mut circuit = CircuitBuilder::new(2)
///     .x(0)
///     .cx(0, 1)
///     .measure_forced(1, 0.5)
///     .build();
/// let result = Simulator::new().run(&mut circuit)?;
///
/// // p0 of q1 is 0, below any positive threshold: the target reads 1
/// assert_eq!(result.outcome(1), Some(Outcome::One));
/// assert_eq!(result.outcome(0), None);
/// assert_eq!(circuit.operations()[2].probability(), Some(0.0));
/// # Ok::<(), SimError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: Probing without collapse
/// ```
/// use statevec::{CircuitBuilder, GateKind, Simulator, SimError};
///
/// let mut circuit = CircuitBuilder::new(1).h(0).probe(0).probe(0).build();
/// let result = Simulator::new().run(&mut circuit)?;
///
/// let probes: Vec<f64> = result.probes().map(|p| p.probability).collect();
/// assert_eq!(probes.len(), 2);
/// assert!((probes[0] - 0.5).abs() < 1e-12);
/// assert_eq!(probes[0], probes[1]);
/// assert!(result.measurements().iter().all(|m| m.kind == GateKind::Probe));
/// # Ok::<(), SimError>(())
/// ```
#[doc(hidden)]
const _: () = ();
