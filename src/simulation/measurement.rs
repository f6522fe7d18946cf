// src/simulation/measurement.rs

//! The measurement and collapse protocol.
//!
//! A measurement of qubit `t` runs in three steps, each complete before the
//! next starts:
//!
//! 1. [`probe`]: reduce `p0 = Σ|a_i|²` over indices with bit `t` clear.
//! 2. [`resolve`]: compare `p0` with a threshold in `[0, 1)`. The outcome is
//!    1 when `p0 < threshold`, otherwise 0.
//! 3. [`project`]: zero the amplitudes inconsistent with the outcome and
//!    rescale the survivors by `1/√p` where `p` is the chosen branch's
//!    probability.
//!
//! The decision in step 2 needs the reduced `p0` on the host, which is why
//! a measurement is a blocking round trip between two backend passes.

use super::backend::ExecutionBackend;
use crate::core::{AmplitudeStore, Outcome, Qubit, Result, SimError, PROBABILITY_EPSILON};
use crate::operations::GateKind;
use tracing::{debug, warn};

/// What one measurement-class operation observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRecord {
    /// Position of the operation in its circuit.
    pub op_index: usize,
    /// `Measure`, `MeasureForced` or `Probe`.
    pub kind: GateKind,
    /// Measured qubit.
    pub target: Qubit,
    /// Marginal probability `p0` of the target reading 0.
    pub probability: f64,
    /// Threshold used to resolve the outcome. `None` for probes.
    pub threshold: Option<f64>,
    /// Collapsed value. `None` for probes.
    pub outcome: Option<Outcome>,
}

fn check_target(store: &AmplitudeStore, target: Qubit) -> Result<()> {
    if target.index() >= store.num_qubits() {
        return Err(SimError::QubitOutOfRange { qubit: target, num_qubits: store.num_qubits() });
    }
    Ok(())
}

/// Probability that `target` reads 0. Read-only; clamped into `[0, 1]`.
pub fn probe(backend: &dyn ExecutionBackend, store: &AmplitudeStore, target: Qubit) -> Result<f64> {
    check_target(store, target)?;
    let p0 = backend.masked_probability(store, target.mask())?;
    Ok(p0.clamp(0.0, 1.0))
}

/// Chooses the outcome for `p0` against `threshold`.
///
/// Outcome 1 iff `p0 < threshold`. A branch whose probability is within
/// [`PROBABILITY_EPSILON`] of zero is never chosen, whatever the threshold.
pub fn resolve(p0: f64, threshold: f64) -> Outcome {
    let compared = if p0 < threshold { Outcome::One } else { Outcome::Zero };
    let guarded = if p0 <= PROBABILITY_EPSILON {
        Outcome::One
    } else if p0 >= 1.0 - PROBABILITY_EPSILON {
        Outcome::Zero
    } else {
        compared
    };
    if guarded != compared {
        warn!(p0, threshold, outcome = %guarded, "threshold selected an empty branch; resolved deterministically");
    }
    guarded
}

/// Probability of the branch that collapses to `outcome`.
pub fn branch_probability(p0: f64, outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Zero => p0,
        Outcome::One => 1.0 - p0,
    }
}

/// Collapses `target` onto `outcome` and renormalizes.
pub fn project(
    backend: &dyn ExecutionBackend,
    store: &mut AmplitudeStore,
    target: Qubit,
    outcome: Outcome,
    p0: f64,
) -> Result<()> {
    check_target(store, target)?;
    let p = branch_probability(p0, outcome).max(PROBABILITY_EPSILON);
    let scale = 1.0 / p.sqrt();
    backend.project(store, target.mask(), outcome == Outcome::One, scale)?;
    Ok(())
}

/// Probe, resolve against `threshold`, then project. Returns `(p0, outcome)`.
pub fn measure(
    backend: &dyn ExecutionBackend,
    store: &mut AmplitudeStore,
    target: Qubit,
    threshold: f64,
) -> Result<(f64, Outcome)> {
    let p0 = probe(backend, store, target)?;
    let outcome = resolve(p0, threshold);
    debug!(%target, p0, threshold, %outcome, "measurement resolved");
    project(backend, store, target, outcome, p0)?;
    Ok((p0, outcome))
}
