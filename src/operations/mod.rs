// src/operations/mod.rs

//! Defines the elementary operations a circuit is built from.
//!
//! An [`Operation`] is a gate kind plus the qubits it touches and any numeric
//! parameters. Operations are immutable once built, except that measurement
//! class operations record their observed probability and realized outcome
//! after they execute.

use crate::core::{Outcome, Qubit};
use std::fmt;

/// The kind of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// Hadamard: `a' = (a+b)/√2`, `b' = (a−b)/√2`.
    H,
    /// Pauli-X: swaps the pair.
    X,
    /// Pauli-Z: negates the target-set amplitude.
    Z,
    /// Controlled X.
    Cx,
    /// Controlled Z.
    Cz,
    /// Rotation by `(theta, phi, lambda)`. Reserved: carries its angles but
    /// has no transform, and executing it fails.
    Phase,
    /// Measurement with a threshold drawn from the randomness source.
    Measure,
    /// Measurement with a caller supplied threshold.
    MeasureForced,
    /// Marginal probability of the target being 0, without collapse.
    Probe,
}

impl GateKind {
    /// Short mnemonic used in diagrams and errors.
    pub fn name(self) -> &'static str {
        match self {
            GateKind::H => "H",
            GateKind::X => "X",
            GateKind::Z => "Z",
            GateKind::Cx => "CX",
            GateKind::Cz => "CZ",
            GateKind::Phase => "PHASE",
            GateKind::Measure => "MEASURE",
            GateKind::MeasureForced => "MEASURE_FORCED",
            GateKind::Probe => "PROBE",
        }
    }

    /// True for gates that need a control qubit.
    pub fn is_controlled(self) -> bool {
        matches!(self, GateKind::Cx | GateKind::Cz)
    }

    /// True for operations dispatched to the measurement protocol.
    pub fn is_measurement(self) -> bool {
        matches!(self, GateKind::Measure | GateKind::MeasureForced | GateKind::Probe)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric parameters attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpParams {
    /// Rotation angles in radians for phase-type gates.
    Angles {
        /// Polar rotation
        theta: f64,
        /// First azimuthal rotation
        phi: f64,
        /// Second azimuthal rotation
        lambda: f64,
    },
    /// Forced measurement threshold in `[0, 1)`.
    Threshold(f64),
}

/// One entry of an operation list.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    kind: GateKind,
    target: Qubit,
    control: Option<Qubit>,
    params: Option<OpParams>,
    probability: Option<f64>,
    outcome: Option<Outcome>,
}

impl Operation {
    /// Builds an operation from its parts. Prefer the named constructors;
    /// this one performs no validation (see [`crate::Circuit::validate`]).
    pub fn new(kind: GateKind, target: Qubit, control: Option<Qubit>, params: Option<OpParams>) -> Self {
        Self { kind, target, control, params, probability: None, outcome: None }
    }

    /// Hadamard on `target`.
    pub fn h(target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::H, target.into(), None, None)
    }

    /// Pauli-X on `target`.
    pub fn x(target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::X, target.into(), None, None)
    }

    /// Pauli-Z on `target`.
    pub fn z(target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::Z, target.into(), None, None)
    }

    /// Controlled X: flips `target` where `control` is 1.
    pub fn cx(control: impl Into<Qubit>, target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::Cx, target.into(), Some(control.into()), None)
    }

    /// Controlled Z: negates the target-set amplitude where `control` is 1.
    pub fn cz(control: impl Into<Qubit>, target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::Cz, target.into(), Some(control.into()), None)
    }

    /// Reserved phase rotation.
    pub fn phase(target: impl Into<Qubit>, theta: f64, phi: f64, lambda: f64) -> Self {
        Self::new(GateKind::Phase, target.into(), None, Some(OpParams::Angles { theta, phi, lambda }))
    }

    /// Sampled measurement of `target`.
    pub fn measure(target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::Measure, target.into(), None, None)
    }

    /// Measurement of `target` resolved against a fixed `threshold`.
    pub fn measure_forced(target: impl Into<Qubit>, threshold: f64) -> Self {
        Self::new(GateKind::MeasureForced, target.into(), None, Some(OpParams::Threshold(threshold)))
    }

    /// Probability-only inspection of `target`.
    pub fn probe(target: impl Into<Qubit>) -> Self {
        Self::new(GateKind::Probe, target.into(), None, None)
    }

    /// Gate kind.
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Target qubit.
    pub fn target(&self) -> Qubit {
        self.target
    }

    /// Control qubit, for controlled gates.
    pub fn control(&self) -> Option<Qubit> {
        self.control
    }

    /// Numeric parameters, if any.
    pub fn params(&self) -> Option<OpParams> {
        self.params
    }

    /// The forced threshold of a `MeasureForced` operation.
    pub fn threshold(&self) -> Option<f64> {
        match self.params {
            Some(OpParams::Threshold(t)) => Some(t),
            _ => None,
        }
    }

    /// Probability `p0` observed when this operation last executed.
    pub fn probability(&self) -> Option<f64> {
        self.probability
    }

    /// Outcome realized when this measurement last executed.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Stores the outputs of an executed measurement-class operation.
    pub(crate) fn record(&mut self, probability: f64, outcome: Option<Outcome>) {
        self.probability = Some(probability);
        self.outcome = outcome;
    }

    /// Every qubit this operation reads or writes.
    pub fn involved_qubits(&self) -> Vec<Qubit> {
        match self.control {
            Some(control) => vec![control, self.target],
            None => vec![self.target],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.control {
            Some(control) => write!(f, "{}({} -> {})", self.kind, control, self.target)?,
            None => write!(f, "{}({})", self.kind, self.target)?,
        }
        if let Some(OpParams::Threshold(t)) = self.params {
            write!(f, " @ {}", t)?;
        }
        Ok(())
    }
}
