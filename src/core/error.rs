//! Error handling logic

use super::qubit::Qubit;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Failures a simulation run can report.
///
/// Configuration errors are raised before or at the offending operation.
/// Backend errors wrap the diagnostic of the execution backend and are never
/// retried; the amplitude store of a failed run must be discarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The register must hold at least one qubit.
    #[error("Invalid qubit count {count}: a register needs at least one qubit")]
    InvalidQubitCount {
        /// Requested qubit count
        count: usize,
    },

    /// `2^n` amplitudes cannot be addressed or allocated.
    #[error("State for {num_qubits} qubits is too large: {message}")]
    StateTooLarge {
        /// Requested qubit count
        num_qubits: usize,
        /// Why the allocation was refused
        message: String,
    },

    /// An operation names a qubit outside `0..num_qubits`.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit register")]
    QubitOutOfRange {
        /// Offending qubit
        qubit: Qubit,
        /// Register width
        num_qubits: usize,
    },

    /// A controlled gate uses the same qubit as control and target.
    #[error("Control and target are both {qubit} in controlled gate {gate}")]
    ControlEqualsTarget {
        /// The shared qubit
        qubit: Qubit,
        /// Gate name
        gate: String,
    },

    /// A controlled gate was built without a control qubit.
    #[error("Gate {gate} on {target} requires a control qubit")]
    MissingControl {
        /// Gate name
        gate: String,
        /// Target qubit
        target: Qubit,
    },

    /// A single-qubit gate or measurement carries a control qubit.
    #[error("Gate {gate} on {target} does not accept a control qubit")]
    UnexpectedControl {
        /// Gate name
        gate: String,
        /// Target qubit
        target: Qubit,
    },

    /// An operation carries parameters its kind does not take.
    #[error("Operation {gate} on {target} does not accept parameters {params}")]
    UnexpectedParams {
        /// Operation name
        gate: String,
        /// Target qubit
        target: Qubit,
        /// The rejected parameters, as debug text
        params: String,
    },

    /// The gate kind is part of the operation model but has no transform.
    #[error("Gate {gate} is reserved and not implemented")]
    UnimplementedGate {
        /// Gate name
        gate: String,
    },

    /// A forced measurement threshold lies outside `[0, 1)`.
    #[error("Measurement threshold {threshold} is outside [0, 1)")]
    InvalidThreshold {
        /// The rejected threshold
        threshold: f64,
    },

    /// The simulator configuration is inconsistent with the requested run.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Invalid configuration message
        message: String,
    },

    /// Two vectors that must agree in length do not.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// The execution backend reported an internal fault.
    #[error("Backend failure (code {code}): {message}")]
    Backend {
        /// Backend specific error code
        code: i32,
        /// Backend diagnostic
        message: String,
    },

    /// The state lost normalization beyond tolerance.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },
}

impl SimError {
    /// True for errors raised by validating the run's inputs, as opposed to
    /// failures during execution.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SimError::Backend { .. } | SimError::Incoherence { .. })
    }
}
