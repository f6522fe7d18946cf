//! Numeric constants shared by the simulation kernels.

/// Tolerances and limits used across the simulator.
pub mod sim_constants {
    /// Branch probabilities at or below this value are treated as exactly zero.
    pub const PROBABILITY_EPSILON: f64 = 1e-12;
    /// Allowed deviation of `Σ|a_i|²` from 1.0 in normalization checks.
    pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;
    /// Elementwise tolerance when comparing two amplitude vectors.
    pub const VERIFY_TOLERANCE: f64 = 1e-7;
    /// Number of individual mismatches kept (and logged) by a verification.
    pub const MAX_REPORTED_MISMATCHES: usize = 10;
    /// 1/√2, the Hadamard coefficient.
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
}
