//! Simulator configuration

use crate::core::{Result, SimError, DEFAULT_NORM_TOLERANCE};

/// Which execution backend a [`Simulator`](super::Simulator) dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Single-threaded reference kernels.
    Serial,
    /// Rayon data parallelism. `None` runs on rayon's global pool; `Some(n)`
    /// on a dedicated pool of `n` workers.
    Parallel {
        /// Worker count
        threads: Option<usize>,
    },
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Parallel { threads: None }
    }
}

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Seed for the default randomness source.
    ///
    /// `None` seeds from operating system entropy. Set it for reproducible
    /// sampled measurements.
    ///
    /// Default: None
    pub seed: Option<u64>,

    /// Execution backend.
    ///
    /// Default: `Parallel { threads: None }`
    pub backend: BackendKind,

    /// Minimum qubit count at which the parallel backend fans out.
    ///
    /// Narrower registers run the serial kernels to avoid pool overhead.
    ///
    /// Default: 12
    pub parallel_threshold: usize,

    /// Largest register a run may allocate.
    ///
    /// Default: 30
    pub max_qubits: usize,

    /// Return the final amplitude vector with the result.
    ///
    /// Default: false
    pub capture_state: bool,

    /// Largest register whose final amplitudes may be captured.
    ///
    /// Default: 16
    pub max_capture_qubits: usize,

    /// Check `Σ|a_i|² ≈ 1` after every operation.
    ///
    /// Default: false
    pub validate_each_step: bool,

    /// Tolerance for the per-operation normalization check.
    ///
    /// Default: 1e-9
    pub norm_tolerance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            backend: BackendKind::default(),
            parallel_threshold: 12,
            max_qubits: 30,
            capture_state: false,
            max_capture_qubits: 16,
            validate_each_step: false,
            norm_tolerance: DEFAULT_NORM_TOLERANCE,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Serial, seeded, validating configuration for tests and debugging.
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            backend: BackendKind::Serial,
            validate_each_step: true,
            ..Default::default()
        }
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the parallel fan-out threshold in qubits.
    pub fn with_parallel_threshold(mut self, qubits: usize) -> Self {
        self.parallel_threshold = qubits;
        self
    }

    /// Requests the final amplitude vector.
    pub fn with_state_capture(mut self, capture: bool) -> Self {
        self.capture_state = capture;
        self
    }

    /// Enables the per-operation normalization check.
    pub fn with_step_validation(mut self, validate: bool) -> Self {
        self.validate_each_step = validate;
        self
    }

    /// Checks the configuration against a run over `num_qubits` qubits.
    pub fn check(&self, num_qubits: usize) -> Result<()> {
        if num_qubits == 0 {
            return Err(SimError::InvalidQubitCount { count: num_qubits });
        }
        if num_qubits > self.max_qubits {
            return Err(SimError::StateTooLarge {
                num_qubits,
                message: format!("configured limit is {} qubits", self.max_qubits),
            });
        }
        if self.capture_state && num_qubits > self.max_capture_qubits {
            return Err(SimError::InvalidConfiguration {
                message: format!(
                    "state capture requested for {} qubits, limit is {}",
                    num_qubits, self.max_capture_qubits
                ),
            });
        }
        if let BackendKind::Parallel { threads: Some(0) } = self.backend {
            return Err(SimError::InvalidConfiguration { message: "parallel backend needs at least one thread".to_string() });
        }
        if !(self.norm_tolerance.is_finite() && self.norm_tolerance > 0.0) {
            return Err(SimError::InvalidConfiguration {
                message: format!("norm tolerance must be positive, got {}", self.norm_tolerance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_parallel_on_global_pool() {
        assert_eq!(BackendKind::default(), BackendKind::Parallel { threads: None });
        assert_eq!(SimulatorConfig::default().backend, BackendKind::default());
    }

    #[test]
    fn defaults_pass_for_small_registers() {
        assert!(SimulatorConfig::default().check(4).is_ok());
        assert!(SimulatorConfig::deterministic(1).check(1).is_ok());
    }

    #[test]
    fn capture_limit_enforced() {
        let config = SimulatorConfig::new().with_state_capture(true);
        assert!(config.check(16).is_ok());
        assert!(matches!(config.check(17), Err(SimError::InvalidConfiguration { .. })));
    }

    #[test]
    fn limits_and_bad_values() {
        let config = SimulatorConfig::new();
        assert!(matches!(config.check(31), Err(SimError::StateTooLarge { .. })));
        assert_eq!(config.check(0), Err(SimError::InvalidQubitCount { count: 0 }));

        let config = SimulatorConfig::new().with_backend(BackendKind::Parallel { threads: Some(0) });
        assert!(matches!(config.check(2), Err(SimError::InvalidConfiguration { .. })));

        let config = SimulatorConfig { norm_tolerance: 0.0, ..Default::default() };
        assert!(matches!(config.check(2), Err(SimError::InvalidConfiguration { .. })));
    }
}
