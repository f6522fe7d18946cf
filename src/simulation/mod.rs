// src/simulation/mod.rs

//! Executes a `statevec::circuits::Circuit` against an amplitude store.
//!
//! The `Simulator` is the sequencer: it walks the operation list in order,
//! hands gates to the gate engine and measurement-class operations to the
//! measurement protocol, and only starts an operation after the previous
//! one has fully completed on the execution backend. Parallelism lives
//! inside a single backend call, never across operations.

pub mod backend;
pub mod config;
pub mod measurement;
pub mod rng;
pub mod verify;
mod results;
pub(crate) mod engine;

// Re-export the main public interface types
pub use backend::{BackendFault, ExecutionBackend, PairKernel, RayonBackend, SerialBackend};
pub use config::{BackendKind, SimulatorConfig};
pub use measurement::MeasurementRecord;
pub use results::SimulationResult;
pub use rng::{FixedThresholds, RandomSource, SeededRandom};
pub use verify::{compare_amplitudes, Mismatch, VerificationReport};

use crate::circuits::Circuit;
use crate::core::{AmplitudeStore, Result, SimError, VERIFY_TOLERANCE};
use crate::operations::GateKind;
use crate::validation::check_normalization;
use engine::GateEngine;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

/// The main simulator orchestrating the execution of circuits.
///
/// The execution backend is built on first use and reused by every later
/// run of the same `Simulator` (and its clones).
#[derive(Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
    backend: OnceLock<Arc<dyn ExecutionBackend>>,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("backend", &self.backend.get().map(|b| b.name()))
            .finish()
    }
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Simulator with the given configuration.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self { config, backend: OnceLock::new() }
    }

    /// The active configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// The backend named by the configuration, built once per simulator.
    pub fn backend(&self) -> &dyn ExecutionBackend {
        self.backend
            .get_or_init(|| -> Arc<dyn ExecutionBackend> {
                match self.config.backend {
                    BackendKind::Serial => Arc::new(SerialBackend::new()),
                    BackendKind::Parallel { threads } => {
                        Arc::new(RayonBackend::new(threads, self.config.parallel_threshold))
                    }
                }
            })
            .as_ref()
    }

    fn default_rng(&self) -> SeededRandom {
        match self.config.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        }
    }

    /// Runs a simulation of the provided circuit.
    ///
    /// Sampled measurements draw their thresholds from a `SeededRandom`
    /// seeded from the configuration. Measurement-class operations in
    /// `circuit` receive their observed probability and outcome.
    ///
    /// # Returns
    /// * `Ok(SimulationResult)` with the outcome vector, the measurement log
    ///   and, when configured, the final amplitudes.
    /// * `Err(SimError)` for configuration errors (before any amplitude is
    ///   touched, or at the offending operation) and backend failures.
    pub fn run(&self, circuit: &mut Circuit) -> Result<SimulationResult> {
        let mut rng = self.default_rng();
        self.run_with_rng(circuit, &mut rng)
    }

    /// Same as [`run`](Self::run) with an explicit randomness source.
    pub fn run_with_rng(&self, circuit: &mut Circuit, rng: &mut dyn RandomSource) -> Result<SimulationResult> {
        self.run_on(self.backend(), circuit, rng)
    }

    /// Same as [`run_with_rng`](Self::run_with_rng) on a caller supplied backend.
    pub fn run_on(
        &self,
        backend: &dyn ExecutionBackend,
        circuit: &mut Circuit,
        rng: &mut dyn RandomSource,
    ) -> Result<SimulationResult> {
        self.preflight(circuit)?;
        let (mut result, store) = self.execute(backend, circuit, rng)?;
        if self.config.capture_state {
            result.set_final_amplitudes(store.amplitudes());
        }
        Ok(result)
    }

    /// Runs `circuit` on the configured backend and on `SerialBackend` with
    /// the same thresholds, then compares final amplitudes (tolerance
    /// `VERIFY_TOLERANCE`) and outcome vectors.
    ///
    /// The caller's circuit is not modified.
    pub fn cross_check(&self, circuit: &Circuit) -> Result<VerificationReport> {
        self.preflight(circuit)?;
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let backend = self.backend();

        let mut under_test = circuit.clone();
        let (actual_result, actual) = self.execute(backend, &mut under_test, &mut SeededRandom::new(seed))?;

        let mut reference_circuit = circuit.clone();
        let (expected_result, expected) =
            self.execute(&SerialBackend::new(), &mut reference_circuit, &mut SeededRandom::new(seed))?;

        let mut report = compare_amplitudes(&actual.amplitudes(), &expected.amplitudes(), VERIFY_TOLERANCE)?;
        report.outcome_mismatches = actual_result
            .outcomes()
            .iter()
            .zip(expected_result.outcomes())
            .enumerate()
            .filter(|(_, (a, e))| a != e)
            .map(|(q, _)| q)
            .collect();
        info!(backend = backend.name(), seed, %report, "cross-check finished");
        Ok(report)
    }

    fn preflight(&self, circuit: &Circuit) -> Result<()> {
        self.config.check(circuit.num_qubits())?;
        circuit.validate()
    }

    /// Walks the operation list. Every backend call returns only after its
    /// work is complete, so each operation sees the full effect of the last.
    fn execute(
        &self,
        backend: &dyn ExecutionBackend,
        circuit: &mut Circuit,
        rng: &mut dyn RandomSource,
    ) -> Result<(SimulationResult, AmplitudeStore)> {
        let num_qubits = circuit.num_qubits();
        info!(
            backend = backend.name(),
            workers = backend.workers(),
            num_qubits,
            operations = circuit.len(),
            "starting simulation run"
        );

        let mut store = AmplitudeStore::new(num_qubits)?;
        let mut result = SimulationResult::new(num_qubits);
        let engine = GateEngine::new(backend);

        for (op_index, op) in circuit.operations_mut().iter_mut().enumerate() {
            debug!(op_index, op = %op, "dispatching");
            let target = op.target();
            let step = match op.kind() {
                GateKind::Measure | GateKind::MeasureForced => {
                    // sampled measurements always draw; only forced ones carry a threshold
                    let threshold = if op.kind() == GateKind::Measure {
                        rng.next_threshold()
                    } else {
                        op.threshold().ok_or(SimError::InvalidThreshold { threshold: f64::NAN })?
                    };
                    measurement::measure(backend, &mut store, target, threshold).map(|(p0, outcome)| {
                        op.record(p0, Some(outcome));
                        result.record_measurement(MeasurementRecord {
                            op_index,
                            kind: op.kind(),
                            target,
                            probability: p0,
                            threshold: Some(threshold),
                            outcome: Some(outcome),
                        });
                    })
                }
                GateKind::Probe => measurement::probe(backend, &store, target).map(|p0| {
                    debug!(%target, p0, "probe");
                    op.record(p0, None);
                    result.record_measurement(MeasurementRecord {
                        op_index,
                        kind: GateKind::Probe,
                        target,
                        probability: p0,
                        threshold: None,
                        outcome: None,
                    });
                }),
                _ => engine.apply(&mut store, op),
            };
            step.inspect_err(|e| error!(op_index, op = %op, error = %e, "operation failed"))?;

            if self.config.validate_each_step {
                check_normalization(&store, Some(self.config.norm_tolerance))?;
            }
        }

        Ok((result, store))
    }
}
