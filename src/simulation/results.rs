// src/simulation/results.rs
use super::measurement::MeasurementRecord;
use crate::core::{Outcome, Qubit};
use crate::operations::GateKind;
use num_complex::Complex;
use std::fmt;

/// Holds the results of a circuit simulation.
///
/// The outcome vector has one entry per qubit, `None` for qubits that were
/// never measured. A later measurement of the same qubit overwrites the
/// earlier entry; every individual measurement remains in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    outcomes: Vec<Option<Outcome>>,
    measurements: Vec<MeasurementRecord>,
    final_amplitudes: Option<Vec<Complex<f64>>>,
}

impl SimulationResult {
    /// Creates an empty result for an n-qubit register. (Internal visibility)
    pub(crate) fn new(num_qubits: usize) -> Self {
        Self {
            outcomes: vec![None; num_qubits],
            measurements: Vec::new(),
            final_amplitudes: None,
        }
    }

    /// Logs a measurement-class operation and, if it collapsed the target,
    /// updates the outcome vector. (Internal visibility)
    pub(crate) fn record_measurement(&mut self, record: MeasurementRecord) {
        if let (Some(outcome), Some(slot)) = (record.outcome, self.outcomes.get_mut(record.target.index())) {
            *slot = Some(outcome);
        }
        self.measurements.push(record);
    }

    /// Attaches the final amplitude vector. (Internal visibility)
    pub(crate) fn set_final_amplitudes(&mut self, amplitudes: Vec<Complex<f64>>) {
        self.final_amplitudes = Some(amplitudes);
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.outcomes.len()
    }

    /// Latest outcome of `qubit`, or `None` if it was never measured.
    pub fn outcome(&self, qubit: impl Into<Qubit>) -> Option<Outcome> {
        self.outcomes.get(qubit.into().index()).copied().flatten()
    }

    /// The outcome vector, indexed by qubit.
    pub fn outcomes(&self) -> &[Option<Outcome>] {
        &self.outcomes
    }

    /// The outcome vector as bits, with `default` for unmeasured qubits.
    pub fn outcome_bits(&self, default: u8) -> Vec<u8> {
        self.outcomes.iter().map(|o| o.map_or(default, Outcome::bit)).collect()
    }

    /// Every measurement-class operation in execution order.
    pub fn measurements(&self) -> &[MeasurementRecord] {
        &self.measurements
    }

    /// Only the probability-only probes.
    pub fn probes(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.measurements.iter().filter(|m| m.kind == GateKind::Probe)
    }

    /// Final amplitudes, when the run was configured to capture them.
    pub fn final_amplitudes(&self) -> Option<&[Complex<f64>]> {
        self.final_amplitudes.as_deref()
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        let measured: Vec<_> = self.outcomes.iter().enumerate().filter_map(|(q, o)| o.map(|o| (q, o))).collect();
        if measured.is_empty() {
            writeln!(f, "  No qubits were measured.")?;
        } else {
            writeln!(f, "  Outcomes:")?;
            for (q, outcome) in measured {
                writeln!(f, "    {}: {}", Qubit(q), outcome)?;
            }
        }
        for probe in self.probes() {
            writeln!(f, "  Probe #{} {}: p0 = {:.6}", probe.op_index, probe.target, probe.probability)?;
        }
        if let Some(amplitudes) = &self.final_amplitudes {
            writeln!(f, "  Final amplitudes:")?;
            for (i, a) in amplitudes.iter().enumerate() {
                writeln!(f, "    |{:0width$b}>: {:.6}", i, a, width = self.outcomes.len())?;
            }
        }
        Ok(())
    }
}
