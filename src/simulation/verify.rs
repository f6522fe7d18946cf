// src/simulation/verify.rs

//! Elementwise comparison of two amplitude vectors against a reference.

use crate::core::{Result, SimError, MAX_REPORTED_MISMATCHES};
use num_complex::Complex;
use std::fmt;
use tracing::error;

/// One entry that differed by more than the tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mismatch {
    /// Amplitude index.
    pub index: usize,
    /// Value under test.
    pub actual: Complex<f64>,
    /// Reference value.
    pub expected: Complex<f64>,
}

/// Summary of [`compare_amplitudes`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    /// Entries compared.
    pub checked: usize,
    /// Entries outside tolerance.
    pub mismatches: usize,
    /// The first few mismatches, at most `MAX_REPORTED_MISMATCHES`.
    pub first_mismatches: Vec<Mismatch>,
    /// Qubits whose recorded outcomes differ. Only filled by a full
    /// cross-check run.
    pub outcome_mismatches: Vec<usize>,
}

impl VerificationReport {
    /// True when no amplitude and no outcome differed.
    pub fn passed(&self) -> bool {
        self.mismatches == 0 && self.outcome_mismatches.is_empty()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "PASS ({} amplitudes)", self.checked);
        }
        write!(f, "FAIL ({} of {} amplitudes differ", self.mismatches, self.checked)?;
        if !self.outcome_mismatches.is_empty() {
            write!(f, ", outcomes differ on qubits {:?}", self.outcome_mismatches)?;
        }
        write!(f, ")")
    }
}

/// Compares real and imaginary parts separately; an entry mismatches when
/// either differs by more than `tolerance`.
pub fn compare_amplitudes(
    actual: &[Complex<f64>],
    expected: &[Complex<f64>],
    tolerance: f64,
) -> Result<VerificationReport> {
    if actual.len() != expected.len() {
        return Err(SimError::DimensionMismatch { expected: expected.len(), actual: actual.len() });
    }
    let mut report = VerificationReport {
        checked: actual.len(),
        mismatches: 0,
        first_mismatches: Vec::new(),
        outcome_mismatches: Vec::new(),
    };
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        // NaN compares false, so test for "within" and negate.
        let within = (a.re - e.re).abs() <= tolerance && (a.im - e.im).abs() <= tolerance;
        if within {
            continue;
        }
        if report.mismatches < MAX_REPORTED_MISMATCHES {
            error!(index, actual = %a, expected = %e, "amplitude mismatch");
            report.first_mismatches.push(Mismatch { index, actual: *a, expected: *e });
        }
        report.mismatches += 1;
    }
    Ok(report)
}
