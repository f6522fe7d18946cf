// src/simulation/engine.rs

use super::backend::{ExecutionBackend, PairKernel};
use crate::core::{AmplitudeStore, Qubit, Result, SimError};
use crate::operations::{GateKind, Operation};
use tracing::trace;

/// Applies unitary gates to an amplitude store through an execution backend.
///
/// For target `t` the store is split into pairs `(i0, i0 | 1<<t)` with bit
/// `t` of `i0` clear. Every pair is independent of every other, so the
/// backend may visit them in any order or in parallel. Controlled gates only
/// touch pairs whose control bit is set.
pub(crate) struct GateEngine<'b> {
    backend: &'b dyn ExecutionBackend,
}

impl<'b> GateEngine<'b> {
    pub(crate) fn new(backend: &'b dyn ExecutionBackend) -> Self {
        Self { backend }
    }

    /// Applies one gate operation. Measurement-class operations are rejected;
    /// they belong to the measurement protocol.
    pub(crate) fn apply(&self, store: &mut AmplitudeStore, op: &Operation) -> Result<()> {
        let target = op.target();
        check_qubit(store, target)?;

        let (kernel, control) = match op.kind() {
            GateKind::H => (PairKernel::Hadamard, None),
            GateKind::X => (PairKernel::Swap, None),
            GateKind::Z => (PairKernel::NegateSecond, None),
            GateKind::Cx => (PairKernel::Swap, Some(control_of(store, op)?)),
            GateKind::Cz => (PairKernel::NegateSecond, Some(control_of(store, op)?)),
            GateKind::Phase => {
                return Err(SimError::UnimplementedGate { gate: op.kind().to_string() });
            }
            GateKind::Measure | GateKind::MeasureForced | GateKind::Probe => {
                return Err(SimError::InvalidConfiguration {
                    message: format!("{} is not a gate and cannot be applied by the gate engine", op.kind()),
                });
            }
        };

        trace!(gate = %op.kind(), %target, control = ?control, ?kernel, "pair transform");
        self.backend
            .pair_transform(store, kernel, target.mask(), control.map(Qubit::mask))?;
        Ok(())
    }
}

fn check_qubit(store: &AmplitudeStore, qubit: Qubit) -> Result<()> {
    if qubit.index() >= store.num_qubits() {
        return Err(SimError::QubitOutOfRange { qubit, num_qubits: store.num_qubits() });
    }
    Ok(())
}

fn control_of(store: &AmplitudeStore, op: &Operation) -> Result<Qubit> {
    let control = op
        .control()
        .ok_or_else(|| SimError::MissingControl { gate: op.kind().to_string(), target: op.target() })?;
    check_qubit(store, control)?;
    if control == op.target() {
        return Err(SimError::ControlEqualsTarget { qubit: control, gate: op.kind().to_string() });
    }
    Ok(control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FRAC_1_SQRT_2;
    use crate::simulation::backend::SerialBackend;
    use num_complex::Complex;
    use num_traits::Zero;

    const TEST_TOLERANCE: f64 = 1e-12;

    fn assert_complex_vec_approx_equal(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).norm_sqr() < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i, a, e, context
            );
        }
    }

    #[test]
    fn hadamard_on_ground_state() -> Result<()> {
        let backend = SerialBackend::new();
        let engine = GateEngine::new(&backend);
        let mut store = AmplitudeStore::new(1)?;
        engine.apply(&mut store, &Operation::h(0))?;
        let s = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert_complex_vec_approx_equal(&store.amplitudes(), &[s, s], "H|0>");
        Ok(())
    }

    #[test]
    fn z_negates_set_half() -> Result<()> {
        let backend = SerialBackend::new();
        let engine = GateEngine::new(&backend);
        let mut store = AmplitudeStore::new(1)?;
        engine.apply(&mut store, &Operation::h(0))?;
        engine.apply(&mut store, &Operation::z(0))?;
        let s = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert_complex_vec_approx_equal(&store.amplitudes(), &[s, -s], "ZH|0>");
        Ok(())
    }

    #[test]
    fn cz_acts_only_on_control_set() -> Result<()> {
        let backend = SerialBackend::new();
        let engine = GateEngine::new(&backend);
        let mut store = AmplitudeStore::new(2)?;
        engine.apply(&mut store, &Operation::h(0))?;
        engine.apply(&mut store, &Operation::h(1))?;
        engine.apply(&mut store, &Operation::cz(0, 1))?;
        let h = Complex::new(0.5, 0.0);
        assert_complex_vec_approx_equal(&store.amplitudes(), &[h, h, h, -h], "CZ on |++>");
        Ok(())
    }

    #[test]
    fn cx_targets_high_bit() -> Result<()> {
        let backend = SerialBackend::new();
        let engine = GateEngine::new(&backend);
        let mut store = AmplitudeStore::new(3)?;
        engine.apply(&mut store, &Operation::x(0))?;
        engine.apply(&mut store, &Operation::cx(0, 2))?;
        let mut expected = vec![Complex::zero(); 8];
        expected[0b101] = Complex::new(1.0, 0.0);
        assert_complex_vec_approx_equal(&store.amplitudes(), &expected, "CX(q0 -> q2) on |001>");
        Ok(())
    }

    #[test]
    fn phase_fails_loudly() -> Result<()> {
        let backend = SerialBackend::new();
        let engine = GateEngine::new(&backend);
        let mut store = AmplitudeStore::new(1)?;
        let err = engine.apply(&mut store, &Operation::phase(0, 0.1, 0.2, 0.3));
        assert_eq!(err, Err(SimError::UnimplementedGate { gate: "PHASE".to_string() }));
        Ok(())
    }

    #[test]
    fn configuration_errors() -> Result<()> {
        let backend = SerialBackend::new();
        let engine = GateEngine::new(&backend);
        let mut store = AmplitudeStore::new(2)?;
        assert!(matches!(engine.apply(&mut store, &Operation::cx(1, 1)), Err(SimError::ControlEqualsTarget { .. })));
        assert!(matches!(engine.apply(&mut store, &Operation::h(2)), Err(SimError::QubitOutOfRange { .. })));
        assert!(matches!(engine.apply(&mut store, &Operation::cx(3, 0)), Err(SimError::QubitOutOfRange { .. })));
        assert!(matches!(
            engine.apply(&mut store, &Operation::measure(0)),
            Err(SimError::InvalidConfiguration { .. })
        ));
        // nothing was touched
        assert_eq!(store, AmplitudeStore::new(2)?);
        Ok(())
    }
}
