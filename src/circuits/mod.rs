// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`statevec::operations::Operation`).
//!
//! A [`Circuit`] is the operation list of one run: a qubit count plus an
//! ordered sequence whose order defines the total execution order.

use crate::core::{Qubit, Result, SimError};
use crate::operations::{GateKind, OpParams, Operation};
use std::fmt;

/// An ordered sequence of operations on an n-qubit register.
///
/// Order is semantically significant: the simulator executes operations one
/// at a time in exactly this order.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits, operations: Vec::new() }
    }

    /// Appends an operation.
    pub fn add_operation(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Appends every operation from `ops`, in order.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        self.operations.extend(ops);
    }

    /// Register width n.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The ordered operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Mutable access for recording measurement outputs.
    pub(crate) fn operations_mut(&mut self) -> &mut [Operation] {
        &mut self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Structural pre-flight check, run before any amplitude is touched.
    ///
    /// Rejects a zero qubit count, out-of-range qubits, controlled gates
    /// without a distinct control, controls on uncontrolled operations and
    /// forced thresholds outside `[0, 1)`. `PHASE` passes this check and
    /// fails only when executed.
    pub fn validate(&self) -> Result<()> {
        if self.num_qubits == 0 {
            return Err(SimError::InvalidQubitCount { count: 0 });
        }
        for op in &self.operations {
            self.check_qubit(op.target())?;
            match (op.kind().is_controlled(), op.control()) {
                (true, None) => {
                    return Err(SimError::MissingControl { gate: op.kind().to_string(), target: op.target() });
                }
                (true, Some(control)) => {
                    self.check_qubit(control)?;
                    if control == op.target() {
                        return Err(SimError::ControlEqualsTarget { qubit: control, gate: op.kind().to_string() });
                    }
                }
                (false, Some(_)) => {
                    return Err(SimError::UnexpectedControl { gate: op.kind().to_string(), target: op.target() });
                }
                (false, None) => {}
            }
            Self::check_params(op)?;
        }
        Ok(())
    }

    /// Each kind takes exactly one parameter shape: angles for `PHASE`, a
    /// threshold in `[0, 1)` for `MEASURE_FORCED`, nothing for the rest.
    fn check_params(op: &Operation) -> Result<()> {
        let unexpected = |params: Option<OpParams>| SimError::UnexpectedParams {
            gate: op.kind().to_string(),
            target: op.target(),
            params: format!("{:?}", params),
        };
        match (op.kind(), op.params()) {
            (GateKind::Phase, Some(OpParams::Angles { .. })) => Ok(()),
            (GateKind::MeasureForced, Some(OpParams::Threshold(t))) if (0.0..1.0).contains(&t) => Ok(()),
            (GateKind::MeasureForced, Some(OpParams::Threshold(t))) => Err(SimError::InvalidThreshold { threshold: t }),
            (GateKind::MeasureForced, None) => Err(SimError::InvalidThreshold { threshold: f64::NAN }),
            (GateKind::Phase | GateKind::MeasureForced, params) => Err(unexpected(params)),
            (_, None) => Ok(()),
            (_, params) => Err(unexpected(params)),
        }
    }

    fn check_qubit(&self, qubit: Qubit) -> Result<()> {
        if qubit.index() >= self.num_qubits {
            return Err(SimError::QubitOutOfRange { qubit, num_qubits: self.num_qubits });
        }
        Ok(())
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Builds a [`Circuit`] by method chaining.
///
/// ```
/// use statevec::CircuitBuilder;
///
/// let circuit = CircuitBuilder::new(2).h(0).cx(0, 1).measure(1).build();
/// assert_eq!(circuit.len(), 3);
/// assert!(circuit.validate().is_ok());
/// ```
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Starts an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self { circuit: Circuit::new(num_qubits) }
    }

    /// Appends one operation.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Appends several operations.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Hadamard.
    pub fn h(self, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::h(target))
    }

    /// Pauli-X.
    pub fn x(self, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::x(target))
    }

    /// Pauli-Z.
    pub fn z(self, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::z(target))
    }

    /// Controlled X.
    pub fn cx(self, control: impl Into<Qubit>, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::cx(control, target))
    }

    /// Controlled Z.
    pub fn cz(self, control: impl Into<Qubit>, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::cz(control, target))
    }

    /// Reserved phase rotation.
    pub fn phase(self, target: impl Into<Qubit>, theta: f64, phi: f64, lambda: f64) -> Self {
        self.add_op(Operation::phase(target, theta, phi, lambda))
    }

    /// Sampled measurement.
    pub fn measure(self, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::measure(target))
    }

    /// Measurement against a fixed threshold.
    pub fn measure_forced(self, target: impl Into<Qubit>, threshold: f64) -> Self {
        self.add_op(Operation::measure_forced(target, threshold))
    }

    /// Probability-only probe.
    pub fn probe(self, target: impl Into<Qubit>) -> Self {
        self.add_op(Operation::probe(target))
    }

    /// Finishes the circuit. Validation happens when it is run.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_ops = self.operations.len();
        let num_qubits = self.num_qubits;
        writeln!(f, "statevec::Circuit[{} operations on {} qubits]", num_ops, num_qubits)?;
        if num_ops == 0 || num_qubits == 0 {
            return Ok(());
        }

        const GATE_WIDTH: usize = 7; // e.g. "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        let label_width = format!("{}", Qubit(num_qubits - 1)).len() + 2;

        // op_grid[row][time] holds the wire segment, v_connect[row][time] the
        // connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total = GATE_WIDTH - slen;
                let pre = total / 2;
                let post = total - pre;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre), symbol, H_WIRE.to_string().repeat(post))
            }
        }

        for (t, op) in self.operations.iter().enumerate() {
            let row = op.target().index();
            if row >= num_qubits {
                continue;
            }
            let symbol = match op.kind() {
                GateKind::H => "H",
                GateKind::X => "X",
                GateKind::Z => "Z",
                GateKind::Cx => "X",
                GateKind::Cz => "●",
                GateKind::Phase => "P",
                GateKind::Measure => "M",
                GateKind::MeasureForced => "M!",
                GateKind::Probe => "?",
            };
            op_grid[row][t] = format_gate(symbol);
            if let Some(control) = op.control().map(Qubit::index).filter(|c| *c < num_qubits) {
                op_grid[control][t] = format_gate("@");
                let r_min = control.min(row);
                let r_max = control.max(row);
                for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                    row_vec[t] = V_WIRE;
                }
            }
        }

        for r in 0..num_qubits {
            let label = format!("{}: ", Qubit(r));
            write!(f, "{:<width$}", label, width = label_width)?;
            writeln!(f, "{}", op_grid[r].join(""))?;
            if r < num_qubits - 1 {
                write!(f, "{}", " ".repeat(label_width))?;
                for t in 0..num_ops {
                    let pad = GATE_WIDTH - 1;
                    let pre = pad / 2;
                    write!(f, "{}{}{}", " ".repeat(pre), v_connect[r][t], " ".repeat(pad - pre))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
