// src/core/qubit.rs

use std::fmt;

/// Index of a qubit within an n-qubit register.
///
/// A qubit owns no storage. Qubit `q` is bit `q` of an amplitude index, so
/// `Qubit(0)` is the least significant bit of the basis state label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qubit(pub usize);

impl Qubit {
    /// The raw index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Single-bit mask selecting this qubit in an amplitude index.
    pub fn mask(self) -> usize {
        1usize << self.0
    }
}

impl From<usize> for Qubit {
    fn from(index: usize) -> Self {
        Qubit(index)
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}
