// src/core/state.rs

use super::error::{Result, SimError};
use num_complex::Complex;
use std::fmt;
use std::mem::size_of;

/// The `2^n` complex amplitudes of an n-qubit register.
///
/// Amplitudes are stored as two parallel real arrays, `re` and `im`, the
/// layout an accelerator buffer pair uses. Index `i` is the basis state whose
/// qubit `q` value is bit `q` of `i`. The store is sized once at construction
/// and never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeStore {
    num_qubits: usize,
    re: Vec<f64>,
    im: Vec<f64>,
}

impl AmplitudeStore {
    /// Allocates a register in the basis state `|0…0⟩`.
    ///
    /// Fails with `InvalidQubitCount` for zero qubits and with `StateTooLarge`
    /// when `2^n` amplitudes cannot be addressed or allocated.
    pub fn new(num_qubits: usize) -> Result<Self> {
        let dim = Self::dimension_for(num_qubits)?;
        let mut re = Self::allocate(num_qubits, dim)?;
        let mut im = Self::allocate(num_qubits, dim)?;
        re.resize(dim, 0.0);
        im.resize(dim, 0.0);
        re[0] = 1.0;
        Ok(Self { num_qubits, re, im })
    }

    /// Builds a store from explicit amplitudes. The slice length must be `2^n`.
    /// No normalization is enforced here; see [`crate::validation`].
    pub fn from_amplitudes(num_qubits: usize, amplitudes: &[Complex<f64>]) -> Result<Self> {
        let mut store = Self::new(num_qubits)?;
        store.write(amplitudes)?;
        Ok(store)
    }

    /// Number of amplitudes `2^n` for `num_qubits`, or the reason it is unusable.
    pub fn dimension_for(num_qubits: usize) -> Result<usize> {
        if num_qubits == 0 {
            return Err(SimError::InvalidQubitCount { count: num_qubits });
        }
        let dim = u32::try_from(num_qubits)
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .filter(|dim| dim.leading_zeros() > 0)
            .ok_or_else(|| SimError::StateTooLarge {
                num_qubits,
                message: "2^n overflows the address space".to_string(),
            })?;
        // Two f64 buffers of `dim` entries each must fit in isize::MAX bytes.
        let bytes = dim.checked_mul(2 * size_of::<f64>()).filter(|b| *b <= isize::MAX as usize);
        if bytes.is_none() {
            return Err(SimError::StateTooLarge {
                num_qubits,
                message: format!("{} amplitudes exceed addressable storage", dim),
            });
        }
        Ok(dim)
    }

    fn allocate(num_qubits: usize, dim: usize) -> Result<Vec<f64>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(dim).map_err(|e| SimError::StateTooLarge {
            num_qubits,
            message: e.to_string(),
        })?;
        Ok(buf)
    }

    /// Number of qubits n.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes, `2^n`.
    pub fn dim(&self) -> usize {
        self.re.len()
    }

    /// Amplitude at `index`, or `None` past the end.
    pub fn amplitude(&self, index: usize) -> Option<Complex<f64>> {
        Some(Complex::new(*self.re.get(index)?, *self.im.get(index)?))
    }

    /// Copies the full vector out as complex numbers.
    pub fn amplitudes(&self) -> Vec<Complex<f64>> {
        self.re.iter().zip(&self.im).map(|(&re, &im)| Complex::new(re, im)).collect()
    }

    /// Real parts.
    pub fn real(&self) -> &[f64] {
        &self.re
    }

    /// Imaginary parts.
    pub fn imag(&self) -> &[f64] {
        &self.im
    }

    /// Both component arrays, mutably. Used by execution backends.
    pub fn parts_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.re, &mut self.im)
    }

    /// Overwrites the full vector. The length must equal [`dim`](Self::dim).
    pub fn write(&mut self, amplitudes: &[Complex<f64>]) -> Result<()> {
        if amplitudes.len() != self.dim() {
            return Err(SimError::DimensionMismatch { expected: self.dim(), actual: amplitudes.len() });
        }
        for ((re, im), a) in self.re.iter_mut().zip(self.im.iter_mut()).zip(amplitudes) {
            *re = a.re;
            *im = a.im;
        }
        Ok(())
    }

    /// Returns the register to `|0…0⟩` without reallocating.
    pub fn reset(&mut self) {
        self.re.fill(0.0);
        self.im.fill(0.0);
        self.re[0] = 1.0;
    }

    /// `Σ|a_i|²`.
    pub fn total_probability(&self) -> f64 {
        self.re.iter().zip(&self.im).map(|(re, im)| re * re + im * im).sum()
    }
}

impl fmt::Display for AmplitudeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitudes[")?;
        for (i, c) in self.amplitudes().iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

/// The value a measured qubit collapsed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Target bit clear.
    Zero,
    /// Target bit set.
    One,
}

impl Outcome {
    /// The outcome as a bit.
    pub fn bit(self) -> u8 {
        match self {
            Outcome::Zero => 0,
            Outcome::One => 1,
        }
    }

    /// Builds an outcome from any nonzero/zero bit.
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 { Outcome::Zero } else { Outcome::One }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};

    fn unit_amplitude() -> Complex<f64> {
        Complex::one()
    }

    fn zero_amplitude() -> Complex<f64> {
        Complex::zero()
    }

    #[test]
    fn new_store_is_ground_state() -> Result<()> {
        let store = AmplitudeStore::new(3)?;
        assert_eq!(store.dim(), 8);
        assert_eq!(store.amplitude(0), Some(unit_amplitude()));
        for i in 1..8 {
            assert_eq!(store.amplitude(i), Some(zero_amplitude()));
        }
        assert_eq!(store.amplitude(8), None);
        assert!((store.total_probability() - 1.0).abs() < 1e-15);
        Ok(())
    }

    #[test]
    fn zero_qubits_rejected() {
        assert_eq!(AmplitudeStore::new(0), Err(SimError::InvalidQubitCount { count: 0 }));
    }

    #[test]
    fn oversized_register_rejected_before_allocation() {
        assert!(matches!(AmplitudeStore::dimension_for(64), Err(SimError::StateTooLarge { .. })));
        assert!(matches!(AmplitudeStore::dimension_for(usize::BITS as usize - 1), Err(SimError::StateTooLarge { .. })));
        assert!(matches!(AmplitudeStore::dimension_for(1000), Err(SimError::StateTooLarge { .. })));
    }

    #[test]
    fn write_checks_length_and_reset_restores() -> Result<()> {
        let mut store = AmplitudeStore::new(1)?;
        let err = store.write(&[zero_amplitude()]);
        assert_eq!(err, Err(SimError::DimensionMismatch { expected: 2, actual: 1 }));

        store.write(&[zero_amplitude(), Complex::new(0.0, 1.0)])?;
        assert_eq!(store.real(), &[0.0, 0.0]);
        assert_eq!(store.imag(), &[0.0, 1.0]);

        store.reset();
        assert_eq!(store.amplitudes(), vec![unit_amplitude(), zero_amplitude()]);
        Ok(())
    }

    #[test]
    fn outcome_bits() {
        assert_eq!(Outcome::from_bit(0), Outcome::Zero);
        assert_eq!(Outcome::from_bit(7), Outcome::One);
        assert_eq!(Outcome::One.bit(), 1);
    }
}
