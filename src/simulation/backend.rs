// src/simulation/backend.rs

//! Execution backends: the three bulk primitives every operation is built from.
//!
//! A backend transforms amplitude pairs selected by a bit mask, reduces the
//! squared magnitude over the mask-clear half of the vector, and projects the
//! vector onto one half while rescaling the survivors. Work inside one call
//! may be split across any number of workers. Every call returns only after
//! all of its work is complete, so consecutive calls never overlap.

use crate::core::{AmplitudeStore, SimError, FRAC_1_SQRT_2};
use num_complex::Complex;
use rayon::prelude::*;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Amplitudes summed per partial in reductions. Fixed so that serial and
/// parallel backends add in the same order and agree bit for bit.
const REDUCE_CHUNK: usize = 1 << 12;

/// Pair stride above which the rayon backend also splits inside a block.
const INNER_PARALLEL_STRIDE: usize = 1 << 12;

/// The per-pair transform of a gate. `a` is the amplitude with the target
/// bit clear, `b` the one with it set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKernel {
    /// `a' = (a+b)/√2`, `b' = (a−b)/√2`
    Hadamard,
    /// `a' = b`, `b' = a`
    Swap,
    /// `a' = a`, `b' = −b`
    NegateSecond,
}

impl PairKernel {
    /// Applies the kernel to one pair.
    #[inline]
    pub fn apply(self, a: Complex<f64>, b: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        match self {
            PairKernel::Hadamard => ((a + b) * FRAC_1_SQRT_2, (a - b) * FRAC_1_SQRT_2),
            PairKernel::Swap => (b, a),
            PairKernel::NegateSecond => (a, -b),
        }
    }
}

/// Internal failure reported by a backend, carrying its diagnostic and code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct BackendFault {
    /// Backend specific error code
    pub code: i32,
    /// Diagnostic message
    pub message: String,
}

impl BackendFault {
    /// A mask does not select exactly one bit inside the vector.
    pub const INVALID_MASK: i32 = -30;
    /// The worker pool could not be created.
    pub const POOL_UNAVAILABLE: i32 = -5;

    /// Creates a fault.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<BackendFault> for SimError {
    fn from(fault: BackendFault) -> Self {
        SimError::Backend { code: fault.code, message: fault.message }
    }
}

/// The bulk primitives an operation is dispatched to.
pub trait ExecutionBackend: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Number of workers a call may fan out to.
    fn workers(&self) -> usize;

    /// Applies `kernel` to every pair `(i0, i0 | target_mask)` with the target
    /// bit of `i0` clear. With a `control_mask`, only pairs whose control bit
    /// is set are transformed.
    fn pair_transform(
        &self,
        store: &mut AmplitudeStore,
        kernel: PairKernel,
        target_mask: usize,
        control_mask: Option<usize>,
    ) -> Result<(), BackendFault>;

    /// `Σ|a_i|²` over every index with the `mask` bit clear.
    fn masked_probability(&self, store: &AmplitudeStore, mask: usize) -> Result<f64, BackendFault>;

    /// Keeps the amplitudes whose `mask` bit equals `keep_set`, multiplying
    /// them by `scale`, and zeroes the rest.
    fn project(&self, store: &mut AmplitudeStore, mask: usize, keep_set: bool, scale: f64) -> Result<(), BackendFault>;
}

fn check_mask(store: &AmplitudeStore, mask: usize, what: &str) -> Result<(), BackendFault> {
    if mask.count_ones() != 1 || mask >= store.dim() {
        return Err(BackendFault::new(
            BackendFault::INVALID_MASK,
            format!("{} mask {:#b} is not a single bit below dimension {}", what, mask, store.dim()),
        ));
    }
    Ok(())
}

fn check_pair_masks(store: &AmplitudeStore, target_mask: usize, control_mask: Option<usize>) -> Result<usize, BackendFault> {
    check_mask(store, target_mask, "target")?;
    match control_mask {
        None => Ok(0),
        Some(control) => {
            check_mask(store, control, "control")?;
            if control == target_mask {
                return Err(BackendFault::new(BackendFault::INVALID_MASK, "control mask equals target mask"));
            }
            Ok(control)
        }
    }
}

/// Transforms one `2·stride` block whose first index is `base`.
/// `control_mask == 0` means uncontrolled.
#[inline]
fn transform_block(re: &mut [f64], im: &mut [f64], base: usize, stride: usize, kernel: PairKernel, control_mask: usize) {
    let (re0, re1) = re.split_at_mut(stride);
    let (im0, im1) = im.split_at_mut(stride);
    for j in 0..stride {
        if control_mask != 0 && (base + j) & control_mask == 0 {
            continue;
        }
        let (a, b) = kernel.apply(Complex::new(re0[j], im0[j]), Complex::new(re1[j], im1[j]));
        re0[j] = a.re;
        im0[j] = a.im;
        re1[j] = b.re;
        im1[j] = b.im;
    }
}

/// Same as [`transform_block`], splitting the pairs of the block across workers.
fn transform_block_parallel(re: &mut [f64], im: &mut [f64], base: usize, stride: usize, kernel: PairKernel, control_mask: usize) {
    let (re0, re1) = re.split_at_mut(stride);
    let (im0, im1) = im.split_at_mut(stride);
    re0.par_iter_mut()
        .zip(im0.par_iter_mut())
        .zip(re1.par_iter_mut().zip(im1.par_iter_mut()))
        .enumerate()
        .for_each(|(j, ((r0, i0), (r1, i1)))| {
            if control_mask != 0 && (base + j) & control_mask == 0 {
                return;
            }
            let (a, b) = kernel.apply(Complex::new(*r0, *i0), Complex::new(*r1, *i1));
            *r0 = a.re;
            *i0 = a.im;
            *r1 = b.re;
            *i1 = b.im;
        });
}

#[inline]
fn partial_probability(re: &[f64], im: &[f64], base: usize, mask: usize) -> f64 {
    re.iter()
        .zip(im)
        .enumerate()
        .filter(|(j, _)| (base + j) & mask == 0)
        .map(|(_, (r, i))| r * r + i * i)
        .sum()
}

#[inline]
fn project_one(index: usize, re: &mut f64, im: &mut f64, mask: usize, keep_set: bool, scale: f64) {
    if (index & mask != 0) == keep_set {
        *re *= scale;
        *im *= scale;
    } else {
        *re = 0.0;
        *im = 0.0;
    }
}

//-------------------------------------------------------------------------
// Serial backend
//-------------------------------------------------------------------------

/// Single-threaded reference backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl SerialBackend {
    /// Creates the serial backend.
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionBackend for SerialBackend {
    fn name(&self) -> &str {
        "serial"
    }

    fn workers(&self) -> usize {
        1
    }

    fn pair_transform(
        &self,
        store: &mut AmplitudeStore,
        kernel: PairKernel,
        target_mask: usize,
        control_mask: Option<usize>,
    ) -> Result<(), BackendFault> {
        let control = check_pair_masks(store, target_mask, control_mask)?;
        let block = target_mask << 1;
        let (re, im) = store.parts_mut();
        for (ci, (re_c, im_c)) in re.chunks_mut(block).zip(im.chunks_mut(block)).enumerate() {
            transform_block(re_c, im_c, ci * block, target_mask, kernel, control);
        }
        Ok(())
    }

    fn masked_probability(&self, store: &AmplitudeStore, mask: usize) -> Result<f64, BackendFault> {
        check_mask(store, mask, "probe")?;
        let partials: Vec<f64> = store
            .real()
            .chunks(REDUCE_CHUNK)
            .zip(store.imag().chunks(REDUCE_CHUNK))
            .enumerate()
            .map(|(ci, (re, im))| partial_probability(re, im, ci * REDUCE_CHUNK, mask))
            .collect();
        Ok(partials.iter().sum())
    }

    fn project(&self, store: &mut AmplitudeStore, mask: usize, keep_set: bool, scale: f64) -> Result<(), BackendFault> {
        check_mask(store, mask, "projection")?;
        let (re, im) = store.parts_mut();
        for (i, (r, m)) in re.iter_mut().zip(im.iter_mut()).enumerate() {
            project_one(i, r, m, mask, keep_set, scale);
        }
        Ok(())
    }
}

//-------------------------------------------------------------------------
// Rayon backend
//-------------------------------------------------------------------------

/// Data-parallel backend on rayon.
///
/// Without a thread count the work runs on rayon's global pool. With one, a
/// dedicated pool is built by the first call that fans out and reused after
/// that. Registers narrower than `min_parallel_qubits` run the serial
/// kernels on the calling thread and never touch a pool.
pub struct RayonBackend {
    threads: Option<usize>,
    min_parallel_qubits: usize,
    pool: OnceLock<Result<rayon::ThreadPool, BackendFault>>,
}

impl RayonBackend {
    /// Creates the backend; no threads are started here.
    pub fn new(threads: Option<usize>, min_parallel_qubits: usize) -> Self {
        Self { threads, min_parallel_qubits, pool: OnceLock::new() }
    }

    fn fans_out(&self, store: &AmplitudeStore) -> bool {
        store.num_qubits() >= self.min_parallel_qubits
    }

    /// Runs `op` on the dedicated pool, or on the caller's (global) pool
    /// when no thread count was given.
    fn in_pool<R: Send>(&self, op: impl FnOnce() -> R + Send) -> Result<R, BackendFault> {
        let Some(threads) = self.threads else {
            return Ok(op());
        };
        let pool = self.pool.get_or_init(|| {
            debug!(threads, "building rayon pool");
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("statevec-worker-{}", i))
                .build()
                .map_err(|e| BackendFault::new(BackendFault::POOL_UNAVAILABLE, e.to_string()))
        });
        match pool {
            Ok(pool) => Ok(pool.install(op)),
            Err(fault) => Err(fault.clone()),
        }
    }
}

impl fmt::Debug for RayonBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RayonBackend")
            .field("threads", &self.threads)
            .field("min_parallel_qubits", &self.min_parallel_qubits)
            .field("pool_built", &self.pool.get().is_some())
            .finish()
    }
}

impl ExecutionBackend for RayonBackend {
    fn name(&self) -> &str {
        "rayon"
    }

    fn workers(&self) -> usize {
        self.threads.unwrap_or_else(rayon::current_num_threads)
    }

    fn pair_transform(
        &self,
        store: &mut AmplitudeStore,
        kernel: PairKernel,
        target_mask: usize,
        control_mask: Option<usize>,
    ) -> Result<(), BackendFault> {
        if !self.fans_out(store) {
            return SerialBackend.pair_transform(store, kernel, target_mask, control_mask);
        }
        let control = check_pair_masks(store, target_mask, control_mask)?;
        let stride = target_mask;
        let block = stride << 1;
        let (re, im) = store.parts_mut();
        self.in_pool(|| {
            re.par_chunks_mut(block)
                .zip(im.par_chunks_mut(block))
                .enumerate()
                .for_each(|(ci, (re_c, im_c))| {
                    if stride >= INNER_PARALLEL_STRIDE {
                        transform_block_parallel(re_c, im_c, ci * block, stride, kernel, control);
                    } else {
                        transform_block(re_c, im_c, ci * block, stride, kernel, control);
                    }
                });
        })
    }

    fn masked_probability(&self, store: &AmplitudeStore, mask: usize) -> Result<f64, BackendFault> {
        if !self.fans_out(store) {
            return SerialBackend.masked_probability(store, mask);
        }
        check_mask(store, mask, "probe")?;
        let partials: Vec<f64> = self.in_pool(|| {
            store
                .real()
                .par_chunks(REDUCE_CHUNK)
                .zip(store.imag().par_chunks(REDUCE_CHUNK))
                .enumerate()
                .map(|(ci, (re, im))| partial_probability(re, im, ci * REDUCE_CHUNK, mask))
                .collect()
        })?;
        Ok(partials.iter().sum())
    }

    fn project(&self, store: &mut AmplitudeStore, mask: usize, keep_set: bool, scale: f64) -> Result<(), BackendFault> {
        if !self.fans_out(store) {
            return SerialBackend.project(store, mask, keep_set, scale);
        }
        check_mask(store, mask, "projection")?;
        let (re, im) = store.parts_mut();
        self.in_pool(|| {
            re.par_iter_mut()
                .zip(im.par_iter_mut())
                .enumerate()
                .for_each(|(i, (r, m))| project_one(i, r, m, mask, keep_set, scale));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Result;

    fn sample_store(num_qubits: usize) -> Result<AmplitudeStore> {
        let dim = 1usize << num_qubits;
        let norm = (dim as f64).sqrt();
        let amps: Vec<Complex<f64>> = (0..dim)
            .map(|i| Complex::new((i as f64 * 0.37).cos(), (i as f64 * 0.11).sin()) / norm)
            .collect();
        AmplitudeStore::from_amplitudes(num_qubits, &amps)
    }

    #[test]
    fn kernels_match_formulas() {
        let a = Complex::new(0.6, 0.0);
        let b = Complex::new(0.0, 0.8);
        let (h0, h1) = PairKernel::Hadamard.apply(a, b);
        assert!((h0 - (a + b) * FRAC_1_SQRT_2).norm() < 1e-15);
        assert!((h1 - (a - b) * FRAC_1_SQRT_2).norm() < 1e-15);
        assert_eq!(PairKernel::Swap.apply(a, b), (b, a));
        assert_eq!(PairKernel::NegateSecond.apply(a, b), (a, -b));
    }

    #[test]
    fn serial_swap_on_high_qubit() -> Result<()> {
        let mut store = AmplitudeStore::new(3)?;
        SerialBackend.pair_transform(&mut store, PairKernel::Swap, 0b100, None)?;
        assert_eq!(store.real(), &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn control_mask_leaves_clear_pairs() -> Result<()> {
        let mut store = AmplitudeStore::new(2)?;
        // control q0 is 0: nothing moves
        SerialBackend.pair_transform(&mut store, PairKernel::Swap, 0b10, Some(0b01))?;
        assert_eq!(store.real(), &[1.0, 0.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn bad_masks_fault() -> Result<()> {
        let mut store = AmplitudeStore::new(2)?;
        let fault = SerialBackend.pair_transform(&mut store, PairKernel::Swap, 0b11, None).unwrap_err();
        assert_eq!(fault.code, BackendFault::INVALID_MASK);
        let fault = SerialBackend.masked_probability(&store, 0b100).unwrap_err();
        assert_eq!(fault.code, BackendFault::INVALID_MASK);
        let fault = SerialBackend.pair_transform(&mut store, PairKernel::Swap, 0b10, Some(0b10)).unwrap_err();
        assert_eq!(fault.code, BackendFault::INVALID_MASK);
        let err: SimError = fault.into();
        assert!(matches!(err, SimError::Backend { code: BackendFault::INVALID_MASK, .. }));
        Ok(())
    }

    #[test]
    fn rayon_agrees_with_serial() -> Result<()> {
        let rayon = RayonBackend::new(Some(4), 0);
        for num_qubits in [1usize, 5, 14] {
            for target in 0..num_qubits {
                let mut expected = sample_store(num_qubits)?;
                let mut actual = expected.clone();
                let control = (num_qubits > 1).then(|| 1usize << ((target + 1) % num_qubits));
                for kernel in [PairKernel::Hadamard, PairKernel::Swap, PairKernel::NegateSecond] {
                    SerialBackend.pair_transform(&mut expected, kernel, 1 << target, control)?;
                    rayon.pair_transform(&mut actual, kernel, 1 << target, control)?;
                }
                assert_eq!(expected, actual, "n={} target={}", num_qubits, target);

                let p_serial = SerialBackend.masked_probability(&expected, 1 << target)?;
                let p_rayon = rayon.masked_probability(&actual, 1 << target)?;
                assert_eq!(p_serial.to_bits(), p_rayon.to_bits());

                SerialBackend.project(&mut expected, 1 << target, true, 2.0)?;
                rayon.project(&mut actual, 1 << target, true, 2.0)?;
                assert_eq!(expected, actual);
            }
        }
        Ok(())
    }

    #[test]
    fn pool_built_once_and_only_when_fanning_out() -> Result<()> {
        let rayon = RayonBackend::new(Some(2), 4);
        let mut narrow = sample_store(3)?;
        rayon.pair_transform(&mut narrow, PairKernel::Hadamard, 0b1, None)?;
        rayon.masked_probability(&narrow, 0b10)?;
        assert!(rayon.pool.get().is_none());

        let mut wide = sample_store(5)?;
        rayon.pair_transform(&mut wide, PairKernel::Hadamard, 0b1, None)?;
        let first = rayon.pool.get().and_then(|p| p.as_ref().ok()).map(std::ptr::from_ref);
        assert!(first.is_some());
        rayon.project(&mut wide, 0b10, false, 1.0)?;
        let second = rayon.pool.get().and_then(|p| p.as_ref().ok()).map(std::ptr::from_ref);
        assert_eq!(first, second);
        assert_eq!(rayon.workers(), 2);
        Ok(())
    }

    #[test]
    fn global_pool_without_thread_count() -> Result<()> {
        let rayon = RayonBackend::new(None, 0);
        let mut store = sample_store(6)?;
        let mut expected = store.clone();
        rayon.pair_transform(&mut store, PairKernel::Swap, 0b100, None)?;
        SerialBackend.pair_transform(&mut expected, PairKernel::Swap, 0b100, None)?;
        assert_eq!(store, expected);
        assert!(rayon.pool.get().is_none());
        assert_eq!(rayon.workers(), rayon::current_num_threads());
        Ok(())
    }

    #[test]
    fn project_zeroes_other_half() -> Result<()> {
        let mut store = sample_store(2)?;
        SerialBackend.project(&mut store, 0b01, false, 1.0)?;
        assert_eq!(store.real()[1], 0.0);
        assert_eq!(store.real()[3], 0.0);
        assert_eq!(store.imag()[1], 0.0);
        assert!(store.real()[0] != 0.0);
        Ok(())
    }
}
