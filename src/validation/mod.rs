// src/validation/mod.rs

//! Provides functions to validate an `AmplitudeStore`.

use crate::core::{AmplitudeStore, Result, SimError, DEFAULT_NORM_TOLERANCE};

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `store` - The `AmplitudeStore` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `DEFAULT_NORM_TOLERANCE`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(SimError::Incoherence)` if normalization fails or a component is not finite.
pub fn check_normalization(store: &AmplitudeStore, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq = store.total_probability();
    // NaN fails the comparison, so test for "within" and negate.
    if !((norm_sq - 1.0).abs() <= effective_tolerance) {
        return Err(SimError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|a_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        });
    }
    Ok(())
}

/// Checks that every stored component is finite.
pub fn check_finite(store: &AmplitudeStore) -> Result<()> {
    let bad = store
        .real()
        .iter()
        .zip(store.imag())
        .position(|(re, im)| !(re.is_finite() && im.is_finite()));
    match bad {
        Some(index) => Err(SimError::Incoherence {
            message: format!("Amplitude at index {} is not finite", index),
        }),
        None => Ok(()),
    }
}

/// Performs the basic validation checks on a state: finite components and
/// normalization within `norm_tolerance` (default `DEFAULT_NORM_TOLERANCE`).
pub fn validate_state(store: &AmplitudeStore, norm_tolerance: Option<f64>) -> Result<()> {
    check_finite(store)?;
    check_normalization(store, norm_tolerance)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn ground_state_is_valid() -> Result<()> {
        let store = AmplitudeStore::new(3)?;
        validate_state(&store, None)?;
        Ok(())
    }

    #[test]
    fn unnormalized_state_fails() -> Result<()> {
        let store = AmplitudeStore::from_amplitudes(1, &[Complex::new(0.5, 0.0), Complex::new(0.5, 0.0)])?;
        assert!(matches!(check_normalization(&store, None), Err(SimError::Incoherence { .. })));
        // a loose tolerance accepts it
        check_normalization(&store, Some(0.6))?;
        Ok(())
    }

    #[test]
    fn nan_component_fails() -> Result<()> {
        let store = AmplitudeStore::from_amplitudes(1, &[Complex::new(f64::NAN, 0.0), Complex::new(1.0, 0.0)])?;
        assert!(matches!(check_finite(&store), Err(SimError::Incoherence { .. })));
        assert!(validate_state(&store, Some(10.0)).is_err());
        Ok(())
    }
}
