// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod qubit;
pub mod state;

// Re-export public types for convenient access via `statevec::core::TypeName`
pub use error::{Result, SimError};
pub use qubit::Qubit;
pub use state::{AmplitudeStore, Outcome};

pub mod constants;
pub use constants::sim_constants::{
    DEFAULT_NORM_TOLERANCE, FRAC_1_SQRT_2, MAX_REPORTED_MISMATCHES, PROBABILITY_EPSILON, VERIFY_TOLERANCE,
};
