//! PercError: unified error type for perc-lattice public APIs
//!
//! This error type is used throughout the crate to provide robust,
//! non-panicking error handling for all public APIs. Configuration
//! errors (`InvalidDimension`, `InvalidProbability`, `InvalidRange`)
//! are reported immediately and never retried internally; estimation
//! errors (`InsufficientData`, `NoTransitionDetected`,
//! `FitDidNotConverge`) are recoverable and the caller may re-sweep
//! with different parameters.

use thiserror::Error;

/// Unified error type for perc-lattice operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PercError {
    /// Attempted to build or sample a grid with zero side length.
    #[error("grid dimension must be positive (N > 0)")]
    InvalidDimension,
    /// Occupation probability outside the closed unit interval.
    #[error("occupation probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),
    /// Sweep configuration rejected at construction.
    #[error("invalid sweep range: {0}")]
    InvalidRange(String),
    /// Too few distinct swept points for a sigmoid fit.
    #[error("sigmoid fit needs at least {required} distinct p values, got {got}")]
    InsufficientData { required: usize, got: usize },
    /// The percolation curve is flat; there is no transition to fit.
    #[error("percolation curve is flat at {0}; no transition detected")]
    NoTransitionDetected(f64),
    /// The least-squares solver exhausted its budget or went singular.
    #[error("sigmoid fit did not converge after {iterations} iterations (residual {residual:.3e})")]
    FitDidNotConverge { iterations: usize, residual: f64 },
}

impl PercError {
    /// True for the estimation-quality errors a caller can recover from
    /// by re-sweeping with different parameters; false for
    /// configuration errors that must be fixed at the call site.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PercError::InsufficientData { .. }
                | PercError::NoTransitionDetected(_)
                | PercError::FitDidNotConverge { .. }
        )
    }
}
