//! # perc-lattice
//!
//! perc-lattice is a high-performance Rust library for site-percolation
//! simulation on 2D square lattices. It samples randomly occupied
//! grids, partitions them into 4-connected clusters, detects
//! boundary-spanning clusters, aggregates statistics over repeated
//! independent trials, and fits a logistic curve to the resulting
//! percolation-probability curve to estimate the critical occupation
//! probability `p_c` and its standard error.
//!
//! ## Features
//! - Union-find cluster labeling with iterative path compression and
//!   union by rank, plus a flood-fill reference strategy behind one
//!   [`cluster::ClusterLabeler`] trait
//! - Spanning detection over free (non-periodic) boundaries, in both
//!   orientations
//! - Seeded, reproducible sweeps with per-trial sub-seed derivation
//! - Damped least-squares logistic fit with parameter covariance
//! - Optional rayon parallelism for the trials of a sweep point
//!   (`parallel` feature, on by default)
//!
//! ## Determinism
//!
//! All randomized decisions use `SmallRng` seeds drawn from caller
//! input so runs are reproducible: identical `(n, p, seed)` arguments
//! reproduce bit-identical grids, and a seeded sweep derives a distinct
//! sub-seed per trial so the whole sweep replays exactly, parallel or
//! not. Unit tests fix seeds explicitly.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! perc-lattice = "0.1"
//! ```
//!
//! ```rust
//! use perc_lattice::prelude::*;
//!
//! # fn main() -> Result<(), PercError> {
//! let cfg = SweepConfig::linspace(64, 0.45, 0.75, 31, 50, Some(42))?;
//! let points = sweep(&cfg, default_labeler())?;
//! let pc = estimate(&points)?;
//! println!("p_c = {:.4} ± {:.4}", pc.value, pc.standard_error);
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod error;
pub mod estimate;
pub mod grid;
pub mod sweep;

pub use error::PercError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::cluster::{
        BfsLabeler, ClusterLabeler, ClusterSummary, LabelMap, UnionFindLabeler, default_labeler,
        summarize,
    };
    pub use crate::error::PercError;
    pub use crate::estimate::{
        FitMethod, FitOptions, PcEstimate, THEORETICAL_PC_SQUARE_SITE, estimate, estimate_with,
        sigmoid,
    };
    pub use crate::grid::Grid;
    pub use crate::sweep::{
        SweepConfig, SweepPoint, TrialResult, run_point, run_trial, sweep, sweep_with_cancel,
    };
}
