//! Critical-point estimation from an aggregated percolation curve.
//!
//! The percolation probability as a function of `p` is fit to a
//! logistic curve with asymptotes fixed at 0 and 1,
//! `f(p) = 1 / (1 + exp(-k·(p - p_c)))`; the inflection point `p_c` is
//! the critical occupation probability and its standard error comes
//! from the parameter covariance of the least-squares fit.

pub mod lm;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::PercError;
use crate::sweep::SweepPoint;

pub use lm::LmConfig;

/// Literature value of `p_c` for site percolation on the 2D square
/// lattice. Exported for callers that report relative error; the fit
/// itself never consults it.
pub const THEORETICAL_PC_SQUARE_SITE: f64 = 0.59274621;

/// Fit procedure tag carried in a [`PcEstimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMethod {
    /// Logistic model, damped least squares.
    LogisticLm,
}

/// Estimated critical occupation probability with fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcEstimate {
    /// The fitted inflection point `p_c`.
    pub value: f64,
    /// Standard error of `value`, from the `p_c` diagonal of the
    /// parameter covariance matrix.
    pub standard_error: f64,
    /// Fitted transition steepness `k`.
    pub steepness: f64,
    pub fit_method: FitMethod,
    /// Unweighted residual sum of squares at the solution.
    pub residual_sum_squares: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Solver iterations spent.
    pub iterations: usize,
    /// Always true for a returned estimate; non-convergence surfaces as
    /// [`PercError::FitDidNotConverge`] instead.
    pub converged: bool,
}

impl PcEstimate {
    /// Relative error against a reference value, in percent. Pair with
    /// [`THEORETICAL_PC_SQUARE_SITE`] to report accuracy on the square
    /// lattice.
    pub fn error_percent(&self, reference: f64) -> f64 {
        (self.value - reference).abs() / reference * 100.0
    }
}

/// Options for [`estimate_with`].
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Weight each point by the reciprocal binomial variance
    /// `trials / (P(1-P))`, down-weighting noisy points near 0 and 1.
    pub weighted: bool,
    /// Initial steepness guess, refined by the solver.
    pub initial_steepness: f64,
    /// Solver configuration.
    pub solver: LmConfig,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            weighted: true,
            initial_steepness: 50.0,
            solver: LmConfig::default(),
        }
    }
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for unweighted fitting.
    pub fn unweighted(mut self) -> Self {
        self.weighted = false;
        self
    }

    /// Builder-style setter for the initial steepness guess.
    pub fn with_initial_steepness(mut self, k: f64) -> Self {
        self.initial_steepness = k;
        self
    }
}

/// The logistic transition curve: 0.5 exactly at `p_c`, approaching 0
/// below and 1 above, sharper for larger `k`.
#[inline]
pub fn sigmoid(p: f64, p_c: f64, k: f64) -> f64 {
    1.0 / (1.0 + (-k * (p - p_c)).exp())
}

/// Minimum number of distinct swept `p` values for a meaningful fit.
const MIN_DISTINCT_POINTS: usize = 4;

/// Fits the logistic model to a swept percolation curve with default
/// options.
pub fn estimate(points: &[SweepPoint]) -> Result<PcEstimate, PercError> {
    estimate_with(points, &FitOptions::default())
}

/// Fits the logistic model to a swept percolation curve.
///
/// Fails with [`PercError::InsufficientData`] on fewer than 4 distinct
/// swept points, [`PercError::NoTransitionDetected`] when the observed
/// curve is flat, and [`PercError::FitDidNotConverge`] when the solver
/// exhausts its budget or the normal matrix is singular. All three are
/// recoverable: re-sweep with a different range or more trials and try
/// again.
pub fn estimate_with(points: &[SweepPoint], opts: &FitOptions) -> Result<PcEstimate, PercError> {
    let distinct = points.iter().map(|pt| pt.p.to_bits()).unique().count();
    if distinct < MIN_DISTINCT_POINTS {
        return Err(PercError::InsufficientData {
            required: MIN_DISTINCT_POINTS,
            got: distinct,
        });
    }

    let xs: Vec<f64> = points.iter().map(|pt| pt.p).collect();
    let ys: Vec<f64> = points.iter().map(|pt| pt.percolation_probability).collect();

    let (lo, hi) = match ys.iter().copied().minmax().into_option() {
        Some(pair) => pair,
        None => unreachable!("distinct count was checked above"),
    };
    if hi - lo < 1e-12 {
        return Err(PercError::NoTransitionDetected(lo));
    }

    let weights: Vec<f64> = if opts.weighted {
        points.iter().map(binomial_weight).collect()
    } else {
        vec![1.0; points.len()]
    };

    // Initial guess: the swept p nearest probability 0.5, per the
    // half-height convention of the transition.
    let init_pc = points
        .iter()
        .min_by(|a, b| {
            let da = (a.percolation_probability - 0.5).abs();
            let db = (b.percolation_probability - 0.5).abs();
            da.total_cmp(&db)
        })
        .map(|pt| pt.p)
        .expect("points is non-empty");

    let model = |p: f64, params: [f64; 2]| {
        let s = sigmoid(p, params[0], params[1]);
        let ds = s * (1.0 - s);
        (s, [-params[1] * ds, (p - params[0]) * ds])
    };

    let fit = lm::fit_two_param(
        model,
        &xs,
        &ys,
        &weights,
        [init_pc, opts.initial_steepness],
        &opts.solver,
    );

    let rss: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(&p, &y)| {
            let r = sigmoid(p, fit.params[0], fit.params[1]) - y;
            r * r
        })
        .sum();

    let covariance = match (fit.covariance, fit.converged) {
        (Some(cov), true) => cov,
        _ => {
            log::warn!(
                "sigmoid fit failed after {} iterations (weighted rss {:.3e})",
                fit.iterations,
                fit.weighted_rss
            );
            return Err(PercError::FitDidNotConverge {
                iterations: fit.iterations,
                residual: rss,
            });
        }
    };

    let mean_y = ys.iter().sum::<f64>() / ys.len() as f64;
    let ss_tot: f64 = ys.iter().map(|&y| (y - mean_y) * (y - mean_y)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - rss / ss_tot } else { 0.0 };

    Ok(PcEstimate {
        value: fit.params[0],
        standard_error: covariance[0][0].max(0.0).sqrt(),
        steepness: fit.params[1],
        fit_method: FitMethod::LogisticLm,
        residual_sum_squares: rss,
        r_squared,
        iterations: fit.iterations,
        converged: true,
    })
}

/// Reciprocal binomial variance `trials / (P(1-P))`, with `P` clamped
/// half a trial away from 0 and 1 so saturated points keep a finite
/// weight.
fn binomial_weight(point: &SweepPoint) -> f64 {
    let m = point.num_trials.max(1) as f64;
    let floor = 0.5 / m;
    let p = point.percolation_probability.clamp(floor, 1.0 - floor);
    m / (p * (1.0 - p))
}
