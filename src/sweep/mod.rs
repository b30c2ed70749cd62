//! Trial aggregation: repeated trials at fixed `p`, swept over a range.
//!
//! A sweep runs `trials_per_point` independent trials at each requested
//! occupation probability and folds them into one [`SweepPoint`] per
//! `p`. Trials share no mutable state; with the `parallel` feature the
//! trials of a point run on rayon and are collected in order, so the
//! fold is a single-threaded merge and the result is bit-identical to
//! the serial path. Output order always follows the caller-supplied
//! `p_values`.

pub mod trial;

use std::hash::Hasher;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHasher;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterLabeler;
use crate::error::PercError;

pub use trial::{TrialResult, run_trial};

/// Validated sweep parameters.
///
/// Construction is the validation point: a `SweepConfig` that exists is
/// runnable, and the engine never starts partial work on bad input.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    n: usize,
    p_values: Vec<f64>,
    trials_per_point: usize,
    seed: Option<u64>,
}

impl SweepConfig {
    /// Builds a config from explicit `p` values (ascending by
    /// convention; duplicates permitted but discouraged).
    ///
    /// Fails with [`PercError::InvalidDimension`] if `n == 0`, and
    /// [`PercError::InvalidRange`] if `p_values` is empty, contains a
    /// value outside `[0, 1]`, or `trials_per_point == 0`.
    pub fn new(
        n: usize,
        p_values: Vec<f64>,
        trials_per_point: usize,
        seed: Option<u64>,
    ) -> Result<Self, PercError> {
        if n == 0 {
            return Err(PercError::InvalidDimension);
        }
        if p_values.is_empty() {
            return Err(PercError::InvalidRange("p_values is empty".into()));
        }
        if let Some(&bad) = p_values
            .iter()
            .find(|p| !p.is_finite() || !(0.0..=1.0).contains(*p))
        {
            return Err(PercError::InvalidRange(format!(
                "p value {bad} outside [0, 1]"
            )));
        }
        if trials_per_point == 0 {
            return Err(PercError::InvalidRange(
                "trials_per_point must be at least 1".into(),
            ));
        }
        Ok(Self {
            n,
            p_values,
            trials_per_point,
            seed,
        })
    }

    /// Builds a config over `p_steps` evenly spaced values in
    /// `[p_min, p_max]`, the shape sweep requests usually arrive in.
    pub fn linspace(
        n: usize,
        p_min: f64,
        p_max: f64,
        p_steps: usize,
        trials_per_point: usize,
        seed: Option<u64>,
    ) -> Result<Self, PercError> {
        if !(p_min.is_finite() && p_max.is_finite()) || p_min >= p_max {
            return Err(PercError::InvalidRange(format!(
                "p_min {p_min} must be below p_max {p_max}"
            )));
        }
        if p_steps < 2 {
            return Err(PercError::InvalidRange(
                "linspace needs at least 2 steps".into(),
            ));
        }
        let step = (p_max - p_min) / (p_steps - 1) as f64;
        // Pin the last value so rounding never pushes it past p_max.
        let p_values = (0..p_steps)
            .map(|i| {
                if i == p_steps - 1 {
                    p_max
                } else {
                    p_min + step * i as f64
                }
            })
            .collect();
        Self::new(n, p_values, trials_per_point, seed)
    }

    /// Grid side length.
    pub const fn n(&self) -> usize {
        self.n
    }

    /// The swept occupation probabilities, in caller order.
    pub fn p_values(&self) -> &[f64] {
        &self.p_values
    }

    /// Trials per swept point.
    pub const fn trials_per_point(&self) -> usize {
        self.trials_per_point
    }

    /// Base seed, if the sweep is to be reproducible.
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Aggregated statistics over all trials at one occupation probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Occupation probability of this point.
    pub p: f64,
    /// Fraction of trials with a spanning cluster, in `[0, 1]`.
    pub percolation_probability: f64,
    /// Mean cluster count across trials.
    pub mean_num_clusters: f64,
    /// Mean of the per-trial mean cluster sizes.
    pub mean_cluster_size: f64,
    /// Mean spanning-cluster size across all trials; non-percolating
    /// trials contribute 0, preserving comparability across `p`.
    pub mean_spanning_size: f64,
    /// Trials aggregated into this point.
    pub num_trials: usize,
}

/// Derives the sub-seed for trial `trial_index` of point `point_index`.
///
/// Hashing `(base, point_index, trial_index)` gives every trial its own
/// random stream while keeping the whole sweep reproducible from one
/// base seed.
fn derive_trial_seed(base: u64, point_index: usize, trial_index: usize) -> u64 {
    let mut hasher = AHasher::default();
    hasher.write_u64(base);
    hasher.write_u64(point_index as u64);
    hasher.write_u64(trial_index as u64);
    hasher.finish()
}

fn reduce_trials(p: f64, results: &[TrialResult]) -> SweepPoint {
    let m = results.len() as f64;
    let percolating = results.iter().filter(|r| r.percolates).count();
    SweepPoint {
        p,
        percolation_probability: percolating as f64 / m,
        mean_num_clusters: results.iter().map(|r| r.num_clusters as f64).sum::<f64>() / m,
        mean_cluster_size: results.iter().map(|r| r.mean_cluster_size).sum::<f64>() / m,
        mean_spanning_size: results
            .iter()
            .map(|r| r.largest_spanning_size)
            .sum::<f64>()
            / m,
        num_trials: results.len(),
    }
}

fn run_point_indexed(
    n: usize,
    p: f64,
    trials: usize,
    base_seed: Option<u64>,
    point_index: usize,
    labeler: &dyn ClusterLabeler,
) -> Result<SweepPoint, PercError> {
    let seed_for = |j: usize| base_seed.map(|base| derive_trial_seed(base, point_index, j));

    #[cfg(feature = "parallel")]
    let results: Result<Vec<TrialResult>, PercError> = (0..trials)
        .into_par_iter()
        .map(|j| run_trial(n, p, seed_for(j), labeler))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<TrialResult>, PercError> = (0..trials)
        .map(|j| run_trial(n, p, seed_for(j), labeler))
        .collect();

    Ok(reduce_trials(p, &results?))
}

/// Runs `trials` independent trials at a single occupation probability
/// and folds them into one [`SweepPoint`].
pub fn run_point(
    n: usize,
    p: f64,
    trials: usize,
    seed: Option<u64>,
    labeler: &dyn ClusterLabeler,
) -> Result<SweepPoint, PercError> {
    // Route through SweepConfig so single-point runs share the sweep's
    // validation and seed-derivation scheme.
    let cfg = SweepConfig::new(n, vec![p], trials, seed)?;
    run_point_indexed(cfg.n, cfg.p_values[0], cfg.trials_per_point, cfg.seed, 0, labeler)
}

/// Sweeps every configured `p`, producing one [`SweepPoint`] each, in
/// the configured order.
pub fn sweep(
    cfg: &SweepConfig,
    labeler: &dyn ClusterLabeler,
) -> Result<Vec<SweepPoint>, PercError> {
    let never = AtomicBool::new(false);
    sweep_with_cancel(cfg, labeler, &never)
}

/// Like [`sweep`], but checks `cancel` between points and returns the
/// points completed so far when it flips. Mid-trial cancellation is
/// not supported; a trial's cost is small relative to a sweep.
pub fn sweep_with_cancel(
    cfg: &SweepConfig,
    labeler: &dyn ClusterLabeler,
    cancel: &AtomicBool,
) -> Result<Vec<SweepPoint>, PercError> {
    let mut points = Vec::with_capacity(cfg.p_values.len());
    for (i, &p) in cfg.p_values.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("sweep cancelled after {} of {} points", i, cfg.p_values.len());
            break;
        }
        let point = run_point_indexed(cfg.n, p, cfg.trials_per_point, cfg.seed, i, labeler)?;
        log::debug!(
            "swept p={:.4} ({}/{}): percolation probability {:.3}",
            p,
            i + 1,
            cfg.p_values.len(),
            point.percolation_probability
        );
        points.push(point);
    }
    Ok(points)
}
