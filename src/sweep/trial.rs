//! Single percolation trial: sample, label, summarize, reduce.

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterLabeler, summarize};
use crate::error::PercError;
use crate::grid::Grid;

/// Scalar record for one percolation trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Some cluster spans the grid in either orientation.
    pub percolates: bool,
    /// Count of distinct clusters.
    pub num_clusters: usize,
    /// Arithmetic mean over all cluster sizes, spanning or not; 0 when
    /// the grid is empty.
    pub mean_cluster_size: f64,
    /// Largest spanning-cluster size; 0 when nothing spans.
    pub largest_spanning_size: f64,
}

/// Runs one trial end-to-end and reduces it to scalars.
///
/// Pure: no shared mutable state between invocations, so trials may run
/// concurrently without locks. Validates its own preconditions even
/// when an outer collaborator already has.
pub fn run_trial(
    n: usize,
    p: f64,
    seed: Option<u64>,
    labeler: &dyn ClusterLabeler,
) -> Result<TrialResult, PercError> {
    let grid = Grid::sample(n, p, seed)?;
    let map = labeler.label(&grid);
    let summaries = summarize(&map);

    let num_clusters = summaries.len();
    let mean_cluster_size = if num_clusters == 0 {
        0.0
    } else {
        summaries.iter().map(|c| c.size as f64).sum::<f64>() / num_clusters as f64
    };
    let largest_spanning_size = summaries
        .iter()
        .filter(|c| c.spans())
        .map(|c| c.size)
        .max()
        .unwrap_or(0) as f64;

    Ok(TrialResult {
        percolates: largest_spanning_size > 0.0,
        num_clusters,
        mean_cluster_size,
        largest_spanning_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::default_labeler;

    #[test]
    fn empty_grid_trial() {
        let r = run_trial(10, 0.0, Some(1), default_labeler()).unwrap();
        assert!(!r.percolates);
        assert_eq!(r.num_clusters, 0);
        assert_eq!(r.mean_cluster_size, 0.0);
        assert_eq!(r.largest_spanning_size, 0.0);
    }

    #[test]
    fn full_grid_trial() {
        let r = run_trial(10, 1.0, Some(1), default_labeler()).unwrap();
        assert!(r.percolates);
        assert_eq!(r.num_clusters, 1);
        assert_eq!(r.mean_cluster_size, 100.0);
        assert_eq!(r.largest_spanning_size, 100.0);
    }

    #[test]
    fn trial_validates_inputs() {
        assert_eq!(
            run_trial(0, 0.5, None, default_labeler()).unwrap_err(),
            PercError::InvalidDimension
        );
        assert!(matches!(
            run_trial(10, 1.2, None, default_labeler()),
            Err(PercError::InvalidProbability(_))
        ));
    }

    #[test]
    fn trial_is_deterministic_for_fixed_seed() {
        let a = run_trial(40, 0.59, Some(99), default_labeler()).unwrap();
        let b = run_trial(40, 0.59, Some(99), default_labeler()).unwrap();
        assert_eq!(a, b);
    }
}
