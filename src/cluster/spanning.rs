//! Border inspection and per-cluster summaries.
//!
//! A cluster spans vertically if it touches both the top and bottom
//! rows, horizontally if it touches both the left and right columns.
//! Boundaries are free (non-periodic).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::cluster::LabelMap;

/// Per-cluster statistics for one trial: occupied-cell count plus which
/// of the four grid borders the cluster reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub label: u32,
    pub size: usize,
    pub touches_top: bool,
    pub touches_bottom: bool,
    pub touches_left: bool,
    pub touches_right: bool,
}

impl ClusterSummary {
    /// Touches both the top and bottom rows.
    #[inline]
    pub const fn spans_vertically(&self) -> bool {
        self.touches_top && self.touches_bottom
    }

    /// Touches both the left and right columns.
    #[inline]
    pub const fn spans_horizontally(&self) -> bool {
        self.touches_left && self.touches_right
    }

    /// Spans in either orientation.
    #[inline]
    pub const fn spans(&self) -> bool {
        self.spans_vertically() || self.spans_horizontally()
    }
}

/// Summarizes every cluster of a label map: sizes from a full scan,
/// border flags from the four border rows/columns.
///
/// Returned in ascending label order, one entry per distinct cluster.
pub fn summarize(map: &LabelMap) -> Vec<ClusterSummary> {
    let n = map.n();
    let mut sizes = vec![0usize; map.num_clusters()];
    for &label in map.labels() {
        if label != 0 {
            sizes[(label - 1) as usize] += 1;
        }
    }

    // (top, bottom, left, right) per border label.
    let mut borders: HashMap<u32, [bool; 4]> = HashMap::new();
    let mut touch = |label: u32, side: usize| {
        if label != 0 {
            borders.entry(label).or_insert([false; 4])[side] = true;
        }
    };
    for col in 0..n {
        touch(map.label(0, col), 0);
        touch(map.label(n - 1, col), 1);
    }
    for row in 0..n {
        touch(map.label(row, 0), 2);
        touch(map.label(row, n - 1), 3);
    }

    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let label = (i + 1) as u32;
            let flags = borders.get(&label).copied().unwrap_or([false; 4]);
            ClusterSummary {
                label,
                size,
                touches_top: flags[0],
                touches_bottom: flags[1],
                touches_left: flags[2],
                touches_right: flags[3],
            }
        })
        .collect()
}
