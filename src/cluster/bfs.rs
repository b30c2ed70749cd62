//! Flood-fill cluster labeling.
//!
//! Reference strategy: a raster scan starts a breadth-first fill from
//! every occupied, still-unlabeled cell. Slower than the disjoint-set
//! labeler on dense grids but trivially auditable, which is what the
//! property tests compare against.

use std::collections::VecDeque;

use crate::cluster::{ClusterLabeler, LabelMap};
use crate::grid::Grid;

/// Breadth-first flood-fill labeler.
#[derive(Debug, Default, Clone, Copy)]
pub struct BfsLabeler;

impl ClusterLabeler for BfsLabeler {
    fn label(&self, grid: &Grid) -> LabelMap {
        let n = grid.n();
        let mut labels = vec![0u32; n * n];
        let mut next_label = 0u32;
        let mut queue = VecDeque::new();

        for row in 0..n {
            for col in 0..n {
                if !grid.is_occupied(row, col) || labels[grid.index(row, col)] != 0 {
                    continue;
                }
                next_label += 1;
                labels[grid.index(row, col)] = next_label;
                queue.push_back((row, col));

                while let Some((r, c)) = queue.pop_front() {
                    let mut visit = |nr: usize, nc: usize, labels: &mut Vec<u32>| {
                        let idx = grid.index(nr, nc);
                        if grid.is_occupied(nr, nc) && labels[idx] == 0 {
                            labels[idx] = next_label;
                            queue.push_back((nr, nc));
                        }
                    };
                    if r > 0 {
                        visit(r - 1, c, &mut labels);
                    }
                    if r + 1 < n {
                        visit(r + 1, c, &mut labels);
                    }
                    if c > 0 {
                        visit(r, c - 1, &mut labels);
                    }
                    if c + 1 < n {
                        visit(r, c + 1, &mut labels);
                    }
                }
            }
        }

        LabelMap::new(n, labels, next_label as usize)
    }

    fn name(&self) -> &'static str {
        "bfs"
    }
}
