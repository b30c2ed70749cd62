use proptest::prelude::*;

use crate::cluster::{BfsLabeler, ClusterLabeler, UnionFindLabeler};
use crate::grid::Grid;

fn arb_grid(max_n: usize) -> impl Strategy<Value = Grid> {
    (1..=max_n).prop_flat_map(|n| {
        proptest::collection::vec(any::<bool>(), n * n).prop_map(move |cells| {
            let rows: Vec<&[bool]> = cells.chunks(n).collect();
            Grid::from_rows(&rows).unwrap()
        })
    })
}

proptest! {
    /// Every two 4-connected occupied cells share a label.
    #[test]
    fn adjacent_occupied_cells_share_label(grid in arb_grid(12)) {
        let map = UnionFindLabeler.label(&grid);
        let n = grid.n();
        for row in 0..n {
            for col in 0..n {
                if !grid.is_occupied(row, col) {
                    continue;
                }
                if col + 1 < n && grid.is_occupied(row, col + 1) {
                    prop_assert_eq!(map.label(row, col), map.label(row, col + 1));
                }
                if row + 1 < n && grid.is_occupied(row + 1, col) {
                    prop_assert_eq!(map.label(row, col), map.label(row + 1, col));
                }
            }
        }
    }

    /// Cells that touch only diagonally never share a label.
    #[test]
    fn diagonal_only_adjacency_never_merges(grid in arb_grid(12)) {
        let map = UnionFindLabeler.label(&grid);
        let n = grid.n();
        for row in 0..n.saturating_sub(1) {
            for col in 0..n {
                for dc in [-1i64, 1] {
                    let dcol = col as i64 + dc;
                    if dcol < 0 || dcol >= n as i64 {
                        continue;
                    }
                    let dcol = dcol as usize;
                    // Diagonal pair with both orthogonal bridges empty:
                    // a shared label would mean a diagonal union happened.
                    if grid.is_occupied(row, col)
                        && grid.is_occupied(row + 1, dcol)
                        && !grid.is_occupied(row, dcol)
                        && !grid.is_occupied(row + 1, col)
                    {
                        prop_assert_ne!(map.label(row, col), map.label(row + 1, dcol));
                    }
                }
            }
        }
    }

    /// Labeling is a pure function of the grid.
    #[test]
    fn labeling_is_idempotent(grid in arb_grid(12)) {
        let first = UnionFindLabeler.label(&grid);
        let second = UnionFindLabeler.label(&grid);
        prop_assert_eq!(first, second);
    }

    /// Union-find and flood fill agree cell-for-cell: both number
    /// clusters by raster order of first encounter.
    #[test]
    fn strategies_agree_exactly(grid in arb_grid(12)) {
        let uf = UnionFindLabeler.label(&grid);
        let bfs = BfsLabeler.label(&grid);
        prop_assert_eq!(uf, bfs);
    }

    /// Every label 1..=K is used, and only occupied cells are labeled.
    #[test]
    fn labels_are_dense(grid in arb_grid(12)) {
        let map = UnionFindLabeler.label(&grid);
        let k = map.num_clusters();
        let mut seen = vec![false; k];
        for (idx, &label) in map.labels().iter().enumerate() {
            prop_assert_eq!(label != 0, grid.cells()[idx]);
            if label != 0 {
                prop_assert!((label as usize) <= k);
                seen[(label - 1) as usize] = true;
            }
        }
        prop_assert!(seen.iter().all(|&s| s));
    }
}
