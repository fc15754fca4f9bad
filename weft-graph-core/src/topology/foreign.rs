//! Foreign topology: edges from one class into a different class
//!
//! Sparse storage keeps per-node adjacency in both directions so that
//! `targets` and `sources` are both O(degree). Full storage keeps nothing:
//! every `(source, target)` pair is an edge and the dense index is
//! `source · n_targets + target`.

use super::{
    dense_dims, dense_edges, directed_adjacency, row_edge, sorted_coords, AdjRow, Density,
    NeighborIter,
};
use crate::error::Result;

/// Directed edges between two distinct node classes
#[derive(Clone, Debug)]
pub struct ForeignTopology {
    n_sources: usize,
    n_targets: usize,
    store: Store,
}

#[derive(Clone, Debug)]
enum Store {
    Sparse {
        /// Source → `(target, edge)`, target-ascending
        outgoing: Vec<AdjRow>,
        /// Target → `(source, edge)`, source-ascending
        incoming: Vec<AdjRow>,
        n_edges: usize,
    },
    Full,
}

impl ForeignTopology {
    /// Build sparse storage from a dense boolean matrix
    ///
    /// Rows are sources, columns targets; edge indices are assigned in
    /// row-major scan order.
    pub fn from_dense(rows: &[Vec<bool>]) -> Result<Self> {
        let (n_sources, n_targets) = dense_dims(rows)?;
        let _span =
            tracing::debug_span!("foreign_from_dense", n_sources, n_targets).entered();
        let (outgoing, incoming, n_edges) =
            directed_adjacency(n_sources, n_targets, dense_edges(rows));
        Ok(ForeignTopology {
            n_sources,
            n_targets,
            store: Store::Sparse {
                outgoing,
                incoming,
                n_edges,
            },
        })
    }

    /// Build sparse storage from a coordinate list
    ///
    /// Coordinates are sorted row-major before indices are assigned, so the
    /// numbering matches [`from_dense`](ForeignTopology::from_dense) of the
    /// same edge set exactly. Out-of-range and duplicate coordinates are
    /// rejected.
    pub fn from_coords(
        n_sources: usize,
        n_targets: usize,
        pairs: &[(usize, usize)],
    ) -> Result<Self> {
        let _span = tracing::debug_span!("foreign_from_coords", n_edges = pairs.len()).entered();
        let sorted = sorted_coords(n_sources, n_targets, pairs)?;
        let (outgoing, incoming, n_edges) =
            directed_adjacency(n_sources, n_targets, sorted.into_iter());
        Ok(ForeignTopology {
            n_sources,
            n_targets,
            store: Store::Sparse {
                outgoing,
                incoming,
                n_edges,
            },
        })
    }

    /// Full storage: every pair is an edge, indices come from the formula
    pub fn full(n_sources: usize, n_targets: usize) -> Self {
        ForeignTopology {
            n_sources,
            n_targets,
            store: Store::Full,
        }
    }

    pub fn density(&self) -> Density {
        match self.store {
            Store::Sparse { .. } => Density::Sparse,
            Store::Full => Density::Full,
        }
    }

    pub fn n_sources(&self) -> usize {
        self.n_sources
    }

    pub fn n_targets(&self) -> usize {
        self.n_targets
    }

    pub fn n_edges(&self) -> usize {
        match &self.store {
            Store::Sparse { n_edges, .. } => *n_edges,
            Store::Full => self.n_sources * self.n_targets,
        }
    }

    pub fn is_edge(&self, source: usize, target: usize) -> bool {
        self.edge_index(source, target).is_some()
    }

    pub fn edge_index(&self, source: usize, target: usize) -> Option<usize> {
        if source >= self.n_sources || target >= self.n_targets {
            return None;
        }
        match &self.store {
            Store::Sparse { outgoing, .. } => row_edge(&outgoing[source], target),
            Store::Full => Some(source * self.n_targets + target),
        }
    }

    pub fn targets(&self, source: usize) -> NeighborIter<'_> {
        if source >= self.n_sources {
            return NeighborIter::empty();
        }
        match &self.store {
            Store::Sparse { outgoing, .. } => NeighborIter::slice(&outgoing[source]),
            Store::Full => NeighborIter::row(0..self.n_targets, source * self.n_targets),
        }
    }

    pub fn sources(&self, target: usize) -> NeighborIter<'_> {
        if target >= self.n_targets {
            return NeighborIter::empty();
        }
        match &self.store {
            Store::Sparse { incoming, .. } => NeighborIter::slice(&incoming[target]),
            Store::Full => NeighborIter::column(0..self.n_sources, target, self.n_targets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The 3×5 matrix used across the suite: 8 edges
    fn example() -> Vec<Vec<bool>> {
        [
            [0, 0, 4, 0, 9],
            [0, 3, 5, 0, 8],
            [1, 0, 7, 2, 0],
        ]
        .iter()
        .map(|row| row.iter().map(|&x| x != 0).collect())
        .collect()
    }

    #[test]
    fn test_from_dense_row_major_numbering() {
        let t = ForeignTopology::from_dense(&example()).unwrap();
        assert_eq!(t.n_sources(), 3);
        assert_eq!(t.n_targets(), 5);
        assert_eq!(t.n_edges(), 8);
        // first row contributes edges 0 and 1
        assert_eq!(t.edge_index(0, 2), Some(0));
        assert_eq!(t.edge_index(0, 4), Some(1));
        assert_eq!(t.edge_index(1, 1), Some(2));
        assert_eq!(t.edge_index(2, 3), Some(7));
        assert_eq!(t.edge_index(0, 0), None);
        assert!(!t.is_edge(0, 0));
        assert!(t.is_edge(2, 0));
    }

    #[test]
    fn test_coords_match_dense() {
        let rows = example();
        let dense = ForeignTopology::from_dense(&rows).unwrap();
        let mut coords: Vec<(usize, usize)> = dense_edges(&rows).collect();
        // shuffle the order; construction must sort it back
        coords.reverse();
        let sparse = ForeignTopology::from_coords(3, 5, &coords).unwrap();
        assert_eq!(sparse.n_edges(), dense.n_edges());
        for s in 0..3 {
            for t in 0..5 {
                assert_eq!(sparse.edge_index(s, t), dense.edge_index(s, t));
            }
        }
    }

    #[test]
    fn test_both_directions() {
        let t = ForeignTopology::from_dense(&example()).unwrap();
        let targets: Vec<_> = t.targets(1).collect();
        assert_eq!(targets, vec![(1, 2), (2, 3), (4, 4)]);
        let sources: Vec<_> = t.sources(2).collect();
        assert_eq!(sources, vec![(0, 0), (1, 3), (2, 6)]);
        assert_eq!(t.targets(99).count(), 0);
    }

    #[test]
    fn test_full_formula() {
        let t = ForeignTopology::full(3, 5);
        assert_eq!(t.n_edges(), 15);
        assert_eq!(t.edge_index(0, 0), Some(0));
        assert_eq!(t.edge_index(1, 0), Some(5));
        assert_eq!(t.edge_index(2, 4), Some(14));
        assert!(t.is_edge(2, 4));
        assert!(!t.is_edge(3, 0));
        let targets: Vec<_> = t.targets(1).collect();
        assert_eq!(targets[0], (0, 5));
        assert_eq!(targets[4], (4, 9));
        let sources: Vec<_> = t.sources(2).collect();
        assert_eq!(sources, vec![(0, 2), (1, 7), (2, 12)]);
    }

    #[test]
    fn test_from_coords_rejects_bad_input() {
        assert!(ForeignTopology::from_coords(2, 2, &[(0, 2)]).is_err());
        assert!(ForeignTopology::from_coords(2, 2, &[(1, 1), (1, 1)]).is_err());
    }
}
