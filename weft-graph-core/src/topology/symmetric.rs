//! Symmetric topology: undirected edges within one class
//!
//! An edge between `a` and `b` exists once, under its canonical pair
//! `(source ≥ target)` — the lower triangle of the incidence matrix,
//! diagonal included. The sparse store keeps one adjacency row per node
//! holding every incident neighbor with the shared edge index, so the edge
//! is found from either endpoint with identical semantics; reads and writes
//! of edge data both resolve through that one index. Canonical edge order
//! is row-major over the lower triangle.
//!
//! Dense construction demands a lower-triangular input: a true cell above
//! the diagonal is rejected rather than silently mirrored, which keeps the
//! dense and coordinate construction paths in exact agreement.

use super::{dense_dims, row_edge, triangle_edge, AdjRow, Density, NeighborIter};
use crate::error::{Error, Result};

/// Undirected edges within one node class
#[derive(Clone, Debug)]
pub struct SymmetricTopology {
    n: usize,
    store: Store,
}

#[derive(Clone, Debug)]
enum Store {
    Sparse {
        /// Node → every incident `(neighbor, edge)`, neighbor-ascending;
        /// a self-loop appears once
        adjacency: Vec<AdjRow>,
        n_edges: usize,
    },
    Full,
}

impl SymmetricTopology {
    /// Build sparse storage from a square, lower-triangular boolean matrix
    pub fn from_dense(rows: &[Vec<bool>]) -> Result<Self> {
        let (n_rows, n_cols) = dense_dims(rows)?;
        if n_rows != n_cols {
            return Err(Error::shape(format!(
                "symmetric topology needs a square matrix, got {n_rows}×{n_cols}"
            )));
        }
        let _span = tracing::debug_span!("symmetric_from_dense", n = n_rows).entered();
        for (s, row) in rows.iter().enumerate() {
            if let Some(t) = (s + 1..n_cols).find(|&t| row[t]) {
                return Err(Error::shape(format!(
                    "symmetric topology input must be lower-triangular; cell ({s}, {t}) is set"
                )));
            }
        }
        let pairs = rows.iter().enumerate().flat_map(|(s, row)| {
            row[..=s]
                .iter()
                .enumerate()
                .filter_map(move |(t, &cell)| cell.then_some((s, t)))
        });
        Ok(Self::from_canonical(n_rows, pairs))
    }

    /// Build sparse storage from canonical `(source ≥ target)` coordinates
    pub fn from_coords(n: usize, pairs: &[(usize, usize)]) -> Result<Self> {
        let _span = tracing::debug_span!("symmetric_from_coords", n_edges = pairs.len()).entered();
        for &(s, t) in pairs {
            if s >= n || t >= n {
                return Err(Error::shape(format!(
                    "coordinate ({s}, {t}) outside a {n}-node topology"
                )));
            }
            if t > s {
                return Err(Error::shape(format!(
                    "symmetric edge ({s}, {t}) is above the diagonal; give the canonical pair"
                )));
            }
        }
        let mut sorted = pairs.to_vec();
        sorted.sort_unstable();
        for w in sorted.windows(2) {
            if w[0] == w[1] {
                return Err(Error::shape(format!(
                    "duplicate edge coordinate ({}, {})",
                    w[0].0, w[0].1
                )));
            }
        }
        Ok(Self::from_canonical(n, sorted.into_iter()))
    }

    /// Full storage over `n` nodes: the whole lower triangle, diagonal
    /// included; `n·(n+1)/2` edges by formula
    pub fn full(n: usize) -> Self {
        SymmetricTopology {
            n,
            store: Store::Full,
        }
    }

    /// Edges must arrive canonical and row-major; indices are assigned in
    /// arrival order and each non-loop edge is mirrored to both rows.
    fn from_canonical(n: usize, pairs: impl Iterator<Item = (usize, usize)>) -> Self {
        let mut adjacency = vec![AdjRow::new(); n];
        let mut n_edges = 0;
        for (s, t) in pairs {
            adjacency[s].push((t, n_edges));
            if s != t {
                adjacency[t].push((s, n_edges));
            }
            n_edges += 1;
        }
        SymmetricTopology {
            n,
            store: Store::Sparse { adjacency, n_edges },
        }
    }

    pub fn density(&self) -> Density {
        match self.store {
            Store::Sparse { .. } => Density::Sparse,
            Store::Full => Density::Full,
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.n
    }

    pub fn n_edges(&self) -> usize {
        match &self.store {
            Store::Sparse { n_edges, .. } => *n_edges,
            Store::Full => self.n * (self.n + 1) / 2,
        }
    }

    /// Whether `{source, target}` is an edge, in either orientation
    pub fn is_edge(&self, source: usize, target: usize) -> bool {
        self.edge_index(source, target).is_some()
    }

    /// Dense index of the undirected pair, identical from both endpoints
    pub fn edge_index(&self, source: usize, target: usize) -> Option<usize> {
        if source >= self.n || target >= self.n {
            return None;
        }
        match &self.store {
            Store::Sparse { adjacency, .. } => row_edge(&adjacency[source], target),
            Store::Full => Some(triangle_edge(source, target)),
        }
    }

    /// Incident `(neighbor, edge)` pairs of one node, neighbor-ascending
    ///
    /// With `include_upper` every incident neighbor is enumerated; without
    /// it only the canonical lower-triangular direction (`neighbor ≤ node`)
    /// is, so that a sweep over all nodes visits each edge exactly once.
    pub fn adjacency(&self, node: usize, include_upper: bool) -> NeighborIter<'_> {
        if node >= self.n {
            return NeighborIter::empty();
        }
        match &self.store {
            Store::Sparse { adjacency, .. } => {
                let row = &adjacency[node];
                if include_upper {
                    NeighborIter::slice(row)
                } else {
                    let canonical = row.partition_point(|&(v, _)| v <= node);
                    NeighborIter::slice(&row[..canonical])
                }
            }
            Store::Full => {
                let end = if include_upper { self.n } else { node + 1 };
                NeighborIter::triangle(node, 0..end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(matrix: &[[u8; 4]; 4]) -> Vec<Vec<bool>> {
        matrix
            .iter()
            .map(|row| row.iter().map(|&x| x != 0).collect())
            .collect()
    }

    /// Lower-triangular input: edges {0,0} {1,0} {2,1} {3,1} {3,3}
    fn example() -> Vec<Vec<bool>> {
        rows(&[[1, 0, 0, 0], [1, 0, 0, 0], [0, 1, 0, 0], [0, 1, 0, 1]])
    }

    #[test]
    fn test_lower_triangular_edge_count_and_symmetry() {
        let t = SymmetricTopology::from_dense(&example()).unwrap();
        assert_eq!(t.n_nodes(), 4);
        assert_eq!(t.n_edges(), 5);
        for s in 0..4 {
            for u in 0..4 {
                assert_eq!(t.is_edge(s, u), t.is_edge(u, s));
                assert_eq!(t.edge_index(s, u), t.edge_index(u, s));
            }
        }
        assert_eq!(t.edge_index(0, 0), Some(0));
        assert_eq!(t.edge_index(1, 0), Some(1));
        assert_eq!(t.edge_index(2, 1), Some(2));
        assert_eq!(t.edge_index(3, 3), Some(4));
    }

    #[test]
    fn test_rejects_above_diagonal() {
        let bad = rows(&[[0, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let err = SymmetricTopology::from_dense(&bad).unwrap_err();
        assert!(err.to_string().contains("lower-triangular"));
        assert!(SymmetricTopology::from_coords(4, &[(0, 1)]).is_err());
    }

    #[test]
    fn test_coords_match_dense() {
        let dense = SymmetricTopology::from_dense(&example()).unwrap();
        let sparse =
            SymmetricTopology::from_coords(4, &[(3, 3), (2, 1), (0, 0), (3, 1), (1, 0)]).unwrap();
        for s in 0..4 {
            for u in 0..4 {
                assert_eq!(sparse.edge_index(s, u), dense.edge_index(s, u));
            }
        }
    }

    #[test]
    fn test_adjacency_upper_and_canonical() {
        let t = SymmetricTopology::from_dense(&example()).unwrap();
        // node 1 touches edges {1,0}, {2,1}, {3,1}
        let all: Vec<_> = t.adjacency(1, true).collect();
        assert_eq!(all, vec![(0, 1), (2, 2), (3, 3)]);
        // canonical direction keeps only neighbors ≤ 1
        let canonical: Vec<_> = t.adjacency(1, false).collect();
        assert_eq!(canonical, vec![(0, 1)]);
        // a canonical sweep visits each edge exactly once
        let mut seen = Vec::new();
        for u in 0..4 {
            seen.extend(t.adjacency(u, false).map(|(_, e)| e));
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_full_symmetric() {
        let t = SymmetricTopology::full(3);
        assert_eq!(t.n_edges(), 6);
        assert_eq!(t.edge_index(2, 1), Some(4));
        assert_eq!(t.edge_index(1, 2), t.edge_index(2, 1));
        let all: Vec<_> = t.adjacency(1, true).collect();
        assert_eq!(all, vec![(0, 1), (1, 2), (2, 4)]);
        let canonical: Vec<_> = t.adjacency(1, false).collect();
        assert_eq!(canonical, vec![(0, 1), (1, 2)]);
    }
}
