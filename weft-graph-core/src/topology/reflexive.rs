//! Reflexive topology: directed edges within one class
//!
//! Same storage as the foreign shape, constrained to a square incidence
//! matrix over a single node set. Self-loops are ordinary edges.

use super::{
    dense_dims, dense_edges, directed_adjacency, row_edge, sorted_coords, AdjRow, Density,
    NeighborIter,
};
use crate::error::{Error, Result};

/// Directed edges within one node class
#[derive(Clone, Debug)]
pub struct ReflexiveTopology {
    n: usize,
    store: Store,
}

#[derive(Clone, Debug)]
enum Store {
    Sparse {
        outgoing: Vec<AdjRow>,
        incoming: Vec<AdjRow>,
        n_edges: usize,
    },
    Full,
}

impl ReflexiveTopology {
    /// Build sparse storage from a square dense boolean matrix
    pub fn from_dense(rows: &[Vec<bool>]) -> Result<Self> {
        let (n_rows, n_cols) = dense_dims(rows)?;
        if n_rows != n_cols {
            return Err(Error::shape(format!(
                "reflexive topology needs a square matrix, got {n_rows}×{n_cols}"
            )));
        }
        let _span = tracing::debug_span!("reflexive_from_dense", n = n_rows).entered();
        let (outgoing, incoming, n_edges) = directed_adjacency(n_rows, n_rows, dense_edges(rows));
        Ok(ReflexiveTopology {
            n: n_rows,
            store: Store::Sparse {
                outgoing,
                incoming,
                n_edges,
            },
        })
    }

    /// Build sparse storage from a coordinate list over `n` nodes
    pub fn from_coords(n: usize, pairs: &[(usize, usize)]) -> Result<Self> {
        let _span = tracing::debug_span!("reflexive_from_coords", n_edges = pairs.len()).entered();
        let sorted = sorted_coords(n, n, pairs)?;
        let (outgoing, incoming, n_edges) = directed_adjacency(n, n, sorted.into_iter());
        Ok(ReflexiveTopology {
            n,
            store: Store::Sparse {
                outgoing,
                incoming,
                n_edges,
            },
        })
    }

    /// Full storage over `n` nodes: all `n²` pairs, self-loops included
    pub fn full(n: usize) -> Self {
        ReflexiveTopology {
            n,
            store: Store::Full,
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
            Store::Full => self.n * self.n,
        }
    }

    pub fn is_edge(&self, source: usize, target: usize) -> bool {
        self.edge_index(source, target).is_some()
    }

    pub fn edge_index(&self, source: usize, target: usize) -> Option<usize> {
        if source >= self.n || target >= self.n {
            return None;
        }
        match &self.store {
            Store::Sparse { outgoing, .. } => row_edge(&outgoing[source], target),
            Store::Full => Some(source * self.n + target),
        }
    }

    pub fn targets(&self, source: usize) -> NeighborIter<'_> {
        if source >= self.n {
            return NeighborIter::empty();
        }
        match &self.store {
            Store::Sparse { outgoing, .. } => NeighborIter::slice(&outgoing[source]),
            Store::Full => NeighborIter::row(0..self.n, source * self.n),
        }
    }

    pub fn sources(&self, target: usize) -> NeighborIter<'_> {
        if target >= self.n {
            return NeighborIter::empty();
        }
        match &self.store {
            Store::Sparse { incoming, .. } => NeighborIter::slice(&incoming[target]),
            Store::Full => NeighborIter::column(0..self.n, target, self.n),
        }
    }
}
