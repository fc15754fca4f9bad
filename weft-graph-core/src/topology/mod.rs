//! Edge topologies
//!
//! A `Topology` is the edge structure of one web, independent of any data
//! attached to the edges. Three incidence shapes, each with a sparse and a
//! full (formula-only) storage density:
//!
//! - **Foreign**: source class ≠ target class, directed across the two sets.
//! - **Reflexive**: source class = target class, directed, self-loops allowed.
//! - **Symmetric**: source class = target class, undirected; an edge between
//!   `a` and `b` is stored once under its canonical pair (`source ≥ target`,
//!   the lower triangle) and found from either endpoint.
//!
//! Edges carry a dense 0-based index in canonical row-major order over
//! `(source, target)` with `source` the slower-varying coordinate; for the
//! symmetric shape the order is row-major over the lower triangle. The
//! numbering is fixed at construction and stable for the lifetime of the
//! topology — topologies are built once, fully, and never grow.
//!
//! Dense-matrix and coordinate-list construction of the same logical edge
//! set produce bit-identical edge numbering; tests pin this.

mod foreign;
mod reflexive;
mod symmetric;

pub use foreign::ForeignTopology;
pub use reflexive::ReflexiveTopology;
pub use symmetric::SymmetricTopology;

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::ops::Range;

/// Per-node adjacency row: `(neighbor, edge index)` pairs, neighbor-ascending
pub(crate) type AdjRow = SmallVec<[(usize, usize); 2]>;

/// Static empty row for out-of-range nodes
static EMPTY_ADJ: &[(usize, usize)] = &[];

/// Storage density of a topology
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Density {
    /// Per-node adjacency rows
    Sparse,
    /// Every addressable pair is an edge; indices come from a formula
    Full,
}

/// Incidence shape of a topology
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Incidence {
    Foreign,
    Reflexive,
    Symmetric,
}

/// The edge structure of one web
#[derive(Clone, Debug)]
pub enum Topology {
    Foreign(ForeignTopology),
    Reflexive(ReflexiveTopology),
    Symmetric(SymmetricTopology),
}

impl From<ForeignTopology> for Topology {
    fn from(t: ForeignTopology) -> Self {
        Topology::Foreign(t)
    }
}

impl From<ReflexiveTopology> for Topology {
    fn from(t: ReflexiveTopology) -> Self {
        Topology::Reflexive(t)
    }
}

impl From<SymmetricTopology> for Topology {
    fn from(t: SymmetricTopology) -> Self {
        Topology::Symmetric(t)
    }
}

impl Topology {
    /// Incidence shape
    pub fn incidence(&self) -> Incidence {
        match self {
            Topology::Foreign(_) => Incidence::Foreign,
            Topology::Reflexive(_) => Incidence::Reflexive,
            Topology::Symmetric(_) => Incidence::Symmetric,
        }
    }

    /// Storage density
    pub fn density(&self) -> Density {
        match self {
            Topology::Foreign(t) => t.density(),
            Topology::Reflexive(t) => t.density(),
            Topology::Symmetric(t) => t.density(),
        }
    }

    /// Size of the source node set
    pub fn n_sources(&self) -> usize {
        match self {
            Topology::Foreign(t) => t.n_sources(),
            Topology::Reflexive(t) => t.n_nodes(),
            Topology::Symmetric(t) => t.n_nodes(),
        }
    }

    /// Size of the target node set
    pub fn n_targets(&self) -> usize {
        match self {
            Topology::Foreign(t) => t.n_targets(),
            Topology::Reflexive(t) => t.n_nodes(),
            Topology::Symmetric(t) => t.n_nodes(),
        }
    }

    /// Node count for the square shapes, `None` for foreign
    pub fn n_nodes(&self) -> Option<usize> {
        match self {
            Topology::Foreign(_) => None,
            Topology::Reflexive(t) => Some(t.n_nodes()),
            Topology::Symmetric(t) => Some(t.n_nodes()),
        }
    }

    /// Number of edges (each undirected pair counted once)
    pub fn n_edges(&self) -> usize {
        match self {
            Topology::Foreign(t) => t.n_edges(),
            Topology::Reflexive(t) => t.n_edges(),
            Topology::Symmetric(t) => t.n_edges(),
        }
    }

    /// Whether `(source, target)` is an edge
    ///
    /// Symmetric topologies answer for either orientation. Out-of-range
    /// positions are simply not edges.
    pub fn is_edge(&self, source: usize, target: usize) -> bool {
        match self {
            Topology::Foreign(t) => t.is_edge(source, target),
            Topology::Reflexive(t) => t.is_edge(source, target),
            Topology::Symmetric(t) => t.is_edge(source, target),
        }
    }

    /// Dense index of the edge `(source, target)`, if present
    pub fn edge_index(&self, source: usize, target: usize) -> Option<usize> {
        match self {
            Topology::Foreign(t) => t.edge_index(source, target),
            Topology::Reflexive(t) => t.edge_index(source, target),
            Topology::Symmetric(t) => t.edge_index(source, target),
        }
    }

    /// `(target, edge)` pairs leaving `source`, target-ascending
    ///
    /// For symmetric topologies this is every incident neighbor.
    pub fn targets(&self, source: usize) -> NeighborIter<'_> {
        match self {
            Topology::Foreign(t) => t.targets(source),
            Topology::Reflexive(t) => t.targets(source),
            Topology::Symmetric(t) => t.adjacency(source, true),
        }
    }

    /// `(source, edge)` pairs entering `target`, source-ascending
    ///
    /// For symmetric topologies this is every incident neighbor.
    pub fn sources(&self, target: usize) -> NeighborIter<'_> {
        match self {
            Topology::Foreign(t) => t.sources(target),
            Topology::Reflexive(t) => t.sources(target),
            Topology::Symmetric(t) => t.adjacency(target, true),
        }
    }

    /// Visit every edge as `(source, target, edge)` in canonical order
    pub fn for_each_edge(&self, mut f: impl FnMut(usize, usize, usize)) {
        match self {
            Topology::Symmetric(t) => {
                for u in 0..t.n_nodes() {
                    for (v, e) in t.adjacency(u, false) {
                        f(u, v, e);
                    }
                }
            }
            _ => {
                for s in 0..self.n_sources() {
                    for (t, e) in self.targets(s) {
                        f(s, t, e);
                    }
                }
            }
        }
    }

    /// Visit every edge once, grouped by its other endpoint
    ///
    /// Directed shapes iterate target-major; the symmetric shape visits
    /// each undirected edge from its lower endpoint.
    pub fn for_each_edge_backward(&self, mut f: impl FnMut(usize, usize, usize)) {
        match self {
            Topology::Symmetric(t) => {
                for v in 0..t.n_nodes() {
                    for (u, e) in t.adjacency(v, true) {
                        if u >= v {
                            f(u, v, e);
                        }
                    }
                }
            }
            _ => {
                for t in 0..self.n_targets() {
                    for (s, e) in self.sources(t) {
                        f(s, t, e);
                    }
                }
            }
        }
    }

    /// Sources with at least one outgoing edge, ascending
    pub fn active_sources(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_sources()).filter(move |&s| self.targets(s).next().is_some())
    }

    /// Targets with at least one incoming edge, ascending
    pub fn active_targets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_targets()).filter(move |&t| self.sources(t).next().is_some())
    }
}

/// Iterator over `(neighbor, edge index)` pairs for one node
pub struct NeighborIter<'a> {
    repr: NeighborRepr<'a>,
}

enum NeighborRepr<'a> {
    /// Sparse adjacency row
    Slice(std::slice::Iter<'a, (usize, usize)>),
    /// Full row: edge = base + neighbor
    Row { targets: Range<usize>, base: usize },
    /// Full column: edge = neighbor · stride + offset
    Column {
        sources: Range<usize>,
        offset: usize,
        stride: usize,
    },
    /// Full symmetric fan around `node`: edge from the triangle formula
    Triangle { node: usize, others: Range<usize> },
}

impl<'a> NeighborIter<'a> {
    pub(crate) fn slice(row: &'a [(usize, usize)]) -> Self {
        NeighborIter {
            repr: NeighborRepr::Slice(row.iter()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::slice(EMPTY_ADJ)
    }

    pub(crate) fn row(targets: Range<usize>, base: usize) -> Self {
        NeighborIter {
            repr: NeighborRepr::Row { targets, base },
        }
    }

    pub(crate) fn column(sources: Range<usize>, offset: usize, stride: usize) -> Self {
        NeighborIter {
            repr: NeighborRepr::Column {
                sources,
                offset,
                stride,
            },
        }
    }

    pub(crate) fn triangle(node: usize, others: Range<usize>) -> Self {
        NeighborIter {
            repr: NeighborRepr::Triangle { node, others },
        }
    }
}

impl Iterator for NeighborIter<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        match &mut self.repr {
            NeighborRepr::Slice(iter) => iter.next().copied(),
            NeighborRepr::Row { targets, base } => {
                let t = targets.next()?;
                Some((t, *base + t))
            }
            NeighborRepr::Column {
                sources,
                offset,
                stride,
            } => {
                let s = sources.next()?;
                Some((s, s * *stride + *offset))
            }
            NeighborRepr::Triangle { node, others } => {
                let v = others.next()?;
                Some((v, triangle_edge(*node, v)))
            }
        }
    }
}

/// Dense index of the undirected pair `{u, v}` in a full symmetric topology
pub(crate) fn triangle_edge(u: usize, v: usize) -> usize {
    let (hi, lo) = if u >= v { (u, v) } else { (v, u) };
    hi * (hi + 1) / 2 + lo
}

/// Validate a dense matrix is rectangular, returning `(rows, columns)`
pub(crate) fn dense_dims(rows: &[Vec<bool>]) -> Result<(usize, usize)> {
    let n_cols = rows.first().map_or(0, Vec::len);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(Error::shape(format!(
                "ragged matrix: row {i} has length {}, expected {n_cols}",
                row.len()
            )));
        }
    }
    Ok((rows.len(), n_cols))
}

/// `(source, target)` pairs of the true cells of a dense matrix, row-major
pub(crate) fn dense_edges(rows: &[Vec<bool>]) -> impl Iterator<Item = (usize, usize)> + '_ {
    rows.iter().enumerate().flat_map(|(s, row)| {
        row.iter()
            .enumerate()
            .filter_map(move |(t, &cell)| cell.then_some((s, t)))
    })
}

/// Bounds-check, sort row-major, and reject duplicate coordinates
pub(crate) fn sorted_coords(
    n_sources: usize,
    n_targets: usize,
    pairs: &[(usize, usize)],
) -> Result<Vec<(usize, usize)>> {
    for &(s, t) in pairs {
        if s >= n_sources || t >= n_targets {
            return Err(Error::shape(format!(
                "coordinate ({s}, {t}) outside a {n_sources}×{n_targets} topology"
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
    Ok(sorted)
}

/// Build both adjacency directions from canonically ordered edges,
/// assigning dense indices on the fly
pub(crate) fn directed_adjacency(
    n_sources: usize,
    n_targets: usize,
    edges: impl Iterator<Item = (usize, usize)>,
) -> (Vec<AdjRow>, Vec<AdjRow>, usize) {
    let mut outgoing = vec![AdjRow::new(); n_sources];
    let mut incoming = vec![AdjRow::new(); n_targets];
    let mut n_edges = 0;
    for (s, t) in edges {
        outgoing[s].push((t, n_edges));
        incoming[t].push((s, n_edges));
        n_edges += 1;
    }
    (outgoing, incoming, n_edges)
}

/// Binary-search an adjacency row for a neighbor, returning the edge index
pub(crate) fn row_edge(row: &[(usize, usize)], neighbor: usize) -> Option<usize> {
    row.binary_search_by_key(&neighbor, |&(n, _)| n)
        .ok()
        .map(|i| row[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bool_rows<const W: usize>(matrix: &[[u8; W]]) -> Vec<Vec<bool>> {
        matrix
            .iter()
            .map(|row| row.iter().map(|&x| x != 0).collect())
            .collect()
    }

    #[test]
    fn test_forward_and_backward_sweeps_agree() {
        // source 1 is isolated
        let rows = bool_rows(&[[0, 1, 1], [0, 0, 0], [1, 0, 0]]);
        let topo: Topology = ForeignTopology::from_dense(&rows).unwrap().into();

        let mut forward = Vec::new();
        topo.for_each_edge(|s, t, e| forward.push((s, t, e)));
        assert_eq!(forward, vec![(0, 1, 0), (0, 2, 1), (2, 0, 2)]);

        let mut backward = Vec::new();
        topo.for_each_edge_backward(|s, t, e| backward.push((s, t, e)));
        assert_eq!(backward, vec![(2, 0, 2), (0, 1, 0), (0, 2, 1)]);

        assert_eq!(topo.active_sources().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(topo.active_targets().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_symmetric_sweeps_visit_each_edge_once() {
        let rows = bool_rows(&[[0, 0, 0], [1, 0, 0], [1, 1, 0]]);
        let topo: Topology = SymmetricTopology::from_dense(&rows).unwrap().into();

        let mut forward = Vec::new();
        topo.for_each_edge(|s, t, e| forward.push((s, t, e)));
        assert_eq!(forward, vec![(1, 0, 0), (2, 0, 1), (2, 1, 2)]);

        let mut backward = Vec::new();
        topo.for_each_edge_backward(|s, t, e| backward.push((s, t, e)));
        backward.sort_by_key(|&(_, _, e)| e);
        assert_eq!(backward, forward);

        // incident neighbors flow both ways through the shared surface
        assert_eq!(topo.targets(0).collect::<Vec<_>>(), vec![(1, 0), (2, 1)]);
        assert_eq!(topo.sources(0).collect::<Vec<_>>(), vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_triangle_edge_formula() {
        // lower triangle of a 3×3, row-major: (0,0) (1,0) (1,1) (2,0) (2,1) (2,2)
        assert_eq!(triangle_edge(0, 0), 0);
        assert_eq!(triangle_edge(1, 0), 1);
        assert_eq!(triangle_edge(1, 1), 2);
        assert_eq!(triangle_edge(2, 0), 3);
        assert_eq!(triangle_edge(2, 2), 5);
        // orientation-independent
        assert_eq!(triangle_edge(0, 2), triangle_edge(2, 0));
    }

    #[test]
    fn test_dense_dims_rejects_ragged() {
        let rows = vec![vec![true, false], vec![true]];
        assert!(dense_dims(&rows).is_err());
        assert_eq!(dense_dims(&[]).unwrap(), (0, 0));
    }

    #[test]
    fn test_sorted_coords_validation() {
        assert!(sorted_coords(2, 2, &[(2, 0)]).is_err());
        assert!(sorted_coords(2, 2, &[(0, 1), (0, 1)]).is_err());
        let sorted = sorted_coords(3, 3, &[(2, 0), (0, 1), (0, 0)]).unwrap();
        assert_eq!(sorted, vec![(0, 0), (0, 1), (2, 0)]);
    }
}
