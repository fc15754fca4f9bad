//! Protected data views
//!
//! A view wraps one data entry together with the index or topology it is
//! validated against. All access is bounds- or label-checked, reads hand a
//! short-lived borrow to a closure, and writes go through the entry's
//! clone-on-write path — callers never see the entry or the field itself,
//! and aggregate extraction always copies out.
//!
//! The `Rc` handles a view holds keep its targets alive independent of the
//! network's later growth.

use crate::error::{Error, Result};
use std::marker::PhantomData;
use std::rc::Rc;
use weft_graph_core::{Entry, Index, Label, Topology};

/// Checked handle onto one class's node field
#[derive(Debug)]
pub struct NodesView<T> {
    class: String,
    index: Rc<Index>,
    entry: Rc<Entry>,
    _values: PhantomData<T>,
}

impl<T: 'static> NodesView<T> {
    pub(crate) fn new(class: String, index: Rc<Index>, entry: Rc<Entry>) -> Self {
        NodesView {
            class,
            index,
            entry,
            _values: PhantomData,
        }
    }

    /// Number of nodes the field covers
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the class is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Labels in canonical order
    pub fn labels(&self) -> &[Label] {
        self.index.labels()
    }

    /// Value at a node position
    pub fn get(&self, position: usize) -> Result<T>
    where
        T: Clone,
    {
        self.check_bounds(position)?;
        let value = self.entry.read(|v: &Vec<T>| v.get(position).cloned())?;
        value.ok_or_else(|| self.bounds_error(position))
    }

    /// Value at a labeled node
    pub fn get_at(&self, label: &str) -> Result<T>
    where
        T: Clone,
    {
        self.get(self.position(label)?)
    }

    /// Overwrite the value at a node position
    pub fn set(&self, position: usize, value: T) -> Result<()> {
        self.check_bounds(position)?;
        let written = self.entry.mutate(|v: &mut Vec<T>| match v.get_mut(position) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        })?;
        if written {
            Ok(())
        } else {
            Err(self.bounds_error(position))
        }
    }

    /// Overwrite the value at a labeled node
    pub fn set_at(&self, label: &str, value: T) -> Result<()> {
        self.set(self.position(label)?, value)
    }

    /// Call `f` with the whole column
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R> {
        Ok(self.entry.read(|v: &Vec<T>| f(v.as_slice()))?)
    }

    /// Call `f!` with the whole column, cloning first if shared
    ///
    /// The closure sees a slice, so the column's length cannot change.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R> {
        Ok(self.entry.mutate(|v: &mut Vec<T>| f(v.as_mut_slice()))?)
    }

    /// Replace the whole column with a new one of the same length
    pub fn reassign(&self, values: Vec<T>) -> Result<()>
    where
        T: std::fmt::Debug + Clone,
    {
        if values.len() != self.index.len() {
            return Err(weft_graph_core::Error::size(
                format!("replacement column for class '{}'", self.class),
                self.index.len(),
                values.len(),
            )
            .into());
        }
        Ok(self.entry.reassign(values)?)
    }

    /// Copy the column out as a plain vector
    pub fn to_vec(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        Ok(self.entry.read(|v: &Vec<T>| v.clone())?)
    }

    fn position(&self, label: &str) -> Result<usize> {
        self.index.position(label).ok_or_else(|| {
            Error::unknown_label(
                label,
                Some(&self.class),
                self.index.labels().iter().map(Label::as_str),
            )
        })
    }

    fn check_bounds(&self, position: usize) -> Result<()> {
        if position < self.index.len() {
            Ok(())
        } else {
            Err(self.bounds_error(position))
        }
    }

    fn bounds_error(&self, position: usize) -> Error {
        weft_graph_core::Error::out_of_bounds("node position", position, self.index.len()).into()
    }
}

/// Checked handle onto one web's edge field
pub struct EdgesView<T> {
    web: String,
    source_class: String,
    target_class: String,
    topology: Rc<Topology>,
    source_index: Rc<Index>,
    target_index: Rc<Index>,
    entry: Rc<Entry>,
    _values: PhantomData<T>,
}

impl<T: 'static> EdgesView<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        web: String,
        source_class: String,
        target_class: String,
        topology: Rc<Topology>,
        source_index: Rc<Index>,
        target_index: Rc<Index>,
        entry: Rc<Entry>,
    ) -> Self {
        EdgesView {
            web,
            source_class,
            target_class,
            topology,
            source_index,
            target_index,
            entry,
            _values: PhantomData,
        }
    }

    /// Number of edges the field covers
    pub fn len(&self) -> usize {
        self.topology.n_edges()
    }

    /// Whether the web has no edges
    pub fn is_empty(&self) -> bool {
        self.topology.n_edges() == 0
    }

    /// The web's edge structure
    pub fn topology(&self) -> &Rc<Topology> {
        &self.topology
    }

    /// Value at a dense edge index
    pub fn get(&self, edge: usize) -> Result<T>
    where
        T: Clone,
    {
        self.check_bounds(edge)?;
        let value = self.entry.read(|v: &Vec<T>| v.get(edge).cloned())?;
        value.ok_or_else(|| self.bounds_error(edge))
    }

    /// Value on the edge from `source` to `target`
    ///
    /// Symmetric webs resolve either orientation to the same edge.
    pub fn get_pair(&self, source: usize, target: usize) -> Result<T>
    where
        T: Clone,
    {
        self.get(self.edge(source, target)?)
    }

    /// Value on the edge between two labeled endpoints
    pub fn get_labels(&self, source: &str, target: &str) -> Result<T>
    where
        T: Clone,
    {
        let (s, t) = self.endpoints(source, target)?;
        self.get_pair(s, t)
    }

    /// Overwrite the value at a dense edge index
    pub fn set(&self, edge: usize, value: T) -> Result<()> {
        self.check_bounds(edge)?;
        let written = self.entry.mutate(|v: &mut Vec<T>| match v.get_mut(edge) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        })?;
        if written {
            Ok(())
        } else {
            Err(self.bounds_error(edge))
        }
    }

    /// Overwrite the value on the edge from `source` to `target`
    ///
    /// Writes resolve through the same canonical edge index as reads, so a
    /// symmetric web behaves identically from both endpoints.
    pub fn set_pair(&self, source: usize, target: usize, value: T) -> Result<()> {
        self.set(self.edge(source, target)?, value)
    }

    /// Overwrite the value on the edge between two labeled endpoints
    pub fn set_labels(&self, source: &str, target: &str, value: T) -> Result<()> {
        let (s, t) = self.endpoints(source, target)?;
        self.set_pair(s, t, value)
    }

    /// Call `f` with the whole column
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R> {
        Ok(self.entry.read(|v: &Vec<T>| f(v.as_slice()))?)
    }

    /// Call `f!` with the whole column, cloning first if shared
    pub fn mutate<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R> {
        Ok(self.entry.mutate(|v: &mut Vec<T>| f(v.as_mut_slice()))?)
    }

    /// Replace the whole column with a new one of the same length
    pub fn reassign(&self, values: Vec<T>) -> Result<()>
    where
        T: std::fmt::Debug + Clone,
    {
        if values.len() != self.topology.n_edges() {
            return Err(weft_graph_core::Error::size(
                format!("replacement column for web '{}'", self.web),
                self.topology.n_edges(),
                values.len(),
            )
            .into());
        }
        Ok(self.entry.reassign(values)?)
    }

    /// Copy the column out as a plain vector
    pub fn to_vec(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        Ok(self.entry.read(|v: &Vec<T>| v.clone())?)
    }

    fn edge(&self, source: usize, target: usize) -> Result<usize> {
        self.topology
            .edge_index(source, target)
            .ok_or_else(|| Error::no_edge(&self.web, source, target))
    }

    fn endpoints(&self, source: &str, target: &str) -> Result<(usize, usize)> {
        let s = self.source_index.position(source).ok_or_else(|| {
            Error::unknown_label(
                source,
                Some(&self.source_class),
                self.source_index.labels().iter().map(Label::as_str),
            )
        })?;
        let t = self.target_index.position(target).ok_or_else(|| {
            Error::unknown_label(
                target,
                Some(&self.target_class),
                self.target_index.labels().iter().map(Label::as_str),
            )
        })?;
        Ok((s, t))
    }

    fn check_bounds(&self, edge: usize) -> Result<()> {
        if edge < self.topology.n_edges() {
            Ok(())
        } else {
            Err(self.bounds_error(edge))
        }
    }

    fn bounds_error(&self, edge: usize) -> Error {
        weft_graph_core::Error::out_of_bounds("edge index", edge, self.topology.n_edges()).into()
    }
}

/// Checked handle onto one graph-level field
pub struct GraphView<T> {
    name: String,
    entry: Rc<Entry>,
    _value: PhantomData<T>,
}

impl<T: 'static> GraphView<T> {
    pub(crate) fn new(name: String, entry: Rc<Entry>) -> Self {
        GraphView {
            name,
            entry,
            _value: PhantomData,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the current value
    pub fn get(&self) -> Result<T>
    where
        T: Clone,
    {
        Ok(self.entry.read(|v: &T| v.clone())?)
    }

    /// Overwrite the value
    pub fn set(&self, value: T) -> Result<()> {
        Ok(self.entry.mutate(|v: &mut T| *v = value)?)
    }

    /// Call `f` with a borrow of the value
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        Ok(self.entry.read(f)?)
    }

    /// Call `f!` with a mutable borrow, cloning first if shared
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        Ok(self.entry.mutate(f)?)
    }

    /// Replace the value (same type required)
    pub fn reassign(&self, value: T) -> Result<()>
    where
        T: std::fmt::Debug + Clone,
    {
        Ok(self.entry.reassign(value)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::network::Network;
    use weft_graph_core::{Error as CoreError, SymmetricTopology};

    fn net_with_field() -> Network {
        let mut net = Network::new();
        net.add_class("plants", ["a", "b", "c"]).unwrap();
        net.add_node_field("plants", "growth", vec![0.15, 0.25, 0.35])
            .unwrap();
        net
    }

    #[test]
    fn test_nodes_view_by_position_and_label() {
        let net = net_with_field();
        let view = net.nodes_view::<f64>("plants", "growth").unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.get(0).unwrap(), 0.15);
        assert_eq!(view.get_at("c").unwrap(), 0.35);

        view.set_at("b", 1.0).unwrap();
        assert_eq!(view.to_vec().unwrap(), vec![0.15, 1.0, 0.35]);
    }

    #[test]
    fn test_nodes_view_bounds_and_label_errors() {
        let net = net_with_field();
        let view = net.nodes_view::<f64>("plants", "growth").unwrap();

        let err = view.get(3).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Core(CoreError::OutOfBounds { index: 3, len: 3, .. })
        ));

        let err = view.get_at("zzz").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown label 'zzz' in class 'plants'; valid labels are [a, b, c]"
        );
    }

    #[test]
    fn test_nodes_view_reassign_checks_length() {
        let net = net_with_field();
        let view = net.nodes_view::<f64>("plants", "growth").unwrap();
        assert!(view.reassign(vec![1.0, 2.0]).is_err());
        view.reassign(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(view.get(2).unwrap(), 3.0);
    }

    #[test]
    fn test_nodes_view_wrong_type_rejected_eagerly() {
        let net = net_with_field();
        let err = net.nodes_view::<i64>("plants", "growth").unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
    }

    #[test]
    fn test_edges_view_pair_and_label_access() {
        let mut net = net_with_field();
        // undirected triangle edges: {a,a} {b,a} {c,b}
        let topo =
            SymmetricTopology::from_coords(3, &[(0, 0), (1, 0), (2, 1)]).unwrap();
        net.add_web("touches", "plants", "plants", topo.into()).unwrap();
        net.add_edge_field("touches", "strength", vec![1.0, 2.0, 3.0])
            .unwrap();

        let view = net.edges_view::<f64>("touches", "strength").unwrap();
        assert_eq!(view.len(), 3);
        // either orientation reaches the same edge
        assert_eq!(view.get_pair(1, 0).unwrap(), 2.0);
        assert_eq!(view.get_pair(0, 1).unwrap(), 2.0);
        assert_eq!(view.get_labels("c", "b").unwrap(), 3.0);
        assert_eq!(view.get_labels("b", "c").unwrap(), 3.0);

        // writes resolve through the same canonical index
        view.set_pair(0, 1, 9.0).unwrap();
        assert_eq!(view.get_pair(1, 0).unwrap(), 9.0);

        let err = view.get_pair(2, 0).unwrap_err();
        assert!(err.to_string().contains("no edge (2, 0) in web 'touches'"));
        assert!(view.get_labels("a", "zzz").is_err());
    }

    #[test]
    fn test_graph_view_roundtrip() {
        let mut net = net_with_field();
        net.add_graph_field("temperature", 21.5f64).unwrap();
        let view = net.graph_view::<f64>("temperature").unwrap();
        assert_eq!(view.get().unwrap(), 21.5);
        view.mutate(|t| *t += 0.5).unwrap();
        assert_eq!(view.get().unwrap(), 22.0);
        view.reassign(25.0).unwrap();
        assert_eq!(view.read(|t| *t).unwrap(), 25.0);
    }
}
