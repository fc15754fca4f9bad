//! Networks
//!
//! A `Network` owns the root label index, the named classes and webs carved
//! out of it, and the graph-level data entries. It is the unit that is
//! forked: `fork` hands back a network whose entries alias the same fields,
//! so the copy costs one reference-count bump per field plus the structural
//! maps, independent of how much data is attached. After a fork the two
//! networks are fully write-independent — the first write to a shared field
//! clones it for the writer only.
//!
//! Every construction operation is append-only and validates before it
//! mutates: a failed call leaves the network exactly as it was. The root
//! index itself lives in a COW entry, so growing one fork's label universe
//! never disturbs the other's.

use crate::class::Class;
use crate::error::{Error, Result};
use crate::view::{EdgesView, GraphView, NodesView};
use crate::web::Web;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;
use weft_graph_core::{Entry, Incidence, Index, Label, Restriction, Topology};

/// A forkable graph value: root index, classes, webs, and graph data
pub struct Network {
    /// Root label index, shared copy-on-write across forks
    root: Rc<Entry>,
    classes: BTreeMap<String, Class>,
    webs: BTreeMap<String, Web>,
    /// Graph-level fields; no size constraint applies
    data: BTreeMap<String, Rc<Entry>>,
    /// Class name → its selection relative to the root, composed through
    /// the parent chain on first use
    restriction_cache: RefCell<FxHashMap<String, Rc<Restriction>>>,
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

impl Network {
    /// Create an empty network
    pub fn new() -> Self {
        Network {
            root: Rc::new(Entry::new(Index::new())),
            classes: BTreeMap::new(),
            webs: BTreeMap::new(),
            data: BTreeMap::new(),
            restriction_cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Copy-on-write clone
    ///
    /// The fork aliases every field of this network; both sides keep
    /// reading shared values until one of them writes, and a write detaches
    /// only the written field in the writing fork.
    pub fn fork(&self) -> Network {
        debug!(
            classes = self.classes.len(),
            webs = self.webs.len(),
            "fork network"
        );
        Network {
            root: Rc::new(self.root.fork()),
            classes: self
                .classes
                .iter()
                .map(|(name, class)| (name.clone(), class.fork()))
                .collect(),
            webs: self
                .webs
                .iter()
                .map(|(name, web)| (name.clone(), web.fork()))
                .collect(),
            data: self
                .data
                .iter()
                .map(|(name, entry)| (name.clone(), Rc::new(entry.fork())))
                .collect(),
            restriction_cache: RefCell::new(self.restriction_cache.borrow().clone()),
        }
    }

    // ---- construction ----------------------------------------------------

    /// Add a class of fresh nodes
    ///
    /// Appends `labels` to the root index (every label must be new to the
    /// whole network) and installs a class spanning exactly the appended
    /// positions.
    pub fn add_class<I>(&mut self, name: &str, labels: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        self.check_name_free(name)?;

        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        let mut batch = FxHashSet::default();
        for label in &labels {
            if !batch.insert(label.clone()) {
                return Err(weft_graph_core::Error::duplicate_label(label.as_str()).into());
            }
        }
        let taken = self.with_root(|index| {
            labels
                .iter()
                .find(|l| index.contains(l.as_str()))
                .map(|l| l.as_str().to_string())
        });
        if let Some(label) = taken {
            return Err(weft_graph_core::Error::duplicate_label(label).into());
        }

        let span = self
            .root
            .mutate(|index: &mut Index| index.append(labels.iter().cloned()))??;
        debug!(class = %name, nodes = labels.len(), "add class");

        let restriction = Rc::new(Restriction::range(span.start, span.end)?);
        let index = Rc::new(Index::from_labels(labels)?);
        self.classes
            .insert(name.to_string(), Class::new(name.to_string(), None, restriction, index));
        Ok(())
    }

    /// Add a subclass selecting part of an existing class
    pub fn add_subclass(
        &mut self,
        parent: &str,
        name: &str,
        restriction: Restriction,
    ) -> Result<()> {
        self.check_name_free(name)?;
        let parent_class = self.class(parent)?;
        if !restriction.fits_within(parent_class.len()) {
            return Err(weft_graph_core::Error::size(
                format!("selection for subclass '{name}' of '{parent}'"),
                parent_class.len(),
                restriction.upper_bound(),
            )
            .into());
        }
        let index = Rc::new(parent_class.index().restricted(&restriction));
        debug!(class = %name, parent = %parent, nodes = index.len(), "add subclass");
        self.classes.insert(
            name.to_string(),
            Class::new(
                name.to_string(),
                Some(parent.to_string()),
                Rc::new(restriction),
                index,
            ),
        );
        Ok(())
    }

    /// Add a subclass from a boolean mask over the parent's positions
    pub fn add_subclass_mask(&mut self, parent: &str, name: &str, mask: &[bool]) -> Result<()> {
        let parent_len = self.class(parent)?.len();
        if mask.len() != parent_len {
            return Err(weft_graph_core::Error::size(
                format!("mask for subclass '{name}' of '{parent}'"),
                parent_len,
                mask.len(),
            )
            .into());
        }
        self.add_subclass(parent, name, Restriction::from_mask(mask))
    }

    /// Add a web connecting `source` to `target` through `topology`
    ///
    /// Foreign topologies need two distinct classes; reflexive and
    /// symmetric ones need the same class on both ends. The topology's
    /// node counts must match the class sizes exactly.
    pub fn add_web(
        &mut self,
        name: &str,
        source: &str,
        target: &str,
        topology: Topology,
    ) -> Result<()> {
        self.check_name_free(name)?;
        let source_len = self.class(source)?.len();
        let target_len = self.class(target)?.len();

        match topology.incidence() {
            Incidence::Foreign => {
                if source == target {
                    return Err(weft_graph_core::Error::shape(format!(
                        "foreign web '{name}' needs two distinct classes, got '{source}' twice"
                    ))
                    .into());
                }
            }
            Incidence::Reflexive | Incidence::Symmetric => {
                if source != target {
                    return Err(weft_graph_core::Error::shape(format!(
                        "web '{name}' is within one class, got '{source}' and '{target}'"
                    ))
                    .into());
                }
            }
        }
        if topology.n_sources() != source_len {
            return Err(weft_graph_core::Error::size(
                format!("sources of web '{name}' against class '{source}'"),
                source_len,
                topology.n_sources(),
            )
            .into());
        }
        if topology.n_targets() != target_len {
            return Err(weft_graph_core::Error::size(
                format!("targets of web '{name}' against class '{target}'"),
                target_len,
                topology.n_targets(),
            )
            .into());
        }

        debug!(web = %name, edges = topology.n_edges(), "add web");
        self.webs.insert(
            name.to_string(),
            Web::new(
                name.to_string(),
                source.to_string(),
                target.to_string(),
                Rc::new(topology),
            ),
        );
        Ok(())
    }

    /// Attach a per-node field to a class
    ///
    /// The vector length must equal the class size; a rejected call leaves
    /// the class's field set untouched.
    pub fn add_node_field<T: fmt::Debug + Clone + 'static>(
        &mut self,
        class: &str,
        field: &str,
        values: Vec<T>,
    ) -> Result<()> {
        let class_len = {
            let class_ref = self.class(class)?;
            if class_ref.has_field(field) {
                return Err(Error::name_conflict(format!(
                    "field '{field}' already attached to class '{class}'"
                )));
            }
            class_ref.len()
        };
        if values.len() != class_len {
            return Err(weft_graph_core::Error::size(
                format!("field '{field}' on class '{class}'"),
                class_len,
                values.len(),
            )
            .into());
        }
        debug!(class = %class, field = %field, "add node field");
        self.class_mut(class)?
            .insert_entry(field.to_string(), Entry::new(values));
        Ok(())
    }

    /// Attach a per-edge field to a web
    pub fn add_edge_field<T: fmt::Debug + Clone + 'static>(
        &mut self,
        web: &str,
        field: &str,
        values: Vec<T>,
    ) -> Result<()> {
        let n_edges = {
            let web_ref = self.web(web)?;
            if web_ref.has_field(field) {
                return Err(Error::name_conflict(format!(
                    "field '{field}' already attached to web '{web}'"
                )));
            }
            web_ref.n_edges()
        };
        if values.len() != n_edges {
            return Err(weft_graph_core::Error::size(
                format!("field '{field}' on web '{web}'"),
                n_edges,
                values.len(),
            )
            .into());
        }
        debug!(web = %web, field = %field, "add edge field");
        self.web_mut(web)?
            .insert_entry(field.to_string(), Entry::new(values));
        Ok(())
    }

    /// Attach a graph-level field (any value, no size constraint)
    pub fn add_graph_field<T: fmt::Debug + Clone + 'static>(
        &mut self,
        field: &str,
        value: T,
    ) -> Result<()> {
        if self.data.contains_key(field) {
            return Err(Error::name_conflict(format!(
                "graph field '{field}' already attached"
            )));
        }
        debug!(field = %field, "add graph field");
        self.data
            .insert(field.to_string(), Rc::new(Entry::new(value)));
        Ok(())
    }

    // ---- queries ---------------------------------------------------------

    /// Look up a class by name
    pub fn class(&self, name: &str) -> Result<&Class> {
        self.classes
            .get(name)
            .ok_or_else(|| Error::unknown_name(format!("class '{name}'")))
    }

    /// Look up a web by name
    pub fn web(&self, name: &str) -> Result<&Web> {
        self.webs
            .get(name)
            .ok_or_else(|| Error::unknown_name(format!("web '{name}'")))
    }

    /// Total number of nodes across all root-level classes
    pub fn n_nodes(&self) -> usize {
        self.with_root(Index::len)
    }

    /// Number of edges in a web
    pub fn n_edges(&self, web: &str) -> Result<usize> {
        Ok(self.web(web)?.n_edges())
    }

    /// Total number of fields attached anywhere (graph, classes, webs)
    pub fn n_fields(&self) -> usize {
        self.data.len()
            + self.classes.values().map(Class::n_fields).sum::<usize>()
            + self.webs.values().map(Web::n_fields).sum::<usize>()
    }

    /// Class names in lexical order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Web names in lexical order
    pub fn web_names(&self) -> impl Iterator<Item = &str> {
        self.webs.keys().map(String::as_str)
    }

    /// Graph-level field names in lexical order
    pub fn graph_field_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// All root labels in canonical order
    pub fn root_labels(&self) -> Vec<Label> {
        self.with_root(|index| index.labels().to_vec())
    }

    /// Root position of a label, with a descriptive error on failure
    pub fn root_position(&self, label: &str) -> Result<usize> {
        self.with_root(|index| {
            index.position(label).ok_or_else(|| {
                Error::unknown_label(label, None, index.labels().iter().map(Label::as_str))
            })
        })
    }

    /// A class's selection relative to the root, memoized
    ///
    /// Composes the class's restriction through its parent chain. The cache
    /// stays valid because the hierarchy is append-only and restrictions
    /// are immutable.
    pub fn root_restriction(&self, class: &str) -> Result<Rc<Restriction>> {
        if let Some(cached) = self.restriction_cache.borrow().get(class) {
            return Ok(cached.clone());
        }
        let class_ref = self.class(class)?;
        let composed = match class_ref.parent() {
            None => class_ref.restriction().clone(),
            Some(parent) => {
                let parent_restriction = self.root_restriction(parent)?;
                Rc::new(class_ref.restriction().compose(&parent_restriction)?)
            }
        };
        self.restriction_cache
            .borrow_mut()
            .insert(class.to_string(), composed.clone());
        Ok(composed)
    }

    // ---- views -----------------------------------------------------------

    /// Protected handle onto a class's node field
    pub fn nodes_view<T: 'static>(&self, class: &str, field: &str) -> Result<NodesView<T>> {
        let class_ref = self.class(class)?;
        let entry = class_ref.entry(field)?;
        if !entry.holds::<Vec<T>>() {
            return Err(weft_graph_core::Error::type_mismatch(
                entry.type_label(),
                std::any::type_name::<Vec<T>>(),
            )
            .into());
        }
        Ok(NodesView::new(
            class.to_string(),
            class_ref.index().clone(),
            entry.clone(),
        ))
    }

    /// Protected handle onto a web's edge field
    pub fn edges_view<T: 'static>(&self, web: &str, field: &str) -> Result<EdgesView<T>> {
        let web_ref = self.web(web)?;
        let entry = web_ref.entry(field)?;
        if !entry.holds::<Vec<T>>() {
            return Err(weft_graph_core::Error::type_mismatch(
                entry.type_label(),
                std::any::type_name::<Vec<T>>(),
            )
            .into());
        }
        let source_index = self.class(web_ref.source_class())?.index().clone();
        let target_index = self.class(web_ref.target_class())?.index().clone();
        Ok(EdgesView::new(
            web.to_string(),
            web_ref.source_class().to_string(),
            web_ref.target_class().to_string(),
            web_ref.topology().clone(),
            source_index,
            target_index,
            entry.clone(),
        ))
    }

    /// Protected handle onto a graph-level field
    pub fn graph_view<T: 'static>(&self, field: &str) -> Result<GraphView<T>> {
        let entry = self
            .data
            .get(field)
            .ok_or_else(|| Error::unknown_name(format!("graph field '{field}'")))?;
        if !entry.holds::<T>() {
            return Err(weft_graph_core::Error::type_mismatch(
                entry.type_label(),
                std::any::type_name::<T>(),
            )
            .into());
        }
        Ok(GraphView::new(field.to_string(), entry.clone()))
    }

    // ---- internals -------------------------------------------------------

    fn with_root<R>(&self, f: impl FnOnce(&Index) -> R) -> R {
        // the root entry holds an Index from construction onwards
        self.root.read(f).expect("root entry holds an Index")
    }

    fn check_name_free(&self, name: &str) -> Result<()> {
        if self.classes.contains_key(name) {
            return Err(Error::name_conflict(format!("class '{name}' already exists")));
        }
        if self.webs.contains_key(name) {
            return Err(Error::name_conflict(format!("web '{name}' already exists")));
        }
        Ok(())
    }

    fn class_mut(&mut self, name: &str) -> Result<&mut Class> {
        self.classes
            .get_mut(name)
            .ok_or_else(|| Error::unknown_name(format!("class '{name}'")))
    }

    fn web_mut(&mut self, name: &str) -> Result<&mut Web> {
        self.webs
            .get_mut(name)
            .ok_or_else(|| Error::unknown_name(format!("web '{name}'")))
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("n_nodes", &self.n_nodes())
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("webs", &self.webs.keys().collect::<Vec<_>>())
            .field("graph_fields", &self.data.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_graph_core::ForeignTopology;

    fn two_class_net() -> Network {
        let mut net = Network::new();
        net.add_class("plants", ["a", "b", "c"]).unwrap();
        net.add_class("animals", ["x", "y"]).unwrap();
        net
    }

    #[test]
    fn test_add_class_assigns_root_span() {
        let net = two_class_net();
        assert_eq!(net.n_nodes(), 5);
        assert_eq!(net.class("plants").unwrap().len(), 3);
        assert_eq!(net.class("animals").unwrap().len(), 2);
        assert_eq!(net.root_position("x").unwrap(), 3);
    }

    #[test]
    fn test_add_class_rejects_existing_label_anywhere() {
        let mut net = two_class_net();
        // "b" lives in plants; the whole call must be a no-op
        let err = net.add_class("fungi", ["f", "b"]).unwrap_err();
        assert!(err.to_string().contains("duplicate label"));
        assert!(net.class("fungi").is_err());
        assert_eq!(net.n_nodes(), 5);
    }

    #[test]
    fn test_name_conflicts_across_classes_and_webs() {
        let mut net = two_class_net();
        assert!(net.add_class("plants", ["q"]).is_err());
        let topo = ForeignTopology::from_coords(3, 2, &[(0, 0)]).unwrap();
        net.add_web("eats", "plants", "animals", topo.into()).unwrap();
        let topo2 = ForeignTopology::from_coords(3, 2, &[(0, 1)]).unwrap();
        assert!(net
            .add_web("plants", "plants", "animals", topo2.into())
            .is_err());
        assert!(net.add_subclass_mask("plants", "eats", &[true, false, false]).is_err());
    }

    #[test]
    fn test_add_web_validates_sizes_and_incidence() {
        let mut net = two_class_net();
        // wrong dimensions
        let small = ForeignTopology::from_coords(2, 2, &[(0, 0)]).unwrap();
        assert!(net.add_web("eats", "plants", "animals", small.into()).is_err());
        // foreign web over one class
        let square = ForeignTopology::from_coords(3, 3, &[(0, 0)]).unwrap();
        assert!(net.add_web("eats", "plants", "plants", square.into()).is_err());
        assert!(net.web("eats").is_err());
    }

    #[test]
    fn test_root_restriction_composes_through_parents() {
        let mut net = two_class_net();
        net.add_subclass_mask("plants", "trees", &[true, false, true])
            .unwrap();
        net.add_subclass_mask("trees", "oaks", &[false, true]).unwrap();

        // oaks selects trees-local {1} = plants-local {2} = root {2}
        let r = net.root_restriction("oaks").unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![2]);
        // animals spans root positions 3..5
        let r = net.root_restriction("animals").unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![3, 4]);
        // memoized
        assert!(net.restriction_cache.borrow().contains_key("oaks"));
    }

    #[test]
    fn test_subclass_mask_must_match_parent_size() {
        let mut net = two_class_net();
        let err = net
            .add_subclass_mask("plants", "trees", &[true, false])
            .unwrap_err();
        assert!(err.to_string().contains("size mismatch"));
        assert!(net.class("trees").is_err());
    }

    #[test]
    fn test_n_fields_counts_every_target() {
        let mut net = two_class_net();
        net.add_node_field("plants", "mass", vec![1.0, 2.0, 3.0]).unwrap();
        net.add_graph_field("temperature", 21.5).unwrap();
        let topo = ForeignTopology::from_coords(3, 2, &[(0, 0), (2, 1)]).unwrap();
        net.add_web("eats", "plants", "animals", topo.into()).unwrap();
        net.add_edge_field("eats", "rate", vec![0.1, 0.2]).unwrap();
        assert_eq!(net.n_fields(), 3);
    }
}
