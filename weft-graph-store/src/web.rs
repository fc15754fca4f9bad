//! Edge webs
//!
//! A `Web` names one topology between two classes (or one class and itself)
//! and carries the data entries attached to its edges. Every data entry
//! holds a vector of length `topology.n_edges()`.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::rc::Rc;
use weft_graph_core::{Entry, Topology};

/// One named edge structure of a network, plus its edge data
#[derive(Clone, Debug)]
pub struct Web {
    name: String,
    source: String,
    target: String,
    topology: Rc<Topology>,
    data: BTreeMap<String, Rc<Entry>>,
}

impl Web {
    pub(crate) fn new(
        name: String,
        source: String,
        target: String,
        topology: Rc<Topology>,
    ) -> Self {
        Web {
            name,
            source,
            target,
            topology,
            data: BTreeMap::new(),
        }
    }

    /// Web name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the source class
    pub fn source_class(&self) -> &str {
        &self.source
    }

    /// Name of the target class
    pub fn target_class(&self) -> &str {
        &self.target
    }

    /// The edge structure
    pub fn topology(&self) -> &Rc<Topology> {
        &self.topology
    }

    /// Number of edges
    pub fn n_edges(&self) -> usize {
        self.topology.n_edges()
    }

    /// Names of the fields attached to this web
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Whether a field of this name is attached
    pub fn has_field(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    /// Number of attached fields
    pub fn n_fields(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn entry(&self, field: &str) -> Result<&Rc<Entry>> {
        self.data
            .get(field)
            .ok_or_else(|| Error::unknown_name(format!("field '{}' on web '{}'", field, self.name)))
    }

    pub(crate) fn insert_entry(&mut self, field: String, entry: Entry) {
        self.data.insert(field, Rc::new(entry));
    }

    /// Clone for a forked network: fresh entries aliasing the same fields
    pub(crate) fn fork(&self) -> Web {
        Web {
            name: self.name.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            topology: self.topology.clone(),
            data: self
                .data
                .iter()
                .map(|(name, entry)| (name.clone(), Rc::new(entry.fork())))
                .collect(),
        }
    }
}
