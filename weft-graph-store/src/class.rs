//! Node classes
//!
//! A `Class` is one node compartment: a name, an optional parent class, the
//! restriction selecting its positions out of the parent's space, the
//! derived label index, and an append-only set of data entries (one per
//! attached field). The restriction, index, and data fields are shared
//! structure: forking a network clones the class cheaply by bumping
//! reference counts, never by copying node data.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::rc::Rc;
use weft_graph_core::{Entry, Index, Label, Restriction};

/// One node compartment of a network
#[derive(Clone, Debug)]
pub struct Class {
    name: String,
    /// Immediate parent class; `None` when derived directly from the root
    parent: Option<String>,
    /// Position selection relative to the immediate parent's space
    restriction: Rc<Restriction>,
    /// Label index over this class's own positions
    index: Rc<Index>,
    /// Field name → data entry; every entry holds a vector of length
    /// `index.len()`
    data: BTreeMap<String, Rc<Entry>>,
}

impl Class {
    pub(crate) fn new(
        name: String,
        parent: Option<String>,
        restriction: Rc<Restriction>,
        index: Rc<Index>,
    ) -> Self {
        Class {
            name,
            parent,
            restriction,
            index,
            data: BTreeMap::new(),
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Immediate parent class name, `None` for root-derived classes
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Number of nodes in this class
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the class has no nodes
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Label index over this class's positions
    pub fn index(&self) -> &Rc<Index> {
        &self.index
    }

    /// Selection of this class out of its immediate parent
    pub fn restriction(&self) -> &Rc<Restriction> {
        &self.restriction
    }

    /// Labels in canonical order
    pub fn labels(&self) -> &[Label] {
        self.index.labels()
    }

    /// Position of a label, with a descriptive error naming the valid set
    pub fn position(&self, label: &str) -> Result<usize> {
        self.index.position(label).ok_or_else(|| {
            Error::unknown_label(
                label,
                Some(&self.name),
                self.index.labels().iter().map(Label::as_str),
            )
        })
    }

    /// Names of the fields attached to this class
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
        self.data.get(field).ok_or_else(|| {
            Error::unknown_name(format!("field '{}' on class '{}'", field, self.name))
        })
    }

    pub(crate) fn insert_entry(&mut self, field: String, entry: Entry) {
        self.data.insert(field, Rc::new(entry));
    }

    /// Clone for a forked network: fresh entries aliasing the same fields
    pub(crate) fn fork(&self) -> Class {
        Class {
            name: self.name.clone(),
            parent: self.parent.clone(),
            restriction: self.restriction.clone(),
            index: self.index.clone(),
            data: self
                .data
                .iter()
                .map(|(name, entry)| (name.clone(), Rc::new(entry.fork())))
                .collect(),
        }
    }
}
