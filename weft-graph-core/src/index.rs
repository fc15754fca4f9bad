//! Bidirectional label⇄position index
//!
//! One `Index` maps the labels of a node set to their dense positions and
//! back. Positions are assigned sequentially in insertion order, which is
//! the canonical order for everything downstream (restrictions, topologies,
//! field vectors). The index is append-only: positions are never removed or
//! reordered once handed out.

use crate::error::{Error, Result};
use crate::label::Label;
use crate::restriction::Restriction;
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Append-only label⇄position map for one node set
#[derive(Clone, Debug, Default)]
pub struct Index {
    /// Position → label, in canonical order
    order: Vec<Label>,
    /// Label → position
    forward: FxHashMap<Label, usize>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Index::default()
    }

    /// Create an index from labels, positions assigned in iteration order
    pub fn from_labels<I>(labels: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        let mut index = Index::new();
        index.append(labels)?;
        Ok(index)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of a label, if present
    pub fn position(&self, label: &str) -> Option<usize> {
        self.forward.get(label).copied()
    }

    /// Whether a label is present
    pub fn contains(&self, label: &str) -> bool {
        self.forward.contains_key(label)
    }

    /// Label at a position, if in bounds
    pub fn label(&self, position: usize) -> Option<&Label> {
        self.order.get(position)
    }

    /// All labels in canonical order
    pub fn labels(&self) -> &[Label] {
        &self.order
    }

    /// Iterate `(label, position)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&Label, usize)> {
        self.order.iter().enumerate().map(|(p, l)| (l, p))
    }

    /// Append labels, returning the span of newly assigned positions
    ///
    /// Validates every incoming label against the index and against the
    /// batch itself before inserting anything, so a rejected append leaves
    /// the index exactly as it was.
    pub fn append<I>(&mut self, labels: I) -> Result<Range<usize>>
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        let incoming: Vec<Label> = labels.into_iter().map(Into::into).collect();

        let mut batch = rustc_hash::FxHashSet::default();
        for label in &incoming {
            if self.forward.contains_key(label.as_str()) || !batch.insert(label.clone()) {
                return Err(Error::duplicate_label(label.as_str()));
            }
        }

        let start = self.order.len();
        for label in incoming {
            self.forward.insert(label.clone(), self.order.len());
            self.order.push(label);
        }
        Ok(start..self.order.len())
    }

    /// Derive a child index by filtering through a restriction
    ///
    /// Keeps the parent's relative order and reassigns contiguous positions
    /// starting at 0. Selected positions outside this index are skipped
    /// (callers validate the restriction against the parent size first).
    pub fn restricted(&self, restriction: &Restriction) -> Index {
        let mut order = Vec::with_capacity(restriction.len());
        let mut forward = FxHashMap::default();
        for parent_pos in restriction.iter() {
            if let Some(label) = self.order.get(parent_pos) {
                forward.insert(label.clone(), order.len());
                order.push(label.clone());
            }
        }
        Index { order, forward }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcde() -> Index {
        Index::from_labels(["a", "b", "c", "d", "e"]).unwrap()
    }

    #[test]
    fn test_positions_follow_insertion_order() {
        let index = abcde();
        assert_eq!(index.len(), 5);
        assert_eq!(index.position("a"), Some(0));
        assert_eq!(index.position("e"), Some(4));
        assert_eq!(index.label(2).map(Label::as_str), Some("c"));
        assert_eq!(index.position("zzz"), None);
    }

    #[test]
    fn test_append_returns_new_span() {
        let mut index = abcde();
        let span = index.append(["f", "g"]).unwrap();
        assert_eq!(span, 5..7);
        assert_eq!(index.position("g"), Some(6));
    }

    #[test]
    fn test_append_rejects_duplicates_atomically() {
        let mut index = abcde();
        // "c" collides; "x" must not have been inserted either
        let err = index.append(["x", "c"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel(l) if l == "c"));
        assert_eq!(index.len(), 5);
        assert!(!index.contains("x"));
    }

    #[test]
    fn test_append_rejects_duplicate_within_batch() {
        let mut index = Index::new();
        assert!(index.append(["x", "x"]).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_restricted_keeps_relative_order() {
        let index = abcde();
        let r = Restriction::from_mask(&[false, true, true, false, true]);
        let child = index.restricted(&r);
        assert_eq!(
            child.labels().iter().map(Label::as_str).collect::<Vec<_>>(),
            vec!["b", "c", "e"]
        );
        assert_eq!(child.position("c"), Some(1));
        assert_eq!(child.position("a"), None);
    }
}
