//! Node labels
//!
//! A `Label` is a cheap-to-clone name for one node of the graph. Labels are
//! interned behind `Arc<str>` so they can be held by an index, its derived
//! child indexes, and any number of error messages without copying the text.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Interned node label
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(Arc<str>);

impl Label {
    /// Create a label from anything string-like
    pub fn new(name: impl AsRef<str>) -> Self {
        Label(Arc::from(name.as_ref()))
    }

    /// The label text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label(Arc::from(name))
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_equality_and_borrow() {
        let a = Label::new("heron");
        let b = Label::from("heron".to_string());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "heron");

        // Borrow<str> lets maps keyed by Label answer &str lookups
        let mut map = std::collections::HashMap::new();
        map.insert(a.clone(), 7usize);
        assert_eq!(map.get("heron"), Some(&7));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::new("a").to_string(), "a");
        assert_eq!(format!("{:?}", Label::new("a")), "\"a\"");
    }
}
