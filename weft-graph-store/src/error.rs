//! Error types for weft-graph-store

use std::fmt;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Store error type
///
/// Naming and label problems are detected here; structural problems bubble
/// up from the core crate unchanged. Everything is recoverable and nothing
/// is reported later than the call that caused it.
#[derive(Error, Debug)]
pub enum Error {
    /// Class, web, or field name already used on the target
    #[error("name conflict: {0}")]
    NameConflict(String),

    /// Class, web, or field name not found
    #[error("unknown name: {0}")]
    UnknownName(String),

    /// Node label not found in the relevant index
    #[error("{0}")]
    Label(LabelError),

    /// No edge between the requested endpoints
    #[error("no edge ({from}, {to}) in web '{web}'")]
    NoEdge {
        web: String,
        from: usize,
        to: usize,
    },

    /// Structural error from the core layer
    #[error(transparent)]
    Core(#[from] weft_graph_core::Error),
}

/// Label lookup failure, carrying the valid label set for the message
#[derive(Debug)]
pub struct LabelError {
    pub label: String,
    /// Class the lookup ran against; `None` for the root index
    pub class: Option<String>,
    pub valid: Vec<String>,
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label '{}' ", self.label)?;
        match &self.class {
            Some(class) => write!(f, "in class '{}'", class)?,
            None => f.write_str("in the root index")?,
        }
        write!(f, "; valid labels are [{}]", self.valid.join(", "))
    }
}

impl Error {
    /// Create a name conflict error
    pub fn name_conflict(msg: impl Into<String>) -> Self {
        Error::NameConflict(msg.into())
    }

    /// Create an unknown name error
    pub fn unknown_name(msg: impl Into<String>) -> Self {
        Error::UnknownName(msg.into())
    }

    /// Create a label error from the lookup context
    pub fn unknown_label(
        label: impl Into<String>,
        class: Option<&str>,
        valid: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Error::Label(LabelError {
            label: label.into(),
            class: class.map(str::to_string),
            valid: valid.into_iter().map(Into::into).collect(),
        })
    }

    /// Create a missing edge error
    pub fn no_edge(web: impl Into<String>, source: usize, target: usize) -> Self {
        Error::NoEdge {
            web: web.into(),
            from: source,
            to: target,
        }
    }
}
