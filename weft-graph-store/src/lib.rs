//! # Weft Graph Store
//!
//! Composition layer of the weft graph store: node classes carved out of
//! one growing label universe, edge webs between them, forkable networks,
//! and protected data views.
//!
//! This crate provides:
//! - `Network`: the forkable unit — root index, classes, webs, graph data
//! - `Class` / `Web`: node compartments and named edge structures
//! - `NodesView` / `EdgesView` / `GraphView`: bounds- and label-checked
//!   handles for reading and writing attached data
//!
//! ## Example
//!
//! ```
//! use weft_graph_store::Network;
//!
//! let mut net = Network::new();
//! net.add_class("species", ["a", "b", "c", "d", "e"]).unwrap();
//! net.add_subclass_mask("species", "plants", &[false, true, true, false, true])
//!     .unwrap();
//! net.add_node_field("plants", "growth", vec![0.15, 0.25, 0.35]).unwrap();
//!
//! // fork cheaply, then write without disturbing the original
//! let fork = net.fork();
//! let view = fork.nodes_view::<f64>("plants", "growth").unwrap();
//! view.set_at("c", 9.9).unwrap();
//!
//! let original = net.nodes_view::<f64>("plants", "growth").unwrap();
//! assert_eq!(original.get_at("c").unwrap(), 0.25);
//! ```

pub mod class;
pub mod error;
pub mod network;
pub mod view;
pub mod web;

// Re-export main types
pub use class::Class;
pub use error::{Error, LabelError, Result};
pub use network::Network;
pub use view::{EdgesView, GraphView, NodesView};
pub use web::Web;

// The storage primitives are part of the public surface: callers build
// restrictions and topologies directly.
pub use weft_graph_core::{
    Density, Error as CoreError, ForeignTopology, Incidence, Index, Label, NeighborIter,
    ReflexiveTopology, Restriction, RestrictionKind, SymmetricTopology, Topology,
};
