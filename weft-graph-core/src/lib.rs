//! # Weft Graph Core
//!
//! Storage primitives for the weft graph store.
//!
//! This crate provides:
//! - Clone-on-write value cells: `Field`, `Entry`
//! - The label⇄position `Index` for one node set
//! - The `Restriction` family describing how a subclass selects positions
//!   from its parent
//! - The `Topology` family of edge structures (foreign/reflexive/symmetric,
//!   sparse/full)
//!
//! ## Design Principles
//!
//! 1. **Explicit sharing**: a value's use-count is its `Rc` strong count;
//!    forking bumps counts, writing to a shared cell clones first.
//! 2. **Closed representations**: restrictions and topologies are sum types
//!    matched exhaustively; adding a representation is a compile error at
//!    every site that must handle it.
//! 3. **Single-threaded by design**: no locks, no atomics; the closure-based
//!    `read`/`mutate` contract is the seam where per-field locking could be
//!    added later without changing call sites.
//!
//! ## Example
//!
//! ```
//! use weft_graph_core::{Entry, Index, Restriction};
//!
//! let parent = Index::from_labels(["a", "b", "c", "d", "e"]).unwrap();
//! let picks = Restriction::from_mask(&[false, true, true, false, true]);
//! let child = parent.restricted(&picks);
//! assert_eq!(child.position("c"), Some(1));
//!
//! let field = Entry::new(vec![0.15, 0.25, 0.35]);
//! let forked = field.fork();
//! forked.mutate(|v: &mut Vec<f64>| v[0] = 9.0).unwrap();
//! // the original still sees the pre-mutation value
//! assert_eq!(field.read(|v: &Vec<f64>| v[0]).unwrap(), 0.15);
//! ```

pub mod entry;
pub mod error;
pub mod index;
pub mod label;
pub mod restriction;
pub mod topology;
pub mod value;

// Re-export main types
pub use entry::{Entry, Field};
pub use error::{Error, Result};
pub use index::Index;
pub use label::Label;
pub use restriction::{Restriction, RestrictionKind};
pub use topology::{
    Density, ForeignTopology, Incidence, NeighborIter, ReflexiveTopology, SymmetricTopology,
    Topology,
};
pub use value::Value;
