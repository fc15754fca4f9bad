//! Type-erased stored values
//!
//! Graph, node, and edge data are heterogeneous: one field holds a
//! `Vec<f64>`, the next a `Vec<bool>`, a graph-level field maybe a single
//! scalar. The store erases the concrete type at the cell boundary and
//! recovers it at every access through a checked downcast.
//!
//! The `Clone` bound on the blanket impl is what makes a value admissible
//! for clone-on-write in the first place: a type without a well-defined
//! copy cannot enter a cell, so the question never arises at runtime.

use std::any::Any;
use std::fmt;

/// A value that can live inside a clone-on-write cell
pub trait Value: fmt::Debug + 'static {
    /// Clone the value behind the erased type
    fn clone_box(&self) -> Box<dyn Value>;

    /// Borrow as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Borrow mutably as `Any` for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Human-readable type name for error messages
    fn type_label(&self) -> &'static str;
}

impl<T: fmt::Debug + Clone + 'static> Value for T {
    fn clone_box(&self) -> Box<dyn Value> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_label(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
