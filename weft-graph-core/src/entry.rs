//! Clone-on-write value cells
//!
//! Two layers make the copy-on-write discipline work:
//!
//! - **`Field`**: the one place a value actually lives. Its use-count is the
//!   `Rc` strong count: ≥ 1 while any entry holds it, and the value frees
//!   deterministically when the last holder lets go — explicit ownership in
//!   place of finalizer tricks.
//! - **`Entry`**: a reassignable indirection wrapping a field. Forking a
//!   graph hands every holder its own entry aliasing the same fields, so a
//!   later write can swap in a fresh field without disturbing siblings.
//!
//! `read`/`mutate` take closures and pass a short-lived borrow in; the
//! borrow cannot escape the closure. This shape is also the seam where a
//! per-field read-write lock could be inserted later without changing any
//! call site. Single-writer discipline applies today: a closure must not
//! re-enter the same entry (the interior `RefCell` enforces this at runtime).

use crate::error::{Error, Result};
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The owned value plus its sharing count (the `Rc` strong count)
pub struct Field {
    value: RefCell<Box<dyn Value>>,
}

impl Field {
    fn new(value: Box<dyn Value>) -> Rc<Self> {
        Rc::new(Field {
            value: RefCell::new(value),
        })
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({:?})", self.value.borrow())
    }
}

/// Reassignable indirection over a shared [`Field`]
///
/// Multiple entries may point at the same field after a fork; the field
/// reference is the only thing a write ever replaces.
pub struct Entry {
    field: RefCell<Rc<Field>>,
}

impl Entry {
    /// Create an entry holding a fresh field with use-count 1
    pub fn new<T: fmt::Debug + Clone + 'static>(value: T) -> Self {
        Entry {
            field: RefCell::new(Field::new(Box::new(value))),
        }
    }

    /// Alias the same field from a new entry, bumping its use-count
    pub fn fork(&self) -> Entry {
        Entry {
            field: RefCell::new(self.field.borrow().clone()),
        }
    }

    /// Number of entries currently sharing the underlying field
    pub fn use_count(&self) -> usize {
        Rc::strong_count(&self.field.borrow())
    }

    /// Whether the entry currently holds a value of type `T`
    pub fn holds<T: 'static>(&self) -> bool {
        self.field.borrow().value.borrow().as_any().is::<T>()
    }

    /// Type name of the held value, for error messages
    pub fn type_label(&self) -> &'static str {
        self.field.borrow().value.borrow().type_label()
    }

    /// Call `f` with a borrow of the current value
    ///
    /// The closure must not write through this entry (runtime-checked by the
    /// interior cell) and cannot retain the reference past the call.
    pub fn read<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let field = self.field.borrow();
        let value = field.value.borrow();
        match value.as_any().downcast_ref::<T>() {
            Some(v) => Ok(f(v)),
            None => Err(Error::type_mismatch(
                value.type_label(),
                std::any::type_name::<T>(),
            )),
        }
    }

    /// Call `f!` with a mutable borrow of the value, cloning first if shared
    ///
    /// Uniquely held: mutates in place. Shared: clones the value, runs `f`
    /// on the clone, then repoints this entry at a fresh field holding it —
    /// every other entry aliasing the old field keeps the pre-mutation
    /// value. The clone-then-install order also means a failed downcast or
    /// a panicking `f` leaves this entry untouched.
    pub fn mutate<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let unique = Rc::strong_count(&self.field.borrow()) == 1;

        if unique {
            let field = self.field.borrow();
            let mut value = field.value.borrow_mut();
            let holds = value.type_label();
            return match value.as_any_mut().downcast_mut::<T>() {
                Some(v) => Ok(f(v)),
                None => Err(Error::type_mismatch(holds, std::any::type_name::<T>())),
            };
        }

        let mut cloned = {
            let field = self.field.borrow();
            let value = field.value.borrow();
            if !value.as_any().is::<T>() {
                return Err(Error::type_mismatch(
                    value.type_label(),
                    std::any::type_name::<T>(),
                ));
            }
            value.clone_box()
        };
        let holds = cloned.type_label();
        let out = {
            // checked above, so this downcast cannot fail
            let v = cloned
                .as_any_mut()
                .downcast_mut::<T>()
                .ok_or_else(|| Error::type_mismatch(holds, std::any::type_name::<T>()))?;
            f(v)
        };
        // Installing the fresh field drops this entry's reference to the old
        // one, decrementing its use-count; siblings are unaffected.
        *self.field.borrow_mut() = Field::new(cloned);
        Ok(out)
    }

    /// Replace the whole value, preserving its type
    ///
    /// Same branching as [`mutate`](Entry::mutate): in place when uniquely
    /// held, fresh field when shared. A value of a different type than the
    /// one currently held is rejected.
    pub fn reassign<T: fmt::Debug + Clone + 'static>(&self, value: T) -> Result<()> {
        {
            let field = self.field.borrow();
            let held = field.value.borrow();
            if !held.as_any().is::<T>() {
                return Err(Error::type_mismatch(
                    held.type_label(),
                    std::any::type_name::<T>(),
                ));
            }
        }

        let unique = Rc::strong_count(&self.field.borrow()) == 1;
        if unique {
            let field = self.field.borrow();
            *field.value.borrow_mut() = Box::new(value);
        } else {
            *self.field.borrow_mut() = Field::new(Box::new(value));
        }
        Ok(())
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("use_count", &self.use_count())
            .field("field", &self.field.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_has_use_count_one() {
        let e = Entry::new(vec![1.0f64, 2.0]);
        assert_eq!(e.use_count(), 1);
        assert!(e.holds::<Vec<f64>>());
        assert!(!e.holds::<Vec<f32>>());
    }

    #[test]
    fn test_fork_shares_field() {
        let a = Entry::new(10i64);
        let b = a.fork();
        assert_eq!(a.use_count(), 2);
        assert_eq!(b.use_count(), 2);
        assert_eq!(b.read(|v: &i64| *v).unwrap(), 10);
    }

    #[test]
    fn test_mutate_unique_in_place() {
        let e = Entry::new(vec![1, 2, 3]);
        e.mutate(|v: &mut Vec<i32>| v.push(4)).unwrap();
        assert_eq!(e.use_count(), 1);
        assert_eq!(e.read(|v: &Vec<i32>| v.clone()).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_mutate_shared_clones_and_detaches() {
        let a = Entry::new(vec![1, 2, 3]);
        let b = a.fork();

        b.mutate(|v: &mut Vec<i32>| v[0] = 99).unwrap();

        // b got a private copy; a still sees the pre-mutation value
        assert_eq!(b.read(|v: &Vec<i32>| v[0]).unwrap(), 99);
        assert_eq!(a.read(|v: &Vec<i32>| v[0]).unwrap(), 1);
        assert_eq!(a.use_count(), 1);
        assert_eq!(b.use_count(), 1);
    }

    #[test]
    fn test_mutate_three_way_sharing() {
        let a = Entry::new(0u32);
        let b = a.fork();
        let c = a.fork();
        assert_eq!(a.use_count(), 3);

        b.mutate(|v: &mut u32| *v = 7).unwrap();

        // a and c still share the original field
        assert_eq!(a.use_count(), 2);
        assert_eq!(c.read(|v: &u32| *v).unwrap(), 0);
        assert_eq!(b.read(|v: &u32| *v).unwrap(), 7);
    }

    #[test]
    fn test_reassign_type_checked() {
        let e = Entry::new(vec![1.0f64]);
        let err = e.reassign(vec![1i32]).unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
        // the failed call changed nothing
        assert_eq!(e.read(|v: &Vec<f64>| v.clone()).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_reassign_shared_detaches() {
        let a = Entry::new("left".to_string());
        let b = a.fork();

        b.reassign("right".to_string()).unwrap();

        assert_eq!(a.read(|v: &String| v.clone()).unwrap(), "left");
        assert_eq!(b.read(|v: &String| v.clone()).unwrap(), "right");
        assert_eq!(a.use_count(), 1);
    }

    #[test]
    fn test_read_wrong_type() {
        let e = Entry::new(1u8);
        let err = e.read(|_: &u16| ()).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { holds: "u8", asked: "u16" }
        ));
    }

    #[test]
    fn test_mutate_wrong_type_leaves_sharing_intact() {
        let a = Entry::new(1u8);
        let b = a.fork();
        assert!(b.mutate(|_: &mut u16| ()).is_err());
        // no clone was installed on the failed path
        assert_eq!(a.use_count(), 2);
    }
}
