use std::any::{Any, TypeId, type_name};
use std::rc::Rc;

/// A type-erased, shared container for a single stored value.
pub(crate) type Dynamic = Rc<dyn Any>;

/// Type-erased storage for the result of a task.
///
/// An `OpaqueValue` remembers the concrete type it was constructed from and
/// yields the value back only on an exact type match. Cloning shares
/// ownership of the stored value; stored results are never mutated, so the
/// shared copy behaves like a deep one.
///
/// The default state is empty: no payload, the same state [`take`] leaves
/// behind. A task returning `()` also produces the empty state as its
/// canonical result.
///
/// [`take`]: OpaqueValue::take
#[derive(Clone)]
pub struct OpaqueValue {
    inner: Option<Dynamic>,
    name: &'static str,
}

impl OpaqueValue {
    /// Creates an empty container holding no payload.
    pub fn empty() -> Self {
        Self {
            inner: None,
            name: type_name::<()>(),
        }
    }

    /// Wraps a value, capturing its type identity.
    ///
    /// The unit value is canonicalized to the empty state, so every task
    /// produces an `OpaqueValue` regardless of its declared return type.
    pub fn new<T: 'static>(value: T) -> Self {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            return Self::empty();
        }

        Self {
            inner: Some(Rc::new(value)),
            name: type_name::<T>(),
        }
    }

    /// Whether the container holds no payload.
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// The `std::any::type_name` of the stored value, `"()"` when empty.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Extracts a copy of the stored value.
    ///
    /// Returns `None` unless `T` is exactly the type the container was
    /// constructed from. Extracting `()` from the empty state succeeds.
    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        match &self.inner {
            Some(value) => value.downcast_ref::<T>().cloned(),
            None => {
                let unit: &dyn Any = &();
                unit.downcast_ref::<T>().cloned()
            }
        }
    }

    /// Moves the payload out, leaving the source empty.
    pub fn take(&mut self) -> OpaqueValue {
        std::mem::take(self)
    }
}

impl Default for OpaqueValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpaqueValue({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_extract() {
        let value = OpaqueValue::new(239_i32);
        assert_eq!(value.downcast::<i32>(), Some(239));
        assert!(!value.is_empty());
    }

    #[test]
    fn test_type_mismatch_yields_none() {
        let value = OpaqueValue::new(1.5_f64);
        assert_eq!(value.downcast::<i32>(), None);
        assert_eq!(value.downcast::<f32>(), None);
    }

    #[test]
    fn test_unit_is_empty() {
        let value = OpaqueValue::new(());
        assert!(value.is_empty());
        assert_eq!(value.downcast::<()>(), Some(()));
        assert_eq!(value.downcast::<i32>(), None);
    }

    #[test]
    fn test_default_is_empty() {
        let value = OpaqueValue::default();
        assert!(value.is_empty());
        assert_eq!(value.type_name(), type_name::<()>());
    }

    #[test]
    fn test_clone_shares_value() {
        let value = OpaqueValue::new(String::from("matsu"));
        let copy = value.clone();
        assert_eq!(copy.downcast::<String>(), Some(String::from("matsu")));
        assert_eq!(value.downcast::<String>(), Some(String::from("matsu")));
    }

    #[test]
    fn test_take_leaves_empty() {
        let mut value = OpaqueValue::new(42_u8);
        let moved = value.take();
        assert!(value.is_empty());
        assert_eq!(moved.downcast::<u8>(), Some(42));
    }
}
