//! The element lifecycle callback record shared by the sequence container.
//!
//! A container may be created with no callbacks (raw copies in and out), with the
//! runtime's generic "type" callbacks (clone/compare/format via the element's own
//! `Clone`/`PartialEq`/`Debug` impls), or with a caller-supplied custom record. Two
//! containers are only considered to have "the same" callbacks if they were built
//! from the same kind of record, and — for custom records — the very same callback
//! object; this identity check runs before any element is ever compared.

use std::fmt;
use std::sync::Arc;

/// Per-element lifecycle operations a sequence container invokes around storage.
///
/// All methods have a default no-op/identity implementation so a custom record only
/// needs to override the ones it cares about — mirroring the source contract, where
/// any callback field may be absent.
pub trait ElementOps<T>: Send + Sync {
    /// Called when a value is copied into the container's storage. May return a
    /// different value than it was given (e.g. a bumped-refcount handle).
    fn retain(&self, value: T) -> T {
        value
    }

    /// Called exactly once when a stored value is evicted from storage, before the
    /// slot itself is freed.
    fn release(&self, _value: &T) {}

    /// Element equality used by `contains`/`index_of`/`count_of`/container `equal`.
    fn equal(&self, a: &T, b: &T) -> bool;

    /// Diagnostic rendering of a single element.
    fn describe(&self, value: &T) -> String;
}

/// Which of the three canonical callback records a container was built with.
///
/// Two `Custom` records are equal only if they wrap the same callback object
/// (`Arc::ptr_eq`); `Null` and `Type` are each a single canonical record, so any two
/// `Null`s (or any two `Type`s) compare equal regardless of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Null,
    Type,
    Custom,
}

/// The callback record a container was constructed with, fixed for the container's
/// lifetime.
pub struct Callbacks<T> {
    kind: CallbackKind,
    ops: Option<Arc<dyn ElementOps<T>>>,
}

impl<T> Clone for Callbacks<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            ops: self.ops.clone(),
        }
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").field("kind", &self.kind).finish()
    }
}

impl<T> Callbacks<T> {
    /// The null-callbacks record: storage performs raw copies, no retain/release,
    /// and (when used for comparisons) falls back to the element's own equality.
    pub fn null() -> Self {
        Self {
            kind: CallbackKind::Null,
            ops: None,
        }
    }

    /// A custom callback record. `ops` establishes this record's identity for the
    /// lifetime of every container built from it.
    pub fn custom(ops: Arc<dyn ElementOps<T>>) -> Self {
        Self {
            kind: CallbackKind::Custom,
            ops: Some(ops),
        }
    }

    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    pub fn retain(&self, value: T) -> T {
        match &self.ops {
            Some(ops) => ops.retain(value),
            None => value,
        }
    }

    pub fn release(&self, value: &T) {
        if let Some(ops) = &self.ops {
            ops.release(value);
        }
    }

    pub fn equal(&self, a: &T, b: &T) -> bool
    where
        T: PartialEq,
    {
        match &self.ops {
            Some(ops) => ops.equal(a, b),
            None => a == b,
        }
    }

    pub fn describe(&self, value: &T) -> String
    where
        T: fmt::Debug,
    {
        match &self.ops {
            Some(ops) => ops.describe(value),
            None => format!("{:?}", value),
        }
    }
}

impl<T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static> Callbacks<T> {
    /// The runtime's generic "type" callbacks: clone on retain, `PartialEq` on
    /// equal, `Debug` on describe, no-op release.
    pub fn type_callbacks() -> Self {
        Self {
            kind: CallbackKind::Type,
            ops: Some(Arc::new(TypeOps::<T>::default())),
        }
    }
}

/// Identity comparison of two callback records, per the structural-identity rule:
/// same kind, and for `Custom`, the same underlying callback object.
impl<T> PartialEq for Callbacks<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (CallbackKind::Null, CallbackKind::Null) => true,
            (CallbackKind::Type, CallbackKind::Type) => true,
            (CallbackKind::Custom, CallbackKind::Custom) => {
                match (&self.ops, &other.ops) {
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

struct TypeOps<T>(std::marker::PhantomData<fn() -> T>);

impl<T> Default for TypeOps<T> {
    fn default() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<T: Clone + PartialEq + fmt::Debug + Send + Sync> ElementOps<T> for TypeOps<T> {
    fn retain(&self, value: T) -> T {
        value
    }

    fn equal(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn describe(&self, value: &T) -> String {
        format!("{:?}", value)
    }
}

/// Convenience constructor for the type-callbacks record, mirroring the source's
/// naming of its generic CFType callback table.
pub fn type_ops<T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static>() -> Callbacks<T> {
    Callbacks::type_callbacks()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_records_are_equal() {
        assert_eq!(Callbacks::<i32>::null(), Callbacks::<i32>::null());
    }

    #[test]
    fn type_records_are_equal_regardless_of_instance() {
        assert_eq!(type_ops::<i32>(), type_ops::<i32>());
    }

    #[test]
    fn null_and_type_are_not_equal() {
        assert_ne!(Callbacks::<i32>::null(), type_ops::<i32>());
    }

    struct Noisy;
    impl ElementOps<i32> for Noisy {
        fn equal(&self, a: &i32, b: &i32) -> bool {
            a == b
        }
        fn describe(&self, value: &i32) -> String {
            format!("noisy({value})")
        }
    }

    #[test]
    fn distinct_custom_records_are_not_equal() {
        let a = Callbacks::custom(Arc::new(Noisy) as Arc<dyn ElementOps<i32>>);
        let b = Callbacks::custom(Arc::new(Noisy) as Arc<dyn ElementOps<i32>>);
        assert_ne!(a, b, "custom records must compare by identity, not behavior");
    }

    #[test]
    fn same_custom_record_shared_is_equal() {
        let ops: Arc<dyn ElementOps<i32>> = Arc::new(Noisy);
        let a = Callbacks::custom(ops.clone());
        let b = Callbacks::custom(ops);
        assert_eq!(a, b);
    }

    #[test]
    fn null_falls_back_to_partial_eq() {
        let cb = Callbacks::<i32>::null();
        assert!(cb.equal(&3, &3));
        assert!(!cb.equal(&3, &4));
    }
}
