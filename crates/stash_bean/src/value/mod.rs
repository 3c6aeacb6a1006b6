//! The type-erased view over every capturable value.

// -----------------------------------------------------------------------------
// Modules

mod impls;

// -----------------------------------------------------------------------------
// Value

use core::any::{Any, TypeId};

use crate::deferred::DeferredRef;

/// An iterator over the elements of a sequence-like [`Value`].
pub type Sequence<'a> = Box<dyn ExactSizeIterator<Item = &'a dyn Value> + 'a>;

/// A value that can flow through a bean write.
///
/// Plain values only need an empty implementation, which
/// [`#[derive(Value)]`](crate::derive::Value) or [`impl_value!`](crate::impl_value)
/// generate. The two provided methods are overridden by containers:
///
/// - [`as_deferred`](Value::as_deferred) for values that only hold or
///   produce another value (`Option<T>`, providers, lazy holders...);
/// - [`as_sequence`](Value::as_sequence) for collections written element by
///   element when no dedicated codec is registered.
///
/// # Examples
///
/// ```
/// use stash_bean::Value;
///
/// let value: &dyn Value = &42_i32;
///
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert_eq!(value.value_type_path(), "i32");
/// ```
pub trait Value: Any + Send + Sync + 'static {
    /// Returns the full path of the concrete type, used in diagnostics and
    /// as the type tag of nested beans.
    fn value_type_path(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Returns the deferred shape of this value, if it is a container.
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        None
    }

    /// Returns the elements of this value, if it is a sequence.
    #[inline]
    fn as_sequence(&self) -> Option<Sequence<'_>> {
        None
    }
}

impl dyn Value {
    /// Returns the [`TypeId`] of the concrete type.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        let any: &dyn Any = self;
        any.type_id()
    }

    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value_type_id() == TypeId::of::<T>()
    }

    /// Downcasts to the concrete type `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

impl core::fmt::Debug for dyn Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "dyn Value<{}>", self.value_type_path())
    }
}

// -----------------------------------------------------------------------------
// impl_value

/// Implements [`Value`] for plain types.
///
/// The implementation is empty: the values are neither deferred nor
/// sequences. Use [`#[derive(Value)]`](crate::derive::Value) for local
/// generic types.
///
/// # Examples
///
/// ```
/// use stash_bean::{Value, impl_value};
///
/// struct Millis(u64);
/// struct Nanos(u64);
///
/// impl_value!(Millis, Nanos);
///
/// let value: &dyn Value = &Millis(5);
/// assert!(value.as_deferred().is_none());
/// ```
#[macro_export]
macro_rules! impl_value {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Value for $ty {})+
    };
}
