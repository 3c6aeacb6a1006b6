use std::sync::{Arc, PoisonError, RwLock};

use crate::Value;
use crate::deferred::DeferredRef;

/// A settable single-value slot.
///
/// Unwraps to its current value or to absence.
///
/// # Examples
///
/// ```
/// use stash_bean::deferred::Property;
///
/// let release = Property::new();
/// assert!(!release.is_present());
///
/// release.set(17_u32);
/// let value = release.get().unwrap();
/// assert_eq!(value.downcast_ref::<u32>(), Some(&17));
/// ```
#[derive(Default)]
pub struct Property {
    slot: RwLock<Option<Arc<dyn Value>>>,
}

impl Property {
    /// Creates an empty property.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Creates a property holding `value`.
    pub fn of(value: impl Value) -> Self {
        Self {
            slot: RwLock::new(Some(Arc::new(value))),
        }
    }

    /// Replaces the current value.
    pub fn set(&self, value: impl Value) {
        self.set_shared(Arc::new(value));
    }

    /// Replaces the current value with an already shared one.
    pub fn set_shared(&self, value: Arc<dyn Value>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Removes the current value.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns the current value.
    pub fn get(&self) -> Option<Arc<dyn Value>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` if a value is set.
    pub fn is_present(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Value for Property {
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Property(self))
    }
}

impl core::fmt::Debug for Property {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Property").field(&self.get()).finish()
    }
}
