//! Deferred values and their unwrapping.
//!
//! A deferred value only holds, or knows how to produce, another value.
//! Bean fields are often declared through such containers so that their
//! final value can be configured late; before a field can be written its
//! *effective* value has to be reached.
//!
//! ## Shapes
//!
//! The set of shapes is closed, see [`DeferredRef`]:
//!
//! | shape      | container        | unwraps to                          |
//! |------------|------------------|-------------------------------------|
//! | `Optional` | `Option<T>`      | the content, or absence             |
//! | `File`     | [`FileProperty`] | the resolved `PathBuf`, or absence  |
//! | `Property` | [`Property`]     | the current value, or absence       |
//! | `Provider` | [`Provider`]     | the current value, or absence       |
//! | `Producer` | [`Producer`]     | the result of invoking it           |
//! | `Lazy`     | [`Lazy`]         | the memoized value                  |
//!
//! Foreign wrapper types are adapted into one of these containers at the
//! boundary, the engine never sees them.
//!
//! ## Unwrapping
//!
//! [`unwrap`] repeats single [steps](unwrap_step) until a value without a
//! deferred shape, or absence, is reached. Absence is a legitimate result.
//! Meeting the same container twice on one chain is reported as
//! [`UnwrapError::Reentrant`] instead of looping.

// -----------------------------------------------------------------------------
// Modules

mod file;
mod lazy;
mod property;
mod provider;
mod unwrap;

// -----------------------------------------------------------------------------
// Exports

pub use file::{FileKind, FileProperty};
pub use lazy::Lazy;
pub use property::Property;
pub use provider::{Producer, Provider};
pub use unwrap::{UnwrapError, unwrap, unwrap_step};

// -----------------------------------------------------------------------------
// DeferredRef

use std::sync::Arc;

use crate::Value;

/// The shape of a deferred value, as returned by [`Value::as_deferred`].
#[derive(Clone, Copy)]
pub enum DeferredRef<'a> {
    /// An optional value, also used by transparent boxes.
    Optional(Option<&'a dyn Value>),
    /// An optional file or directory location.
    File(&'a FileProperty),
    /// A settable single-value slot.
    Property(&'a Property),
    /// A provider of an optional current value.
    Provider(&'a Provider),
    /// A zero-argument producer.
    Producer(&'a Producer),
    /// A memoizing lazy holder.
    Lazy(&'a Lazy),
}

/// The outcome of one unwrapping step.
pub enum Step<'a> {
    /// The container holds nothing.
    Absent,
    /// The container exposes a value it owns.
    Value(&'a dyn Value),
    /// The container produced or shares a value.
    Shared(Arc<dyn Value>),
}

impl<'a> DeferredRef<'a> {
    /// A short human readable name of the shape.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Optional(_) => "optional value",
            Self::File(_) => "file property",
            Self::Property(_) => "property",
            Self::Provider(_) => "provider",
            Self::Producer(_) => "producer",
            Self::Lazy(_) => "lazy value",
        }
    }

    /// Identity of the container, used to detect re-entrant unwrapping.
    ///
    /// `Optional` only borrows its content and cannot form a cycle by itself.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Self::Optional(_) => None,
            Self::File(v) => Some(core::ptr::from_ref(*v).addr()),
            Self::Property(v) => Some(core::ptr::from_ref(*v).addr()),
            Self::Provider(v) => Some(v.identity()),
            Self::Producer(v) => Some(v.identity()),
            Self::Lazy(v) => Some(core::ptr::from_ref(*v).addr()),
        }
    }

    /// Performs exactly one unwrapping step.
    pub fn resolve(self) -> Result<Step<'a>, UnwrapError> {
        Ok(match self {
            Self::Optional(None) => Step::Absent,
            Self::Optional(Some(value)) => Step::Value(value),
            Self::File(file) => match file.get() {
                Some(path) => Step::Shared(Arc::new(path)),
                None => Step::Absent,
            },
            Self::Property(property) => Step::from(property.get()),
            Self::Provider(provider) => Step::from(provider.get()),
            Self::Producer(producer) => Step::Shared(producer.call()),
            Self::Lazy(lazy) => Step::from(lazy.force()?),
        })
    }
}

impl From<Option<Arc<dyn Value>>> for Step<'_> {
    #[inline]
    fn from(value: Option<Arc<dyn Value>>) -> Self {
        match value {
            Some(value) => Self::Shared(value),
            None => Self::Absent,
        }
    }
}

impl core::fmt::Debug for Step<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Shared(v) => f.debug_tuple("Shared").field(&&**v).finish(),
        }
    }
}
