//! Bean descriptors, their registry and convention fallbacks.
//!
//! A [`BeanDescriptor`] lists the relevant fields of a type in declaration
//! order, each with an accessor reading the field from an erased instance.
//! Descriptors are generated by [`#[derive(Bean)]`](crate::derive::Bean) or
//! built by hand with [`BeanDescriptor::builder`], and looked up by
//! [`TypeId`](core::any::TypeId) through a [`FieldResolver`], usually a
//! [`BeanRegistry`].

// -----------------------------------------------------------------------------
// Modules

mod convention;
mod descriptor;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use convention::{ConventionAware, ConventionMapping};
pub use descriptor::{BeanDescriptor, BeanDescriptorBuilder, DescriptorError, FieldDescriptor};
pub use registry::{BeanRegistry, BeanRegistryArc, FieldResolver};

// -----------------------------------------------------------------------------
// Bean

use crate::Value;

/// A type with a statically known [`BeanDescriptor`].
///
/// Usually derived, see [`#[derive(Bean)]`](crate::derive::Bean).
///
/// # Examples
///
/// ```
/// use stash_bean::Value;
/// use stash_bean::bean::{Bean, BeanDescriptor};
///
/// struct Jar {
///     name: String,
///     compressed: bool,
/// }
///
/// impl Value for Jar {}
///
/// impl Bean for Jar {
///     fn bean_descriptor() -> BeanDescriptor {
///         BeanDescriptor::builder::<Jar>()
///             .field("name", |jar| &jar.name)
///             .field("compressed", |jar| &jar.compressed)
///             .build()
///             .unwrap()
///     }
/// }
///
/// let descriptor = Jar::bean_descriptor();
/// let names: Vec<_> = descriptor.fields().iter().map(|f| f.name()).collect();
/// assert_eq!(names, ["name", "compressed"]);
/// ```
pub trait Bean: Value + Sized {
    /// The type path written in front of nested instances.
    ///
    /// Must agree with [`Value::value_type_path`].
    fn bean_type_path() -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Builds the descriptor of this type.
    fn bean_descriptor() -> BeanDescriptor;
}
