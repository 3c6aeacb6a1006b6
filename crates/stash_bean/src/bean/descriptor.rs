use core::any::TypeId;
use core::marker::PhantomData;

use thiserror::Error;

use crate::Value;
use crate::bean::ConventionAware;

type Reader = dyn for<'a> Fn(&'a dyn Value) -> Option<&'a dyn Value> + Send + Sync;

type ConventionsOf = for<'a> fn(&'a dyn Value) -> Option<&'a dyn ConventionAware>;

// Gives the closure its higher-ranked signature.
#[inline(always)]
fn constrain<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Value) -> Option<&'a dyn Value>,
{
    f
}

fn conventions_of<B: Value + ConventionAware>(bean: &dyn Value) -> Option<&dyn ConventionAware> {
    bean.downcast_ref::<B>().map(|bean| bean as &dyn ConventionAware)
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// A relevant field: its name and a way to read it.
pub struct FieldDescriptor {
    name: &'static str,
    reader: Box<Reader>,
}

impl FieldDescriptor {
    /// Creates a descriptor reading the field of `B` with `read`.
    pub fn new<B: Value>(name: &'static str, read: fn(&B) -> &dyn Value) -> Self {
        Self {
            name,
            reader: Box::new(constrain(move |bean| bean.downcast_ref::<B>().map(read))),
        }
    }

    /// Returns the field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the raw field value from `bean`.
    ///
    /// Returns `None` if `bean` is not an instance of the described type.
    #[inline]
    pub fn read<'a>(&self, bean: &'a dyn Value) -> Option<&'a dyn Value> {
        (self.reader)(bean)
    }
}

impl core::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BeanDescriptor

/// An error that occurs when building a [`BeanDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("a field of bean `{type_path}` has an empty name")]
    EmptyName { type_path: &'static str },
    #[error("bean `{type_path}` declares the field `{name}` twice")]
    DuplicateName {
        type_path: &'static str,
        name: &'static str,
    },
}

/// The relevant fields of a bean type, in declaration order.
///
/// Field names are non-empty and unique. A descriptor never changes after
/// it has been built.
pub struct BeanDescriptor {
    type_id: TypeId,
    type_path: &'static str,
    fields: Box<[FieldDescriptor]>,
    conventions: Option<ConventionsOf>,
}

impl BeanDescriptor {
    /// Starts describing the fields of `B`.
    pub fn builder<B: Value>() -> BeanDescriptorBuilder<B> {
        BeanDescriptorBuilder {
            type_path: core::any::type_name::<B>(),
            fields: Vec::new(),
            conventions: None,
            _marker: PhantomData,
        }
    }

    /// Creates a descriptor from already validated fields.
    ///
    /// Used by the derive macro, which rejects empty and duplicated names at
    /// compile time.
    #[doc(hidden)]
    pub fn from_fields<B: Value>(type_path: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        debug_assert!(validate(type_path, &fields).is_ok());
        Self {
            type_id: TypeId::of::<B>(),
            type_path,
            fields: fields.into_boxed_slice(),
            conventions: None,
        }
    }

    /// Marks the bean as supporting convention fallbacks.
    #[doc(hidden)]
    pub fn with_conventions<B: Value + ConventionAware>(mut self) -> Self {
        debug_assert_eq!(self.type_id, TypeId::of::<B>());
        self.conventions = Some(conventions_of::<B>);
        self
    }

    /// Returns the [`TypeId`] of the described type.
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type path of the described type.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Returns the fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the field named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns `true` if instances provide convention fallbacks.
    #[inline]
    pub const fn supports_conventions(&self) -> bool {
        self.conventions.is_some()
    }

    /// Returns the convention fallbacks of `bean`, if it supports them.
    pub fn conventions<'a>(&self, bean: &'a dyn Value) -> Option<&'a dyn ConventionAware> {
        self.conventions.and_then(|conventions_of| conventions_of(bean))
    }
}

impl core::fmt::Debug for BeanDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BeanDescriptor")
            .field("type_path", &self.type_path)
            .field("fields", &self.fields)
            .field("conventions", &self.supports_conventions())
            .finish()
    }
}

fn validate(type_path: &'static str, fields: &[FieldDescriptor]) -> Result<(), DescriptorError> {
    for (index, field) in fields.iter().enumerate() {
        if field.name.is_empty() {
            return Err(DescriptorError::EmptyName { type_path });
        }
        if fields[..index].iter().any(|other| other.name == field.name) {
            return Err(DescriptorError::DuplicateName {
                type_path,
                name: field.name,
            });
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// BeanDescriptorBuilder

/// Builds a [`BeanDescriptor`] for `B` by hand.
///
/// See [`Bean`](crate::bean::Bean) for an example.
pub struct BeanDescriptorBuilder<B: Value> {
    type_path: &'static str,
    fields: Vec<FieldDescriptor>,
    conventions: Option<ConventionsOf>,
    _marker: PhantomData<fn() -> B>,
}

impl<B: Value> BeanDescriptorBuilder<B> {
    /// Overrides the type path, which defaults to [`type_name`](core::any::type_name).
    pub fn type_path(mut self, type_path: &'static str) -> Self {
        self.type_path = type_path;
        self
    }

    /// Appends a field.
    pub fn field(mut self, name: &'static str, read: fn(&B) -> &dyn Value) -> Self {
        self.fields.push(FieldDescriptor::new(name, read));
        self
    }

    /// Marks the bean as supporting convention fallbacks.
    pub fn conventions(mut self) -> Self
    where
        B: ConventionAware,
    {
        self.conventions = Some(conventions_of::<B>);
        self
    }

    /// Validates the field names and builds the descriptor.
    pub fn build(self) -> Result<BeanDescriptor, DescriptorError> {
        validate(self.type_path, &self.fields)?;
        Ok(BeanDescriptor {
            type_id: TypeId::of::<B>(),
            type_path: self.type_path,
            fields: self.fields.into_boxed_slice(),
            conventions: self.conventions,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{BeanDescriptor, DescriptorError};
    use crate::Value;
    use crate::bean::ConventionAware;

    struct Archive {
        base_name: String,
        version: u32,
    }

    impl Value for Archive {}

    impl ConventionAware for Archive {
        fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>> {
            (property == "version").then(|| Arc::new(1_u32) as Arc<dyn Value>)
        }
    }

    fn archive() -> Archive {
        Archive {
            base_name: "app".to_owned(),
            version: 3,
        }
    }

    #[test]
    fn fields_read_in_declaration_order() {
        let descriptor = BeanDescriptor::builder::<Archive>()
            .type_path("demo::Archive")
            .field("baseName", |a| &a.base_name)
            .field("version", |a| &a.version)
            .build()
            .unwrap();
        let bean = archive();

        assert_eq!(descriptor.type_path(), "demo::Archive");
        let values: Vec<_> = descriptor
            .fields()
            .iter()
            .map(|field| (field.name(), field.read(&bean).unwrap().value_type_path()))
            .collect();
        assert_eq!(values, [("baseName", "alloc::string::String"), ("version", "u32")]);
        assert!(descriptor.field("version").is_some());
        assert!(descriptor.field("missing").is_none());
    }

    #[test]
    fn wrong_instance_is_not_read() {
        let descriptor = BeanDescriptor::builder::<Archive>()
            .field("version", |a| &a.version)
            .build()
            .unwrap();

        assert!(descriptor.fields()[0].read(&5_u32).is_none());
        assert!(descriptor.conventions(&archive()).is_none());
    }

    #[test]
    fn conventions_are_reachable() {
        let descriptor = BeanDescriptor::builder::<Archive>()
            .field("version", |a| &a.version)
            .conventions()
            .build()
            .unwrap();
        let bean = archive();

        assert!(descriptor.supports_conventions());
        let conventions = descriptor.conventions(&bean).unwrap();
        assert!(conventions.convention_value("version").is_some());
        assert!(conventions.convention_value("baseName").is_none());
        assert!(descriptor.conventions(&7_i8).is_none());
    }

    #[test]
    fn invalid_names_are_rejected() {
        let empty = BeanDescriptor::builder::<Archive>()
            .type_path("Archive")
            .field("", |a| &a.version)
            .build();
        assert_eq!(
            empty.unwrap_err(),
            DescriptorError::EmptyName {
                type_path: "Archive"
            }
        );

        let duplicate = BeanDescriptor::builder::<Archive>()
            .type_path("Archive")
            .field("version", |a| &a.version)
            .field("version", |a| &a.base_name)
            .build();
        assert_eq!(
            duplicate.unwrap_err().to_string(),
            "bean `Archive` declares the field `version` twice"
        );
    }
}
