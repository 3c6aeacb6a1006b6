//! See following macros:
//!
//! - [`Bean`]
//! - [`Value`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static BEAN_ATTRIBUTE_NAME: &str = "bean";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Bean Derivation
///
/// `#[derive(Bean)]` implements `Value` and `Bean` for a struct. Every field
/// becomes a property, in declaration order, named after the field. Fields
/// of tuple structs are named by their index (`"0"`, `"1"`...).
///
/// Each field type must implement `Value`.
///
/// ```rust, ignore
/// #[derive(Bean)]
/// struct Compile {
///     source: FileProperty,
///     jobs: Provider,
/// }
/// ```
///
/// ## Type Path
///
/// Nested beans are written with their type path, which defaults to
/// `module_path!()::Ident`. It can be overridden:
///
/// ```rust, ignore
/// #[derive(Bean)]
/// #[bean(type_path = "app::tasks::Compile")]
/// struct Compile { /* ... */ }
/// ```
///
/// Generic types always use their full type name and reject this attribute.
///
/// This attribute can only be applied at the type level.
///
/// ## Field Attributes
///
/// - `skip`: the field is not a property.
/// - `rename = "..."`: the property name to use instead of the field name.
///
/// ```rust, ignore
/// #[derive(Bean)]
/// struct Archive {
///     #[bean(rename = "baseName")]
///     base_name: Property,
///     #[bean(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// Property names must be non-empty and unique; violations are compile
/// errors.
///
/// ## Conventions
///
/// Beans implementing `ConventionAware` can declare it, so that absent
/// fields fall back to their convention value when written:
///
/// ```rust, ignore
/// #[derive(Bean)]
/// #[bean(conventions)]
/// struct Test {
///     #[bean(skip)]
///     mapping: ConventionMapping,
///     max_forks: Provider,
/// }
///
/// impl ConventionAware for Test {
///     fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>> {
///         self.mapping.convention_value(property)
///     }
/// }
/// ```
///
/// This attribute can only be applied at the type level.
///
/// ## Auto Registration
///
/// Automatic registration is disabled by default, even when the
/// `auto_register` feature is enabled. Enable it with the `auto_register`
/// attribute; `BeanRegistry::auto_register` then registers the type.
///
/// ```rust, ignore
/// #[derive(Bean)]
/// #[bean(auto_register)]
/// struct A { /* ... */ }
/// ```
///
/// This attribute has no effect on generic types, and is a no-op when the
/// `auto_register` feature is disabled.
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let bean = match derive_data::BeanStruct::from_input(&ast) {
        Ok(bean) => bean,
        Err(err) => return err.into_compile_error().into(),
    };

    let value_impl = impls::impl_bean_value(&bean);
    let bean_impl = impls::impl_trait_bean(&bean);
    let auto_register = impls::get_auto_register_impl(&bean);

    TokenStream::from(quote! {
        const _: () = {
            #value_impl
            #bean_impl
            #auto_register
        };
    })
}

/// # Value Derivation
///
/// `#[derive(Value)]` implements an empty `Value`: the type is neither a
/// deferred container nor a sequence, and is written by the codec
/// registered for it.
///
/// Type parameters must be `Send + Sync + 'static`.
///
/// ```rust, ignore
/// #[derive(Value)]
/// struct Checksum([u8; 32]);
/// ```
#[proc_macro_derive(Value)]
pub fn derive_value(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let value_impl = impls::impl_plain_value(&ast);

    TokenStream::from(quote! {
        const _: () = {
            #value_impl
        };
    })
}
