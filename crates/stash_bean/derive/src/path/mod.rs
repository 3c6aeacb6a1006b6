//! Paths of the items used by generated code.
//!
//! Everything is reached through `__macro_exports`, so that moving an item
//! inside `stash_bean` only needs a change there.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `stash_bean` crate.
///
/// 1. For crates that depend on `stash_bean`, `::stash_bean` is returned.
/// 2. For crates that depend on `stash_core` or `stash`, `::stash_core::bean`
///    (or `::stash::bean`) is returned.
/// 3. Otherwise `::stash_bean` is returned, which resolves inside
///    `stash_bean` itself through its `extern crate self` alias.
///
/// Reading the manifest is not free, so the path is obtained once per
/// derive and passed around.
pub(crate) fn stash_bean() -> syn::Path {
    stash_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("stash_bean"))
        .unwrap_or_else(|_| syn::parse_quote!(::stash_bean))
}

// -----------------------------------------------------------------------------
// Modules

pub(crate) mod fp;

// -----------------------------------------------------------------------------
// Internal API

#[inline(always)]
fn macro_exports_(stash_bean_path: &syn::Path) -> TokenStream {
    quote! {
        #stash_bean_path::__macro_exports
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(stash_bean_path: &syn::Path) -> TokenStream {
    let macro_exports_ = macro_exports_(stash_bean_path);
    quote! {
        #macro_exports_::auto_register
    }
}

#[inline(always)]
pub(crate) fn value_(stash_bean_path: &syn::Path) -> TokenStream {
    let macro_exports_ = macro_exports_(stash_bean_path);
    quote! {
        #macro_exports_::Value
    }
}

#[inline(always)]
pub(crate) fn bean_(stash_bean_path: &syn::Path) -> TokenStream {
    let macro_exports_ = macro_exports_(stash_bean_path);
    quote! {
        #macro_exports_::Bean
    }
}

#[inline(always)]
pub(crate) fn bean_descriptor_(stash_bean_path: &syn::Path) -> TokenStream {
    let macro_exports_ = macro_exports_(stash_bean_path);
    quote! {
        #macro_exports_::BeanDescriptor
    }
}

#[inline(always)]
pub(crate) fn field_descriptor_(stash_bean_path: &syn::Path) -> TokenStream {
    let macro_exports_ = macro_exports_(stash_bean_path);
    quote! {
        #macro_exports_::FieldDescriptor
    }
}
