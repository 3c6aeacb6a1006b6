use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::derive_data::{BeanStruct, split_generics};

/// Generate an empty `Value` implementation, for `#[derive(Value)]`.
pub(crate) fn impl_plain_value(input: &DeriveInput) -> TokenStream {
    let stash_bean_path = crate::path::stash_bean();
    let value_ = crate::path::value_(&stash_bean_path);
    let ident = &input.ident;

    let (impl_generics, ty_generics, where_clause) =
        split_generics(&input.generics, &value_, None::<core::iter::Empty<&syn::Type>>);

    quote! {
        impl #impl_generics #value_ for #ident #ty_generics #where_clause {}
    }
}

/// Generate the `Value` implementation of a bean.
///
/// The type path agrees with `Bean::bean_type_path`.
pub(crate) fn impl_bean_value(bean: &BeanStruct) -> TokenStream {
    let stash_bean_path = bean.stash_bean_path();
    let value_ = crate::path::value_(stash_bean_path);
    let bean_ = crate::path::bean_(stash_bean_path);
    let ident = bean.ident();

    let (impl_generics, ty_generics, where_clause) = bean.split_generics(false);

    quote! {
        impl #impl_generics #value_ for #ident #ty_generics #where_clause {
            #[inline]
            fn value_type_path(&self) -> &'static str {
                <Self as #bean_>::bean_type_path()
            }
        }
    }
}
