//! Fully qualified paths of `core` and `std` items.
//!
//! Generated code must not depend on what the caller has in scope.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

macro_rules! full_path {
    ($($name:ident => $($segment:ident)::+,)*) => {
        $(
            pub(crate) struct $name;

            impl ToTokens for $name {
                #[inline]
                fn to_tokens(&self, tokens: &mut TokenStream) {
                    quote!($(::$segment)+).to_tokens(tokens);
                }
            }
        )*
    };
}

full_path! {
    AnyFP => core::any::Any,
    SendFP => core::marker::Send,
    SyncFP => core::marker::Sync,
    VecFP => std::vec::Vec,
}
