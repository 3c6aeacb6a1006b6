use proc_macro2::TokenStream;

use crate::derive_data::BeanStruct;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(bean: &BeanStruct) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = bean.attrs().auto_register else {
        return crate::utils::empty();
    };

    // Invalid for generic types.
    if bean.impl_with_generic() {
        return crate::utils::empty();
    }

    let auto_register_ = crate::path::auto_register_(bean.stash_bean_path());
    let ident = bean.ident();

    quote_spanned! { span =>
        fn __register_bean(registry: &mut #auto_register_::BeanRegistry) {
            registry.register::<#ident>();
        }

        #auto_register_::inventory::submit! {
            #auto_register_::__AutoRegisterFunc(__register_bean)
        }
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &BeanStruct) -> TokenStream {
    crate::utils::empty()
}
