use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};

use crate::derive_data::BeanStruct;

/// Generate the `Bean` implementation.
///
/// Similar to following:
///
/// ```ignore
/// impl Bean for Foo {
///     fn bean_type_path() -> &'static str {
///         "app::Foo"
///     }
///
///     fn bean_descriptor() -> BeanDescriptor {
///         BeanDescriptor::from_fields::<Self>(
///             <Self as Bean>::bean_type_path(),
///             Vec::from([
///                 FieldDescriptor::new::<Self>("name", |bean| &bean.name),
///                 /* ... */
///             ]),
///         )
///         .with_conventions::<Self>() // with `#[bean(conventions)]`
///     }
/// }
/// ```
pub(crate) fn impl_trait_bean(bean: &BeanStruct) -> TokenStream {
    use crate::path::fp::VecFP;

    let stash_bean_path = bean.stash_bean_path();
    let bean_ = crate::path::bean_(stash_bean_path);
    let bean_descriptor_ = crate::path::bean_descriptor_(stash_bean_path);
    let field_descriptor_ = crate::path::field_descriptor_(stash_bean_path);

    let ident = bean.ident();
    let type_path = bean.type_path_expr();

    let fields = bean.fields().iter().map(|field| {
        let name = &field.name;
        let member = &field.member;
        quote_spanned! { field.name_span =>
            #field_descriptor_::new::<Self>(#name, |__bean| &__bean.#member)
        }
    });

    let with_conventions = match bean.attrs().conventions {
        Some(span) => quote_spanned! { span => .with_conventions::<Self>() },
        None => crate::utils::empty(),
    };

    let inline_flag = if bean.impl_with_generic() {
        crate::utils::empty()
    } else {
        quote! { #[inline] }
    };

    let (impl_generics, ty_generics, where_clause) = bean.split_generics(true);

    quote! {
        impl #impl_generics #bean_ for #ident #ty_generics #where_clause {
            #inline_flag
            fn bean_type_path() -> &'static str {
                #type_path
            }

            fn bean_descriptor() -> #bean_descriptor_ {
                #bean_descriptor_::from_fields::<Self>(
                    <Self as #bean_>::bean_type_path(),
                    #VecFP::from([ #(#fields,)* ]),
                )
                #with_conventions
            }
        }
    }
}
