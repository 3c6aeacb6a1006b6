use std::collections::BTreeMap;

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Index, Member, Token, Type};

use super::{FieldAttributes, TypeAttributes};

// -----------------------------------------------------------------------------
// BeanField

/// A field which becomes a property.
pub(crate) struct BeanField<'a> {
    /// The property name.
    pub name: String,
    pub name_span: Span,
    pub member: Member,
    pub ty: &'a Type,
}

// -----------------------------------------------------------------------------
// BeanStruct

/// The parsed input of `#[derive(Bean)]`.
pub(crate) struct BeanStruct<'a> {
    stash_bean_path: syn::Path,
    ident: &'a Ident,
    generics: &'a Generics,
    attrs: TypeAttributes,
    fields: Vec<BeanField<'a>>,
}

impl<'a> BeanStruct<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        let data = match &input.data {
            Data::Struct(data) => data,
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span,
                    "`Bean` can only be derived for structs",
                ));
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "`Bean` can only be derived for structs",
                ));
            }
        };

        if let Some(lit) = &attrs.type_path
            && has_non_lifetime_params(&input.generics)
        {
            return Err(syn::Error::new(
                lit.span(),
                "generic beans cannot declare a type path, their instances would share it",
            ));
        }

        let fields = Self::collect_fields(&data.fields)?;

        Ok(Self {
            stash_bean_path: crate::path::stash_bean(),
            ident: &input.ident,
            generics: &input.generics,
            attrs,
            fields,
        })
    }

    fn collect_fields(fields: &'a Fields) -> syn::Result<Vec<BeanField<'a>>> {
        let mut result = Vec::with_capacity(fields.len());
        // Name -> span of its first declaration.
        let mut seen: BTreeMap<String, Span> = BTreeMap::new();

        for (index, field) in fields.iter().enumerate() {
            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            if attrs.skip.is_some() {
                continue;
            }

            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(Index::from(index)),
            };

            let (name, name_span) = match (&attrs.rename, &field.ident) {
                (Some(lit), _) => (lit.value(), lit.span()),
                (None, Some(ident)) => (ident.unraw().to_string(), ident.span()),
                (None, None) => (index.to_string(), field.ty.span()),
            };

            if name.is_empty() {
                return Err(syn::Error::new(name_span, "property names must not be empty"));
            }

            if let Some(first) = seen.get(&name) {
                let mut error =
                    syn::Error::new(name_span, format!("duplicate property name `{name}`"));
                error.combine(syn::Error::new(*first, "first declared here"));
                return Err(error);
            }
            seen.insert(name.clone(), name_span);

            result.push(BeanField {
                name,
                name_span,
                member,
                ty: &field.ty,
            });
        }

        Ok(result)
    }

    #[inline]
    pub fn stash_bean_path(&self) -> &syn::Path {
        &self.stash_bean_path
    }

    #[inline]
    pub fn ident(&self) -> &'a Ident {
        self.ident
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn fields(&self) -> &[BeanField<'a>] {
        &self.fields
    }

    /// Whether the implementations have type or const parameters.
    #[inline]
    pub fn impl_with_generic(&self) -> bool {
        has_non_lifetime_params(self.generics)
    }

    /// The expression of the type path.
    ///
    /// Generic types use their full type name, since the declared path
    /// cannot tell instances apart.
    pub fn type_path_expr(&self) -> TokenStream {
        if let Some(lit) = &self.attrs.type_path {
            return lit.to_token_stream();
        }
        if self.impl_with_generic() {
            return quote! { ::core::any::type_name::<Self>() };
        }
        let ident = self.ident.unraw().to_string();
        quote! { ::core::concat!(::core::module_path!(), "::", #ident) }
    }

    /// Returns `(impl_generics, ty_generics, where_clause)`.
    ///
    /// With `add_field_bounds`, fields whose type mentions a type parameter
    /// are required to be values.
    pub fn split_generics(&self, add_field_bounds: bool) -> (TokenStream, TokenStream, TokenStream) {
        let value_ = crate::path::value_(&self.stash_bean_path);
        split_generics(
            self.generics,
            &value_,
            add_field_bounds.then(|| self.fields.iter().map(|field| field.ty)),
        )
    }
}

fn has_non_lifetime_params(generics: &Generics) -> bool {
    generics
        .params
        .iter()
        .any(|param| !matches!(param, syn::GenericParam::Lifetime(_)))
}

/// Adds the bounds every `Value` needs to `generics`.
pub(crate) fn split_generics<'t>(
    generics: &Generics,
    value_: &TokenStream,
    field_types: Option<impl Iterator<Item = &'t Type>>,
) -> (TokenStream, TokenStream, TokenStream) {
    use crate::path::fp::{AnyFP, SendFP, SyncFP};

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut predicates: Punctuated<TokenStream, Token![,]> = Punctuated::new();

    if generics.type_params().next().is_some() {
        predicates.push(quote! { Self: #AnyFP + #SendFP + #SyncFP });
    } else if generics.lifetimes().next().is_some() {
        predicates.push(quote! { Self: 'static });
    }

    // Maintain existing where clause bounds, if any.
    if let Some(where_clause) = where_clause {
        predicates.extend(where_clause.predicates.iter().map(ToTokens::to_token_stream));
    }

    let type_params: Vec<&Ident> = generics.type_params().map(|param| &param.ident).collect();
    if let Some(field_types) = field_types
        && !type_params.is_empty()
    {
        for ty in field_types {
            if mentions_any(&type_params, ty.to_token_stream()) {
                predicates.push(quote! { #ty: #value_ });
            }
        }
    }

    let where_clause = if predicates.is_empty() {
        TokenStream::new()
    } else {
        quote! { where #predicates }
    };

    (
        impl_generics.to_token_stream(),
        ty_generics.to_token_stream(),
        where_clause,
    )
}

fn mentions_any(idents: &[&Ident], tokens: TokenStream) -> bool {
    tokens.into_iter().any(|tree| match tree {
        proc_macro2::TokenTree::Ident(ident) => idents.iter().any(|i| **i == ident),
        proc_macro2::TokenTree::Group(group) => mentions_any(idents, group.stream()),
        _ => false,
    })
}
