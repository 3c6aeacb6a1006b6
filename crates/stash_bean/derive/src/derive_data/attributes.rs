use proc_macro2::Span;
use syn::{Attribute, Ident, LitStr, Token, parse::ParseStream};

use crate::BEAN_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Parser

/// Parses every `#[bean(...)]` attribute in `attrs` with `parse_one`.
///
/// Items are comma separated and may be spread over several attributes.
fn parse_bean_attrs(
    attrs: &[Attribute],
    mut parse_one: impl FnMut(&Ident, ParseStream) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident(BEAN_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_args_with(|input: ParseStream| {
            while !input.is_empty() {
                let ident: Ident = input.parse()?;
                parse_one(&ident, input)?;
                if input.is_empty() {
                    break;
                }
                input.parse::<Token![,]>()?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn parse_string(input: ParseStream) -> syn::Result<LitStr> {
    input.parse::<Token![=]>()?;
    input.parse()
}

fn set_once<T>(slot: &mut Option<T>, ident: &Ident, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(
            ident.span(),
            format!("`{ident}` is specified more than once"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Type level attributes.
///
/// - `type_path = "..."`: the path written in front of nested instances.
/// - `conventions`: the type implements `ConventionAware`.
/// - `auto_register`: submit the type for automatic registration.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    pub type_path: Option<LitStr>,
    pub conventions: Option<Span>,
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        parse_bean_attrs(attrs, |ident, input| {
            if ident == "type_path" {
                let lit = parse_string(input)?;
                if lit.value().is_empty() {
                    return Err(syn::Error::new(lit.span(), "type path must not be empty"));
                }
                set_once(&mut this.type_path, ident, lit)
            } else if ident == "conventions" {
                set_once(&mut this.conventions, ident, ident.span())
            } else if ident == "auto_register" {
                set_once(&mut this.auto_register, ident, ident.span())
            } else {
                Err(syn::Error::new(
                    ident.span(),
                    format!("unknown bean attribute `{ident}`, expected `type_path`, `conventions` or `auto_register`"),
                ))
            }
        })?;

        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field level attributes.
///
/// - `skip`: the field is not a property.
/// - `rename = "..."`: the property name, instead of the field name.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    pub skip: Option<Span>,
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        parse_bean_attrs(attrs, |ident, input| {
            if ident == "skip" {
                set_once(&mut this.skip, ident, ident.span())
            } else if ident == "rename" {
                set_once(&mut this.rename, ident, parse_string(input)?)
            } else {
                Err(syn::Error::new(
                    ident.span(),
                    format!("unknown field attribute `{ident}`, expected `skip` or `rename`"),
                ))
            }
        })?;

        if let (Some(span), Some(_)) = (this.skip, &this.rename) {
            return Err(syn::Error::new(span, "a skipped field cannot be renamed"));
        }

        Ok(this)
    }
}
