// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod trait_bean;
mod trait_value;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use auto_register::get_auto_register_impl;
pub(crate) use trait_bean::impl_trait_bean;
pub(crate) use trait_value::{impl_bean_value, impl_plain_value};
