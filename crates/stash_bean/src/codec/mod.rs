//! Codecs: how resolved values of a given type are written.
//!
//! A [`Codec<T>`] writes the payload of values of type `T` through the
//! [`WriteContext`]. Codecs are registered in a [`CodecRegistry`] under the
//! [`TypeId`](core::any::TypeId) of `T`, each one receiving a [tag](tag) the
//! writer puts in front of the payload so that a reader knows which codec
//! to run.
//!
//! Closures are codecs:
//!
//! ```
//! use stash_bean::Value;
//! use stash_bean::codec::{CodecError, CodecRegistry};
//! use stash_bean::write::WriteContext;
//!
//! struct Millis(u64);
//!
//! impl Value for Millis {}
//!
//! let mut codecs = CodecRegistry::new();
//! codecs.register_fn(|ctx: &mut WriteContext<'_>, value: &Millis| {
//!     ctx.encoder().write_u64(value.0)?;
//!     Ok(())
//! });
//! ```
//!
//! Types implementing [`Serialize`](serde_core::Serialize) can reuse it
//! with [`CodecRegistry::register_serde`].

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod registry;
mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use registry::{CodecEntry, CodecRegistry};
pub use serde::{EncoderSerializer, SerdeEncodeError, to_encoder};

// -----------------------------------------------------------------------------
// Tags

/// Reserved value tags.
///
/// Registered codecs receive tags starting at [`FIRST_CODEC`](tag::FIRST_CODEC),
/// in registration order.
pub mod tag {
    /// An absent value, without payload.
    pub const NULL: u32 = 0;
    /// A nested bean: its type path, then its property stream.
    pub const BEAN: u32 = 1;
    /// A sequence: its length, then each tagged element.
    pub const SEQUENCE: u32 = 2;
    /// The tag of the first registered codec.
    pub const FIRST_CODEC: u32 = 8;
}

// -----------------------------------------------------------------------------
// Codec

use std::error::Error;
use std::io;

use thiserror::Error;

use crate::write::{WriteContext, WriteError};

/// Writes the payload of values of type `T`.
///
/// A codec must write either nothing or a complete payload: the property
/// name and tag are already written when it runs, so a failing codec fails
/// the whole bean.
pub trait Codec<T: ?Sized>: Send + Sync + 'static {
    /// Writes `value`.
    fn encode(&self, ctx: &mut WriteContext<'_>, value: &T) -> Result<(), CodecError>;
}

impl<T, F> Codec<T> for F
where
    T: ?Sized,
    F: Fn(&mut WriteContext<'_>, &T) -> Result<(), CodecError> + Send + Sync + 'static,
{
    #[inline]
    fn encode(&self, ctx: &mut WriteContext<'_>, value: &T) -> Result<(), CodecError> {
        self(ctx, value)
    }
}

/// An error raised by a [`Codec`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0}")]
    Custom(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A nested write failed; it already carries its own trace and is
    /// reported as is.
    #[error(transparent)]
    Nested(Box<WriteError>),
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl CodecError {
    /// Creates an error with a custom message.
    #[inline]
    pub fn custom(msg: impl core::fmt::Display) -> Self {
        Self::Custom(msg.to_string())
    }

    /// Wraps an arbitrary error.
    #[inline]
    pub fn other(error: impl Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }
}

impl From<WriteError> for CodecError {
    #[inline]
    fn from(error: WriteError) -> Self {
        Self::Nested(Box::new(error))
    }
}
