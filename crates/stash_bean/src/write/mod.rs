//! Writing beans as property streams.
//!
//! A [`WriteContext`] drives one write pass over an [`Encoder`](crate::output::Encoder).
//! Beans are written by their [`BeanPropertyWriter`], built once per type
//! and shared through a [`BeanWriterCache`]. Each field becomes one
//! property, the empty name ends the bean:
//!
//! ```text
//! bean-stream := property* ""
//! property    := name tag payload
//! payload     := codec bytes                   ; tag >= FIRST_CODEC
//!              | type-path bean-stream         ; tag == BEAN
//!              | len (tag payload)*            ; tag == SEQUENCE
//!              | nothing                       ; tag == NULL
//! ```
//!
//! Every step pushes a frame on the [`PropertyTrace`], so that failures name
//! the property that caused them, e.g.
//! `field "classpath" of bean "app::Compile"`.
//!
//! Two failures are handled differently:
//!
//! - a value without codec is omitted before anything is written, with a
//!   warning, see [`MissingCodecPolicy`];
//! - a failing codec aborts the whole write, leaving the stream without its
//!   terminating empty name.

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod context;
mod error;
mod settings;
mod trace;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use cache::BeanWriterCache;
pub use context::{WriteAction, WriteContext};
pub use error::WriteError;
pub use settings::{MissingCodecPolicy, WriteSettings};
pub use trace::{PropertyKind, PropertyTrace, TraceFrame};
pub use writer::BeanPropertyWriter;

// -----------------------------------------------------------------------------
// Tests
