//! Bean-property state capture.
//!
//! A *bean* is any value whose relevant fields are described by a
//! [`BeanDescriptor`](bean::BeanDescriptor), usually generated with
//! [`#[derive(Bean)]`](derive::Bean). Writing a bean produces a
//! self-terminating, name-tagged property stream:
//!
//! ```text
//! bean-stream   := property* sentinel
//! property      := name tag payload     ; name is non-empty
//! sentinel      := ""                   ; the empty name ends the bean
//! ```
//!
//! Each field value is first unwrapped through its [deferred](deferred)
//! containers (providers, settable properties, lazy holders...), then falls
//! back to the bean's [conventions](bean::ConventionAware) if absent, and is
//! finally dispatched to a [codec](codec). Values without a codec are skipped
//! with a warning, a failing codec aborts the bean with an error naming the
//! property path.
//!
//! # Example
//!
//! ```
//! use stash_bean::bean::BeanRegistry;
//! use stash_bean::codec::CodecRegistry;
//! use stash_bean::deferred::Provider;
//! use stash_bean::derive::Bean;
//! use stash_bean::output::BinaryEncoder;
//! use stash_bean::write::{BeanWriterCache, WriteContext};
//!
//! #[derive(Bean)]
//! struct Compile {
//!     name: String,
//!     jobs: Provider,
//!     #[bean(skip)]
//!     _scratch: Vec<u8>,
//! }
//!
//! let mut registry = BeanRegistry::new();
//! registry.register::<Compile>();
//!
//! let codecs = CodecRegistry::new();
//! let writers = BeanWriterCache::new(registry);
//!
//! let task = Compile {
//!     name: "compileJava".to_owned(),
//!     jobs: Provider::of(4_u32),
//!     _scratch: Vec::new(),
//! };
//!
//! let mut encoder = BinaryEncoder::new(Vec::new());
//! WriteContext::new(&mut encoder, &codecs, &writers)
//!     .write_bean(&task)
//!     .unwrap();
//!
//! assert!(!encoder.into_inner().is_empty());
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `stash_bean`, which only resolves inside
// the crate itself through this alias.
extern crate self as stash_bean;

// -----------------------------------------------------------------------------
// Modules

mod value;

pub mod bean;
pub mod codec;
pub mod deferred;
pub mod output;
pub mod write;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use stash_bean_derive as derive;
pub use value::{Sequence, Value};
