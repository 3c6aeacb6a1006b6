//! Facade crate of the `stash` workspace.
//!
//! `stash` captures the observable state of beans (arbitrary, derive-described
//! objects) into a self-terminating, name-tagged property stream.
//!
//! - [`bean`]: values, deferred values, bean descriptors, codecs and the writer.
//! - [`utils`]: hashing helpers and [`TypeIdMap`](utils::TypeIdMap).
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use stash_bean as bean;
pub use stash_utils as utils;
