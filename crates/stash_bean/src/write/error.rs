use std::io;

use thiserror::Error;

use crate::codec::CodecError;
use crate::deferred::UnwrapError;

/// An error that occurs when writing a bean.
///
/// Traces are rendered at the point of failure, see
/// [`PropertyTrace`](crate::write::PropertyTrace).
#[derive(Debug, Error)]
pub enum WriteError {
    /// A codec failed after the property name was written.
    #[error("could not save the value of {trace} with type `{type_path}`")]
    Codec {
        trace: String,
        type_path: &'static str,
        source: CodecError,
    },
    /// A deferred value could not be unwrapped.
    #[error("could not unwrap the value of {trace}")]
    Unwrap { trace: String, source: UnwrapError },
    /// No codec exists for a value which cannot be omitted.
    #[error("cannot serialize {trace}: there's no serializer for type `{type_path}`")]
    MissingCodec {
        trace: String,
        type_path: &'static str,
    },
    /// The value passed to `write_bean` is not a registered bean.
    #[error("type `{type_path}` is not a registered bean")]
    UnknownBean { type_path: &'static str },
    /// A field accessor received an instance of another type.
    #[error("field `{field}` of bean `{bean}` cannot be read from a value of type `{type_path}`")]
    FieldAccess {
        bean: &'static str,
        field: &'static str,
        type_path: &'static str,
    },
    /// Property names must not be empty, the empty name ends a bean.
    #[error("cannot write a property with an empty name in {trace}")]
    EmptyPropertyName { trace: String },
    /// Beans are nested too deeply, likely a cycle.
    #[error("{trace} nests more than {max_depth} beans")]
    TooDeep { trace: String, max_depth: usize },
    /// The output stream failed.
    #[error("could not write {trace}")]
    Io { trace: String, source: io::Error },
}

impl WriteError {
    /// Returns the rendered trace of the failure, if it has one.
    pub fn trace(&self) -> Option<&str> {
        match self {
            Self::Codec { trace, .. }
            | Self::Unwrap { trace, .. }
            | Self::MissingCodec { trace, .. }
            | Self::EmptyPropertyName { trace }
            | Self::TooDeep { trace, .. }
            | Self::Io { trace, .. } => Some(trace),
            Self::UnknownBean { .. } | Self::FieldAccess { .. } => None,
        }
    }
}
