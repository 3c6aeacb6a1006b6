use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use crate::codec::{CodecEntry, CodecError, CodecRegistry, tag};
use crate::deferred::{self, UnwrapError};
use crate::output::Encoder;
use crate::write::{BeanPropertyWriter, BeanWriterCache, MissingCodecPolicy};
use crate::write::{PropertyKind, PropertyTrace, TraceFrame, WriteError, WriteSettings};
use crate::{Sequence, Value};

// -----------------------------------------------------------------------------
// WriteAction

/// How a resolved value is written, see [`WriteContext::write_action_for`].
pub enum WriteAction<'a, 'v> {
    /// Absence: the null tag, without payload.
    Null,
    /// A registered codec.
    Codec(&'a CodecEntry, &'v dyn Value),
    /// A nested bean: its type path, then its property stream.
    Bean(Arc<BeanPropertyWriter>, &'v dyn Value),
    /// A sequence: its length, then each element.
    Sequence(Sequence<'v>),
}

impl WriteAction<'_, '_> {
    /// Returns the tag written in front of the payload.
    pub fn tag(&self) -> u32 {
        match self {
            Self::Null => tag::NULL,
            Self::Codec(entry, _) => entry.tag(),
            Self::Bean(..) => tag::BEAN,
            Self::Sequence(_) => tag::SEQUENCE,
        }
    }
}

// -----------------------------------------------------------------------------
// WriteContext

/// The state of one write pass.
///
/// Owns the [trace](PropertyTrace) of the pass and borrows the output
/// stream exclusively. Registries and writer caches are only read and may
/// be shared by concurrent passes.
pub struct WriteContext<'a> {
    encoder: &'a mut dyn Encoder,
    codecs: &'a CodecRegistry,
    writers: &'a BeanWriterCache,
    settings: WriteSettings,
    trace: PropertyTrace,
}

impl<'a> WriteContext<'a> {
    /// Creates a context with default [settings](WriteSettings).
    pub fn new(
        encoder: &'a mut dyn Encoder,
        codecs: &'a CodecRegistry,
        writers: &'a BeanWriterCache,
    ) -> Self {
        Self {
            encoder,
            codecs,
            writers,
            settings: WriteSettings::DEFAULT,
            trace: PropertyTrace::new(),
        }
    }

    /// Replaces the settings.
    #[inline]
    pub fn with_settings(mut self, settings: WriteSettings) -> Self {
        self.settings = settings;
        self
    }

    #[inline]
    pub fn settings(&self) -> &WriteSettings {
        &self.settings
    }

    /// Returns the output stream, for codecs.
    #[inline]
    pub fn encoder(&mut self) -> &mut dyn Encoder {
        &mut *self.encoder
    }

    #[inline]
    pub fn codecs(&self) -> &'a CodecRegistry {
        self.codecs
    }

    #[inline]
    pub fn writers(&self) -> &'a BeanWriterCache {
        self.writers
    }

    /// Returns the current trace.
    #[inline]
    pub fn trace(&self) -> &PropertyTrace {
        &self.trace
    }

    // -------------------------------------------------------------------------
    // Trace

    /// Runs `body` with `frame` pushed on the trace.
    ///
    /// The frame is popped whatever `body` returns.
    pub fn with_trace<R>(&mut self, frame: TraceFrame, body: impl FnOnce(&mut Self) -> R) -> R {
        self.trace.push(frame);
        let result = body(self);
        self.trace.pop();
        result
    }

    /// Runs `body` with a property frame pushed on the trace.
    #[inline]
    pub fn with_property_trace<R>(
        &mut self,
        kind: PropertyKind,
        name: impl Into<Cow<'static, str>>,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let name = name.into();
        self.with_trace(TraceFrame::Property { kind, name }, body)
    }

    /// Runs `body` with a bean frame pushed on the trace.
    #[inline]
    pub fn with_bean_trace<R>(
        &mut self,
        type_path: &'static str,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.with_trace(TraceFrame::Bean { type_path }, body)
    }

    // -------------------------------------------------------------------------
    // Errors

    fn io_error(&self, source: io::Error) -> WriteError {
        WriteError::Io {
            trace: self.trace.to_string(),
            source,
        }
    }

    fn codec_error(&self, value: &dyn Value, source: CodecError) -> WriteError {
        match source {
            // Already carries the trace of the nested failure.
            CodecError::Nested(error) => *error,
            source => WriteError::Codec {
                trace: self.trace.to_string(),
                type_path: value.value_type_path(),
                source,
            },
        }
    }

    pub(crate) fn unwrap_error(
        &mut self,
        kind: PropertyKind,
        name: Cow<'static, str>,
        source: UnwrapError,
    ) -> WriteError {
        let trace = self.with_property_trace(kind, name, |ctx| ctx.trace.to_string());
        WriteError::Unwrap { trace, source }
    }

    fn missing_codec(&self, value: Option<&dyn Value>) -> Result<bool, WriteError> {
        let type_path = value.map_or("()", |value| value.value_type_path());
        match self.settings.missing_codec {
            MissingCodecPolicy::Warn => {
                log::warn!(
                    "cannot serialize {}: there's no serializer for type `{type_path}`",
                    self.trace,
                );
                Ok(false)
            }
            MissingCodecPolicy::Fail => Err(WriteError::MissingCodec {
                trace: self.trace.to_string(),
                type_path,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Dispatch

    /// Returns how to write a resolved value, or `None` if it has no codec.
    ///
    /// In order of priority:
    /// 1. absence is written as null;
    /// 2. a codec registered for the exact type;
    /// 3. a bean known to the writer cache;
    /// 4. a sequence, written element by element.
    pub fn write_action_for<'v>(&self, value: Option<&'v dyn Value>) -> Option<WriteAction<'a, 'v>> {
        let Some(value) = value else {
            return Some(WriteAction::Null);
        };
        let type_id = value.value_type_id();

        let codecs: &'a CodecRegistry = self.codecs;
        if let Some(entry) = codecs.get(type_id) {
            return Some(WriteAction::Codec(entry, value));
        }
        if let Some(writer) = self.writers.get(type_id) {
            return Some(WriteAction::Bean(writer, value));
        }
        value.as_sequence().map(WriteAction::Sequence)
    }

    /// Writes the tag and payload of `action`.
    pub fn write_with(&mut self, action: WriteAction<'a, '_>) -> Result<(), WriteError> {
        self.encoder
            .write_tag(action.tag())
            .map_err(|e| self.io_error(e))?;

        match action {
            WriteAction::Null => Ok(()),
            WriteAction::Codec(entry, value) => entry
                .encode(self, value)
                .map_err(|source| self.codec_error(value, source)),
            WriteAction::Bean(writer, value) => {
                self.encoder
                    .write_string(writer.descriptor().type_path())
                    .map_err(|e| self.io_error(e))?;
                writer.write_fields_of(self, value)
            }
            WriteAction::Sequence(elements) => {
                self.encoder
                    .write_len(elements.len())
                    .map_err(|e| self.io_error(e))?;
                for (index, element) in elements.enumerate() {
                    self.with_trace(TraceFrame::Element { index }, |ctx| {
                        ctx.write_value(Some(element))
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Unwraps `value` and writes its tag and payload.
    ///
    /// Unlike a property, a value cannot be omitted: a missing codec is an
    /// error whatever the [`MissingCodecPolicy`].
    pub fn write_value(&mut self, value: Option<&dyn Value>) -> Result<(), WriteError> {
        let result = deferred::unwrap(value, |value| match self.write_action_for(value) {
            Some(action) => self.write_with(action),
            None => Err(WriteError::MissingCodec {
                trace: self.trace.to_string(),
                type_path: value.map_or("()", |value| value.value_type_path()),
            }),
        });
        match result {
            Ok(written) => written,
            Err(source) => Err(WriteError::Unwrap {
                trace: self.trace.to_string(),
                source,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Properties

    /// Writes a property name.
    pub fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.encoder
            .write_string(name)
            .map_err(|e| self.io_error(e))
    }

    /// Runs `body`, then ends the property stream with the empty name.
    ///
    /// Nothing is written after a failing `body`.
    pub fn writing_properties(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<(), WriteError>,
    ) -> Result<(), WriteError> {
        body(self)?;
        self.write_name("")
    }

    /// Writes one property of the current stream.
    ///
    /// `value` is unwrapped first. Returns `false` if the property was
    /// omitted because its value has no codec, see [`MissingCodecPolicy`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stash_bean::bean::BeanRegistry;
    /// use stash_bean::codec::CodecRegistry;
    /// use stash_bean::deferred::Provider;
    /// use stash_bean::output::BinaryEncoder;
    /// use stash_bean::write::{BeanWriterCache, PropertyKind, WriteContext};
    ///
    /// struct Opaque;
    /// stash_bean::impl_value!(Opaque);
    ///
    /// let codecs = CodecRegistry::new();
    /// let writers = BeanWriterCache::new(BeanRegistry::new());
    /// let mut encoder = BinaryEncoder::new(Vec::new());
    /// let mut ctx = WriteContext::new(&mut encoder, &codecs, &writers);
    ///
    /// ctx.writing_properties(|ctx| {
    ///     let version = Provider::of(String::from("1.0"));
    ///     assert!(ctx.write_next_property("version", Some(&version), PropertyKind::InputProperty)?);
    ///     assert!(!ctx.write_next_property("handle", Some(&Opaque), PropertyKind::InputProperty)?);
    ///     Ok(())
    /// })
    /// .unwrap();
    /// ```
    pub fn write_next_property(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: Option<&dyn Value>,
        kind: PropertyKind,
    ) -> Result<bool, WriteError> {
        let name = name.into();
        if name.is_empty() {
            return Err(WriteError::EmptyPropertyName {
                trace: self.trace.to_string(),
            });
        }

        let result = deferred::unwrap(value, |value| {
            self.write_resolved_property(kind, name.clone(), value)
        });
        match result {
            Ok(written) => written,
            Err(source) => Err(self.unwrap_error(kind, name, source)),
        }
    }

    fn write_resolved_property(
        &mut self,
        kind: PropertyKind,
        name: Cow<'static, str>,
        value: Option<&dyn Value>,
    ) -> Result<bool, WriteError> {
        self.with_property_trace(kind, name.clone(), |ctx| {
            // The name is only written once the value is known to be writable.
            let Some(action) = ctx.write_action_for(value) else {
                return ctx.missing_codec(value);
            };
            ctx.write_name(&name)?;
            ctx.write_with(action)?;

            #[cfg(all(debug_assertions, feature = "debug"))]
            log::debug!(
                "serialize {}: {}",
                ctx.trace,
                value.map_or("null", |value| value.value_type_path()),
            );

            Ok(true)
        })
    }

    /// Writes all properties of a registered bean, then the empty name.
    ///
    /// Fails with [`WriteError::UnknownBean`] if the writer cache does not
    /// know the type of `bean`.
    pub fn write_bean(&mut self, bean: &dyn Value) -> Result<(), WriteError> {
        let Some(writer) = self.writers.get(bean.value_type_id()) else {
            return Err(WriteError::UnknownBean {
                type_path: bean.value_type_path(),
            });
        };
        writer.write_fields_of(self, bean)
    }
}
