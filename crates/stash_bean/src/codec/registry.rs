use core::any::TypeId;
use core::marker::PhantomData;
use std::sync::Arc;

use serde_core::Serialize;
use stash_utils::TypeIdMap;

use crate::Value;
use crate::codec::serde::SerdeCodec;
use crate::codec::{Codec, CodecError, tag};
use crate::write::WriteContext;

// -----------------------------------------------------------------------------
// Erased codecs

pub(super) trait ErasedCodec: Send + Sync + 'static {
    fn encode_erased(
        &self,
        ctx: &mut WriteContext<'_>,
        value: &dyn Value,
    ) -> Result<(), CodecError>;
}

struct TypedCodec<T, C> {
    codec: C,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Value, C: Codec<T>> ErasedCodec for TypedCodec<T, C> {
    fn encode_erased(
        &self,
        ctx: &mut WriteContext<'_>,
        value: &dyn Value,
    ) -> Result<(), CodecError> {
        match value.downcast_ref::<T>() {
            Some(value) => self.codec.encode(ctx, value),
            None => Err(mismatch(core::any::type_name::<T>(), value)),
        }
    }
}

pub(super) fn mismatch(expected: &str, value: &dyn Value) -> CodecError {
    CodecError::custom(format_args!(
        "codec for `{expected}` received a value of type `{}`",
        value.value_type_path(),
    ))
}

// -----------------------------------------------------------------------------
// CodecEntry

/// A registered codec and its tag.
#[derive(Clone)]
pub struct CodecEntry {
    tag: u32,
    type_path: &'static str,
    codec: Arc<dyn ErasedCodec>,
}

impl CodecEntry {
    /// Returns the tag written in front of the payloads of this codec.
    #[inline]
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    /// Returns the path of the type this codec writes.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Writes the payload of `value`.
    ///
    /// Fails if `value` is not of the registered type.
    #[inline]
    pub fn encode(&self, ctx: &mut WriteContext<'_>, value: &dyn Value) -> Result<(), CodecError> {
        self.codec.encode_erased(ctx, value)
    }
}

impl core::fmt::Debug for CodecEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CodecEntry")
            .field("tag", &self.tag)
            .field("type_path", &self.type_path)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// CodecRegistry

/// Codecs by value type.
///
/// The registry only answers "which codec writes this exact type"; nested
/// beans, sequences and absence are dispatched by the
/// [`WriteContext`](crate::write::WriteContext).
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use stash_bean::codec::{CodecRegistry, tag};
///
/// let codecs = CodecRegistry::new();
/// let entry = codecs.get(TypeId::of::<u32>()).unwrap();
/// assert!(entry.tag() >= tag::FIRST_CODEC);
/// assert_eq!(entry.type_path(), "u32");
///
/// assert!(CodecRegistry::empty().is_empty());
/// ```
pub struct CodecRegistry {
    entries: TypeIdMap<CodecEntry>,
    next_tag: u32,
}

impl Default for CodecRegistry {
    /// See [`CodecRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Creates a registry without codecs.
    ///
    /// Absent values stay writable, they need no codec.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            entries: TypeIdMap::new(),
            next_tag: tag::FIRST_CODEC,
        }
    }

    /// Creates a registry with the built-in codecs:
    ///
    /// - `()` `bool` `char`
    /// - `i8 - i128` `isize`
    /// - `u8 - u128` `usize`
    /// - `f32` `f64`
    /// - `String` `&'static str` `Cow<'static, str>` `PathBuf`
    ///
    /// Tags are assigned in this order, so they are identical across
    /// registries created with this function.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        super::builtin::register_builtins(&mut registry);
        registry
    }

    fn insert_erased(
        &mut self,
        type_id: TypeId,
        type_path: &'static str,
        codec: Arc<dyn ErasedCodec>,
    ) -> u32 {
        if let Some(entry) = self.entries.get_mut(&type_id) {
            entry.codec = codec;
            return entry.tag;
        }
        let tag = self.next_tag;
        self.next_tag += 1;
        self.entries.insert(
            type_id,
            CodecEntry {
                tag,
                type_path,
                codec,
            },
        );
        tag
    }

    /// Registers `codec` for values of type `T` and returns its tag.
    ///
    /// Registering a type again replaces its codec and keeps its tag.
    pub fn register<T: Value, C: Codec<T>>(&mut self, codec: C) -> u32 {
        let codec = TypedCodec::<T, C> {
            codec,
            _marker: PhantomData,
        };
        self.insert_erased(TypeId::of::<T>(), core::any::type_name::<T>(), Arc::new(codec))
    }

    /// Registers a closure as the codec of `T`.
    ///
    /// Same as [`register`](Self::register), with better type inference for
    /// closures.
    pub fn register_fn<T, F>(&mut self, codec: F) -> u32
    where
        T: Value,
        F: Fn(&mut WriteContext<'_>, &T) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.register::<T, F>(codec)
    }

    /// Registers a codec writing `T` through its [`Serialize`] implementation.
    ///
    /// See [`EncoderSerializer`](crate::codec::EncoderSerializer) for the
    /// format.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Serialize;
    /// use stash_bean::codec::CodecRegistry;
    /// use stash_bean::derive::Value;
    ///
    /// #[derive(Value, Serialize)]
    /// struct Coordinates {
    ///     group: String,
    ///     artifact: String,
    /// }
    ///
    /// let mut codecs = CodecRegistry::new();
    /// codecs.register_serde::<Coordinates>();
    /// ```
    pub fn register_serde<T: Serialize + Value>(&mut self) -> u32 {
        self.insert_erased(
            TypeId::of::<T>(),
            core::any::type_name::<T>(),
            Arc::new(SerdeCodec::of::<T>()),
        )
    }

    /// Whether a codec is registered for the type with given [`TypeId`].
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains(&type_id)
    }

    /// Returns the codec registered for the type with given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&CodecEntry> {
        self.entries.get(&type_id)
    }

    /// Returns the codec with the given tag.
    pub fn get_with_tag(&self, tag: u32) -> Option<&CodecEntry> {
        self.entries.values().find(|entry| entry.tag == tag)
    }

    /// Returns the number of registered codecs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no codec is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the registered codecs, in no particular order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CodecEntry> {
        self.entries.values()
    }
}

impl core::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_unstable_by_key(|entry| entry.tag);
        f.debug_list().entries(entries).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::CodecRegistry;
    use crate::codec::{CodecError, tag};
    use crate::write::WriteContext;

    struct Version(u32);

    crate::impl_value!(Version);

    #[test]
    fn builtin_tags_are_stable() {
        let a = CodecRegistry::new();
        let b = CodecRegistry::new();

        assert_eq!(a.len(), b.len());
        for entry in a.iter() {
            assert!(entry.tag() >= tag::FIRST_CODEC);
            let other = b.get_with_tag(entry.tag()).unwrap();
            assert_eq!(other.type_path(), entry.type_path());
        }
        assert_eq!(a.get(TypeId::of::<()>()).unwrap().tag(), tag::FIRST_CODEC);
    }

    #[test]
    fn reregistering_keeps_the_tag() {
        let mut codecs = CodecRegistry::empty();
        let first = codecs.register_fn(|ctx: &mut WriteContext<'_>, v: &Version| {
            ctx.encoder().write_u64(u64::from(v.0))?;
            Ok(())
        });
        let second = codecs.register_fn(|_: &mut WriteContext<'_>, _: &Version| {
            Err(CodecError::custom("replaced"))
        });

        assert_eq!(first, tag::FIRST_CODEC);
        assert_eq!(first, second);
        assert_eq!(codecs.len(), 1);
        assert!(codecs.contains(TypeId::of::<Version>()));
        assert!(!codecs.contains(TypeId::of::<u32>()));
    }
}
