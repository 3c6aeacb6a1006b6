use core::fmt::Display;
use std::io;

use serde_core::ser::{self, Serialize, SerializeMap, SerializeSeq, SerializeStruct};
use serde_core::ser::{SerializeStructVariant, SerializeTuple, SerializeTupleStruct};
use serde_core::ser::{SerializeTupleVariant, Serializer};
use thiserror::Error;

use crate::Value;
use crate::codec::CodecError;
use crate::codec::registry::{ErasedCodec, mismatch};
use crate::output::Encoder;
use crate::write::WriteContext;

// -----------------------------------------------------------------------------
// SerdeCodec

/// The codec registered by [`CodecRegistry::register_serde`].
///
/// Internally stores a function pointer downcasting to the concrete type, so
/// a single serializer implementation serves every registered type.
///
/// [`CodecRegistry::register_serde`]: crate::codec::CodecRegistry::register_serde
pub(super) struct SerdeCodec {
    type_path: &'static str,
    fun: fn(value: &dyn Value) -> Option<&dyn erased_serde::Serialize>,
}

impl SerdeCodec {
    pub(super) fn of<T: Serialize + Value>() -> Self {
        Self {
            type_path: core::any::type_name::<T>(),
            fun: |value| {
                value
                    .downcast_ref::<T>()
                    .map(|value| value as &dyn erased_serde::Serialize)
            },
        }
    }
}

impl ErasedCodec for SerdeCodec {
    fn encode_erased(
        &self,
        ctx: &mut WriteContext<'_>,
        value: &dyn Value,
    ) -> Result<(), CodecError> {
        let Some(serialize) = (self.fun)(value) else {
            return Err(mismatch(self.type_path, value));
        };
        to_encoder(ctx.encoder(), serialize).map_err(CodecError::from)
    }
}

// -----------------------------------------------------------------------------
// SerdeEncodeError

/// An error that occurs when writing a [`Serialize`] value to an [`Encoder`].
#[derive(Debug, Error)]
pub enum SerdeEncodeError {
    #[error("{0}")]
    Custom(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("the length of sequences and maps must be known in advance")]
    UnknownLength,
}

impl ser::Error for SerdeEncodeError {
    #[inline]
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl From<SerdeEncodeError> for CodecError {
    fn from(error: SerdeEncodeError) -> Self {
        match error {
            SerdeEncodeError::Io(error) => Self::Io(error),
            error => Self::other(error),
        }
    }
}

// -----------------------------------------------------------------------------
// EncoderSerializer

/// Writes `value` to `encoder` with an [`EncoderSerializer`].
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use stash_bean::codec::to_encoder;
/// use stash_bean::output::BinaryEncoder;
///
/// #[derive(Serialize)]
/// struct Dependency<'a> {
///     notation: &'a str,
///     transitive: bool,
/// }
///
/// let mut encoder = BinaryEncoder::new(Vec::new());
/// let dependency = Dependency { notation: "log", transitive: true };
/// to_encoder(&mut encoder, &dependency).unwrap();
///
/// assert_eq!(encoder.into_inner(), [3, b'l', b'o', b'g', 1]);
/// ```
pub fn to_encoder<T>(encoder: &mut dyn Encoder, value: &T) -> Result<(), SerdeEncodeError>
where
    T: Serialize + ?Sized,
{
    value.serialize(&mut EncoderSerializer::new(encoder))
}

/// A compact, non self-describing [`Serializer`] over an [`Encoder`].
///
/// - primitives use the [`Encoder`] layout;
/// - options are a `0`/`1` byte, then the value if present;
/// - enum variants are their index, then their content;
/// - structs and tuples are their fields in order, without names;
/// - sequences and maps are their length, then their elements.
///
/// The length of sequences and maps must be known in advance.
pub struct EncoderSerializer<'e> {
    encoder: &'e mut dyn Encoder,
}

impl<'e> EncoderSerializer<'e> {
    /// Creates a serializer writing to `encoder`.
    #[inline]
    pub fn new(encoder: &'e mut dyn Encoder) -> Self {
        Self { encoder }
    }
}

impl Serializer for &mut EncoderSerializer<'_> {
    type Ok = ();
    type Error = SerdeEncodeError;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<(), Self::Error> {
        Ok(self.encoder.write_bool(v)?)
    }

    fn serialize_i8(self, v: i8) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<(), Self::Error> {
        Ok(self.encoder.write_i64(v)?)
    }

    fn serialize_i128(self, v: i128) -> Result<(), Self::Error> {
        Ok(self.encoder.write_i128(v)?)
    }

    fn serialize_u8(self, v: u8) -> Result<(), Self::Error> {
        self.serialize_u64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<(), Self::Error> {
        self.serialize_u64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<(), Self::Error> {
        self.serialize_u64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<(), Self::Error> {
        Ok(self.encoder.write_u64(v)?)
    }

    fn serialize_u128(self, v: u128) -> Result<(), Self::Error> {
        Ok(self.encoder.write_u128(v)?)
    }

    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        Ok(self.encoder.write_f32(v)?)
    }

    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        Ok(self.encoder.write_f64(v)?)
    }

    fn serialize_char(self, v: char) -> Result<(), Self::Error> {
        self.serialize_u32(v.into())
    }

    fn serialize_str(self, v: &str) -> Result<(), Self::Error> {
        Ok(self.encoder.write_string(v)?)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), Self::Error> {
        Ok(self.encoder.write_bytes(v)?)
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        Ok(self.encoder.write_u8(0)?)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        self.encoder.write_u8(1)?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), Self::Error> {
        self.serialize_u32(variant_index)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.encoder.write_u64(variant_index.into())?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let len = len.ok_or(SerdeEncodeError::UnknownLength)?;
        self.encoder.write_len(len)?;
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.encoder.write_u64(variant_index.into())?;
        Ok(self)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        let len = len.ok_or(SerdeEncodeError::UnknownLength)?;
        self.encoder.write_len(len)?;
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.encoder.write_u64(variant_index.into())?;
        Ok(self)
    }

    #[inline]
    fn is_human_readable(&self) -> bool {
        false
    }
}

macro_rules! impl_compound {
    ($($trait:ident :: $method:ident),+ $(,)?) => {
        $(
            impl $trait for &mut EncoderSerializer<'_> {
                type Ok = ();
                type Error = SerdeEncodeError;

                #[inline]
                fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
                    value.serialize(&mut **self)
                }

                #[inline]
                fn end(self) -> Result<(), Self::Error> {
                    Ok(())
                }
            }
        )+
    };
}

impl_compound!(
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
);

impl SerializeMap for &mut EncoderSerializer<'_> {
    type Ok = ();
    type Error = SerdeEncodeError;

    #[inline]
    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        key.serialize(&mut **self)
    }

    #[inline]
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(&mut **self)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SerializeStruct for &mut EncoderSerializer<'_> {
    type Ok = ();
    type Error = SerdeEncodeError;

    #[inline]
    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(&mut **self)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SerializeStructVariant for &mut EncoderSerializer<'_> {
    type Ok = ();
    type Error = SerdeEncodeError;

    #[inline]
    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(&mut **self)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use super::{SerdeEncodeError, to_encoder};
    use crate::output::BinaryEncoder;
    use crate::output::decode::Decoder;

    #[derive(Serialize)]
    enum Scope {
        Compile,
        Runtime { optional: bool },
    }

    #[derive(Serialize)]
    struct Module {
        name: String,
        scopes: Vec<Scope>,
        labels: BTreeMap<String, u32>,
        parent: Option<Box<Module>>,
    }

    struct Unsized;

    impl Serialize for Unsized {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeSeq;
            serializer.serialize_seq(None)?.end()
        }
    }

    #[test]
    fn nested_values_are_positional() {
        let module = Module {
            name: "core".to_owned(),
            scopes: vec![Scope::Compile, Scope::Runtime { optional: true }],
            labels: BTreeMap::from([("a".to_owned(), 300)]),
            parent: None,
        };
        let mut encoder = BinaryEncoder::new(Vec::new());
        to_encoder(&mut encoder, &module).unwrap();
        let bytes = encoder.into_inner();

        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_string(), "core");
        assert_eq!(decoder.read_len(), 2);
        assert_eq!(decoder.read_u64(), 0);
        assert_eq!(decoder.read_u64(), 1);
        assert!(decoder.read_bool());
        assert_eq!(decoder.read_len(), 1);
        assert_eq!(decoder.read_string(), "a");
        assert_eq!(decoder.read_u64(), 300);
        assert_eq!(decoder.read_u8(), 0);
        assert!(decoder.is_empty());
    }

    #[test]
    fn unknown_lengths_are_rejected() {
        let mut encoder = BinaryEncoder::new(Vec::new());
        let error = to_encoder(&mut encoder, &Unsized).unwrap_err();
        assert!(matches!(error, SerdeEncodeError::UnknownLength));
    }
}
