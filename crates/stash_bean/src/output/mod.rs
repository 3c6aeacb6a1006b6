//! The primitive output stream codecs write to.
//!
//! Integers are LEB128 varints (signed ones zig-zag encoded first), floats
//! are little-endian bits, strings and byte arrays are length-prefixed.

// -----------------------------------------------------------------------------
// Modules

#[cfg(test)]
pub(crate) mod decode;

// -----------------------------------------------------------------------------
// Encoder

use std::io;

/// A primitive output stream.
///
/// Only [`write_raw`](Encoder::write_raw) is required, every other write is
/// expressed through it.
pub trait Encoder {
    /// Writes `bytes` as is.
    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Writes a single byte.
    #[inline]
    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_raw(&[value])
    }

    /// Writes a value tag as a varint.
    #[inline]
    fn write_tag(&mut self, tag: u32) -> io::Result<()> {
        self.write_u64(u64::from(tag))
    }

    /// Writes `true` as `1` and `false` as `0`.
    #[inline]
    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_u8(u8::from(value))
    }

    /// Writes an unsigned LEB128 varint.
    fn write_u64(&mut self, mut value: u64) -> io::Result<()> {
        let mut buf = [0_u8; 10];
        let mut len = 0;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                buf[len] = byte;
                len += 1;
                break;
            }
            buf[len] = byte | 0x80;
            len += 1;
        }
        self.write_raw(&buf[..len])
    }

    /// Writes a zig-zag encoded varint.
    #[inline]
    fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.write_u64(((value << 1) ^ (value >> 63)) as u64)
    }

    /// Writes 16 little-endian bytes.
    #[inline]
    fn write_u128(&mut self, value: u128) -> io::Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes 16 little-endian bytes.
    #[inline]
    fn write_i128(&mut self, value: i128) -> io::Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    #[inline]
    fn write_f32(&mut self, value: f32) -> io::Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    #[inline]
    fn write_f64(&mut self, value: f64) -> io::Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a collection length.
    #[inline]
    fn write_len(&mut self, len: usize) -> io::Result<()> {
        self.write_u64(len as u64)
    }

    /// Writes a length-prefixed byte array.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_len(bytes.len())?;
        self.write_raw(bytes)
    }

    /// Writes a length-prefixed UTF-8 string.
    #[inline]
    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.write_bytes(value.as_bytes())
    }
}

impl<E: Encoder + ?Sized> Encoder for &mut E {
    #[inline]
    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_raw(bytes)
    }
}

// -----------------------------------------------------------------------------
// BinaryEncoder

/// An [`Encoder`] over any [`io::Write`].
///
/// # Examples
///
/// ```
/// use stash_bean::output::{BinaryEncoder, Encoder};
///
/// let mut encoder = BinaryEncoder::new(Vec::new());
/// encoder.write_string("jar").unwrap();
/// encoder.write_i64(-2).unwrap();
/// encoder.write_u64(300).unwrap();
///
/// assert_eq!(encoder.position(), 7);
/// assert_eq!(encoder.into_inner(), [3, b'j', b'a', b'r', 3, 0xAC, 0x02]);
/// ```
#[derive(Debug)]
pub struct BinaryEncoder<W> {
    writer: W,
    position: u64,
}

impl<W: io::Write> BinaryEncoder<W> {
    /// Creates an encoder writing to `writer`.
    #[inline]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Returns a reference to the underlying writer.
    #[inline]
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Unwraps the underlying writer.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Encoder for BinaryEncoder<W> {
    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::decode::Decoder;
    use super::{BinaryEncoder, Encoder};

    #[test]
    fn varints_use_minimal_bytes() {
        let mut encoder = BinaryEncoder::new(Vec::new());
        encoder.write_u64(0).unwrap();
        encoder.write_u64(127).unwrap();
        encoder.write_u64(128).unwrap();
        encoder.write_u64(u64::MAX).unwrap();

        let bytes = encoder.into_inner();
        assert_eq!(&bytes[..4], [0x00, 0x7F, 0x80, 0x01]);
        assert_eq!(bytes.len(), 4 + 10);
    }

    #[test]
    fn zig_zag_interleaves_signs() {
        let mut encoder = BinaryEncoder::new(Vec::new());
        for value in [0, -1, 1, -2, i64::MIN, i64::MAX] {
            encoder.write_i64(value).unwrap();
        }

        let bytes = encoder.into_inner();
        assert_eq!(&bytes[..4], [0, 1, 2, 3]);
        let mut decoder = Decoder::new(&bytes);
        for expected in [0, -1, 1, -2, i64::MIN, i64::MAX] {
            assert_eq!(decoder.read_i64(), expected);
        }
        assert!(decoder.is_empty());
    }

    #[test]
    fn failing_writer_reports_io_errors() {
        struct Full;

        impl std::io::Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut encoder = BinaryEncoder::new(Full);
        let error = encoder.write_string("x").unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::WriteZero);
        assert_eq!(encoder.position(), 0);
    }
}
