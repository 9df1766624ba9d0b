//! Little-endian primitive reads and writes over byte streams.
//!
//! The [`ReadLe`] and [`WriteLe`] traits extend [`std::io::Read`] and [`std::io::Write`] with the
//! handful of shapes the CTM wire format is built from:
//! * fixed-width words (`u32`, `i32`, `f32`), always little-endian,
//! * four-byte ASCII tags, handled as the `u32` holding their little-endian byte order,
//! * strings, framed as a `u32` byte length followed by exactly that many bytes of UTF-8
//!   (no terminator).
//!
//! Both traits have blanket implementations, so any reader or writer picks them up with a `use`.

use std::io::{Read, Write};

use snafu::prelude::*;

/// Error conditions for when reading/writing stream data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Thrown if the stream ends in the middle of a fixed-width value or string body.
    #[snafu(display("Unexpected end of stream!"))]
    EndOfFile,
    /// Thrown if string bytes fail UTF-8 validation.
    #[snafu(display("Invalid UTF-8 string!"))]
    InvalidUtf8,
    /// Thrown if a string's declared length exceeds the caller's limit.
    #[snafu(display("String length {length} exceeds the allowed maximum {max}!"))]
    StringTooLong { length: u32, max: u32 },
    /// Any other failure reported by the underlying stream.
    #[snafu(display("Stream I/O failed"))]
    Io { source: std::io::Error },
}
type Result<T> = core::result::Result<T, Error>;

fn map_io(error: std::io::Error) -> Error {
    match error.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::EndOfFile,
        _ => Error::Io { source: error },
    }
}

/// Little-endian reading of the CTM wire primitives.
pub trait ReadLe: Read {
    /// Reads one byte.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the stream is exhausted.
    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf).map_err(map_io)?;
        Ok(buf[0])
    }

    /// Reads four bytes as a little-endian `u32`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the stream is exhausted.
    #[inline]
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf).map_err(map_io)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads four bytes as a little-endian `i32`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the stream is exhausted.
    #[inline]
    fn read_i32(&mut self) -> Result<i32> {
        self.read_u32().map(|v| v as i32)
    }

    /// Reads four bytes as a little-endian IEEE-754 `f32`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the stream is exhausted.
    #[inline]
    fn read_f32(&mut self) -> Result<f32> {
        self.read_u32().map(f32::from_bits)
    }

    /// Reads a four-byte ASCII tag, returned as the `u32` holding its little-endian byte order.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the stream is exhausted.
    #[inline]
    fn read_tag(&mut self) -> Result<u32> {
        self.read_u32()
    }

    /// Reads exactly `length` bytes into a new buffer.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the stream is exhausted.
    #[inline]
    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        self.read_exact(&mut buf).map_err(map_io)?;
        Ok(buf)
    }

    /// Reads a length-prefixed UTF-8 string, rejecting lengths above `max` bytes.
    ///
    /// # Errors
    /// Returns [`StringTooLong`](Error::StringTooLong) if the declared length exceeds `max`,
    /// [`InvalidUtf8`](Error::InvalidUtf8) if the body is not UTF-8, or
    /// [`EndOfFile`](Error::EndOfFile) if the stream ends early.
    fn read_string(&mut self, max: u32) -> Result<String> {
        let length = self.read_u32()?;
        ensure!(length <= max, StringTooLongSnafu { length, max });
        let bytes = self.read_bytes(length as usize)?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }
}

impl<R: Read + ?Sized> ReadLe for R {}

/// Little-endian writing of the CTM wire primitives.
pub trait WriteLe: Write {
    /// Writes one byte.
    ///
    /// # Errors
    /// Returns [`Io`](Error::Io) if the underlying stream fails.
    #[inline]
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_all(&[value]).map_err(map_io)
    }

    /// Writes a `u32` as four little-endian bytes.
    ///
    /// # Errors
    /// Returns [`Io`](Error::Io) if the underlying stream fails.
    #[inline]
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_le_bytes()).map_err(map_io)
    }

    /// Writes an `i32` as four little-endian bytes.
    ///
    /// # Errors
    /// Returns [`Io`](Error::Io) if the underlying stream fails.
    #[inline]
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_u32(value as u32)
    }

    /// Writes an `f32` as its four IEEE-754 bytes, little-endian.
    ///
    /// # Errors
    /// Returns [`Io`](Error::Io) if the underlying stream fails.
    #[inline]
    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_u32(value.to_bits())
    }

    /// Writes a four-byte ASCII tag given as the `u32` holding its little-endian byte order.
    ///
    /// # Errors
    /// Returns [`Io`](Error::Io) if the underlying stream fails.
    #[inline]
    fn write_tag(&mut self, tag: u32) -> Result<()> {
        self.write_u32(tag)
    }

    /// Writes a length-prefixed UTF-8 string with no terminator.
    ///
    /// # Errors
    /// Returns [`Io`](Error::Io) if the underlying stream fails.
    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_u32(value.len() as u32)?;
        self.write_all(value.as_bytes()).map_err(map_io)
    }
}

impl<W: Write + ?Sized> WriteLe for W {}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn words_round_trip() {
        let mut buf = Vec::new();
        buf.write_u32(0xDEAD_BEEF).unwrap();
        buf.write_i32(-42).unwrap();
        buf.write_f32(1.5).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(cursor.read_i32().unwrap(), -42);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
    }

    #[test]
    fn words_are_little_endian() {
        let mut buf = Vec::new();
        buf.write_u32(0x0403_0201).unwrap();
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn strings_round_trip() {
        let mut buf = Vec::new();
        buf.write_string("Pigment").unwrap();
        buf.write_string("").unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_string(64).unwrap(), "Pigment");
        assert_eq!(cursor.read_string(64).unwrap(), "");
    }

    #[test]
    fn string_length_is_capped() {
        let mut buf = Vec::new();
        buf.write_u32(1000).unwrap();
        let result = Cursor::new(buf).read_string(64);
        assert!(matches!(result, Err(Error::StringTooLong { length: 1000, max: 64 })));
    }

    #[test]
    fn short_stream_is_end_of_file() {
        let mut cursor = Cursor::new([0x01, 0x02]);
        assert!(matches!(cursor.read_u32(), Err(Error::EndOfFile)));
    }

    #[test]
    fn truncated_string_body_is_end_of_file() {
        let mut buf = Vec::new();
        buf.write_u32(8).unwrap();
        buf.extend_from_slice(b"abc");
        assert!(matches!(Cursor::new(buf).read_string(64), Err(Error::EndOfFile)));
    }
}
