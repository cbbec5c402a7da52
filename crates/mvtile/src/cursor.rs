//! Byte-level primitive reads over a tile buffer.
//!
//! [`Cursor`] borrows the undecoded buffer for the duration of one decode
//! call and tracks a mutable read position. Every read is bounds-checked;
//! length-delimited payloads come back as borrowed views into the buffer,
//! numeric reads copy small fixed-width values.

use alloc::string::String;

use bstr::ByteSlice;

use crate::error::{DecodeError, ErrorKind};

/// Longest legal encoding of a 64-bit varint.
const MAX_VARINT_BYTES: usize = 10;

#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    /// Repositions the cursor at a previously recorded offset.
    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn fail(&self, kind: ErrorKind, offset: usize) -> DecodeError {
        DecodeError::new(kind, offset)
    }

    /// Reads one unsigned varint: little-endian 7-bit groups, continuation
    /// bit high. At most ten bytes encode a 64-bit value.
    pub(crate) fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.pos;
        let mut value = 0u64;
        for group in 0..MAX_VARINT_BYTES {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(self.fail(ErrorKind::TruncatedInput("varint"), start));
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(self.fail(ErrorKind::TruncatedInput("varint exceeds 10 bytes"), start))
    }

    /// Reads a zig-zag encoded signed varint.
    pub(crate) fn read_svarint(&mut self) -> Result<i64, DecodeError> {
        let raw = self.read_varint()?;
        #[allow(clippy::cast_possible_wrap)]
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    fn read_fixed<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], DecodeError> {
        let start = self.pos;
        let Some(bytes) = self.buf.get(self.pos..self.pos + N) else {
            return Err(self.fail(ErrorKind::TruncatedInput(what), start));
        };
        self.pos += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub(crate) fn read_float(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.read_fixed::<4>("float")?))
    }

    pub(crate) fn read_double(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.read_fixed::<8>("double")?))
    }

    /// Reads a varint; any non-zero value is `true`.
    pub(crate) fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_varint()? != 0)
    }

    /// Reads a length-delimited span and returns the borrowed view.
    pub(crate) fn read_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let len = self.read_varint()?;
        let Some(end) = usize::try_from(len)
            .ok()
            .and_then(|n| self.pos.checked_add(n))
        else {
            return Err(self.fail(ErrorKind::TruncatedInput("length-delimited field"), start));
        };
        let Some(bytes) = self.buf.get(self.pos..end) else {
            return Err(self.fail(ErrorKind::TruncatedInput("length-delimited field"), start));
        };
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a length-delimited string. The wire format does not guarantee
    /// valid UTF-8, so decoding is lossy rather than fallible.
    pub(crate) fn read_string(&mut self) -> Result<String, DecodeError> {
        Ok(self.read_bytes()?.to_str_lossy().into_owned())
    }

    /// Advances past `n` bytes without decoding them.
    pub(crate) fn skip(&mut self, n: u64) -> Result<(), DecodeError> {
        let start = self.pos;
        let end = usize::try_from(n)
            .ok()
            .and_then(|n| self.pos.checked_add(n))
            .filter(|&end| end <= self.buf.len());
        match end {
            Some(end) => {
                self.pos = end;
                Ok(())
            }
            None => Err(self.fail(ErrorKind::TruncatedInput("skipped field"), start)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_single_byte() {
        let mut c = Cursor::new(&[0x2a]);
        assert_eq!(c.read_varint().unwrap(), 42);
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn varint_multi_byte() {
        // 300 = 0b10_0101100
        let mut c = Cursor::new(&[0xac, 0x02]);
        assert_eq!(c.read_varint().unwrap(), 300);
        assert_eq!(c.pos(), 2);
    }

    #[test]
    fn varint_max_value() {
        let buf = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut c = Cursor::new(&buf);
        assert_eq!(c.read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn varint_truncated() {
        let mut c = Cursor::new(&[0x80]);
        let err = c.read_varint().unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput("varint"));
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn varint_overlong() {
        let buf = [0x80; 11];
        let mut c = Cursor::new(&buf);
        let err = c.read_varint().unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput("varint exceeds 10 bytes"));
    }

    #[test]
    fn svarint_zig_zag() {
        for (raw, expected) in [(0u8, 0i64), (1, -1), (2, 1), (3, -2), (4, 2)] {
            let buf = [raw];
            let mut c = Cursor::new(&buf);
            assert_eq!(c.read_svarint().unwrap(), expected);
        }
    }

    #[test]
    fn svarint_extremes() {
        // Zig-zag of u64::MAX is i64::MIN.
        let buf = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut c = Cursor::new(&buf);
        assert_eq!(c.read_svarint().unwrap(), i64::MIN);
    }

    #[test]
    fn fixed_width_reads() {
        let mut buf = alloc::vec::Vec::new();
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        buf.extend_from_slice(&(-2.25f64).to_le_bytes());
        let mut c = Cursor::new(&buf);
        assert_eq!(c.read_float().unwrap(), 1.5);
        assert_eq!(c.read_double().unwrap(), -2.25);
    }

    #[test]
    fn double_truncated() {
        let mut c = Cursor::new(&[0x00, 0x01, 0x02]);
        let err = c.read_double().unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput("double"));
    }

    #[test]
    fn bool_nonzero_is_true() {
        let mut c = Cursor::new(&[0x00, 0x01, 0x07]);
        assert!(!c.read_bool().unwrap());
        assert!(c.read_bool().unwrap());
        assert!(c.read_bool().unwrap());
    }

    #[test]
    fn bytes_span_is_borrowed_view() {
        let buf = [0x03, b'a', b'b', b'c', 0xff];
        let mut c = Cursor::new(&buf);
        let span = c.read_bytes().unwrap();
        assert_eq!(span, b"abc");
        assert_eq!(c.pos(), 4);
    }

    #[test]
    fn bytes_length_past_end() {
        let mut c = Cursor::new(&[0x05, b'a']);
        let err = c.read_bytes().unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput("length-delimited field"));
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn string_invalid_utf8_is_lossy() {
        let buf = [0x02, 0xff, b'a'];
        let mut c = Cursor::new(&buf);
        assert_eq!(c.read_string().unwrap(), "\u{fffd}a");
    }

    #[test]
    fn skip_past_end() {
        let mut c = Cursor::new(&[0x00; 4]);
        assert!(c.skip(4).is_ok());
        let err = c.skip(1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput("skipped field"));
    }
}
