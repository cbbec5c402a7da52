//! Generic tagged-field message walking.
//!
//! A message is a flat run of fields, each introduced by a varint tag that
//! packs a field number (`tag >> 3`) and a 3-bit wire type (`tag & 0x7`).
//! [`walk`] owns the boundary bookkeeping for one message and hands each
//! field to a handler. The handler must consume exactly the bytes belonging
//! to that field; fields it does not recognize must still be stepped over
//! with [`skip_value`] so the cursor stays synchronized.

use crate::cursor::Cursor;
use crate::error::{DecodeError, ErrorKind};

/// The encoding-kind discriminator carried by every field tag.
///
/// Deprecated group wire types (3 and 4) and the two unassigned values are
/// rejected outright; a buffer using them cannot be skipped reliably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    fn from_tag(tag: u64, offset: usize) -> Result<Self, DecodeError> {
        match tag & 0x7 {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            _ => Err(DecodeError::new(
                ErrorKind::MalformedMessage("invalid wire type"),
                offset,
            )),
        }
    }
}

/// Reads the length prefix of a nested message and returns the byte offset
/// one past its end.
pub(crate) fn message_end(cursor: &mut Cursor<'_>) -> Result<usize, DecodeError> {
    let start = cursor.pos();
    let len = cursor.read_varint()?;
    usize::try_from(len)
        .ok()
        .and_then(|n| cursor.pos().checked_add(n))
        .filter(|&end| end <= cursor.len())
        .ok_or_else(|| DecodeError::new(ErrorKind::TruncatedInput("message body"), start))
}

/// Walks the fields of one message spanning `[cursor.pos(), end)`.
///
/// Stops normally once the cursor reaches `end`; a field whose read moves
/// the cursor past `end` is a malformed message.
pub(crate) fn walk<F>(cursor: &mut Cursor<'_>, end: usize, mut handler: F) -> Result<(), DecodeError>
where
    F: FnMut(u64, WireType, &mut Cursor<'_>) -> Result<(), DecodeError>,
{
    while cursor.pos() < end {
        let at = cursor.pos();
        let tag = cursor.read_varint()?;
        let wire_type = WireType::from_tag(tag, at)?;
        handler(tag >> 3, wire_type, cursor)?;
        if cursor.pos() > end {
            return Err(DecodeError::new(
                ErrorKind::MalformedMessage("field overruns message boundary"),
                at,
            ));
        }
    }
    Ok(())
}

/// Consumes one field payload based on its wire type.
pub(crate) fn skip_value(cursor: &mut Cursor<'_>, wire_type: WireType) -> Result<(), DecodeError> {
    match wire_type {
        WireType::Varint => cursor.read_varint().map(|_| ()),
        WireType::Fixed64 => cursor.skip(8),
        WireType::LengthDelimited => {
            let len = cursor.read_varint()?;
            cursor.skip(len)
        }
        WireType::Fixed32 => cursor.skip(4),
    }
}
