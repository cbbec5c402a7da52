use thiserror::Error;

/// Terminal failure while decoding one tile.
///
/// Decoding never partially succeeds: the first error aborts the whole call,
/// because a desynchronized cursor position invalidates every later
/// offset-based read in the same buffer. `offset` is the byte position at
/// which the offending read started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct DecodeError {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl DecodeError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// What went wrong, independent of where.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A primitive read would consume bytes past the end of the buffer or a
    /// declared message boundary.
    #[error("truncated input: {0}")]
    TruncatedInput(&'static str),
    /// A tag, wire type, dictionary index, or geometry command integer is
    /// outside its valid domain.
    #[error("malformed message: {0}")]
    MalformedMessage(&'static str),
    /// A geometry type code reserved for future use.
    #[error("unsupported geometry type {0}")]
    UnsupportedGeometryType(u64),
}
