//! Error types surfaced by generated codecs

use thiserror::Error;

/// Failures while decoding an SSZ buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer cannot even hold the fixed-size region
    #[error("buffer too short: need at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    /// An offset-table entry points before the previous payload or past the buffer
    #[error("invalid offset {offset} (previous {previous}, buffer length {len})")]
    InvalidOffset {
        offset: usize,
        previous: usize,
        len: usize,
    },

    /// Bytes left over after the value's encoded content
    #[error("encoded content overruns its segment: expected {expected} bytes, got {actual}")]
    DecodeOverrun { expected: usize, actual: usize },

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// Bits set past the declared length of a bit-vector
    #[error("bit-vector has bits set beyond its length")]
    InvalidBitVector,

    /// Empty bit-list buffer or missing delimiter bit
    #[error("bit-list is missing its length delimiter")]
    InvalidBitList,

    #[error("list of {len} elements exceeds limit of {max}")]
    ListTooLong { len: usize, max: usize },
}

/// Failures while encoding a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Offsets are 4-byte little-endian values
    #[error("offset {0} does not fit in 32 bits")]
    OffsetOverflow(usize),

    #[error("list of {len} elements exceeds limit of {max}")]
    ListTooLong { len: usize, max: usize },
}
