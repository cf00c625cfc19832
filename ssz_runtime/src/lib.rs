//! Runtime support for code emitted by `sszgen`.
//!
//! Generated `impl Ssz` blocks only ever call into this crate: the [`Ssz`]
//! trait itself, the error types, the offset-table helpers and the bitfield
//! containers. Scalars, fixed-length arrays and `Vec<T>` implement [`Ssz`]
//! here so that generated code can delegate composite fields to them.

pub mod bits;
pub mod error;
pub mod offset;
mod prim;
mod seq;

pub use bits::{BitList, BitVector};
pub use error::{DecodeError, EncodeError};
pub use offset::{
    check_first_offset, check_fixed_len, check_max_decode, check_max_encode, check_min_len,
    check_offset, decode_bool, read_array, read_offset, write_offset, BYTES_PER_OFFSET,
};

/// A type with a deterministic SSZ encoding.
///
/// `FIXED_SIZE` is `Some(n)` when every value encodes to exactly `n` bytes and
/// `None` when the encoded length depends on the value. Encoders must write
/// exactly `ssz_size()` bytes; decoders must consume the whole slice they are
/// handed and reject anything else.
pub trait Ssz: Sized {
    const FIXED_SIZE: Option<usize>;

    fn ssz_size(&self) -> usize;

    fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError>;

    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError>;

    fn marshal_ssz(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(self.ssz_size());
        self.marshal_ssz_to(&mut buf)?;
        Ok(buf)
    }
}
