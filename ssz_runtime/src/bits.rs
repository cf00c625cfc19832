//! Bitfield containers. Bits are packed least-significant first.

use crate::error::{DecodeError, EncodeError};
use crate::offset::check_fixed_len;
use crate::Ssz;

/// Bit-vector of static length `N`, encoded in `ceil(N / 8)` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector<const N: usize> {
    bytes: Vec<u8>,
}

impl<const N: usize> BitVector<N> {
    pub const BYTE_LEN: usize = (N + 7) / 8;

    pub fn new() -> Self {
        Self {
            bytes: vec![0; Self::BYTE_LEN],
        }
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= N {
            return None;
        }
        Some(self.bytes[index / 8] >> (index % 8) & 1 == 1)
    }

    /// # Panics
    ///
    /// Panics if `index >= N`.
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < N, "bit index {} out of range for BitVector<{}>", index, N);
        if value {
            self.bytes[index / 8] |= 1 << (index % 8);
        } else {
            self.bytes[index / 8] &= !(1 << (index % 8));
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<const N: usize> Default for BitVector<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Ssz for BitVector<N> {
    const FIXED_SIZE: Option<usize> = Some((N + 7) / 8);

    fn ssz_size(&self) -> usize {
        Self::BYTE_LEN
    }

    fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.extend_from_slice(&self.bytes);
        Ok(())
    }

    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError> {
        check_fixed_len(buf, Self::BYTE_LEN)?;
        if N % 8 != 0 {
            if let Some(last) = buf.last() {
                if last >> (N % 8) != 0 {
                    return Err(DecodeError::InvalidBitVector);
                }
            }
        }
        Ok(Self {
            bytes: buf.to_vec(),
        })
    }
}

/// Bit-list of runtime length. The encoding appends one delimiter bit after
/// the last element, so the buffer is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitList {
    bits: Vec<bool>,
}

impl BitList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: bool) {
        self.bits[index] = value;
    }

    pub fn push(&mut self, value: bool) {
        self.bits.push(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }
}

impl From<Vec<bool>> for BitList {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl FromIterator<bool> for BitList {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl Ssz for BitList {
    const FIXED_SIZE: Option<usize> = None;

    fn ssz_size(&self) -> usize {
        self.bits.len() / 8 + 1
    }

    fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let mut bytes = vec![0u8; self.ssz_size()];
        for (idx, bit) in self.bits.iter().enumerate() {
            if *bit {
                bytes[idx / 8] |= 1 << (idx % 8);
            }
        }
        let delimiter = self.bits.len();
        bytes[delimiter / 8] |= 1 << (delimiter % 8);
        buf.extend_from_slice(&bytes);
        Ok(())
    }

    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError> {
        let last = match buf.last() {
            Some(&last) if last != 0 => last,
            _ => return Err(DecodeError::InvalidBitList),
        };
        let high_bit = 7 - last.leading_zeros() as usize;
        let len = (buf.len() - 1) * 8 + high_bit;
        let bits = (0..len)
            .map(|idx| buf[idx / 8] >> (idx % 8) & 1 == 1)
            .collect();
        Ok(Self { bits })
    }
}
