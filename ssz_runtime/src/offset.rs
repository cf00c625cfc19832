//! Offset-table and bounds helpers shared by generated code and the
//! composite impls in this crate.

use crate::error::{DecodeError, EncodeError};

/// Width of one offset-table slot.
pub const BYTES_PER_OFFSET: usize = 4;

/* Append a 4-byte little-endian offset */
pub fn write_offset(buf: &mut Vec<u8>, offset: usize) -> Result<(), EncodeError> {
    let value = u32::try_from(offset).map_err(|_| EncodeError::OffsetOverflow(offset))?;
    buf.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Copies `N` bytes starting at `at`.
///
/// # Panics
///
/// Panics if `at + N` exceeds `buf.len()`; callers check lengths first.
pub fn read_array<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}

/// Reads the offset slot starting at `at`. Same bounds contract as [`read_array`].
pub fn read_offset(buf: &[u8], at: usize) -> usize {
    u32::from_le_bytes(read_array(buf, at)) as usize
}

/* The first payload must start right after the fixed region */
pub fn check_first_offset(offset: usize, fixed_size: usize, len: usize) -> Result<(), DecodeError> {
    if offset != fixed_size || offset > len {
        return Err(DecodeError::InvalidOffset {
            offset,
            previous: fixed_size,
            len,
        });
    }
    Ok(())
}

/* Later payloads may be empty but never run backwards or past the buffer */
pub fn check_offset(offset: usize, previous: usize, len: usize) -> Result<(), DecodeError> {
    if offset < previous || offset > len {
        return Err(DecodeError::InvalidOffset {
            offset,
            previous,
            len,
        });
    }
    Ok(())
}

/* Exact length check for fixed-size values */
pub fn check_fixed_len(buf: &[u8], size: usize) -> Result<(), DecodeError> {
    if buf.len() < size {
        return Err(DecodeError::BufferTooShort {
            expected: size,
            actual: buf.len(),
        });
    }
    if buf.len() > size {
        return Err(DecodeError::DecodeOverrun {
            expected: size,
            actual: buf.len(),
        });
    }
    Ok(())
}

pub fn check_min_len(buf: &[u8], size: usize) -> Result<(), DecodeError> {
    if buf.len() < size {
        return Err(DecodeError::BufferTooShort {
            expected: size,
            actual: buf.len(),
        });
    }
    Ok(())
}

pub fn check_max_encode(len: usize, max: usize) -> Result<(), EncodeError> {
    if len > max {
        return Err(EncodeError::ListTooLong { len, max });
    }
    Ok(())
}

pub fn check_max_decode(len: usize, max: usize) -> Result<(), DecodeError> {
    if len > max {
        return Err(DecodeError::ListTooLong { len, max });
    }
    Ok(())
}

pub fn decode_bool(byte: u8) -> Result<bool, DecodeError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DecodeError::InvalidBool(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_little_endian() {
        let mut buf = Vec::new();
        write_offset(&mut buf, 12).unwrap();
        assert_eq!(buf, vec![12, 0, 0, 0]);
        assert_eq!(read_offset(&buf, 0), 12);
    }

    #[test]
    fn offset_overflow_is_rejected() {
        let mut buf = Vec::new();
        let too_big = u32::MAX as usize + 1;
        assert_eq!(
            write_offset(&mut buf, too_big),
            Err(EncodeError::OffsetOverflow(too_big))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn first_offset_must_match_fixed_region() {
        assert!(check_first_offset(12, 12, 14).is_ok());
        assert_eq!(
            check_first_offset(13, 12, 14),
            Err(DecodeError::InvalidOffset {
                offset: 13,
                previous: 12,
                len: 14
            })
        );
        assert!(check_first_offset(12, 12, 10).is_err());
    }

    #[test]
    fn offsets_must_be_monotonic_and_in_bounds() {
        assert!(check_offset(16, 16, 16).is_ok());
        assert!(check_offset(15, 16, 20).is_err());
        assert!(check_offset(21, 16, 20).is_err());
    }

    #[test]
    fn fixed_len_distinguishes_short_and_long() {
        assert_eq!(
            check_fixed_len(&[0; 3], 4),
            Err(DecodeError::BufferTooShort {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            check_fixed_len(&[0; 5], 4),
            Err(DecodeError::DecodeOverrun {
                expected: 4,
                actual: 5
            })
        );
        assert!(check_fixed_len(&[0; 4], 4).is_ok());
    }

    #[test]
    fn bool_bytes() {
        assert_eq!(decode_bool(0), Ok(false));
        assert_eq!(decode_bool(1), Ok(true));
        assert_eq!(decode_bool(2), Err(DecodeError::InvalidBool(2)));
    }
}
