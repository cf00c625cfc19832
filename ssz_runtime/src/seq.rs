//! Homogeneous sequences: `[T; N]` vectors and `Vec<T>` lists.
//!
//! Fixed-size elements are concatenated. Variable-size elements are preceded
//! by one offset per element, each relative to the start of the sequence.

use crate::error::{DecodeError, EncodeError};
use crate::offset::{
    check_first_offset, check_fixed_len, check_min_len, check_offset, read_offset, write_offset,
    BYTES_PER_OFFSET,
};
use crate::Ssz;

fn encoded_len<T: Ssz>(items: &[T]) -> usize {
    match T::FIXED_SIZE {
        Some(size) => size * items.len(),
        None => items
            .iter()
            .map(|item| BYTES_PER_OFFSET + item.ssz_size())
            .sum(),
    }
}

fn marshal_items<T: Ssz>(items: &[T], buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    if T::FIXED_SIZE.is_none() {
        let mut offset = BYTES_PER_OFFSET * items.len();
        for item in items {
            write_offset(buf, offset)?;
            offset += item.ssz_size();
        }
    }
    for item in items {
        item.marshal_ssz_to(buf)?;
    }
    Ok(())
}

fn unmarshal_fixed_items<T: Ssz>(buf: &[u8], size: usize) -> Result<Vec<T>, DecodeError> {
    if size == 0 {
        if !buf.is_empty() {
            return Err(DecodeError::DecodeOverrun {
                expected: 0,
                actual: buf.len(),
            });
        }
        return Ok(Vec::new());
    }
    let trailing = buf.len() % size;
    if trailing != 0 {
        return Err(DecodeError::DecodeOverrun {
            expected: buf.len() - trailing,
            actual: buf.len(),
        });
    }
    buf.chunks_exact(size).map(T::unmarshal_ssz).collect()
}

/* `count` is known for vectors; lists derive it from the first offset */
fn unmarshal_variable_items<T: Ssz>(
    buf: &[u8],
    count: Option<usize>,
) -> Result<Vec<T>, DecodeError> {
    match count {
        Some(0) | None if buf.is_empty() => return Ok(Vec::new()),
        Some(0) => {
            return Err(DecodeError::DecodeOverrun {
                expected: 0,
                actual: buf.len(),
            })
        }
        _ => {}
    }

    check_min_len(buf, BYTES_PER_OFFSET)?;
    let first = read_offset(buf, 0);
    let count = match count {
        Some(count) => count,
        None => {
            if first == 0 || first % BYTES_PER_OFFSET != 0 {
                return Err(DecodeError::InvalidOffset {
                    offset: first,
                    previous: 0,
                    len: buf.len(),
                });
            }
            first / BYTES_PER_OFFSET
        }
    };

    let table_len = count * BYTES_PER_OFFSET;
    check_min_len(buf, table_len)?;
    check_first_offset(first, table_len, buf.len())?;

    let mut offsets = Vec::with_capacity(count);
    offsets.push(first);
    for idx in 1..count {
        let offset = read_offset(buf, idx * BYTES_PER_OFFSET);
        check_offset(offset, offsets[idx - 1], buf.len())?;
        offsets.push(offset);
    }

    let mut items = Vec::with_capacity(count);
    for (idx, &start) in offsets.iter().enumerate() {
        let end = offsets.get(idx + 1).copied().unwrap_or(buf.len());
        items.push(T::unmarshal_ssz(&buf[start..end])?);
    }
    Ok(items)
}

impl<T: Ssz> Ssz for Vec<T> {
    const FIXED_SIZE: Option<usize> = None;

    fn ssz_size(&self) -> usize {
        encoded_len(self)
    }

    fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        marshal_items(self, buf)
    }

    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError> {
        match T::FIXED_SIZE {
            Some(size) => unmarshal_fixed_items(buf, size),
            None => unmarshal_variable_items(buf, None),
        }
    }
}

impl<T: Ssz, const N: usize> Ssz for [T; N] {
    const FIXED_SIZE: Option<usize> = match T::FIXED_SIZE {
        Some(size) => Some(size * N),
        None => None,
    };

    fn ssz_size(&self) -> usize {
        encoded_len(self.as_slice())
    }

    fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        marshal_items(self.as_slice(), buf)
    }

    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError> {
        let items = match T::FIXED_SIZE {
            Some(size) => {
                check_fixed_len(buf, size * N)?;
                unmarshal_fixed_items(buf, size)?
            }
            None => unmarshal_variable_items(buf, Some(N))?,
        };
        let len = items.len();
        items
            .try_into()
            .map_err(|_| DecodeError::BufferTooShort {
                expected: N,
                actual: len,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_element_list() {
        let list: Vec<u16> = vec![1, 0x0203];
        let bytes = list.marshal_ssz().unwrap();
        assert_eq!(bytes, vec![1, 0, 3, 2]);
        assert_eq!(list.ssz_size(), 4);
        assert_eq!(Vec::<u16>::unmarshal_ssz(&bytes).unwrap(), list);
    }

    #[test]
    fn fixed_element_list_with_trailing_byte() {
        assert_eq!(
            Vec::<u16>::unmarshal_ssz(&[1, 0, 3]),
            Err(DecodeError::DecodeOverrun {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn variable_element_list_uses_offsets() {
        let list: Vec<Vec<u8>> = vec![vec![1, 2], vec![], vec![3]];
        let bytes = list.marshal_ssz().unwrap();
        assert_eq!(
            bytes,
            vec![12, 0, 0, 0, 14, 0, 0, 0, 14, 0, 0, 0, 1, 2, 3]
        );
        assert_eq!(list.ssz_size(), bytes.len());
        assert_eq!(Vec::<Vec<u8>>::unmarshal_ssz(&bytes).unwrap(), list);
    }

    #[test]
    fn variable_element_list_rejects_backwards_offsets() {
        let bytes = vec![8, 0, 0, 0, 7, 0, 0, 0, 1];
        assert!(matches!(
            Vec::<Vec<u8>>::unmarshal_ssz(&bytes),
            Err(DecodeError::InvalidOffset { offset: 7, .. })
        ));
    }

    #[test]
    fn variable_element_list_rejects_misaligned_first_offset() {
        let bytes = vec![5, 0, 0, 0, 1];
        assert!(matches!(
            Vec::<Vec<u8>>::unmarshal_ssz(&bytes),
            Err(DecodeError::InvalidOffset { offset: 5, .. })
        ));
    }

    #[test]
    fn empty_list_is_empty_buffer() {
        let list: Vec<Vec<u8>> = Vec::new();
        assert!(list.marshal_ssz().unwrap().is_empty());
        assert!(Vec::<Vec<u8>>::unmarshal_ssz(&[]).unwrap().is_empty());
    }

    #[test]
    fn fixed_array_roundtrip() {
        let arr: [u32; 3] = [1, 2, 3];
        assert_eq!(<[u32; 3]>::FIXED_SIZE, Some(12));
        let bytes = arr.marshal_ssz().unwrap();
        assert_eq!(<[u32; 3]>::unmarshal_ssz(&bytes).unwrap(), arr);
        assert!(matches!(
            <[u32; 3]>::unmarshal_ssz(&bytes[..11]),
            Err(DecodeError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn variable_array_roundtrip() {
        let arr: [Vec<u8>; 2] = [vec![1], vec![2, 3]];
        assert_eq!(<[Vec<u8>; 2]>::FIXED_SIZE, None);
        let bytes = arr.marshal_ssz().unwrap();
        assert_eq!(bytes, vec![8, 0, 0, 0, 9, 0, 0, 0, 1, 2, 3]);
        assert_eq!(<[Vec<u8>; 2]>::unmarshal_ssz(&bytes).unwrap(), arr);
    }
}
