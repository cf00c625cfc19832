use crate::error::{DecodeError, EncodeError};
use crate::offset::{check_fixed_len, decode_bool, read_array};
use crate::Ssz;

macro_rules! impl_ssz_uint {
    ($($t:ty),*) => {
        $(
            impl Ssz for $t {
                const FIXED_SIZE: Option<usize> = Some(std::mem::size_of::<$t>());

                fn ssz_size(&self) -> usize {
                    std::mem::size_of::<$t>()
                }

                fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
                    buf.extend_from_slice(&self.to_le_bytes());
                    Ok(())
                }

                fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError> {
                    check_fixed_len(buf, std::mem::size_of::<$t>())?;
                    Ok(<$t>::from_le_bytes(read_array(buf, 0)))
                }
            }
        )*
    };
}

impl_ssz_uint!(u8, u16, u32, u64, u128);

impl Ssz for bool {
    const FIXED_SIZE: Option<usize> = Some(1);

    fn ssz_size(&self) -> usize {
        1
    }

    fn marshal_ssz_to(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(*self as u8);
        Ok(())
    }

    fn unmarshal_ssz(buf: &[u8]) -> Result<Self, DecodeError> {
        check_fixed_len(buf, 1)?;
        decode_bool(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_roundtrip_little_endian() {
        let bytes = 0x0102_0304u32.marshal_ssz().unwrap();
        assert_eq!(bytes, vec![4, 3, 2, 1]);
        assert_eq!(u32::unmarshal_ssz(&bytes), Ok(0x0102_0304));
        assert_eq!(u128::FIXED_SIZE, Some(16));
    }

    #[test]
    fn uint_rejects_wrong_length() {
        assert_eq!(
            u64::unmarshal_ssz(&[1, 2, 3]),
            Err(DecodeError::BufferTooShort {
                expected: 8,
                actual: 3
            })
        );
        assert_eq!(
            u16::unmarshal_ssz(&[1, 2, 3]),
            Err(DecodeError::DecodeOverrun {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn bool_is_strict() {
        assert_eq!(true.marshal_ssz().unwrap(), vec![1]);
        assert_eq!(bool::unmarshal_ssz(&[0]), Ok(false));
        assert_eq!(bool::unmarshal_ssz(&[7]), Err(DecodeError::InvalidBool(7)));
    }
}
