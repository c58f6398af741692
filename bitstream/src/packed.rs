//! Packed (7-bit group) integer encoding.
//!
//! Each encoded byte carries 7 value bits in its upper bits and a
//! continuation flag in bit 0. Groups are emitted least-significant first
//! and the encoding is always minimal; zero is a single `0x00` byte.

use crate::error::{BitError, BitResult};
use crate::reader::BitReader;
use crate::writer::BitWriter;

/// Maximum number of bytes a packed `u32` occupies.
pub const MAX_PACKED_U32_BYTES: usize = 5;

/// Returns the number of bytes `value` occupies when packed.
#[must_use]
pub const fn packed_u32_len(value: u32) -> usize {
    let significant = 32 - value.leading_zeros() as usize;
    if significant == 0 {
        1
    } else {
        significant.div_ceil(7)
    }
}

impl BitWriter {
    /// Writes `value` as a packed integer.
    pub fn write_packed_u32(&mut self, value: u32) {
        let mut remaining = value;
        loop {
            let mut byte = ((remaining & 0x7F) as u8) << 1;
            remaining >>= 7;
            if remaining != 0 {
                byte |= 1;
            }
            self.write_byte(byte);
            if remaining == 0 {
                return;
            }
        }
    }
}

impl BitReader<'_> {
    /// Reads a packed integer.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidPackedInt`] if the groups overflow a `u32`.
    pub fn read_packed_u32(&mut self) -> BitResult<u32> {
        let mut value = 0u32;
        for group in 0..MAX_PACKED_U32_BYTES {
            let byte = self.read_byte()?;
            let bits = u32::from(byte >> 1);
            let shift = group * 7;
            let shifted = bits << shift;
            if shifted >> shift != bits {
                return Err(BitError::InvalidPackedInt);
            }
            value |= shifted;
            if byte & 1 == 0 {
                return Ok(value);
            }
        }
        Err(BitError::InvalidPackedInt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(value: u32) -> Vec<u8> {
        let mut writer = BitWriter::unpadded();
        writer.write_packed_u32(value);
        writer.finish()
    }

    #[test]
    fn zero_is_single_zero_byte() {
        assert_eq!(pack(0), vec![0x00]);
    }

    #[test]
    fn small_values_fit_one_byte() {
        assert_eq!(pack(1), vec![0x02]);
        assert_eq!(pack(0x7F), vec![0xFE]);
    }

    #[test]
    fn control_name_index() {
        // 0xFF = 0x7F | 0x01 << 7
        assert_eq!(pack(0xFF), vec![0xFF, 0x02]);
    }

    #[test]
    fn high_bit_handle_uses_five_bytes() {
        let bytes = pack(0x8000_0000);
        assert_eq!(bytes.len(), 5);
        assert_eq!(bytes, vec![0x01, 0x01, 0x01, 0x01, 0x10]);
    }

    #[test]
    fn packed_len_matches_encoding() {
        for value in [0, 1, 0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF, u32::MAX] {
            assert_eq!(pack(value).len(), packed_u32_len(value), "value {value:#x}");
        }
    }

    #[test]
    fn read_roundtrip() {
        for value in [0, 1, 0x33, 0xFF, 0x100, 0x8000_0000, u32::MAX] {
            let bytes = pack(value);
            let mut reader = BitReader::new(&bytes);
            assert_eq!(reader.read_packed_u32().unwrap(), value);
            assert!(reader.is_done());
        }
    }

    #[test]
    fn read_unaligned() {
        let mut writer = BitWriter::unpadded();
        writer.write_bit(true);
        writer.write_packed_u32(300);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_packed_u32().unwrap(), 300);
    }

    #[test]
    fn read_overflow_rejected() {
        // Fifth group carries more than the 4 remaining bits.
        let mut reader = BitReader::new(&[0x01, 0x01, 0x01, 0x01, 0x20]);
        assert_eq!(reader.read_packed_u32(), Err(BitError::InvalidPackedInt));
    }

    #[test]
    fn read_too_many_groups_rejected() {
        let mut reader = BitReader::new(&[0x01; 6]);
        assert_eq!(reader.read_packed_u32(), Err(BitError::InvalidPackedInt));
    }

    #[test]
    fn read_truncated() {
        let mut reader = BitReader::new(&[0x01]);
        assert!(matches!(
            reader.read_packed_u32(),
            Err(BitError::Truncated { .. })
        ));
    }
}
