//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A bit-level reader for decoding packed binary data.
///
/// Bits are consumed least-significant first within each byte. Every read is
/// bounded by `max_bits`; running past it yields [`BitError::Truncated`]
/// instead of a default value.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
    max_bits: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over every bit of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_pos: 0,
            max_bits: data.len().saturating_mul(8),
        }
    }

    /// Creates a reader limited to the first `bits` bits of `data`.
    ///
    /// Use this when the logical content length is known out of band, e.g.
    /// from a length prefix, so that termination padding is never read as data.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Truncated`] if `data` holds fewer than `bits` bits.
    pub const fn with_bit_len(data: &'a [u8], bits: usize) -> BitResult<Self> {
        let available = data.len().saturating_mul(8);
        if bits > available {
            return Err(BitError::Truncated {
                requested: bits,
                available,
            });
        }
        Ok(Self::bounded(data, bits))
    }

    pub(crate) const fn bounded(data: &'a [u8], bits: usize) -> Self {
        Self {
            data,
            bit_pos: 0,
            max_bits: bits,
        }
    }

    /// Returns the number of readable bits.
    #[must_use]
    pub const fn max_bits(&self) -> usize {
        self.max_bits
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.max_bits.saturating_sub(self.bit_pos)
    }

    /// Returns `true` once the cursor has reached the end of the readable bits.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.bit_pos >= self.max_bits
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        let bit = (self.data[self.bit_pos / 8] >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits as an unsigned integer, least-significant first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount {
                bits: bits as usize,
                max_bits: 64,
            });
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u64;
        for i in 0..bits {
            value |= u64::from(self.read_bit()?) << i;
        }
        Ok(value)
    }

    /// Reads 8 bits as a byte.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        self.ensure_bits(8)?;
        let mut byte = 0u8;
        for i in 0..8 {
            byte |= u8::from(self.read_bit()?) << i;
        }
        Ok(byte)
    }

    /// Reads 4 little-endian bytes as a `u32`.
    pub fn read_u32_le(&mut self) -> BitResult<u32> {
        self.ensure_bits(32)?;
        let mut bytes = [0u8; 4];
        for byte in &mut bytes {
            *byte = self.read_byte()?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads 4 little-endian bytes as an IEEE-754 single-precision float.
    pub fn read_f32_le(&mut self) -> BitResult<f32> {
        Ok(f32::from_bits(self.read_u32_le()?))
    }

    /// Reads `bits` bits into bytes, LSB-first within each byte.
    ///
    /// When `bits` is not a multiple of 8 the unused high bits of the final
    /// byte are zero.
    pub fn read_buffer(&mut self, bits: usize) -> BitResult<Vec<u8>> {
        self.ensure_bits(bits)?;
        let mut out = vec![0u8; bits.div_ceil(8)];
        for i in 0..bits {
            if self.read_bit()? {
                out[i / 8] |= 1 << (i % 8);
            }
        }
        Ok(out)
    }

    /// Skips `bits` bits.
    pub fn skip_bits(&mut self, bits: usize) -> BitResult<()> {
        self.ensure_bits(bits)?;
        self.bit_pos += bits;
        Ok(())
    }

    pub(crate) fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::Truncated {
                requested: bits,
                available,
            });
        }
        Ok(())
    }
}
