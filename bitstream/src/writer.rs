//! Bit-level writer for encoding packed binary data.

use crate::error::{BitError, BitResult};
use crate::payload::Payload;

/// A bit-level writer for encoding packed binary data.
///
/// Bits are written least-significant first within each byte. The backing
/// buffer grows by one zero byte whenever the cursor crosses into a byte that
/// does not exist yet, so previously written bits are never discarded.
///
/// A *padded* writer terminates its output on [`finish`](Self::finish): a
/// trailing partial byte receives a `1` bit followed by zeros, and an extra
/// `0x01` byte is appended when the output would otherwise end in `0x00`.
#[derive(Debug, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: usize,
    padded: bool,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    /// Creates a new padded `BitWriter`.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_padding(true)
    }

    /// Creates a writer whose output is returned exactly as written.
    #[must_use]
    pub const fn unpadded() -> Self {
        Self::with_padding(false)
    }

    /// Creates a writer with an explicit padding mode.
    #[must_use]
    pub const fn with_padding(padded: bool) -> Self {
        Self {
            bytes: Vec::new(),
            bit_pos: 0,
            padded,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit_pos
    }

    /// Returns the bytes written so far, including any partial byte.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        let byte_idx = self.bit_pos / 8;
        if byte_idx == self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_idx] |= 1 << (self.bit_pos % 8);
        }
        self.bit_pos += 1;
    }

    /// Writes the 8 bits of `byte`, least-significant first.
    pub fn write_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.write_bit((byte >> i) & 1 == 1);
        }
    }

    /// Writes `bits` bits drawn LSB-first, byte by byte, from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bytes` holds fewer than `bits` bits.
    pub fn write_buffer(&mut self, bytes: &[u8], bits: usize) -> BitResult<()> {
        let max_bits = bytes.len().saturating_mul(8);
        if bits > max_bits {
            return Err(BitError::InvalidBitCount { bits, max_bits });
        }
        for i in 0..bits {
            self.write_bit((bytes[i / 8] >> (i % 8)) & 1 == 1);
        }
        Ok(())
    }

    /// Writes the low `bits` bits of `value`, least-significant first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount {
                bits: bits as usize,
                max_bits: 64,
            });
        }
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange {
                value,
                bits: bits as usize,
            });
        }
        for i in 0..bits {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Writes a `u32` as 4 little-endian bytes (always 32 bits).
    pub fn write_u32_le(&mut self, value: u32) {
        for byte in value.to_le_bytes() {
            self.write_byte(byte);
        }
    }

    /// Writes an IEEE-754 single-precision float as 4 little-endian bytes.
    pub fn write_f32_le(&mut self, value: f32) {
        self.write_u32_le(value.to_bits());
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// Padded writers terminate the output as described on [`BitWriter`];
    /// unpadded writers return the buffer as-is, including a trailing partial
    /// byte whose unused high bits are zero.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        if self.padded {
            self.terminate();
        }
        self.bytes
    }

    /// Finishes writing and returns the bytes together with the bit length
    /// written before any termination padding.
    #[must_use]
    pub fn finish_payload(self) -> Payload {
        let bit_len = self.bit_pos;
        Payload::new_unchecked(self.finish(), bit_len)
    }

    fn terminate(&mut self) {
        if self.bit_pos % 8 != 0 {
            self.write_bit(true);
            while self.bit_pos % 8 != 0 {
                self.write_bit(false);
            }
        }
        if self.bytes.last().map_or(true, |&byte| byte == 0) {
            self.bytes.push(0x01);
            self.bit_pos += 8;
        }
    }
}
