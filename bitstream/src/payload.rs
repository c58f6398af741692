//! Finalized bit payloads.

use crate::error::{BitError, BitResult};
use crate::reader::BitReader;

/// Finalized writer output together with its logical bit length.
///
/// The byte buffer may carry termination padding; `bit_len` counts only the
/// bits that were actually written, which is what a length-prefixed frame
/// must embed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl Payload {
    /// Creates a payload from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bytes` holds fewer than `bit_len` bits.
    pub fn from_parts(bytes: Vec<u8>, bit_len: usize) -> BitResult<Self> {
        let max_bits = bytes.len().saturating_mul(8);
        if bit_len > max_bits {
            return Err(BitError::InvalidBitCount {
                bits: bit_len,
                max_bits,
            });
        }
        Ok(Self { bytes, bit_len })
    }

    pub(crate) const fn new_unchecked(bytes: Vec<u8>, bit_len: usize) -> Self {
        Self { bytes, bit_len }
    }

    /// Returns the logical length in bits.
    #[must_use]
    pub const fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns `true` if no bits were written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Returns the finalized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns a reader bounded to the logical bit length.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::bounded(&self.bytes, self.bit_len)
    }
}
