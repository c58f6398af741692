//! Length-prefixed, NUL-terminated string encoding.
//!
//! A string is written as a 32-bit little-endian length that counts the
//! trailing NUL, followed by that many bytes. Only Latin-1 characters are
//! representable; the engine's negative-length wide form is not supported.

use crate::error::{BitError, BitResult};
use crate::reader::BitReader;
use crate::writer::BitWriter;

impl BitWriter {
    /// Writes `value` as a length-prefixed, NUL-terminated string.
    ///
    /// An empty string still carries its terminator (length prefix `1`).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::UnencodableChar`] for characters above U+00FF.
    pub fn write_string(&mut self, value: &str) -> BitResult<()> {
        let mut encoded = Vec::with_capacity(value.len() + 1);
        for ch in value.chars() {
            let byte = u8::try_from(u32::from(ch)).map_err(|_| BitError::UnencodableChar { ch })?;
            encoded.push(byte);
        }
        encoded.push(0);

        let len = u32::try_from(encoded.len()).map_err(|_| BitError::ValueOutOfRange {
            value: encoded.len() as u64,
            bits: 32,
        })?;
        self.write_u32_le(len);
        for byte in encoded {
            self.write_byte(byte);
        }
        Ok(())
    }
}

impl BitReader<'_> {
    /// Reads a length-prefixed string, stripping its NUL terminator.
    ///
    /// A zero length prefix decodes as the empty string.
    pub fn read_string(&mut self) -> BitResult<String> {
        let len = self.read_u32_le()? as i32;
        if len < 0 {
            return Err(BitError::WideString { len });
        }
        if len == 0 {
            return Ok(String::new());
        }
        let len = len as usize;
        self.ensure_bits(len.saturating_mul(8))?;

        let mut value = String::with_capacity(len - 1);
        for _ in 0..len - 1 {
            value.push(char::from(self.read_byte()?));
        }
        if self.read_byte()? != 0 {
            return Err(BitError::MissingTerminator);
        }
        Ok(value)
    }
}
