//! LSB-first bit packing primitives for the uenet transport codec.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding
//! and decoding in the layout used by the engine's packet archives: fields are
//! packed at arbitrary bit offsets, least-significant bit first, and
//! multi-byte integers are little-endian.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded reads** - Reading past the logical end is [`BitError::Truncated`], never a default value.
//! - **Checked writes** - Values wider than their declared bit width are rejected.
//! - **No protocol knowledge** - This crate knows nothing about packets, channels, or handshakes.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::unpadded();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//! writer.write_packed_u32(0xFF);
//! writer.write_string("/Game/Entry").unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_packed_u32().unwrap(), 0xFF);
//! assert_eq!(reader.read_string().unwrap(), "/Game/Entry");
//! ```

mod error;
mod packed;
mod payload;
mod reader;
mod string;
mod writer;

pub use error::{BitError, BitResult};
pub use packed::{packed_u32_len, MAX_PACKED_U32_BYTES};
pub use payload::Payload;
pub use reader::BitReader;
pub use writer::BitWriter;
