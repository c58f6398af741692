//! Error types for bitstream operations.

use std::fmt;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// Attempted to read past the logical end of the buffer.
    Truncated {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: usize,
        /// Maximum allowed bits for this operation.
        max_bits: usize,
    },

    /// Value exceeds the range representable by the specified number of bits.
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: usize,
    },

    /// A packed integer used more groups than a `u32` can hold.
    InvalidPackedInt,

    /// A string contained a character outside of Latin-1.
    UnencodableChar {
        /// The offending character.
        ch: char,
    },

    /// A string length prefix was negative (wide-character strings are unsupported).
    WideString {
        /// The raw length prefix.
        len: i32,
    },

    /// A non-empty string did not end with a NUL byte.
    MissingTerminator,
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                requested,
                available,
            } => {
                write!(
                    f,
                    "truncated: attempted to read {requested} bits but only {available} bits available"
                )
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::InvalidPackedInt => write!(f, "packed integer overflows 32 bits"),
            Self::UnencodableChar { ch } => {
                write!(f, "character {ch:?} is outside the Latin-1 range")
            }
            Self::WideString { len } => {
                write!(f, "wide-character string (length prefix {len}) is unsupported")
            }
            Self::MissingTerminator => write!(f, "string is missing its NUL terminator"),
        }
    }
}

impl std::error::Error for BitError {}
