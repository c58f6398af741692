//! Error types for control message encoding and decoding.

use std::fmt;

use bitstream::BitError;

use crate::message::MessageType;

/// Result type for control message operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while building or parsing control messages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControlError {
    /// A field could not be written or read.
    Bit(BitError),

    /// The message type byte is not one this crate understands.
    UnknownMessageType { raw: u8 },

    /// The message type byte does not match the requested decoder.
    UnexpectedMessageType { expected: MessageType, found: u8 },

    /// A field holds a value this client does not support.
    Unsupported { field: &'static str },

    /// Bits were left over after the message was fully decoded.
    TrailingBits { bits: usize },
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(err) => write!(f, "bitstream error: {err}"),
            Self::UnknownMessageType { raw } => write!(f, "unknown message type 0x{raw:02X}"),
            Self::UnexpectedMessageType { expected, found } => {
                write!(f, "expected {expected:?} message, found type 0x{found:02X}")
            }
            Self::Unsupported { field } => write!(f, "unsupported value in {field}"),
            Self::TrailingBits { bits } => write!(f, "{bits} trailing bits after message"),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BitError> for ControlError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}
