//! Error types for wire format operations.

use std::fmt;

use bitstream::BitError;

/// Result type for wire decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding a datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// A field could not be read from the bitstream.
    Bit(BitError),

    /// The leading bit marks a handshake packet, not a data packet.
    NotDataPacket,

    /// The channel name was sent as a string instead of a hardcoded index.
    UnhardcodedChannelName,

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Errors that can occur while encoding a datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// A field did not fit its declared width.
    Bit(BitError),

    /// The bunch flags cannot be represented on the wire.
    InvalidFlags { flags: u16 },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PacketBytes,
    PayloadBits,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(err) => write!(f, "bitstream error: {err}"),
            Self::NotDataPacket => write!(f, "datagram is a handshake packet, not a data packet"),
            Self::UnhardcodedChannelName => {
                write!(f, "channel name is not a hardcoded index")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(err) => write!(f, "bitstream error: {err}"),
            Self::InvalidFlags { flags } => write!(f, "invalid bunch flags: 0x{flags:04X}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PacketBytes => "packet bytes",
            Self::PayloadBits => "payload bits",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BitError> for DecodeError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}

impl From<BitError> for EncodeError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}
