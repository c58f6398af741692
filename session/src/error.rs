//! Error types for the handshake and session layers.

use bitstream::BitError;
use control::ControlError;
use wire::{DecodeError, EncodeError};

use crate::handshake::HandshakeState;

/// Result type for handshake steps.
pub type HandshakeResult<T> = Result<T, HandshakeError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the transport collaborator.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No datagram arrived before the read timeout elapsed.
    #[error("receive timed out")]
    Timeout,

    /// The transport has no more datagrams to deliver.
    #[error("transport closed")]
    Closed,

    /// The socket failed.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while driving the handshake.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandshakeError {
    /// A datagram does not match the layout expected in `state`.
    #[error("unexpected datagram in {state:?}: {detail}")]
    UnexpectedShape {
        state: HandshakeState,
        detail: &'static str,
    },

    /// A handshake field could not be decoded.
    #[error("malformed handshake datagram: {0}")]
    Malformed(#[from] BitError),

    /// A step was requested out of order.
    #[error("cannot {op} in handshake state {state:?}")]
    InvalidState {
        state: HandshakeState,
        op: &'static str,
    },
}

/// Which side of the connection an error points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller asked for something that cannot be encoded; fix the caller.
    LocalEncoding,
    /// The peer sent something unexpected; abort the session.
    PeerData,
    /// The network failed; the caller may reconnect.
    Network,
}

/// Errors surfaced by [`Session`](crate::Session) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A bunch could not be framed.
    #[error("failed to frame bunch: {0}")]
    Encode(#[from] EncodeError),

    /// A received datagram could not be parsed.
    #[error("failed to parse datagram: {0}")]
    Decode(#[from] DecodeError),

    /// A message body could not be built from the caller's values.
    #[error("failed to build message: {0}")]
    Build(#[source] ControlError),

    /// A received message body could not be parsed.
    #[error("failed to parse message: {0}")]
    Message(#[source] ControlError),

    /// The server reported a failure and will close the connection.
    #[error("server reported failure: {reason}")]
    PeerFailure { reason: String },
}

impl SessionError {
    /// Classifies the error by the remedy it calls for.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Handshake(HandshakeError::InvalidState { .. })
            | Self::Encode(_)
            | Self::Build(_) => ErrorClass::LocalEncoding,
            Self::Handshake(_) | Self::Decode(_) | Self::Message(_) | Self::PeerFailure { .. } => {
                ErrorClass::PeerData
            }
            Self::Transport(_) => ErrorClass::Network,
        }
    }
}
