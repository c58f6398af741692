//! Handshake and control channel session for the uenet transport codec.
//!
//! [`Session::connect`] runs the stateless handshake over any [`Transport`],
//! then frames control messages with sequence numbers derived from the
//! server's cookie. The handshake itself is available sans-IO as
//! [`Handshake`] for callers that own their socket loop.
//!
//! Errors carry an [`ErrorClass`] telling local encoding mistakes apart from
//! bad peer data and network failures.

mod config;
mod error;
mod handshake;
mod session;
mod transport;

pub use config::{SessionConfig, SessionSeed};
pub use error::{
    ErrorClass, HandshakeError, HandshakeResult, SessionError, SessionResult, TransportError,
};
pub use handshake::{
    challenge_datagram, perform_handshake, Handshake, HandshakeContext, HandshakeState,
    ACK_MIN_BITS, CHALLENGE_MAGIC, CHALLENGE_ZERO_BITS, CONFIRM_MIN_BITS, COOKIE_BITS,
    COOKIE_BYTES,
};
pub use session::Session;
pub use transport::{Transport, UdpTransport};
