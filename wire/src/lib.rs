//! Packet and channel bunch framing for the uenet transport codec.
//!
//! This crate handles the data-packet layout that follows a completed
//! handshake: the packet header (sequence numbers), the bunch header (channel
//! flags, channel sequence, channel name), and the bit-length-prefixed
//! payload. It does not know what the payload means; message bodies live in
//! the `control` crate.
//!
//! # Design Principles
//!
//! - **Named layout** - Every width and reserved run is a constant in [`protocol`].
//! - **Exact lengths** - Payloads are embedded by bit length, never by padded byte length.
//! - **Bounded decoding** - Datagram and payload sizes are checked against [`Limits`].

mod bunch;
mod error;
mod flags;
mod header;
mod limits;
pub mod protocol;

pub use bitstream::Payload;
pub use bunch::{decode_bunch, encode_bunch, Bunch};
pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use flags::BunchFlags;
pub use header::{BunchHeader, PacketHeader};
pub use limits::Limits;
pub use protocol::ChannelName;
