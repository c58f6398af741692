//! Message types and the shared control message trait.

use bitstream::{BitReader, Payload};
use wire::{BunchFlags, ChannelName};

use crate::error::{ControlError, ControlResult};

/// Control channel message type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Client greeting carrying the network version.
    Hello = 0x00,
    /// Server challenge sent in response to a hello.
    Challenge = 0x03,
    /// Client login request.
    Login = 0x05,
    /// Server-side failure notice.
    Failure = 0x06,
    /// Client request to join the world.
    Join = 0x09,
}

impl MessageType {
    /// Maps a raw type byte to a known message type.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(Self::Hello),
            0x03 => Some(Self::Challenge),
            0x05 => Some(Self::Login),
            0x06 => Some(Self::Failure),
            0x09 => Some(Self::Join),
            _ => None,
        }
    }

    /// Returns the raw type byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// A message body that can be framed into a control channel bunch.
pub trait ControlMessage {
    /// Flags of the bunch carrying this message.
    fn flags(&self) -> BunchFlags;

    /// Name of the channel the bunch is addressed to.
    fn channel_name(&self) -> ChannelName {
        ChannelName::Control
    }

    /// Encodes the message body.
    fn encode(&self) -> ControlResult<Payload>;
}

pub(crate) fn expect_type(reader: &mut BitReader<'_>, expected: MessageType) -> ControlResult<()> {
    let found = reader.read_byte()?;
    if found != expected.raw() {
        return Err(ControlError::UnexpectedMessageType { expected, found });
    }
    Ok(())
}

pub(crate) fn expect_end(reader: &BitReader<'_>) -> ControlResult<()> {
    match reader.bits_remaining() {
        0 => Ok(()),
        bits => Err(ControlError::TrailingBits { bits }),
    }
}
