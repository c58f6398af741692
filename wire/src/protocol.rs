//! Protocol constants for the packet and bunch layout.
//!
//! Bit widths, reserved runs, and hardcoded name indices live here so that a
//! protocol variant can be described without touching the framing logic.

use std::fmt;

/// Reserved zero bits at the start of every data packet body.
pub const RESERVED_HEADER_BITS: usize = 4;

/// Width of the packet sequence and acknowledged sequence fields.
pub const PACKET_SEQUENCE_BITS: u8 = 14;

/// Packet sequences wrap at this value.
pub const MAX_PACKET_SEQUENCE: u16 = 1 << PACKET_SEQUENCE_BITS;

/// Reserved zero bits occupying the frame time slot.
pub const FRAME_TIME_BITS: usize = 32;

/// Width of the per-channel reliable sequence.
pub const CHANNEL_SEQUENCE_BITS: u8 = 10;

/// Channel sequences wrap at this value.
pub const MAX_CHANNEL_SEQUENCE: u16 = 1 << CHANNEL_SEQUENCE_BITS;

/// Width of the bunch payload bit-length prefix.
pub const BUNCH_DATA_LEN_BITS: u8 = 13;

/// Largest payload a single bunch can carry, in bits.
pub const MAX_BUNCH_DATA_BITS: usize = (1 << BUNCH_DATA_LEN_BITS) - 1;

/// Remote bandwidth estimate sent by this client.
pub const DEFAULT_REMOTE_BANDWIDTH: u8 = 0x41;

/// Index of the control channel.
pub const CONTROL_CHANNEL_INDEX: u8 = 0;

/// Network version of the server build this client was written against.
pub const DEFAULT_NETWORK_VERSION: u32 = 0x4945_CD76;

/// Wraps a counter into the packet sequence space.
#[must_use]
pub const fn wrap_packet_sequence(value: u32) -> u16 {
    (value % MAX_PACKET_SEQUENCE as u32) as u16
}

/// Wraps a counter into the channel sequence space.
#[must_use]
pub const fn wrap_channel_sequence(value: u32) -> u16 {
    (value % MAX_CHANNEL_SEQUENCE as u32) as u16
}

/// Channel name, serialized as a hardcoded name-table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelName {
    /// No name; also what a bunch that carries no name decodes to.
    #[default]
    None,
    /// Actor replication channel.
    Actor,
    /// Control channel.
    Control,
    /// Voice channel.
    Voice,
    /// Any other hardcoded index.
    Other(u32),
}

impl ChannelName {
    const NONE_INDEX: u32 = 0x00;
    const ACTOR_INDEX: u32 = 0x66;
    const CONTROL_INDEX: u32 = 0xFF;
    const VOICE_INDEX: u32 = 0x100;

    /// Returns the hardcoded name index.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::None => Self::NONE_INDEX,
            Self::Actor => Self::ACTOR_INDEX,
            Self::Control => Self::CONTROL_INDEX,
            Self::Voice => Self::VOICE_INDEX,
            Self::Other(index) => index,
        }
    }

    /// Maps a hardcoded name index back to a channel name.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        match index {
            Self::NONE_INDEX => Self::None,
            Self::ACTOR_INDEX => Self::Actor,
            Self::CONTROL_INDEX => Self::Control,
            Self::VOICE_INDEX => Self::Voice,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Actor => write!(f, "Actor"),
            Self::Control => write!(f, "Control"),
            Self::Voice => write!(f, "Voice"),
            Self::Other(index) => write!(f, "name#{index:#x}"),
        }
    }
}
