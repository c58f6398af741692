//! Configurable limits for bounded encoding and decoding.

use crate::protocol::MAX_BUNCH_DATA_BITS;

/// Wire-level limits.
///
/// Enforced on both directions: an oversized outgoing datagram is a local
/// encoding error, an oversized incoming one is rejected before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum datagram size in bytes, also used as the receive buffer size.
    pub max_packet_bytes: usize,

    /// Maximum bunch payload in bits. Never above what the length prefix can express.
    pub max_payload_bits: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_packet_bytes: 1024,
            max_payload_bits: MAX_BUNCH_DATA_BITS,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_bytes: 256,
            max_payload_bits: 1024,
        }
    }

    /// Creates the loosest limits the wire format allows.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_bytes: usize::MAX,
            max_payload_bits: MAX_BUNCH_DATA_BITS,
        }
    }

    /// Returns the effective payload limit, clamped to the length prefix.
    #[must_use]
    pub const fn payload_bits(&self) -> usize {
        if self.max_payload_bits < MAX_BUNCH_DATA_BITS {
            self.max_payload_bits
        } else {
            MAX_BUNCH_DATA_BITS
        }
    }
}
