//! Session configuration.

use std::time::Duration;

use wire::protocol::{DEFAULT_NETWORK_VERSION, DEFAULT_REMOTE_BANDWIDTH};
use wire::Limits;

/// Sequence numbers for a server that does not run the stateless handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSeed {
    pub server_sequence: u16,
    pub client_sequence: u16,
    pub active_secret_id: bool,
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SessionConfig {
    /// Network version announced in the hello.
    pub network_version: u32,

    /// Bandwidth estimate byte written into every packet header.
    pub remote_bandwidth: u8,

    /// How long a receive may block. `None` blocks forever.
    pub recv_timeout: Option<Duration>,

    /// Wire limits; `max_packet_bytes` doubles as the receive buffer size.
    pub limits: Limits,

    /// Skip the handshake and start from these sequence numbers.
    pub seed: Option<SessionSeed>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            network_version: DEFAULT_NETWORK_VERSION,
            remote_bandwidth: DEFAULT_REMOTE_BANDWIDTH,
            recv_timeout: Some(Duration::from_secs(5)),
            limits: Limits::default(),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Sets the network version announced in the hello.
    #[must_use]
    pub const fn with_network_version(mut self, network_version: u32) -> Self {
        self.network_version = network_version;
        self
    }

    /// Sets the bandwidth byte written into packet headers.
    #[must_use]
    pub const fn with_remote_bandwidth(mut self, remote_bandwidth: u8) -> Self {
        self.remote_bandwidth = remote_bandwidth;
        self
    }

    /// Sets the receive timeout; `None` blocks forever.
    #[must_use]
    pub const fn with_recv_timeout(mut self, recv_timeout: Option<Duration>) -> Self {
        self.recv_timeout = recv_timeout;
        self
    }

    /// Sets the datagram and payload limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Skips the handshake, starting from `seed`.
    #[must_use]
    pub const fn with_seed(mut self, seed: SessionSeed) -> Self {
        self.seed = Some(seed);
        self
    }
}
