//! Control channel session over an established connection.

use std::net::SocketAddr;

use control::{
    decode_message, ChannelOpen, ControlMessage, DecodedMessage, FieldExportTable, GuidExport,
    Hello, Join, Login,
};
use tracing::{debug, info, trace, warn};
use wire::protocol::{wrap_channel_sequence, wrap_packet_sequence, CONTROL_CHANNEL_INDEX};
use wire::{decode_bunch, encode_bunch, Bunch, BunchHeader, ChannelName, PacketHeader};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::handshake::{perform_handshake, HandshakeContext};
use crate::transport::{Transport, UdpTransport};

/// Client session on the control channel.
///
/// Every datagram carries one bunch. Packet sequences count up from the
/// client sequence learned in the handshake; reliable bunches take the next
/// channel sequence after the initial reliable sequence.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    context: HandshakeContext,
    acked_sequence: u16,
    packets_sent: u32,
    reliable_sent: u32,
}

impl Session<UdpTransport> {
    /// Opens a UDP socket to `remote` and connects.
    pub fn connect_udp(remote: SocketAddr, config: SessionConfig) -> SessionResult<Self> {
        let transport = UdpTransport::connect(remote, config.recv_timeout)?;
        Self::connect(transport, config)
    }
}

impl<T: Transport> Session<T> {
    /// Runs the handshake over `transport`, or starts from the configured
    /// seed without one.
    pub fn connect(mut transport: T, config: SessionConfig) -> SessionResult<Self> {
        let context = match config.seed {
            Some(seed) => {
                info!(
                    client_sequence = seed.client_sequence,
                    server_sequence = seed.server_sequence,
                    "skipping handshake"
                );
                HandshakeContext::seeded(
                    seed.server_sequence,
                    seed.client_sequence,
                    seed.active_secret_id,
                )
            }
            None => perform_handshake(&mut transport, config.limits.max_packet_bytes)?,
        };
        Ok(Self::from_context(transport, config, context))
    }

    /// Builds a session from an already established context.
    #[must_use]
    pub fn from_context(transport: T, config: SessionConfig, context: HandshakeContext) -> Self {
        Self {
            acked_sequence: context.initial_acked_sequence(),
            transport,
            config,
            context,
            packets_sent: 0,
            reliable_sent: 0,
        }
    }

    /// Context the session was established with.
    pub const fn context(&self) -> &HandshakeContext {
        &self.context
    }

    /// Configuration the session was created with.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sequence acknowledged in the next packet.
    pub const fn acked_sequence(&self) -> u16 {
        self.acked_sequence
    }

    /// Sequence of the next packet sent.
    pub fn next_sequence(&self) -> u16 {
        wrap_packet_sequence(
            u32::from(self.context.client_sequence).wrapping_add(self.packets_sent),
        )
    }

    /// Channel sequence of the next reliable bunch.
    pub fn next_channel_sequence(&self) -> u16 {
        wrap_channel_sequence(
            u32::from(self.context.in_reliable_sequence)
                .wrapping_add(self.reliable_sent)
                .wrapping_add(1),
        )
    }

    /// Consumes the session, returning its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Frames `message` into the next datagram and advances the counters.
    ///
    /// Nothing advances if framing fails.
    pub fn frame<M: ControlMessage>(&mut self, message: &M) -> SessionResult<Vec<u8>> {
        let payload = message.encode().map_err(SessionError::Build)?;
        let flags = message.flags();

        let mut packet = PacketHeader::new(self.acked_sequence, self.next_sequence());
        packet.remote_bandwidth = self.config.remote_bandwidth;
        let mut header = BunchHeader::control(flags, message.channel_name());
        if flags.is_reliable() {
            header = header.with_channel_sequence(self.next_channel_sequence());
        }

        let datagram = encode_bunch(&packet, &header, &payload, &self.config.limits)?;
        trace!(
            sequence = packet.sequence,
            channel_sequence = header.channel_sequence,
            payload_bits = payload.bit_len(),
            bytes = datagram.len(),
            "bunch framed"
        );
        self.packets_sent = self.packets_sent.wrapping_add(1);
        if flags.is_reliable() {
            self.reliable_sent = self.reliable_sent.wrapping_add(1);
        }
        Ok(datagram)
    }

    /// Frames and sends `message`.
    pub fn send<M: ControlMessage>(&mut self, message: &M) -> SessionResult<()> {
        let datagram = self.frame(message)?;
        self.transport.send(&datagram)?;
        Ok(())
    }

    /// Opens the control channel with the configured network version.
    pub fn hello(&mut self) -> SessionResult<()> {
        debug!(network_version = self.config.network_version, "sending hello");
        self.send(&Hello::new(self.config.network_version))
    }

    /// Requests travel to `request_url`.
    pub fn login(&mut self, request_url: &str) -> SessionResult<()> {
        debug!(request_url, "sending login");
        self.send(&Login::new(request_url))
    }

    /// Joins the world after a successful login.
    pub fn join(&mut self) -> SessionResult<()> {
        self.send(&Join)
    }

    /// Exports `path` under `net_guid` in a partial bunch.
    pub fn export_guid(&mut self, net_guid: u32, path: &str) -> SessionResult<()> {
        debug!(net_guid, path, "exporting guid");
        self.send(&GuidExport::new(net_guid, path))
    }

    /// Sends a field export table.
    pub fn export_fields(&mut self, table: &FieldExportTable) -> SessionResult<()> {
        debug!(exports = table.exports.len(), "exporting fields");
        self.send(table)
    }

    /// Opens a channel named `name`.
    pub fn open_channel(&mut self, name: ChannelName) -> SessionResult<()> {
        debug!(%name, "opening channel");
        self.send(&ChannelOpen { name })
    }

    /// Receives one data datagram and acknowledges its sequence in later
    /// packets.
    pub fn receive(&mut self) -> SessionResult<Bunch> {
        let datagram = self.transport.recv(self.config.limits.max_packet_bytes)?;
        let bunch = decode_bunch(&datagram, &self.config.limits)?;
        trace!(
            sequence = bunch.packet.sequence,
            channel = bunch.header.channel_index,
            payload_bits = bunch.payload.bit_len(),
            "bunch received"
        );
        self.acked_sequence = bunch.packet.sequence;
        Ok(bunch)
    }

    /// Receives one control channel message.
    ///
    /// A server failure notice is returned as [`SessionError::PeerFailure`].
    pub fn receive_message(&mut self) -> SessionResult<DecodedMessage> {
        let bunch = self.receive()?;
        if bunch.header.channel_index != CONTROL_CHANNEL_INDEX {
            debug!(
                channel = bunch.header.channel_index,
                "message on non-control channel"
            );
        }
        match decode_message(bunch.header.flags, &bunch.payload).map_err(SessionError::Message)? {
            DecodedMessage::Failure(failure) => {
                warn!(reason = %failure.reason, "server reported failure");
                Err(SessionError::PeerFailure {
                    reason: failure.reason,
                })
            }
            message => Ok(message),
        }
    }
}
