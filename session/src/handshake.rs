//! Stateless connect handshake.
//!
//! The client sends a fixed-shape challenge, the server answers with a
//! cookie, the client echoes the cookie back and the server confirms.
//! [`Handshake`] holds no socket; [`perform_handshake`] drives it over a
//! [`Transport`].
//!
//! ```text
//! Idle --challenge--> SynSent --ack--> AckReceived --response--> SynAckSent --confirm--> Established
//!   any failure --> Failed
//! ```

use bitstream::{BitReader, BitWriter};
use tracing::{debug, info, warn};
use wire::protocol::{wrap_channel_sequence, wrap_packet_sequence, MAX_PACKET_SEQUENCE};

use crate::error::{HandshakeError, HandshakeResult, SessionResult};
use crate::transport::Transport;

/// Zero bits following the handshake bit in the challenge.
pub const CHALLENGE_ZERO_BITS: usize = 191;

/// Trailing byte of the challenge.
pub const CHALLENGE_MAGIC: u8 = 0x08;

/// Cookie length in bytes.
pub const COOKIE_BYTES: usize = 20;

/// Cookie length in bits.
pub const COOKIE_BITS: usize = COOKIE_BYTES * 8;

/// Handshake bit, restart bit, and secret id bit.
const PREFIX_BITS: usize = 3;

/// Smallest server ack: prefix, timestamp, cookie.
pub const ACK_MIN_BITS: usize = PREFIX_BITS + 32 + COOKIE_BITS;

/// Smallest server confirmation: prefix and timestamp.
pub const CONFIRM_MIN_BITS: usize = PREFIX_BITS + 32;

/// Capability bits closing the challenge response.
const RESPONSE_TRAILER: [bool; 5] = [true, false, false, false, false];

/// Where the handshake stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HandshakeState {
    #[default]
    Idle,
    SynSent,
    AckReceived,
    SynAckSent,
    Established,
    Failed,
}

/// Values learned from the server ack, and the sequence numbers derived
/// from its cookie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandshakeContext {
    /// Server timestamp, echoed back in the response.
    pub timestamp: f32,
    pub cookie: [u8; COOKIE_BYTES],
    /// Which of the server's two secrets signed the cookie.
    pub active_secret_id: bool,
    /// First packet sequence the server will send.
    pub server_sequence: u16,
    /// First packet sequence this client sends.
    pub client_sequence: u16,
    /// Initial reliable sequence on every channel.
    pub in_reliable_sequence: u16,
}

impl HandshakeContext {
    /// Derives the sequence numbers from `cookie`.
    ///
    /// Bytes 0..2 seed the server sequence and bytes 2..4 the client
    /// sequence, both read little-endian and masked to 14 bits.
    #[must_use]
    pub fn from_cookie(timestamp: f32, cookie: [u8; COOKIE_BYTES], active_secret_id: bool) -> Self {
        let server_sequence = sequence_from(cookie[0], cookie[1]);
        let client_sequence = sequence_from(cookie[2], cookie[3]);
        Self {
            timestamp,
            cookie,
            active_secret_id,
            server_sequence,
            client_sequence,
            in_reliable_sequence: wrap_channel_sequence(u32::from(client_sequence)),
        }
    }

    /// Builds a context for a server that skips the stateless handshake.
    ///
    /// The cookie is zeroed; only the sequence numbers matter after setup.
    #[must_use]
    pub fn seeded(server_sequence: u16, client_sequence: u16, active_secret_id: bool) -> Self {
        let server_sequence = wrap_packet_sequence(u32::from(server_sequence));
        let client_sequence = wrap_packet_sequence(u32::from(client_sequence));
        Self {
            timestamp: 0.0,
            cookie: [0; COOKIE_BYTES],
            active_secret_id,
            server_sequence,
            client_sequence,
            in_reliable_sequence: wrap_channel_sequence(u32::from(client_sequence)),
        }
    }

    /// Packet sequence acknowledged in the first client packet: the one
    /// before the server's initial sequence.
    #[must_use]
    pub const fn initial_acked_sequence(&self) -> u16 {
        let max = MAX_PACKET_SEQUENCE as u32;
        ((self.server_sequence as u32 + max - 1) % max) as u16
    }
}

fn sequence_from(low: u8, high: u8) -> u16 {
    wrap_packet_sequence(u32::from(u16::from_le_bytes([low, high])))
}

/// Sans-IO handshake state machine.
///
/// Every step checks the current state; a step taken out of order, or a
/// datagram of the wrong shape, moves the machine to
/// [`HandshakeState::Failed`] for good.
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    state: HandshakeState,
    context: Option<HandshakeContext>,
    confirm_timestamp: Option<f32>,
}

impl Handshake {
    /// Creates a handshake in [`HandshakeState::Idle`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
            context: None,
            confirm_timestamp: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> HandshakeState {
        self.state
    }

    /// Context learned from the server ack, once received.
    #[must_use]
    pub const fn context(&self) -> Option<&HandshakeContext> {
        self.context.as_ref()
    }

    /// Timestamp carried by the server confirmation, once received.
    #[must_use]
    pub const fn confirm_timestamp(&self) -> Option<f32> {
        self.confirm_timestamp
    }

    /// Marks the handshake as failed, e.g. after a transport error.
    pub fn fail(&mut self) {
        self.state = HandshakeState::Failed;
    }

    /// Builds the initial challenge datagram.
    pub fn challenge(&mut self) -> HandshakeResult<Vec<u8>> {
        self.step(
            HandshakeState::Idle,
            HandshakeState::SynSent,
            "send challenge",
            |_| Ok(challenge_datagram()),
        )
    }

    /// Parses the server ack and derives the session context.
    pub fn receive_ack(&mut self, datagram: &[u8]) -> HandshakeResult<HandshakeContext> {
        self.step(
            HandshakeState::SynSent,
            HandshakeState::AckReceived,
            "receive ack",
            |this| {
                let context = parse_ack(datagram)?;
                this.context = Some(context);
                Ok(context)
            },
        )
    }

    /// Builds the response echoing the server's cookie.
    pub fn response(&mut self) -> HandshakeResult<Vec<u8>> {
        self.step(
            HandshakeState::AckReceived,
            HandshakeState::SynAckSent,
            "send response",
            |this| match this.context {
                Some(context) => response_datagram(&context),
                None => Err(HandshakeError::InvalidState {
                    state: HandshakeState::AckReceived,
                    op: "send response",
                }),
            },
        )
    }

    /// Accepts the server confirmation.
    ///
    /// Only the minimum length is checked; the confirmation's fields are
    /// recorded but not compared against the ack.
    pub fn receive_confirm(&mut self, datagram: &[u8]) -> HandshakeResult<()> {
        self.step(
            HandshakeState::SynAckSent,
            HandshakeState::Established,
            "receive confirmation",
            |this| {
                let mut reader = BitReader::new(datagram);
                if reader.max_bits() < CONFIRM_MIN_BITS {
                    return Err(HandshakeError::UnexpectedShape {
                        state: HandshakeState::SynAckSent,
                        detail: "confirmation shorter than its fixed fields",
                    });
                }
                reader.skip_bits(PREFIX_BITS)?;
                this.confirm_timestamp = Some(reader.read_f32_le()?);
                Ok(())
            },
        )
    }

    /// Consumes an established handshake.
    pub fn into_context(self) -> HandshakeResult<HandshakeContext> {
        match (self.state, self.context) {
            (HandshakeState::Established, Some(context)) => Ok(context),
            (state, _) => Err(HandshakeError::InvalidState {
                state,
                op: "finish handshake",
            }),
        }
    }

    fn step<T>(
        &mut self,
        expected: HandshakeState,
        next: HandshakeState,
        op: &'static str,
        f: impl FnOnce(&mut Self) -> HandshakeResult<T>,
    ) -> HandshakeResult<T> {
        if self.state != expected {
            let state = self.state;
            self.state = HandshakeState::Failed;
            return Err(HandshakeError::InvalidState { state, op });
        }
        match f(self) {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(err) => {
                self.state = HandshakeState::Failed;
                Err(err)
            }
        }
    }
}

/// The fixed 25-byte challenge: handshake bit, 191 zero bits, magic byte.
#[must_use]
pub fn challenge_datagram() -> Vec<u8> {
    let mut writer = BitWriter::new();
    writer.write_bit(true);
    for _ in 0..CHALLENGE_ZERO_BITS {
        writer.write_bit(false);
    }
    writer.write_byte(CHALLENGE_MAGIC);
    writer.finish()
}

fn parse_ack(datagram: &[u8]) -> HandshakeResult<HandshakeContext> {
    let mut reader = BitReader::new(datagram);
    if reader.max_bits() < ACK_MIN_BITS {
        return Err(HandshakeError::UnexpectedShape {
            state: HandshakeState::SynSent,
            detail: "ack shorter than its fixed fields",
        });
    }
    if !reader.read_bit()? {
        return Err(HandshakeError::UnexpectedShape {
            state: HandshakeState::SynSent,
            detail: "handshake bit not set",
        });
    }
    // restart handshake
    reader.read_bit()?;
    let active_secret_id = reader.read_bit()?;
    let timestamp = reader.read_f32_le()?;
    let bytes = reader.read_buffer(COOKIE_BITS)?;
    let mut cookie = [0; COOKIE_BYTES];
    cookie.copy_from_slice(&bytes);
    expect_termination(&mut reader, HandshakeState::SynSent)?;
    Ok(HandshakeContext::from_cookie(
        timestamp,
        cookie,
        active_secret_id,
    ))
}

/// Accepts only the padding a padded writer leaves behind: a `1` bit
/// followed by zeros, shorter than a byte.
fn expect_termination(reader: &mut BitReader<'_>, state: HandshakeState) -> HandshakeResult<()> {
    let tail = reader.bits_remaining();
    if tail == 0 || tail >= 8 {
        return Err(HandshakeError::UnexpectedShape {
            state,
            detail: "unexpected length after the cookie",
        });
    }
    let padding = reader.read_bits(tail as u8)?;
    if padding != 1 {
        return Err(HandshakeError::UnexpectedShape {
            state,
            detail: "trailing bits after the cookie",
        });
    }
    Ok(())
}

fn response_datagram(context: &HandshakeContext) -> HandshakeResult<Vec<u8>> {
    let mut writer = BitWriter::new();
    writer.write_bit(true);
    writer.write_bit(false);
    writer.write_bit(context.active_secret_id);
    writer.write_f32_le(context.timestamp);
    writer.write_buffer(&context.cookie, COOKIE_BITS)?;
    for bit in RESPONSE_TRAILER {
        writer.write_bit(bit);
    }
    Ok(writer.finish())
}

/// Runs the four-step handshake over `transport`.
///
/// Datagrams larger than `max_datagram` bytes are truncated by the
/// transport. Any transport error aborts the handshake.
pub fn perform_handshake<T: Transport + ?Sized>(
    transport: &mut T,
    max_datagram: usize,
) -> SessionResult<HandshakeContext> {
    let mut handshake = Handshake::new();
    match drive(&mut handshake, transport, max_datagram) {
        Ok(()) => {
            let context = handshake.into_context()?;
            info!(
                client_sequence = context.client_sequence,
                server_sequence = context.server_sequence,
                "handshake established"
            );
            Ok(context)
        }
        Err(err) => {
            handshake.fail();
            warn!(error = %err, "handshake failed");
            Err(err)
        }
    }
}

fn drive<T: Transport + ?Sized>(
    handshake: &mut Handshake,
    transport: &mut T,
    max_datagram: usize,
) -> SessionResult<()> {
    transport.send(&handshake.challenge()?)?;
    debug!("challenge sent");

    let ack = transport.recv(max_datagram)?;
    let context = handshake.receive_ack(&ack)?;
    debug!(
        bytes = ack.len(),
        secret_id = context.active_secret_id,
        "ack received"
    );

    transport.send(&handshake.response()?)?;
    debug!("response sent");

    let confirm = transport.recv(max_datagram)?;
    handshake.receive_confirm(&confirm)?;
    debug!(bytes = confirm.len(), "confirmation received");
    Ok(())
}
