//! Byte-exact layout of the datagrams a session sends.
//!
//! Expected datagrams are assembled field by field with a bare `BitWriter`,
//! in wire order, and compared against what the session puts on the wire.

use bitstream::BitWriter;
use session::{Session, SessionConfig, SessionSeed, Transport, TransportError};

#[derive(Debug, Default)]
struct Recorder {
    sent: Vec<Vec<u8>>,
}

impl Transport for Recorder {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        self.sent.push(datagram.to_vec());
        Ok(())
    }

    fn recv(&mut self, _max_len: usize) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Timeout)
    }
}

const SERVER_SEQUENCE: u16 = 0x0010;
const CLIENT_SEQUENCE: u16 = 0x0405;
const IN_RELIABLE: u64 = 0x0405 % 1024;
const ACKED: u64 = 0x000F;

fn session() -> Session<Recorder> {
    let config = SessionConfig::default().with_seed(SessionSeed {
        server_sequence: SERVER_SEQUENCE,
        client_sequence: CLIENT_SEQUENCE,
        active_secret_id: false,
    });
    Session::connect(Recorder::default(), config).unwrap()
}

/// Length-prefixed, NUL-terminated string bytes.
fn string_bytes(value: &str) -> Vec<u8> {
    let len = value.len() as u32 + 1;
    let mut out = len.to_le_bytes().to_vec();
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    out
}

struct Layout {
    sequence: u64,
    control: bool,
    open: bool,
    reliable: bool,
    exports: bool,
    partial: bool,
    partial_initial: bool,
    channel_sequence: u64,
    body: Vec<u8>,
    body_bits: usize,
}

/// Builds a datagram in wire order without going through the framer.
fn datagram(layout: &Layout) -> Vec<u8> {
    let mut inner = BitWriter::new();
    for _ in 0..4 {
        inner.write_bit(false);
    }
    inner.write_bits(ACKED, 14).unwrap();
    inner.write_bits(layout.sequence, 14).unwrap();
    inner.write_bits(0, 32).unwrap();
    // server frame time
    inner.write_bit(false);
    inner.write_byte(0x41);

    inner.write_bit(layout.control);
    if layout.control {
        inner.write_bit(layout.open);
        // close
        inner.write_bit(false);
    }
    // replication paused
    inner.write_bit(false);
    inner.write_bit(layout.reliable);
    // control channel index
    inner.write_byte(0x00);
    inner.write_bit(layout.exports);
    // must be mapped guids
    inner.write_bit(false);
    inner.write_bit(layout.partial);
    if layout.reliable {
        inner.write_bits(layout.channel_sequence, 10).unwrap();
    }
    if layout.partial {
        inner.write_bit(layout.partial_initial);
        // partial final
        inner.write_bit(false);
    }
    if layout.open || layout.reliable {
        inner.write_bit(true);
        // packed 0xFF: the control channel name
        inner.write_byte(0xFF);
        inner.write_byte(0x02);
    }
    inner.write_bits(layout.body_bits as u64, 13).unwrap();
    inner.write_buffer(&layout.body, layout.body_bits).unwrap();
    let inner = inner.finish_payload();

    let mut outer = BitWriter::new();
    outer.write_bit(false);
    outer
        .write_buffer(inner.as_bytes(), inner.bit_len())
        .unwrap();
    outer.finish()
}

fn hello_layout() -> Layout {
    let mut body = vec![0x00, 0x01, 0x76, 0xCD, 0x45, 0x49];
    body.extend(string_bytes(""));
    Layout {
        sequence: u64::from(CLIENT_SEQUENCE),
        control: true,
        open: true,
        reliable: true,
        exports: false,
        partial: false,
        partial_initial: false,
        channel_sequence: IN_RELIABLE + 1,
        body_bits: body.len() * 8,
        body,
    }
}

fn login_layout(url: &str) -> Layout {
    let mut body = vec![0x05];
    body.extend(string_bytes(""));
    body.extend(string_bytes(url));
    body.push(0x00);
    body.extend(string_bytes(""));
    body.extend(string_bytes(""));
    Layout {
        sequence: u64::from(CLIENT_SEQUENCE) + 1,
        control: false,
        open: false,
        reliable: true,
        exports: false,
        partial: false,
        partial_initial: false,
        channel_sequence: IN_RELIABLE + 2,
        body_bits: body.len() * 8,
        body,
    }
}

#[test]
fn hello_bytes() {
    let mut session = session();
    session.hello().unwrap();
    let sent = session.into_transport().sent;
    assert_eq!(sent[0], datagram(&hello_layout()));
}

#[test]
fn login_bytes() {
    let url = "/Game/Maps/Entry?Name=Player";
    let mut session = session();
    session.hello().unwrap();
    session.login(url).unwrap();
    let sent = session.into_transport().sent;
    assert_eq!(sent[1], datagram(&login_layout(url)));
}

#[test]
fn guid_export_bytes() {
    let path = "/Game/Maps/Entry";
    let mut session = session();
    session.hello().unwrap();
    session.export_guid(7, path).unwrap();
    let sent = session.into_transport().sent;

    // Leading false bit, then the export count, packed guid 7, the path
    // flag, the packed outer guid 0 and the path.
    let mut body = BitWriter::unpadded();
    body.write_bit(false);
    body.write_bits(1, 32).unwrap();
    body.write_byte(0x0E);
    body.write_byte(0x01);
    body.write_byte(0x00);
    for byte in string_bytes(path) {
        body.write_byte(byte);
    }
    let body_bits = body.bits_written();
    let expected = datagram(&Layout {
        sequence: u64::from(CLIENT_SEQUENCE) + 1,
        control: true,
        open: true,
        reliable: false,
        exports: true,
        partial: true,
        partial_initial: true,
        channel_sequence: 0,
        body: body.finish(),
        body_bits,
    });
    assert_eq!(sent[1], expected);
}

#[test]
fn hello_header_bytes() {
    let mut session = session();
    session.hello().unwrap();
    let sent = session.into_transport().sent;
    // Outer flag bit, 4 reserved bits and the low 3 bits of acked 0x0F.
    assert_eq!(sent[0][0], 0b1110_0000);
    assert_eq!(sent[0].len(), datagram(&hello_layout()).len());
}
