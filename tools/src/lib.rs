//! Inspection helpers behind the `uenet-tools` binary.
//!
//! [`inspect_datagram`] classifies a captured datagram by its leading bit,
//! then decodes either the handshake fields or the single bunch it carries.
//! Reports serialize to JSON and also render as plain text.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use bitstream::BitReader;
use control::{decode_message, DecodedMessage};
use serde::Serialize;
use session::{
    challenge_datagram, HandshakeContext, ACK_MIN_BITS, CONFIRM_MIN_BITS, COOKIE_BITS,
    COOKIE_BYTES,
};
use wire::{decode_bunch, BunchFlags, Limits};

/// Decoded view of one datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InspectReport {
    Handshake(HandshakeReport),
    Data(DataReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandshakeReport {
    pub bytes: usize,
    /// The client's fixed challenge.
    pub challenge: bool,
    pub restart: bool,
    pub active_secret_id: bool,
    pub timestamp: Option<f32>,
    /// Hex-encoded cookie, when the datagram is long enough to carry one.
    pub cookie: Option<String>,
    pub server_sequence: Option<u16>,
    pub client_sequence: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataReport {
    pub bytes: usize,
    pub acked_sequence: u16,
    pub sequence: u16,
    pub remote_bandwidth: u8,
    pub flags: Vec<&'static str>,
    pub channel_index: u8,
    pub channel_sequence: Option<u16>,
    pub channel_name: String,
    pub payload_bits: usize,
    /// Summary of the control message, or why it did not decode.
    pub message: String,
}

const FLAG_NAMES: [(u16, &str); 10] = [
    (BunchFlags::CONTROL, "control"),
    (BunchFlags::OPEN, "open"),
    (BunchFlags::CLOSE, "close"),
    (BunchFlags::REPLICATION_PAUSED, "replication_paused"),
    (BunchFlags::RELIABLE, "reliable"),
    (BunchFlags::HAS_PACKAGE_MAP_EXPORTS, "exports"),
    (BunchFlags::HAS_MUST_BE_MAPPED_GUIDS, "must_be_mapped"),
    (BunchFlags::PARTIAL, "partial"),
    (BunchFlags::PARTIAL_INITIAL, "partial_initial"),
    (BunchFlags::PARTIAL_FINAL, "partial_final"),
];

/// Decodes a captured datagram.
pub fn inspect_datagram(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let mut reader = BitReader::new(bytes);
    let is_handshake = reader.read_bit().context("empty datagram")?;
    if is_handshake {
        inspect_handshake(bytes).map(InspectReport::Handshake)
    } else {
        inspect_data(bytes, limits).map(InspectReport::Data)
    }
}

fn inspect_handshake(bytes: &[u8]) -> Result<HandshakeReport> {
    let mut report = HandshakeReport {
        bytes: bytes.len(),
        challenge: bytes == challenge_datagram().as_slice(),
        restart: false,
        active_secret_id: false,
        timestamp: None,
        cookie: None,
        server_sequence: None,
        client_sequence: None,
    };
    if report.challenge {
        return Ok(report);
    }

    let mut reader = BitReader::new(bytes);
    let bits = reader.max_bits();
    if bits < CONFIRM_MIN_BITS {
        anyhow::bail!("handshake datagram too short: {bits} bits");
    }
    reader.read_bit()?;
    report.restart = reader.read_bit()?;
    report.active_secret_id = reader.read_bit()?;
    report.timestamp = Some(reader.read_f32_le()?);

    if bits >= ACK_MIN_BITS {
        let raw = reader.read_buffer(COOKIE_BITS)?;
        let mut cookie = [0; COOKIE_BYTES];
        cookie.copy_from_slice(&raw);
        let context = HandshakeContext::from_cookie(0.0, cookie, report.active_secret_id);
        report.cookie = Some(hex(&cookie));
        report.server_sequence = Some(context.server_sequence);
        report.client_sequence = Some(context.client_sequence);
    }
    Ok(report)
}

fn inspect_data(bytes: &[u8], limits: &Limits) -> Result<DataReport> {
    let bunch = decode_bunch(bytes, limits).context("decode bunch")?;
    let flags = bunch.header.flags;
    let message = match decode_message(flags, &bunch.payload) {
        Ok(message) => describe(&message),
        Err(err) => format!("undecoded: {err}"),
    };
    Ok(DataReport {
        bytes: bytes.len(),
        acked_sequence: bunch.packet.acked_sequence,
        sequence: bunch.packet.sequence,
        remote_bandwidth: bunch.packet.remote_bandwidth,
        flags: FLAG_NAMES
            .iter()
            .filter(|(flag, _)| flags.contains(*flag))
            .map(|(_, name)| *name)
            .collect(),
        channel_index: bunch.header.channel_index,
        channel_sequence: flags.is_reliable().then_some(bunch.header.channel_sequence),
        channel_name: bunch.header.channel_name.to_string(),
        payload_bits: bunch.payload.bit_len(),
        message,
    })
}

fn describe(message: &DecodedMessage) -> String {
    match message {
        DecodedMessage::Hello(hello) => format!(
            "hello network_version=0x{:08x} token={:?}",
            hello.network_version, hello.encryption_token
        ),
        DecodedMessage::Challenge(challenge) => format!("challenge nonce={:?}", challenge.nonce),
        DecodedMessage::Login(login) => format!(
            "login url={:?} response={:?} platform={:?}",
            login.request_url, login.client_response, login.platform_name
        ),
        DecodedMessage::Failure(failure) => format!("failure reason={:?}", failure.reason),
        DecodedMessage::Join(_) => "join".to_string(),
        DecodedMessage::GuidExport(export) => {
            format!("guid export net_guid={} path={:?}", export.net_guid, export.path)
        }
        DecodedMessage::FieldExports(table) => {
            format!("field exports count={}", table.exports.len())
        }
        DecodedMessage::Empty => "empty".to_string(),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Renders a report as indented plain text.
pub fn format_report_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    match report {
        InspectReport::Handshake(hs) => {
            let _ = writeln!(out, "handshake ({} bytes)", hs.bytes);
            if hs.challenge {
                let _ = writeln!(out, "  client challenge");
                return out;
            }
            let _ = writeln!(
                out,
                "  restart: {} secret_id: {}",
                hs.restart, hs.active_secret_id
            );
            if let Some(timestamp) = hs.timestamp {
                let _ = writeln!(out, "  timestamp: {timestamp}");
            }
            if let Some(cookie) = &hs.cookie {
                let _ = writeln!(out, "  cookie: {cookie}");
            }
            if let (Some(server), Some(client)) = (hs.server_sequence, hs.client_sequence) {
                let _ = writeln!(out, "  server_sequence: {server} client_sequence: {client}");
            }
        }
        InspectReport::Data(data) => {
            let _ = writeln!(out, "data ({} bytes)", data.bytes);
            let _ = writeln!(
                out,
                "  sequence: {} acked: {} bandwidth: 0x{:02x}",
                data.sequence, data.acked_sequence, data.remote_bandwidth
            );
            let _ = writeln!(out, "  flags: {}", data.flags.join(" "));
            let _ = write!(out, "  channel: {}", data.channel_index);
            if let Some(seq) = data.channel_sequence {
                let _ = write!(out, " seq {seq}");
            }
            let _ = writeln!(out, " name {}", data.channel_name);
            let _ = writeln!(out, "  payload: {} bits", data.payload_bits);
            let _ = writeln!(out, "  message: {}", data.message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::BitWriter;
    use control::{ControlMessage, Hello};
    use wire::{encode_bunch, BunchHeader, ChannelName, PacketHeader};

    #[test]
    fn challenge_recognized() {
        let report = inspect_datagram(&challenge_datagram(), &Limits::default()).unwrap();
        let InspectReport::Handshake(hs) = report else {
            panic!("expected handshake report");
        };
        assert!(hs.challenge);
        assert_eq!(hs.bytes, 25);
    }

    #[test]
    fn ack_cookie_decoded() {
        let mut cookie = [0u8; COOKIE_BYTES];
        cookie[..4].copy_from_slice(&[0x02, 0x00, 0x03, 0x00]);
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bit(false);
        writer.write_bit(true);
        writer.write_f32_le(4.0);
        writer.write_buffer(&cookie, COOKIE_BITS).unwrap();
        let report = inspect_datagram(&writer.finish(), &Limits::default()).unwrap();
        let InspectReport::Handshake(hs) = report else {
            panic!("expected handshake report");
        };
        assert!(!hs.challenge);
        assert!(hs.active_secret_id);
        assert_eq!(hs.timestamp, Some(4.0));
        assert_eq!(hs.server_sequence, Some(2));
        assert_eq!(hs.client_sequence, Some(3));
        assert_eq!(hs.cookie.as_deref().map(str::len), Some(40));
    }

    #[test]
    fn hello_bunch_described() {
        let hello = Hello::new(0x4945_CD76);
        let datagram = encode_bunch(
            &PacketHeader::new(9, 10),
            &BunchHeader::control(hello.flags(), ChannelName::Control).with_channel_sequence(11),
            &hello.encode().unwrap(),
            &Limits::default(),
        )
        .unwrap();
        let report = inspect_datagram(&datagram, &Limits::default()).unwrap();
        let InspectReport::Data(data) = &report else {
            panic!("expected data report");
        };
        assert_eq!(data.sequence, 10);
        assert_eq!(data.acked_sequence, 9);
        assert_eq!(data.channel_sequence, Some(11));
        assert_eq!(data.flags, vec!["control", "open", "reliable"]);
        assert!(data.message.starts_with("hello network_version=0x4945cd76"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "data");
        assert!(format_report_pretty(&report).contains("seq 11"));
    }

    #[test]
    fn empty_datagram_rejected() {
        assert!(inspect_datagram(&[], &Limits::default()).is_err());
    }
}
