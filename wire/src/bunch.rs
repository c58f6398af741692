//! Channel bunch framing.
//!
//! A data datagram is an outer padded writer holding one `0` bit (data
//! packet, not handshake) followed by the inner packet body. The inner body
//! is finalized on its own and re-embedded using its exact bit length, so its
//! termination padding never reaches the outer frame:
//!
//! ```text
//! [0] [packet header] [bunch header] [13-bit payload length] [payload] [terminator]
//! ```

use bitstream::{BitReader, BitWriter, Payload};

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::header::{BunchHeader, PacketHeader};
use crate::limits::Limits;
use crate::protocol::BUNCH_DATA_LEN_BITS;

/// A decoded single-bunch datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bunch {
    pub packet: PacketHeader,
    pub header: BunchHeader,
    pub payload: Payload,
}

/// Frames `payload` into a complete datagram.
///
/// The payload is measured by its logical bit length, never by its byte
/// length.
pub fn encode_bunch(
    packet: &PacketHeader,
    header: &BunchHeader,
    payload: &Payload,
    limits: &Limits,
) -> Result<Vec<u8>, EncodeError> {
    let payload_bits = payload.bit_len();
    if payload_bits > limits.payload_bits() {
        return Err(EncodeError::LimitsExceeded {
            kind: LimitKind::PayloadBits,
            limit: limits.payload_bits(),
            actual: payload_bits,
        });
    }

    let mut inner = BitWriter::new();
    packet.write(&mut inner)?;
    header.write(&mut inner)?;
    inner.write_bits(payload_bits as u64, BUNCH_DATA_LEN_BITS)?;
    inner.write_buffer(payload.as_bytes(), payload_bits)?;
    let inner = inner.finish_payload();

    let mut outer = BitWriter::new();
    outer.write_bit(false);
    outer.write_buffer(inner.as_bytes(), inner.bit_len())?;
    let datagram = outer.finish();

    if datagram.len() > limits.max_packet_bytes {
        return Err(EncodeError::LimitsExceeded {
            kind: LimitKind::PacketBytes,
            limit: limits.max_packet_bytes,
            actual: datagram.len(),
        });
    }
    Ok(datagram)
}

/// Decodes a single-bunch datagram produced by [`encode_bunch`].
///
/// Bits after the payload (the frame terminator) are ignored.
pub fn decode_bunch(datagram: &[u8], limits: &Limits) -> WireResult<Bunch> {
    if datagram.len() > limits.max_packet_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::PacketBytes,
            limit: limits.max_packet_bytes,
            actual: datagram.len(),
        });
    }

    let mut reader = BitReader::new(datagram);
    if reader.read_bit()? {
        return Err(DecodeError::NotDataPacket);
    }
    let packet = PacketHeader::read(&mut reader)?;
    let header = BunchHeader::read(&mut reader)?;

    let payload_bits = reader.read_bits(BUNCH_DATA_LEN_BITS)? as usize;
    if payload_bits > limits.payload_bits() {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::PayloadBits,
            limit: limits.payload_bits(),
            actual: payload_bits,
        });
    }
    let bytes = reader.read_buffer(payload_bits)?;
    let payload = Payload::from_parts(bytes, payload_bits)?;

    Ok(Bunch {
        packet,
        header,
        payload,
    })
}
