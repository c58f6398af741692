//! Packet and bunch header layout.

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeError, EncodeError, WireResult};
use crate::flags::BunchFlags;
use crate::protocol::{
    ChannelName, CHANNEL_SEQUENCE_BITS, CONTROL_CHANNEL_INDEX, DEFAULT_REMOTE_BANDWIDTH,
    FRAME_TIME_BITS, PACKET_SEQUENCE_BITS, RESERVED_HEADER_BITS,
};

/// Per-packet header written ahead of the first bunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Last packet sequence received from the peer (14 bits).
    pub acked_sequence: u16,
    /// This packet's sequence (14 bits).
    pub sequence: u16,
    /// Whether a server frame time is attached. Always `false` from a client.
    pub has_server_frame_time: bool,
    /// Remote bandwidth estimate byte.
    pub remote_bandwidth: u8,
}

impl PacketHeader {
    /// Creates a client packet header with the default bandwidth estimate.
    #[must_use]
    pub const fn new(acked_sequence: u16, sequence: u16) -> Self {
        Self {
            acked_sequence,
            sequence,
            has_server_frame_time: false,
            remote_bandwidth: DEFAULT_REMOTE_BANDWIDTH,
        }
    }

    pub(crate) fn write(&self, writer: &mut BitWriter) -> Result<(), EncodeError> {
        for _ in 0..RESERVED_HEADER_BITS {
            writer.write_bit(false);
        }
        writer.write_bits(u64::from(self.acked_sequence), PACKET_SEQUENCE_BITS)?;
        writer.write_bits(u64::from(self.sequence), PACKET_SEQUENCE_BITS)?;
        for _ in 0..FRAME_TIME_BITS {
            writer.write_bit(false);
        }
        writer.write_bit(self.has_server_frame_time);
        writer.write_byte(self.remote_bandwidth);
        Ok(())
    }

    pub(crate) fn read(reader: &mut BitReader<'_>) -> WireResult<Self> {
        reader.skip_bits(RESERVED_HEADER_BITS)?;
        let acked_sequence = reader.read_bits(PACKET_SEQUENCE_BITS)? as u16;
        let sequence = reader.read_bits(PACKET_SEQUENCE_BITS)? as u16;
        reader.skip_bits(FRAME_TIME_BITS)?;
        let has_server_frame_time = reader.read_bit()?;
        let remote_bandwidth = reader.read_byte()?;
        Ok(Self {
            acked_sequence,
            sequence,
            has_server_frame_time,
            remote_bandwidth,
        })
    }
}

/// Header of a single bunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BunchHeader {
    /// Channel and partial flags.
    pub flags: BunchFlags,
    /// Channel index.
    pub channel_index: u8,
    /// Reliable channel sequence (10 bits). Only encoded for reliable bunches.
    pub channel_sequence: u16,
    /// Channel name. Only encoded for open or reliable bunches.
    pub channel_name: ChannelName,
}

impl BunchHeader {
    /// Creates a header on the control channel index.
    #[must_use]
    pub const fn control(flags: BunchFlags, channel_name: ChannelName) -> Self {
        Self {
            flags,
            channel_index: CONTROL_CHANNEL_INDEX,
            channel_sequence: 0,
            channel_name,
        }
    }

    /// Returns a copy carrying `channel_sequence`.
    #[must_use]
    pub const fn with_channel_sequence(mut self, channel_sequence: u16) -> Self {
        self.channel_sequence = channel_sequence;
        self
    }

    pub(crate) fn write(&self, writer: &mut BitWriter) -> Result<(), EncodeError> {
        let flags = self.flags;
        if !flags.is_valid() {
            return Err(EncodeError::InvalidFlags { flags: flags.raw() });
        }

        writer.write_bit(flags.is_control());
        if flags.is_control() {
            writer.write_bit(flags.is_open());
            writer.write_bit(flags.is_close());
        }
        writer.write_bit(flags.is_replication_paused());
        writer.write_bit(flags.is_reliable());
        writer.write_byte(self.channel_index);
        writer.write_bit(flags.has_package_map_exports());
        writer.write_bit(flags.has_must_be_mapped_guids());
        writer.write_bit(flags.is_partial());

        if flags.is_reliable() {
            writer.write_bits(u64::from(self.channel_sequence), CHANNEL_SEQUENCE_BITS)?;
        }
        if flags.is_partial() {
            writer.write_bit(flags.is_partial_initial());
            writer.write_bit(flags.is_partial_final());
        }
        if flags.has_channel_name() {
            // Hardcoded name index.
            writer.write_bit(true);
            writer.write_packed_u32(self.channel_name.index());
        }
        Ok(())
    }

    pub(crate) fn read(reader: &mut BitReader<'_>) -> WireResult<Self> {
        let mut flags = BunchFlags::default();

        let control = reader.read_bit()?;
        flags = flags.set(BunchFlags::CONTROL, control);
        if control {
            flags = flags.set(BunchFlags::OPEN, reader.read_bit()?);
            flags = flags.set(BunchFlags::CLOSE, reader.read_bit()?);
        }
        flags = flags.set(BunchFlags::REPLICATION_PAUSED, reader.read_bit()?);
        flags = flags.set(BunchFlags::RELIABLE, reader.read_bit()?);
        let channel_index = reader.read_byte()?;
        flags = flags.set(BunchFlags::HAS_PACKAGE_MAP_EXPORTS, reader.read_bit()?);
        flags = flags.set(BunchFlags::HAS_MUST_BE_MAPPED_GUIDS, reader.read_bit()?);
        flags = flags.set(BunchFlags::PARTIAL, reader.read_bit()?);

        let channel_sequence = if flags.is_reliable() {
            reader.read_bits(CHANNEL_SEQUENCE_BITS)? as u16
        } else {
            0
        };
        if flags.is_partial() {
            flags = flags.set(BunchFlags::PARTIAL_INITIAL, reader.read_bit()?);
            flags = flags.set(BunchFlags::PARTIAL_FINAL, reader.read_bit()?);
        }
        let channel_name = if flags.has_channel_name() {
            if !reader.read_bit()? {
                return Err(DecodeError::UnhardcodedChannelName);
            }
            ChannelName::from_index(reader.read_packed_u32()?)
        } else {
            ChannelName::None
        };

        Ok(Self {
            flags,
            channel_index,
            channel_sequence,
            channel_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_header_bit_length() {
        let mut writer = BitWriter::unpadded();
        PacketHeader::new(0x3FFF, 0x0123).write(&mut writer).unwrap();
        assert_eq!(writer.bits_written(), 4 + 14 + 14 + 32 + 1 + 8);
    }

    #[test]
    fn packet_header_roundtrip() {
        let header = PacketHeader::new(0x1ABC, 0x0042);
        let mut writer = BitWriter::unpadded();
        header.write(&mut writer).unwrap();
        let bytes = writer.finish();
        let decoded = PacketHeader::read(&mut BitReader::new(&bytes)).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.remote_bandwidth, DEFAULT_REMOTE_BANDWIDTH);
    }

    #[test]
    fn packet_header_rejects_wide_sequence() {
        let mut writer = BitWriter::unpadded();
        let err = PacketHeader::new(0x4000, 0).write(&mut writer).unwrap_err();
        assert!(matches!(err, EncodeError::Bit(_)));
    }

    #[test]
    fn non_control_bunch_omits_open_close() {
        let header = BunchHeader::control(BunchFlags::reliable(), ChannelName::Control)
            .with_channel_sequence(7);
        let mut writer = BitWriter::unpadded();
        header.write(&mut writer).unwrap();
        // control, paused, reliable, index, exports, guids, partial, seq, hardcoded, name (2 bytes)
        assert_eq!(writer.bits_written(), 3 + 8 + 3 + 10 + 1 + 16);
    }

    #[test]
    fn bunch_header_roundtrip_partial() {
        let header = BunchHeader::control(
            BunchFlags::partial_control_open().with(BunchFlags::HAS_PACKAGE_MAP_EXPORTS),
            ChannelName::Control,
        );
        let mut writer = BitWriter::unpadded();
        header.write(&mut writer).unwrap();
        let bytes = writer.finish();
        let decoded = BunchHeader::read(&mut BitReader::new(&bytes)).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn bunch_header_without_name_decodes_none() {
        let header = BunchHeader::control(
            BunchFlags::from_raw(BunchFlags::CONTROL),
            ChannelName::None,
        );
        let mut writer = BitWriter::unpadded();
        header.write(&mut writer).unwrap();
        let bytes = writer.finish();
        let decoded = BunchHeader::read(&mut BitReader::new(&bytes)).unwrap();
        assert_eq!(decoded.channel_name, ChannelName::None);
    }

    #[test]
    fn invalid_flags_rejected() {
        let header = BunchHeader::control(BunchFlags::from_raw(BunchFlags::OPEN), ChannelName::Control);
        let mut writer = BitWriter::unpadded();
        assert_eq!(
            header.write(&mut writer),
            Err(EncodeError::InvalidFlags {
                flags: BunchFlags::OPEN
            })
        );
    }

    #[test]
    fn channel_sequence_overflow_rejected() {
        let header = BunchHeader::control(BunchFlags::reliable(), ChannelName::Control)
            .with_channel_sequence(1024);
        let mut writer = BitWriter::unpadded();
        assert!(matches!(
            header.write(&mut writer),
            Err(EncodeError::Bit(bitstream::BitError::ValueOutOfRange { .. }))
        ));
    }
}
