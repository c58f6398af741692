//! Hello, challenge, and failure messages.

use bitstream::{BitWriter, Payload};
use wire::BunchFlags;

use crate::error::{ControlError, ControlResult};
use crate::message::{expect_end, expect_type, ControlMessage, MessageType};

/// Byte order marker sent in the hello; this codec only speaks little-endian.
const LITTLE_ENDIAN: u8 = 1;

/// First reliable message on the control channel; opens the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    /// Network version identifying the wire-compatible server build.
    pub network_version: u32,
    /// Encryption token. Empty: encryption is not negotiated.
    pub encryption_token: String,
}

impl Hello {
    /// Creates a hello with an empty encryption token.
    #[must_use]
    pub const fn new(network_version: u32) -> Self {
        Self {
            network_version,
            encryption_token: String::new(),
        }
    }

    /// Decodes a hello body.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        expect_type(&mut reader, MessageType::Hello)?;
        if reader.read_byte()? != LITTLE_ENDIAN {
            return Err(ControlError::Unsupported {
                field: "is_little_endian",
            });
        }
        let network_version = reader.read_bits(32)? as u32;
        let encryption_token = reader.read_string()?;
        expect_end(&reader)?;
        Ok(Self {
            network_version,
            encryption_token,
        })
    }
}

impl ControlMessage for Hello {
    fn flags(&self) -> BunchFlags {
        BunchFlags::reliable_control_open()
    }

    fn encode(&self) -> ControlResult<Payload> {
        let mut writer = BitWriter::unpadded();
        writer.write_byte(MessageType::Hello.raw());
        writer.write_byte(LITTLE_ENDIAN);
        writer.write_bits(u64::from(self.network_version), 32)?;
        writer.write_string(&self.encryption_token)?;
        Ok(writer.finish_payload())
    }
}

/// Server challenge answering a hello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub nonce: String,
}

impl Challenge {
    /// Decodes a challenge body.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        expect_type(&mut reader, MessageType::Challenge)?;
        let nonce = reader.read_string()?;
        expect_end(&reader)?;
        Ok(Self { nonce })
    }
}

impl ControlMessage for Challenge {
    fn flags(&self) -> BunchFlags {
        BunchFlags::reliable()
    }

    fn encode(&self) -> ControlResult<Payload> {
        let mut writer = BitWriter::unpadded();
        writer.write_byte(MessageType::Challenge.raw());
        writer.write_string(&self.nonce)?;
        Ok(writer.finish_payload())
    }
}

/// Server failure notice; the connection is about to be closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub reason: String,
}

impl Failure {
    /// Decodes a failure body.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        expect_type(&mut reader, MessageType::Failure)?;
        let reason = reader.read_string()?;
        expect_end(&reader)?;
        Ok(Self { reason })
    }
}

impl ControlMessage for Failure {
    fn flags(&self) -> BunchFlags {
        BunchFlags::reliable()
    }

    fn encode(&self) -> ControlResult<Payload> {
        let mut writer = BitWriter::unpadded();
        writer.write_byte(MessageType::Failure.raw());
        writer.write_string(&self.reason)?;
        Ok(writer.finish_payload())
    }
}
