//! Login and join messages.

use bitstream::{BitWriter, Payload};
use wire::BunchFlags;

use crate::error::{ControlError, ControlResult};
use crate::message::{expect_end, expect_type, ControlMessage, MessageType};

/// Unique net id encoding flags for "no id".
const NO_UNIQUE_NET_ID: u8 = 0x00;

/// Login request naming the resource the client wants to travel to.
///
/// The unique net id is always sent as the empty form: encoding flags `0`
/// followed by an empty contents string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Login {
    /// Response to the server challenge.
    pub client_response: String,
    /// Travel URL, e.g. a map path with options.
    pub request_url: String,
    /// Online platform name.
    pub platform_name: String,
}

impl Login {
    /// Creates a login for `request_url` with every other field empty.
    #[must_use]
    pub fn new(request_url: impl Into<String>) -> Self {
        Self {
            request_url: request_url.into(),
            ..Self::default()
        }
    }

    /// Decodes a login body.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        expect_type(&mut reader, MessageType::Login)?;
        let client_response = reader.read_string()?;
        let request_url = reader.read_string()?;
        if reader.read_byte()? != NO_UNIQUE_NET_ID || !reader.read_string()?.is_empty() {
            return Err(ControlError::Unsupported {
                field: "unique_net_id",
            });
        }
        let platform_name = reader.read_string()?;
        expect_end(&reader)?;
        Ok(Self {
            client_response,
            request_url,
            platform_name,
        })
    }
}

impl ControlMessage for Login {
    fn flags(&self) -> BunchFlags {
        BunchFlags::reliable()
    }

    fn encode(&self) -> ControlResult<Payload> {
        let mut writer = BitWriter::unpadded();
        writer.write_byte(MessageType::Login.raw());
        writer.write_string(&self.client_response)?;
        writer.write_string(&self.request_url)?;
        writer.write_byte(NO_UNIQUE_NET_ID);
        writer.write_string("")?;
        writer.write_string(&self.platform_name)?;
        Ok(writer.finish_payload())
    }
}

/// Request to join the world after a successful login. Carries no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Join;

impl Join {
    /// Decodes a join body, which is only the message type.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        expect_type(&mut reader, MessageType::Join)?;
        expect_end(&reader)?;
        Ok(Self)
    }
}

impl ControlMessage for Join {
    fn flags(&self) -> BunchFlags {
        BunchFlags::reliable()
    }

    fn encode(&self) -> ControlResult<Payload> {
        let mut writer = BitWriter::unpadded();
        writer.write_byte(MessageType::Join.raw());
        Ok(writer.finish_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::BitReader;

    #[test]
    fn login_layout() {
        let payload = Login::new("/Game/Maps/Entry").encode().unwrap();
        let mut reader = BitReader::with_bit_len(payload.as_bytes(), payload.bit_len()).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0x05);
        assert_eq!(reader.read_string().unwrap(), "");
        assert_eq!(reader.read_string().unwrap(), "/Game/Maps/Entry");
        assert_eq!(reader.read_byte().unwrap(), 0x00);
        assert_eq!(reader.read_string().unwrap(), "");
        assert_eq!(reader.read_string().unwrap(), "");
        assert!(reader.is_done());
    }

    #[test]
    fn login_roundtrip() {
        let login = Login {
            client_response: "0".to_string(),
            request_url: "\\\\share.example\\maps\\entry.umap".to_string(),
            platform_name: "WINDOWS".to_string(),
        };
        assert_eq!(Login::decode(&login.encode().unwrap()).unwrap(), login);
    }

    #[test]
    fn login_rides_open_control_channel() {
        let flags = Login::default().flags();
        assert!(flags.is_reliable());
        assert!(!flags.is_control());
    }

    #[test]
    fn login_with_net_id_rejected() {
        let mut writer = BitWriter::unpadded();
        writer.write_byte(MessageType::Login.raw());
        writer.write_string("").unwrap();
        writer.write_string("/Game").unwrap();
        writer.write_byte(0x00);
        writer.write_string("steam:1234").unwrap();
        writer.write_string("").unwrap();
        assert_eq!(
            Login::decode(&writer.finish_payload()),
            Err(ControlError::Unsupported {
                field: "unique_net_id"
            })
        );
    }

    #[test]
    fn join_is_type_byte_only() {
        let payload = Join.encode().unwrap();
        assert_eq!(payload.bit_len(), 8);
        assert_eq!(payload.as_bytes(), &[0x09]);
        assert_eq!(Join::decode(&payload).unwrap(), Join);
    }

    #[test]
    fn join_trailing_bits_rejected() {
        let payload = Payload::from_parts(vec![0x09, 0x00], 9).unwrap();
        assert_eq!(
            Join::decode(&payload),
            Err(ControlError::TrailingBits { bits: 1 })
        );
    }
}
