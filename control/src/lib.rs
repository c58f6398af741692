//! Control channel message bodies for the uenet transport codec.
//!
//! Every message is a plain struct implementing [`ControlMessage`]: encoding
//! is a pure function from the struct's fields to a finalized [`Payload`],
//! and the trait also names the bunch flags the message travels with.
//! Framing and sequencing are left to the `wire` and `session` crates.
//!
//! # Example
//!
//! ```
//! use control::{ControlMessage, Hello};
//!
//! let payload = Hello::new(0x4945_CD76).encode().unwrap();
//! let hello = Hello::decode(&payload).unwrap();
//! assert_eq!(hello.network_version, 0x4945_CD76);
//! assert!(hello.encryption_token.is_empty());
//! ```

mod error;
mod exports;
mod hello;
mod login;
mod message;

pub use bitstream::Payload;
pub use error::{ControlError, ControlResult};
pub use exports::{FieldExport, FieldExportTable, GuidExport};
pub use hello::{Challenge, Failure, Hello};
pub use login::{Join, Login};
pub use message::{ControlMessage, MessageType};

use bitstream::BitWriter;
use wire::{BunchFlags, ChannelName};

/// Empty bunch opening a named channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOpen {
    pub name: ChannelName,
}

impl ControlMessage for ChannelOpen {
    fn flags(&self) -> BunchFlags {
        BunchFlags::partial_control_open()
    }

    fn channel_name(&self) -> ChannelName {
        self.name
    }

    fn encode(&self) -> ControlResult<Payload> {
        Ok(BitWriter::unpadded().finish_payload())
    }
}

/// Any body this crate can decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMessage {
    Hello(Hello),
    Challenge(Challenge),
    Login(Login),
    Failure(Failure),
    Join(Join),
    GuidExport(GuidExport),
    FieldExports(FieldExportTable),
    /// A bunch with no payload, e.g. a channel open.
    Empty,
}

/// Decodes a bunch payload, using the bunch flags to tell package map
/// exports apart from typed control messages.
pub fn decode_message(flags: BunchFlags, payload: &Payload) -> ControlResult<DecodedMessage> {
    if payload.is_empty() {
        return Ok(DecodedMessage::Empty);
    }
    if flags.has_package_map_exports() {
        let has_rep_layout_export = payload.reader().read_bit()?;
        return if has_rep_layout_export {
            FieldExportTable::decode(payload).map(DecodedMessage::FieldExports)
        } else {
            GuidExport::decode(payload).map(DecodedMessage::GuidExport)
        };
    }

    let raw = payload.reader().read_byte()?;
    match MessageType::from_raw(raw) {
        Some(MessageType::Hello) => Hello::decode(payload).map(DecodedMessage::Hello),
        Some(MessageType::Challenge) => Challenge::decode(payload).map(DecodedMessage::Challenge),
        Some(MessageType::Login) => Login::decode(payload).map(DecodedMessage::Login),
        Some(MessageType::Failure) => Failure::decode(payload).map(DecodedMessage::Failure),
        Some(MessageType::Join) => Join::decode(payload).map(DecodedMessage::Join),
        None => Err(ControlError::UnknownMessageType { raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_dispatches_on_type_byte() {
        let hello = Hello::new(7);
        let decoded = decode_message(hello.flags(), &hello.encode().unwrap()).unwrap();
        assert_eq!(decoded, DecodedMessage::Hello(hello));

        let login = Login::new("/Game/Entry");
        let decoded = decode_message(login.flags(), &login.encode().unwrap()).unwrap();
        assert_eq!(decoded, DecodedMessage::Login(login));

        let decoded = decode_message(Join.flags(), &Join.encode().unwrap()).unwrap();
        assert_eq!(decoded, DecodedMessage::Join(Join));
    }

    #[test]
    fn decode_dispatches_exports_on_flags() {
        let export = GuidExport::new(1, "/Game/Entry");
        let decoded = decode_message(export.flags(), &export.encode().unwrap()).unwrap();
        assert_eq!(decoded, DecodedMessage::GuidExport(export));

        let table = FieldExportTable::default();
        let decoded = decode_message(table.flags(), &table.encode().unwrap()).unwrap();
        assert_eq!(decoded, DecodedMessage::FieldExports(table));
    }

    #[test]
    fn channel_open_is_empty() {
        let open = ChannelOpen {
            name: ChannelName::Actor,
        };
        let payload = open.encode().unwrap();
        assert!(payload.is_empty());
        assert_eq!(open.channel_name(), ChannelName::Actor);
        assert_eq!(
            decode_message(open.flags(), &payload).unwrap(),
            DecodedMessage::Empty
        );
    }

    #[test]
    fn unknown_type_rejected() {
        let payload = Payload::from_parts(vec![0x7F], 8).unwrap();
        assert_eq!(
            decode_message(BunchFlags::reliable(), &payload),
            Err(ControlError::UnknownMessageType { raw: 0x7F })
        );
    }
}
