//! Package map export payloads.
//!
//! These bodies carry no message type byte. They travel in a partial bunch
//! with the package-map-exports flag set, and their first bit tells the peer
//! whether a replication layout export follows (field export table) or a
//! plain list of GUID exports.

use bitstream::{BitWriter, Payload};
use wire::BunchFlags;

use crate::error::{ControlError, ControlResult};
use crate::message::{expect_end, ControlMessage};

/// Export flags bit: the object is exported by path.
const EXPORT_HAS_PATH: u8 = 0x01;

/// GUID terminating the outer-object chain.
const NO_OUTER_GUID: u32 = 0;

fn export_flags() -> BunchFlags {
    BunchFlags::partial_control_open().with(BunchFlags::HAS_PACKAGE_MAP_EXPORTS)
}

/// Registers an object path under a NetGUID in the peer's package map.
///
/// Exactly one export with no outer object is sent per bunch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidExport {
    /// Non-zero id the path is registered under.
    pub net_guid: u32,
    /// Object path.
    pub path: String,
}

impl GuidExport {
    /// Creates an export of `path` under `net_guid`.
    #[must_use]
    pub fn new(net_guid: u32, path: impl Into<String>) -> Self {
        Self {
            net_guid,
            path: path.into(),
        }
    }

    /// Decodes a single GUID export body.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        if reader.read_bit()? {
            return Err(ControlError::Unsupported {
                field: "has_rep_layout_export",
            });
        }
        if reader.read_u32_le()? != 1 {
            return Err(ControlError::Unsupported {
                field: "export_count",
            });
        }
        let net_guid = reader.read_packed_u32()?;
        if reader.read_byte()? != EXPORT_HAS_PATH {
            return Err(ControlError::Unsupported {
                field: "export_flags",
            });
        }
        if reader.read_packed_u32()? != NO_OUTER_GUID {
            return Err(ControlError::Unsupported {
                field: "outer_guid",
            });
        }
        let path = reader.read_string()?;
        expect_end(&reader)?;
        Ok(Self { net_guid, path })
    }
}

impl ControlMessage for GuidExport {
    fn flags(&self) -> BunchFlags {
        export_flags()
    }

    fn encode(&self) -> ControlResult<Payload> {
        if self.net_guid == NO_OUTER_GUID {
            return Err(ControlError::Unsupported { field: "net_guid" });
        }
        let mut writer = BitWriter::unpadded();
        writer.write_bit(false);
        writer.write_u32_le(1);
        writer.write_packed_u32(self.net_guid);
        writer.write_byte(EXPORT_HAS_PATH);
        writer.write_packed_u32(NO_OUTER_GUID);
        writer.write_string(&self.path)?;
        Ok(writer.finish_payload())
    }
}

/// One property name export entry.
///
/// [`Default`] yields placeholder values: a one-character path, and fixed
/// handle, checksum, and name index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExport {
    pub path_name_index: u32,
    pub path_name: String,
    pub max_exports: u32,
    pub flags: u8,
    pub handle: u32,
    pub compatible_checksum: u32,
    /// Hardcoded name index of the exported property.
    pub export_name: u32,
}

impl Default for FieldExport {
    fn default() -> Self {
        Self {
            path_name_index: 0,
            path_name: "Z".to_string(),
            max_exports: 0x41,
            flags: 0x01,
            handle: 0x8000_0000,
            compatible_checksum: 0x4141_4141,
            export_name: 0x33,
        }
    }
}

/// Field export table seeding the peer's replication layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExportTable {
    pub exports: Vec<FieldExport>,
}

impl Default for FieldExportTable {
    fn default() -> Self {
        Self {
            exports: vec![FieldExport::default()],
        }
    }
}

impl FieldExportTable {
    /// Decodes a field export table body.
    pub fn decode(payload: &Payload) -> ControlResult<Self> {
        let mut reader = payload.reader();
        if !reader.read_bit()? {
            return Err(ControlError::Unsupported {
                field: "has_rep_layout_export",
            });
        }
        let count = reader.read_u32_le()? as usize;
        let mut exports = Vec::new();
        for _ in 0..count {
            let path_name_index = reader.read_packed_u32()?;
            if !reader.read_bit()? {
                return Err(ControlError::Unsupported {
                    field: "path_exported",
                });
            }
            let path_name = reader.read_string()?;
            let max_exports = reader.read_u32_le()?;
            let flags = reader.read_byte()?;
            let handle = reader.read_packed_u32()?;
            let compatible_checksum = reader.read_u32_le()?;
            if !reader.read_bit()? {
                return Err(ControlError::Unsupported {
                    field: "export_name",
                });
            }
            let export_name = reader.read_packed_u32()?;
            exports.push(FieldExport {
                path_name_index,
                path_name,
                max_exports,
                flags,
                handle,
                compatible_checksum,
                export_name,
            });
        }
        expect_end(&reader)?;
        Ok(Self { exports })
    }
}

impl ControlMessage for FieldExportTable {
    fn flags(&self) -> BunchFlags {
        export_flags()
    }

    fn encode(&self) -> ControlResult<Payload> {
        let count = u32::try_from(self.exports.len()).map_err(|_| ControlError::Unsupported {
            field: "export_count",
        })?;
        let mut writer = BitWriter::unpadded();
        writer.write_bit(true);
        writer.write_u32_le(count);
        for export in &self.exports {
            writer.write_packed_u32(export.path_name_index);
            writer.write_bit(true);
            writer.write_string(&export.path_name)?;
            writer.write_u32_le(export.max_exports);
            writer.write_byte(export.flags);
            writer.write_packed_u32(export.handle);
            writer.write_u32_le(export.compatible_checksum);
            writer.write_bit(true);
            writer.write_packed_u32(export.export_name);
        }
        Ok(writer.finish_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::BitReader;

    #[test]
    fn guid_export_layout() {
        let payload = GuidExport::new(1, "/Game/Maps/Entry").encode().unwrap();
        let mut reader = BitReader::with_bit_len(payload.as_bytes(), payload.bit_len()).unwrap();
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(32).unwrap(), 1);
        assert_eq!(reader.read_packed_u32().unwrap(), 1);
        assert_eq!(reader.read_byte().unwrap(), 0x01);
        assert_eq!(reader.read_packed_u32().unwrap(), 0);
        assert_eq!(reader.read_string().unwrap(), "/Game/Maps/Entry");
        assert!(reader.is_done());
    }

    #[test]
    fn guid_export_roundtrip() {
        let export = GuidExport::new(0x1234, "/Script/Engine.GameMode");
        assert_eq!(GuidExport::decode(&export.encode().unwrap()).unwrap(), export);
    }

    #[test]
    fn guid_export_zero_guid_rejected() {
        assert_eq!(
            GuidExport::new(0, "/Game").encode(),
            Err(ControlError::Unsupported { field: "net_guid" })
        );
    }

    #[test]
    fn export_bunches_are_partial_initial() {
        let flags = GuidExport::new(1, "/Game").flags();
        assert!(flags.has_package_map_exports());
        assert!(flags.is_partial() && flags.is_partial_initial());
        assert!(!flags.is_partial_final());
        assert!(!flags.is_reliable());
        assert_eq!(flags, FieldExportTable::default().flags());
    }

    #[test]
    fn default_field_export_bit_length() {
        let payload = FieldExportTable::default().encode().unwrap();
        // 1 + 32 header bits, 0xB2 bits per placeholder export.
        assert_eq!(payload.bit_len(), 33 + 0xB2);
    }

    #[test]
    fn field_export_table_roundtrip() {
        let table = FieldExportTable {
            exports: vec![
                FieldExport::default(),
                FieldExport {
                    path_name_index: 7,
                    path_name: "/Script/Engine.PlayerController".to_string(),
                    max_exports: 12,
                    flags: 0,
                    handle: 3,
                    compatible_checksum: 0xDEAD_BEEF,
                    export_name: 0x66,
                },
            ],
        };
        assert_eq!(
            FieldExportTable::decode(&table.encode().unwrap()).unwrap(),
            table
        );
    }

    #[test]
    fn decoders_reject_each_other() {
        let guid = GuidExport::new(1, "/Game").encode().unwrap();
        let table = FieldExportTable::default().encode().unwrap();
        assert!(FieldExportTable::decode(&guid).is_err());
        assert!(GuidExport::decode(&table).is_err());
    }
}
