//! Fixed FastFile header.
//!
//! ```text
//! 0x000  u64   magic        TAff0100 (signed) | TAffu100 (unsigned)
//! 0x008  u32   version      platform version, e.g. 0x94 for WiiU
//! 0x018  [32]  identifier   NUL-terminated name, seeds the IV table
//! 0x138  ...   sections     signature/reserved region skipped, unverified
//! ```

use serde::Serialize;
use std::io::{Read, Seek};

use crate::error::{FormatError, Result};
use crate::io_stream::ByteReader;
use crate::platform::{Magic, Platform};

pub const IDENTIFIER_OFFSET: u64   = 0x18;
pub const IDENTIFIER_LEN:    usize = 32;
/// First section length lives here, past the signature region.
pub const SECTIONS_OFFSET:   u64   = 0x138;

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub magic:      Magic,
    pub version:    u32,
    #[serde(serialize_with = "hex_bytes")]
    pub identifier: [u8; IDENTIFIER_LEN],
}

impl Header {
    /// Read magic and version from offset 0 and validate them.
    ///
    /// When `expected` is given the version must match it exactly. The
    /// identifier is read only after both checks pass.
    pub fn read<R: Read + Seek>(reader: &mut ByteReader<R>, expected: Option<Platform>) -> Result<Self> {
        reader.seek(0)?;
        let raw_magic = reader.read_u64()?;
        let magic = Magic::from_u64(raw_magic).ok_or(FormatError::InvalidMagic(raw_magic))?;

        let version = reader.read_u32()?;
        if let Some(platform) = expected {
            if version != platform.version() {
                return Err(FormatError::VersionMismatch {
                    found:    version,
                    expected: platform.version(),
                }
                .into());
            }
        }

        let mut header = Self { magic, version, identifier: [0u8; IDENTIFIER_LEN] };
        header.read_identifier(reader)?;
        Ok(header)
    }

    fn read_identifier<R: Read + Seek>(&mut self, reader: &mut ByteReader<R>) -> Result<()> {
        reader.seek(IDENTIFIER_OFFSET)?;
        reader.read_exact(&mut self.identifier)?;
        Ok(())
    }

    pub fn platform(&self) -> Option<Platform> {
        Platform::from_version(self.version)
    }

    /// Identifier up to its first NUL, lossily decoded.
    pub fn name(&self) -> String {
        let end = self.identifier.iter().position(|&b| b == 0).unwrap_or(IDENTIFIER_LEN);
        String::from_utf8_lossy(&self.identifier[..end]).into_owned()
    }
}

fn hex_bytes<S: serde::Serializer>(bytes: &[u8; IDENTIFIER_LEN], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FastFileError;
    use crate::io_stream::ByteOrder;
    use crate::platform::{MAGIC_SIGNED, MAGIC_UNSIGNED};
    use std::io::Cursor;

    fn image(magic: u64, version: u32, name: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; SECTIONS_OFFSET as usize];
        buf[0..8].copy_from_slice(&magic.to_be_bytes());
        buf[8..12].copy_from_slice(&version.to_be_bytes());
        buf[0x18..0x18 + name.len()].copy_from_slice(name);
        buf
    }

    fn reader(bytes: Vec<u8>) -> ByteReader<Cursor<Vec<u8>>> {
        ByteReader::new(Cursor::new(bytes), ByteOrder::Big).unwrap()
    }

    #[test]
    fn parses_signed_header() {
        let mut r = reader(image(MAGIC_SIGNED, 0x94, b"patch_mp"));
        let h = Header::read(&mut r, Some(Platform::WiiU)).unwrap();
        assert_eq!(h.magic, Magic::Signed);
        assert_eq!(h.platform(), Some(Platform::WiiU));
        assert_eq!(h.name(), "patch_mp");
    }

    #[test]
    fn parses_unsigned_header_without_version_check() {
        let mut r = reader(image(MAGIC_UNSIGNED, 0x1234, b"x"));
        let h = Header::read(&mut r, None).unwrap();
        assert_eq!(h.magic, Magic::Unsigned);
        assert_eq!(h.platform(), None);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut r = reader(image(0x4241_4442_4144_4241, 0x94, b"x"));
        match Header::read(&mut r, Some(Platform::WiiU)) {
            Err(FastFileError::Format(FormatError::InvalidMagic(m))) => assert_eq!(m, 0x4241_4442_4144_4241),
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn rejects_version_mismatch_before_identifier() {
        // Truncated right after the version: the mismatch must win over EOF.
        let mut bytes = image(MAGIC_SIGNED, 0x93, b"x");
        bytes.truncate(12);
        let mut r = reader(bytes);
        match Header::read(&mut r, Some(Platform::WiiU)) {
            Err(FastFileError::Format(FormatError::VersionMismatch { found, expected })) => {
                assert_eq!(found, 0x93);
                assert_eq!(expected, 0x94);
            }
            other => panic!("expected VersionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn little_endian_header() {
        let mut bytes = image(0, 0, b"le");
        bytes[0..8].copy_from_slice(&MAGIC_SIGNED.to_le_bytes());
        bytes[8..12].copy_from_slice(&0x93u32.to_le_bytes());
        let mut r = ByteReader::new(Cursor::new(bytes), ByteOrder::Little).unwrap();
        let h = Header::read(&mut r, Some(Platform::Pc)).unwrap();
        assert_eq!(h.magic, Magic::Signed);
    }
}
