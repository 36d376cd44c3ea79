//! WAD container header structures and parsing.

use std::io::{self, Read, Write};

use crate::{Error, Result};

use super::reader::{read_bytes, read_u8, read_u16_le, read_u32_le, read_u64_le};
use super::reader::{write_u32_le, write_u64_le};
use super::{MAGIC, V2_SIGNATURE_LEN, V3_SIGNATURE_LEN, header_size, toc_entry_size};

/// The header of a WAD container.
///
/// Version 1 and 2 headers carry an explicit TOC offset and record size;
/// version 3 fixes both (the TOC starts right after the 272-byte header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadHeader {
    /// Format version - major number (1, 2 or 3).
    pub version_major: u8,
    /// Format version - minor number.
    pub version_minor: u8,
    /// Raw signature field (empty for version 1).
    pub signature: Vec<u8>,
    /// Header checksum (0 for version 1).
    pub checksum: u64,
    /// Absolute offset of the first TOC record.
    pub toc_offset: u64,
    /// Size of one TOC record.
    pub toc_entry_size: u16,
    /// Number of TOC records.
    pub entry_count: u32,
}

impl WadHeader {
    /// Creates a version 3 header for `entry_count` entries.
    pub fn v3(version_minor: u8, entry_count: u32) -> Self {
        Self {
            version_major: 3,
            version_minor,
            signature: vec![0; V3_SIGNATURE_LEN],
            checksum: 0,
            toc_offset: header_size::V3,
            toc_entry_size: toc_entry_size::V3,
            entry_count,
        }
    }

    /// Parses a header from the start of a container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the magic is missing or the major
    /// version is unknown, and [`Error::CorruptHeader`] if the header is
    /// truncated or its TOC geometry is impossible.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 2];
        r.read_exact(&mut magic).map_err(|e| truncated(e, 0))?;
        if magic != *MAGIC {
            return Err(Error::InvalidFormat("missing RW magic".into()));
        }

        let version_major = read_u8(r).map_err(|e| truncated(e, 2))?;
        let version_minor = read_u8(r).map_err(|e| truncated(e, 3))?;

        let header = match version_major {
            1 => {
                let toc_offset = read_u16_le(r).map_err(|e| truncated(e, 4))?;
                let toc_entry_size = read_u16_le(r).map_err(|e| truncated(e, 6))?;
                let entry_count = read_u32_le(r).map_err(|e| truncated(e, 8))?;
                Self {
                    version_major,
                    version_minor,
                    signature: Vec::new(),
                    checksum: 0,
                    toc_offset: toc_offset as u64,
                    toc_entry_size,
                    entry_count,
                }
            }
            2 => {
                let signature_len = read_u8(r).map_err(|e| truncated(e, 4))?;
                let mut signature =
                    read_bytes(r, V2_SIGNATURE_LEN).map_err(|e| truncated(e, 5))?;
                signature.truncate(signature_len as usize);
                let checksum = read_u64_le(r).map_err(|e| truncated(e, 88))?;
                let toc_offset = read_u16_le(r).map_err(|e| truncated(e, 96))?;
                let toc_entry_size = read_u16_le(r).map_err(|e| truncated(e, 98))?;
                let entry_count = read_u32_le(r).map_err(|e| truncated(e, 100))?;
                Self {
                    version_major,
                    version_minor,
                    signature,
                    checksum,
                    toc_offset: toc_offset as u64,
                    toc_entry_size,
                    entry_count,
                }
            }
            3 => {
                let signature = read_bytes(r, V3_SIGNATURE_LEN).map_err(|e| truncated(e, 4))?;
                let checksum = read_u64_le(r).map_err(|e| truncated(e, 260))?;
                let entry_count = read_u32_le(r).map_err(|e| truncated(e, 268))?;
                Self {
                    version_major,
                    version_minor,
                    signature,
                    checksum,
                    toc_offset: header_size::V3,
                    toc_entry_size: toc_entry_size::V3,
                    entry_count,
                }
            }
            _ => {
                return Err(Error::InvalidFormat(format!(
                    "unsupported WAD version {}.{}",
                    version_major, version_minor
                )));
            }
        };

        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        let (min_offset, min_entry) = match self.version_major {
            1 => (header_size::V1, toc_entry_size::V1),
            2 => (header_size::V2, toc_entry_size::V2),
            _ => (header_size::V3, toc_entry_size::V3),
        };
        if self.toc_offset < min_offset {
            return Err(Error::CorruptHeader {
                offset: self.toc_offset,
                reason: format!("TOC offset {} overlaps the header", self.toc_offset),
            });
        }
        if self.toc_entry_size < min_entry {
            return Err(Error::CorruptHeader {
                offset: self.toc_offset,
                reason: format!(
                    "TOC record size {} is smaller than {}",
                    self.toc_entry_size, min_entry
                ),
            });
        }
        Ok(())
    }

    /// Returns the total size of the table of contents.
    pub fn toc_size(&self) -> u64 {
        self.entry_count as u64 * self.toc_entry_size as u64
    }

    /// Returns the offset of the first byte after the table of contents.
    pub fn data_start(&self) -> u64 {
        self.toc_offset + self.toc_size()
    }

    /// Writes this header in the version 3 layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFeature`] for any other major version.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        if self.version_major != 3 {
            return Err(Error::UnsupportedFeature {
                feature: "writing WAD versions other than 3",
            });
        }
        w.write_all(MAGIC)?;
        w.write_all(&[self.version_major, self.version_minor])?;
        let mut signature = [0u8; V3_SIGNATURE_LEN];
        let len = self.signature.len().min(V3_SIGNATURE_LEN);
        signature[..len].copy_from_slice(&self.signature[..len]);
        w.write_all(&signature)?;
        write_u64_le(w, self.checksum)?;
        write_u32_le(w, self.entry_count)?;
        Ok(())
    }
}

fn truncated(err: io::Error, offset: u64) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::CorruptHeader {
            offset,
            reason: "truncated header".into(),
        }
    } else {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_v3_write_parse() {
        let header = WadHeader::v3(4, 7);
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, header_size::V3);

        let parsed = WadHeader::parse(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.data_start(), 272 + 7 * 32);
    }

    #[test]
    fn test_v1_header() {
        let mut buf = b"RW\x01\x00".to_vec();
        buf.extend_from_slice(&12u16.to_le_bytes());
        buf.extend_from_slice(&24u16.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());

        let parsed = WadHeader::parse(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed.version_major, 1);
        assert_eq!(parsed.toc_offset, 12);
        assert_eq!(parsed.toc_entry_size, 24);
        assert_eq!(parsed.entry_count, 2);
    }

    #[test]
    fn test_v2_header() {
        let mut buf = b"RW\x02\x00".to_vec();
        buf.push(3);
        let mut signature = [0u8; V2_SIGNATURE_LEN];
        signature[..3].copy_from_slice(b"sig");
        buf.extend_from_slice(&signature);
        buf.extend_from_slice(&0x55u64.to_le_bytes());
        buf.extend_from_slice(&104u16.to_le_bytes());
        buf.extend_from_slice(&32u16.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        assert_eq!(buf.len() as u64, header_size::V2);

        let parsed = WadHeader::parse(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed.signature, b"sig");
        assert_eq!(parsed.checksum, 0x55);
        assert_eq!(parsed.toc_offset, 104);
    }

    #[test]
    fn test_bad_magic() {
        let err = WadHeader::parse(&mut Cursor::new(b"PK\x03\x04")).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_unknown_version() {
        let err = WadHeader::parse(&mut Cursor::new(b"RW\x09\x00")).unwrap_err();
        assert!(err.to_string().contains("9.0"));
    }

    #[test]
    fn test_truncated_header() {
        let err = WadHeader::parse(&mut Cursor::new(b"RW\x03\x01\x00\x00")).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader { offset: 4, .. }));
    }

    #[test]
    fn test_toc_overlapping_header() {
        let mut buf = b"RW\x01\x00".to_vec();
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&24u16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        let err = WadHeader::parse(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader { .. }));
    }
}
