//! Table of contents records.
//!
//! Record layout (version 2 and 3, 32 bytes):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 8 | path hash (XXH64 of the lower-cased path) |
//! | 8 | 4 | payload offset |
//! | 12 | 4 | stored size |
//! | 16 | 4 | uncompressed size |
//! | 20 | 1 | low nibble: compression, high nibble: subchunk count |
//! | 21 | 1 | duplicated flag |
//! | 22 | 2 | first subchunk index |
//! | 24 | 8 | checksum of the stored bytes |
//!
//! Version 1 records stop after the subchunk index.

use std::io::{Read, Write};

use crate::codec::Compression;
use crate::{Error, Result};

use super::reader::{read_u8, read_u16_le, read_u32_le, read_u64_le};
use super::reader::{write_u16_le, write_u32_le, write_u64_le};

/// An entry of a container's table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Entry {
    /// XXH64 hash of the lower-cased entry path.
    pub path_hash: u64,
    /// Absolute offset of the stored bytes.
    pub offset: u32,
    /// Number of stored (compressed) bytes.
    pub compressed_size: u32,
    /// Number of bytes after decompression.
    pub uncompressed_size: u32,
    /// Raw compression id (low nibble of the type byte).
    pub compression_id: u8,
    /// Number of subchunks (high nibble of the type byte).
    pub subchunk_count: u8,
    /// Whether the stored bytes are shared with another entry.
    pub duplicated: bool,
    /// Index of the first subchunk.
    pub subchunk_index: u16,
    /// Checksum of the stored bytes (0 for version 1 containers).
    pub checksum: u64,
}

impl Entry {
    /// Returns the compression kind, or `None` for an unknown id.
    pub fn compression(&self) -> Option<Compression> {
        Compression::from_id(self.compression_id)
    }

    /// Returns the packed type byte.
    pub fn type_byte(&self) -> u8 {
        (self.subchunk_count << 4) | (self.compression_id & 0x0F)
    }

    /// Returns the byte range of the stored payload.
    pub fn data_range(&self) -> std::ops::Range<u64> {
        let start = self.offset as u64;
        start..start + self.compressed_size as u64
    }

    /// Parses one TOC record.
    ///
    /// `record_size` is the per-record size announced by the header; any
    /// bytes beyond the known fields are skipped. `record_offset` is only
    /// used for error reporting.
    pub fn parse<R: Read>(r: &mut R, version_major: u8, record_size: u16, record_offset: u64) -> Result<Self> {
        let mut record = vec![0u8; record_size as usize];
        r.read_exact(&mut record).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::CorruptHeader {
                    offset: record_offset,
                    reason: "truncated table of contents".into(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let mut cursor = record.as_slice();
        let path_hash = read_u64_le(&mut cursor)?;
        let offset = read_u32_le(&mut cursor)?;
        let compressed_size = read_u32_le(&mut cursor)?;
        let uncompressed_size = read_u32_le(&mut cursor)?;
        let type_byte = read_u8(&mut cursor)?;
        let duplicated = read_u8(&mut cursor)? != 0;
        let subchunk_index = read_u16_le(&mut cursor)?;
        let checksum = if version_major >= 2 {
            read_u64_le(&mut cursor)?
        } else {
            0
        };

        Ok(Self {
            path_hash,
            offset,
            compressed_size,
            uncompressed_size,
            compression_id: type_byte & 0x0F,
            subchunk_count: type_byte >> 4,
            duplicated,
            subchunk_index,
            checksum,
        })
    }

    /// Writes this entry as a 32-byte version 3 record.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64_le(w, self.path_hash)?;
        write_u32_le(w, self.offset)?;
        write_u32_le(w, self.compressed_size)?;
        write_u32_le(w, self.uncompressed_size)?;
        w.write_all(&[self.type_byte(), self.duplicated as u8])?;
        write_u16_le(w, self.subchunk_index)?;
        write_u64_le(w, self.checksum)?;
        Ok(())
    }
}
