//! Entry lookup and payload access.

use std::io::{Read, Seek, SeekFrom};

use crate::codec::{self, Compression};
use crate::format::detect::{ContentType, SNIFF_LEN};
use crate::format::toc::Entry;
use crate::{Error, Result};

use super::Wad;

impl<R: Read + Seek> Wad<R> {
    /// Looks up an entry by path hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if no entry has this hash.
    pub fn entry(&self, path_hash: u64) -> Result<&Entry> {
        self.index
            .get(&path_hash)
            .map(|&i| &self.entries[i])
            .ok_or(Error::EntryNotFound { path_hash })
    }

    /// Reads the stored (possibly compressed) bytes of an entry.
    pub fn read_raw(&mut self, path_hash: u64) -> Result<Vec<u8>> {
        let entry = self.entry(path_hash)?.clone();
        self.read_entry_raw(&entry)
    }

    /// Reads the stored bytes described by a TOC record.
    pub fn read_entry_raw(&mut self, entry: &Entry) -> Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut data = vec![0u8; entry.compressed_size as usize];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Reads and decompresses an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCompression`] for satellite entries and
    /// unknown compression ids, [`Error::Decompression`] if the codec
    /// fails, and [`Error::SizeMismatch`] if the output does not have the
    /// declared uncompressed size.
    pub fn read(&mut self, path_hash: u64) -> Result<Vec<u8>> {
        let entry = self.entry(path_hash)?.clone();
        let raw = self.read_entry_raw(&entry)?;
        decompress_entry(&entry, &raw)
    }

    /// Decompresses at most `len` bytes from the start of an entry.
    pub fn peek(&mut self, path_hash: u64, len: usize) -> Result<Vec<u8>> {
        let entry = self.entry(path_hash)?.clone();
        let compression = decodable(&entry)?;
        // A prefix of the stored bytes is enough for stored entries.
        let stored_len = match compression {
            Compression::None => (len as u32).min(entry.compressed_size),
            _ => entry.compressed_size,
        };
        let raw = self.read_entry_raw(&Entry {
            compressed_size: stored_len,
            ..entry.clone()
        })?;
        codec::decompress_prefix(compression, &raw, len).map_err(|source| Error::Decompression {
            path_hash: entry.path_hash,
            source,
        })
    }

    /// Detects the content type of an entry from its first decompressed bytes.
    pub fn content_type(&mut self, path_hash: u64) -> Result<ContentType> {
        let head = self.peek(path_hash, SNIFF_LEN)?;
        Ok(ContentType::detect(&head))
    }
}

fn decodable(entry: &Entry) -> Result<Compression> {
    match entry.compression() {
        Some(kind) if kind.is_decodable() => Ok(kind),
        _ => Err(Error::UnsupportedCompression {
            path_hash: entry.path_hash,
            id: entry.compression_id,
        }),
    }
}

/// Decompresses stored entry bytes and checks the declared size.
pub fn decompress_entry(entry: &Entry, raw: &[u8]) -> Result<Vec<u8>> {
    let compression = decodable(entry)?;
    let data = codec::decompress(compression, raw, entry.uncompressed_size as usize).map_err(
        |source| Error::Decompression {
            path_hash: entry.path_hash,
            source,
        },
    )?;
    if data.len() as u64 != entry.uncompressed_size as u64 {
        return Err(Error::SizeMismatch {
            path_hash: entry.path_hash,
            expected: entry.uncompressed_size as u64,
            actual: data.len() as u64,
        });
    }
    Ok(data)
}
