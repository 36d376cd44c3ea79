//! Write options and result types.

use crate::checksum::ChecksumKind;
use crate::codec::Compression;

/// Options for building containers.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compression applied to [`EntryInput::Data`](super::EntryInput::Data) entries.
    pub compression: Compression,
    /// Compression level (codec-specific; zstd 1-22, gzip 0-9).
    pub level: i32,
    /// Checksum algorithm of the TOC. Also selects the written minor version.
    pub checksum: ChecksumKind,
    /// Whether identical stored payloads are written once.
    pub deduplicate: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Zstd,
            level: 3,
            checksum: ChecksumKind::Xxh3,
            deduplicate: true,
        }
    }
}

impl WriteOptions {
    /// Creates new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression for freshly encoded entries.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the compression level.
    pub fn level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Sets the checksum algorithm.
    pub fn checksum(mut self, checksum: ChecksumKind) -> Self {
        self.checksum = checksum;
        self
    }

    /// Enables or disables payload deduplication.
    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Returns the minor version written for the chosen checksum kind.
    ///
    /// SHA-256 checksums imply version 3.0; XXH3 implies 3.1 or later, and
    /// 3.4 is what current game builds ship.
    pub fn version_minor(&self) -> u8 {
        match self.checksum {
            ChecksumKind::Sha256 => 0,
            ChecksumKind::Xxh3 => 4,
        }
    }
}

/// Result of a container write operation.
#[derive(Debug, Clone, Default)]
pub struct WriteResult {
    /// Number of TOC entries written.
    pub entries_written: usize,
    /// Number of entries whose payload was shared with an earlier entry.
    pub duplicates: usize,
    /// Number of entries compressed by the writer.
    pub entries_encoded: usize,
    /// Number of checksums recomputed for raw entries of another kind.
    pub checksums_recomputed: usize,
    /// Total uncompressed bytes.
    pub total_size: u64,
    /// Total stored bytes written (after deduplication).
    pub compressed_size: u64,
    /// Total container size.
    pub bytes_written: u64,
}

impl WriteResult {
    /// Returns the compression ratio (stored / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }
}
