//! Container writing API for WAD files.
//!
//! [`WadWriter`] collects entries in memory and lays the container out on
//! [`finish`](WadWriter::finish): a version 3 header, the TOC sorted by path
//! hash, then the payloads in the same order. Identical stored payloads are
//! written once and every later entry pointing at them is flagged as
//! duplicated.
//!
//! # Example
//!
//! ```rust
//! use widefix::hash;
//! use widefix::write::{EntryInput, WadWriter, WriteOptions};
//!
//! let mut buf = Vec::new();
//! let mut writer = WadWriter::new(&mut buf, WriteOptions::default());
//! writer.add(hash::xxh64("data/a.bin"), EntryInput::Data(b"PROP".to_vec()))?;
//! writer.add(hash::xxh64("data/b.bin"), EntryInput::Data(b"PROP".to_vec()))?;
//! let result = writer.finish()?;
//! assert_eq!(result.entries_written, 2);
//! assert_eq!(result.duplicates, 1);
//! # Ok::<(), widefix::Error>(())
//! ```

mod entry_input;
pub(crate) mod options;

pub use entry_input::EntryInput;
pub use options::{WriteOptions, WriteResult};

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use crate::codec;
use crate::format::header::WadHeader;
use crate::format::toc::Entry;
use crate::format::{header_size, toc_entry_size};
use crate::{Error, Result};

/// Entry data stored until the layout is known.
#[derive(Debug)]
struct PendingEntry {
    stored: Vec<u8>,
    uncompressed_size: u32,
    compression_id: u8,
    subchunk_count: u8,
    subchunk_index: u16,
    checksum: u64,
}

/// A WAD container writer.
pub struct WadWriter<W: Write> {
    sink: W,
    options: WriteOptions,
    pending: BTreeMap<u64, PendingEntry>,
    result: WriteResult,
}

impl<W: Write> std::fmt::Debug for WadWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WadWriter")
            .field("options", &self.options)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<W: Write> WadWriter<W> {
    /// Creates a writer that emits into `sink`.
    pub fn new(sink: W, options: WriteOptions) -> Self {
        Self {
            sink,
            options,
            pending: BTreeMap::new(),
            result: WriteResult::default(),
        }
    }

    /// Returns the number of entries added so far.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no entry was added.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Adds an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryExists`] if `path_hash` was already added, and
    /// [`Error::Encode`] if the payload does not fit a 32-bit size field or
    /// cannot be compressed.
    pub fn add(&mut self, path_hash: u64, input: EntryInput) -> Result<()> {
        if self.pending.contains_key(&path_hash) {
            return Err(Error::EntryExists { path_hash });
        }

        let pending = match input {
            EntryInput::Data(data) => {
                let uncompressed_size = size_u32(data.len(), path_hash)?;
                let stored = codec::compress(self.options.compression, &data, self.options.level)
                    .map_err(|e| Error::Encode(format!("entry {path_hash:016x}: {e}")))?;
                self.result.entries_encoded += 1;
                PendingEntry {
                    checksum: self.options.checksum.compute(&stored),
                    stored,
                    uncompressed_size,
                    compression_id: self.options.compression.id(),
                    subchunk_count: 0,
                    subchunk_index: 0,
                }
            }
            EntryInput::Raw {
                data,
                entry,
                checksum_kind,
            } => {
                let checksum = if checksum_kind == Some(self.options.checksum) {
                    entry.checksum
                } else {
                    self.result.checksums_recomputed += 1;
                    self.options.checksum.compute(&data)
                };
                PendingEntry {
                    stored: data,
                    uncompressed_size: entry.uncompressed_size,
                    compression_id: entry.compression_id,
                    subchunk_count: entry.subchunk_count,
                    subchunk_index: entry.subchunk_index,
                    checksum,
                }
            }
        };

        size_u32(pending.stored.len(), path_hash)?;
        self.pending.insert(path_hash, pending);
        Ok(())
    }

    /// Writes the container and returns statistics.
    pub fn finish(mut self) -> Result<WriteResult> {
        let count = self.pending.len();
        let entry_count = u32::try_from(count)
            .map_err(|_| Error::Encode(format!("too many entries: {count}")))?;
        let data_start = header_size::V3 + count as u64 * toc_entry_size::V3 as u64;

        // Layout pass: assign offsets in path hash order.
        let mut toc = Vec::with_capacity(count);
        let mut payloads: Vec<&[u8]> = Vec::new();
        let mut seen: HashMap<&[u8], u32> = HashMap::new();
        let mut cursor = data_start;
        for (&path_hash, pending) in &self.pending {
            let shared = if self.options.deduplicate {
                seen.get(pending.stored.as_slice()).copied()
            } else {
                None
            };
            let offset = match shared {
                Some(offset) => {
                    self.result.duplicates += 1;
                    offset
                }
                None => {
                    let offset = u32::try_from(cursor).map_err(|_| {
                        Error::Encode(format!("container exceeds 4 GiB at entry {path_hash:016x}"))
                    })?;
                    if self.options.deduplicate {
                        seen.insert(pending.stored.as_slice(), offset);
                    }
                    payloads.push(&pending.stored);
                    cursor += pending.stored.len() as u64;
                    self.result.compressed_size += pending.stored.len() as u64;
                    offset
                }
            };
            self.result.total_size += pending.uncompressed_size as u64;
            toc.push(Entry {
                path_hash,
                offset,
                compressed_size: pending.stored.len() as u32,
                uncompressed_size: pending.uncompressed_size,
                compression_id: pending.compression_id,
                subchunk_count: pending.subchunk_count,
                duplicated: shared.is_some(),
                subchunk_index: pending.subchunk_index,
                checksum: pending.checksum,
            });
        }

        WadHeader::v3(self.options.version_minor(), entry_count).write(&mut self.sink)?;
        for entry in &toc {
            entry.write(&mut self.sink)?;
        }
        for payload in payloads {
            self.sink.write_all(payload)?;
        }
        self.sink.flush()?;

        self.result.entries_written = count;
        self.result.bytes_written = cursor;
        log::debug!(
            "Wrote WAD 3.{} with {} entries ({} duplicates, {} bytes)",
            self.options.version_minor(),
            count,
            self.result.duplicates,
            cursor
        );
        Ok(self.result)
    }
}

fn size_u32(len: usize, path_hash: u64) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::Encode(format!("entry {path_hash:016x} is larger than 4 GiB")))
}
