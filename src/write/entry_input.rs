//! Entry input kinds.

use crate::checksum::ChecksumKind;
use crate::format::toc::Entry;

/// An entry handed to [`WadWriter::add`](super::WadWriter::add).
#[derive(Debug, Clone)]
pub enum EntryInput {
    /// Uncompressed payload; the writer compresses it with
    /// [`WriteOptions::compression`](super::WriteOptions::compression).
    Data(Vec<u8>),
    /// Stored bytes copied from another container without decoding.
    Raw {
        /// The stored (possibly compressed) bytes.
        data: Vec<u8>,
        /// The source TOC record; its sizes, compression and subchunk
        /// fields are kept. Offset and duplicate flag are reassigned.
        entry: Entry,
        /// Checksum kind of the source container, if it had checksums.
        checksum_kind: Option<ChecksumKind>,
    },
}

impl EntryInput {
    /// Creates a passthrough input from a source TOC record and its stored bytes.
    pub fn raw(entry: Entry, data: Vec<u8>, checksum_kind: Option<ChecksumKind>) -> Self {
        EntryInput::Raw {
            data,
            entry,
            checksum_kind,
        }
    }

    /// Returns the uncompressed size of this input.
    pub fn uncompressed_size(&self) -> u64 {
        match self {
            EntryInput::Data(data) => data.len() as u64,
            EntryInput::Raw { entry, .. } => entry.uncompressed_size as u64,
        }
    }
}
