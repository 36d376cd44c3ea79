//! Container reading API for WAD files.
//!
//! Mounting a container parses only its header and table of contents;
//! payloads are read and decompressed lazily, one entry at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use widefix::hash;
//! use widefix::read::Wad;
//!
//! let mut wad = Wad::open_path("UI.wad.client")?;
//! println!("WAD {}.{}, {} entries", wad.version().0, wad.version().1, wad.len());
//!
//! let path_hash = hash::xxh64("ux/renderui/shared_renderui.bin");
//! if wad.contains(path_hash) {
//!     let data = wad.read(path_hash)?;
//!     println!("{} bytes", data.len());
//! }
//! # Ok::<(), widefix::Error>(())
//! ```

mod open;
mod query;

use std::collections::HashMap;

pub use crate::format::detect::ContentType;
pub use crate::format::header::WadHeader;
pub use crate::format::toc::Entry;
pub use query::decompress_entry;

use crate::checksum::ChecksumKind;

/// A mounted WAD container.
///
/// The container keeps its reader; every payload access seeks to the
/// entry's stored bytes.
pub struct Wad<R> {
    pub(crate) reader: R,
    pub(crate) header: WadHeader,
    pub(crate) entries: Vec<Entry>,
    /// Path hash to the first entry index with that hash.
    pub(crate) index: HashMap<u64, usize>,
}

impl<R> std::fmt::Debug for Wad<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wad")
            .field("version", &self.version())
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<R> Wad<R> {
    /// Returns the container version as `(major, minor)`.
    pub fn version(&self) -> (u8, u8) {
        (self.header.version_major, self.header.version_minor)
    }

    /// Returns the parsed header.
    pub fn header(&self) -> &WadHeader {
        &self.header
    }

    /// Returns the checksum kind used by this container's TOC.
    ///
    /// Version 1 containers have no checksums.
    pub fn checksum_kind(&self) -> Option<ChecksumKind> {
        ChecksumKind::for_version(self.header.version_major, self.header.version_minor)
    }

    /// Returns all entries in TOC order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the container has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if an entry with this path hash exists.
    pub fn contains(&self, path_hash: u64) -> bool {
        self.index.contains_key(&path_hash)
    }

    /// Consumes the container and returns its reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
