//! Candidate selection.
//!
//! An [`EntrySelector`] decides which entries of a mounted container are
//! decoded and transformed. Everything else is passed through unexamined.
//!
//! | Selector | Selects |
//! |----------|---------|
//! | [`FileTable`] | Entries whose path hash is in the table |
//! | [`SelectByContentType`] | Entries whose decompressed data sniffs as one of the given types |
//! | `Fn(&Entry) -> bool` | Custom predicate over the TOC record |

use std::io::{Read, Seek};

use super::files::FileTable;
use crate::format::detect::ContentType;
use crate::read::{Entry, Wad};

/// Chooses the candidate entries of a container.
pub trait EntrySelector {
    /// Returns `true` if the entry should be decoded and transformed.
    ///
    /// Selectors may read from the container to inspect the entry; a read
    /// error means the entry is not a candidate.
    fn select<R: Read + Seek>(&self, wad: &mut Wad<R>, entry: &Entry) -> bool;
}

impl EntrySelector for FileTable {
    fn select<R: Read + Seek>(&self, _wad: &mut Wad<R>, entry: &Entry) -> bool {
        self.contains(entry.path_hash)
    }
}

impl<F: Fn(&Entry) -> bool> EntrySelector for F {
    fn select<R: Read + Seek>(&self, _wad: &mut Wad<R>, entry: &Entry) -> bool {
        self(entry)
    }
}

/// Selects entries by sniffing the start of their decompressed data.
///
/// This is the scan-all strategy: it finds property bins wherever they
/// live, at the cost of partially decompressing every entry.
#[derive(Debug, Clone)]
pub struct SelectByContentType {
    types: Vec<ContentType>,
}

impl SelectByContentType {
    /// Selects entries of any of the given types.
    pub fn new(types: impl IntoIterator<Item = ContentType>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    /// Selects every property bin.
    pub fn property_bins() -> Self {
        Self::new([ContentType::PropertyBin])
    }
}

impl Default for SelectByContentType {
    fn default() -> Self {
        Self::property_bins()
    }
}

impl EntrySelector for SelectByContentType {
    fn select<R: Read + Seek>(&self, wad: &mut Wad<R>, entry: &Entry) -> bool {
        match wad.content_type(entry.path_hash) {
            Ok(content_type) => self.types.contains(&content_type),
            Err(e) => {
                log::debug!("Skipping {:016x}: {}", entry.path_hash, e);
                false
            }
        }
    }
}
