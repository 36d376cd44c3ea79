//! Container opening methods.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::format::header::WadHeader;
use crate::format::toc::Entry;
use crate::{Error, Result};

use super::Wad;

impl Wad<BufReader<File>> {
    /// Opens a container from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContainerNotFound`] if the file does not exist, and
    /// the errors of [`Wad::open`] otherwise.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ContainerNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> Wad<R> {
    /// Opens a container from a reader.
    ///
    /// Parses the header and the table of contents; no payload is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for a non-WAD input and
    /// [`Error::CorruptHeader`] when the table of contents is truncated or
    /// points outside the file.
    pub fn open(mut reader: R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = WadHeader::parse(&mut reader)?;
        if header.data_start() > file_len {
            return Err(Error::CorruptHeader {
                offset: header.toc_offset,
                reason: format!(
                    "table of contents of {} entries ends past the end of the file ({} bytes)",
                    header.entry_count, file_len
                ),
            });
        }

        reader.seek(SeekFrom::Start(header.toc_offset))?;
        let mut entries = Vec::with_capacity(header.entry_count as usize);
        let mut index = HashMap::with_capacity(header.entry_count as usize);
        for i in 0..header.entry_count as u64 {
            let record_offset = header.toc_offset + i * header.toc_entry_size as u64;
            let entry = Entry::parse(
                &mut reader,
                header.version_major,
                header.toc_entry_size,
                record_offset,
            )?;
            if entry.data_range().end > file_len {
                return Err(Error::CorruptHeader {
                    offset: record_offset,
                    reason: format!(
                        "entry {:016x} data ends past the end of the file",
                        entry.path_hash
                    ),
                });
            }
            index.entry(entry.path_hash).or_insert(entries.len());
            entries.push(entry);
        }

        log::debug!(
            "Mounted WAD {}.{} with {} entries",
            header.version_major,
            header.version_minor,
            entries.len()
        );

        Ok(Self {
            reader,
            header,
            entries,
            index,
        })
    }
}
