//! WAD container format constants, definitions, and low-level parsing utilities.
//!
//! A WAD container is a header, a table of contents (TOC) of fixed-size
//! records, and the entry payloads. All integers are little endian.

pub mod detect;
pub mod header;
pub mod reader;
pub mod toc;

/// The WAD file signature (magic bytes): `'R' 'W'`.
pub const MAGIC: &[u8; 2] = b"RW";

/// Major version written by [`WadWriter`](crate::write::WadWriter).
pub const WRITE_VERSION_MAJOR: u8 = 3;

/// Header sizes per major version, in bytes.
pub mod header_size {
    /// Version 1: magic, version, TOC offset, entry size, count.
    pub const V1: u64 = 12;
    /// Version 2: adds an 83-byte signature and a header checksum.
    pub const V2: u64 = 104;
    /// Version 3: 256-byte signature and header checksum; the TOC follows.
    pub const V3: u64 = 272;
}

/// TOC record sizes per major version, in bytes.
pub mod toc_entry_size {
    /// Version 1 records have no checksum.
    pub const V1: u16 = 24;
    /// Version 2 and 3 records end with a 64-bit checksum.
    pub const V2: u16 = 32;
    /// Same layout as version 2.
    pub const V3: u16 = 32;
}

/// Length of the signature field of a version 2 header.
pub const V2_SIGNATURE_LEN: usize = 83;

/// Length of the signature field of a version 3 header.
pub const V3_SIGNATURE_LEN: usize = 256;
