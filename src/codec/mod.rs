//! Entry compression codecs.
//!
//! Every entry of a WAD container is compressed independently. The table of
//! contents records the kind in the low nibble of the type byte:
//!
//! | Id | Kind | Decoder |
//! |----|------|---------|
//! | 0 | [`Compression::None`] | stored bytes |
//! | 1 | [`Compression::Gzip`] | [`gzip::GzipDecoder`] |
//! | 2 | [`Compression::Satellite`] | not supported (payload lives in another file) |
//! | 3 | [`Compression::Zstd`] | [`zstd::ZstdStreamDecoder`] |
//! | 4 | [`Compression::ZstdMulti`] | stored prefix followed by a zstd stream |
//!
//! The one-shot helpers [`decompress`], [`decompress_prefix`] and [`compress`]
//! cover what the reader and writer need; [`build_decoder`] exposes the
//! streaming form.

pub mod gzip;
pub mod zstd;

use std::io::{self, Cursor, Read, Write};

/// Compression kind of a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Compression {
    /// Stored without compression.
    None = 0,
    /// Gzip stream.
    Gzip = 1,
    /// Reference to an external file; the stored bytes are not a payload.
    Satellite = 2,
    /// Single zstd stream.
    #[default]
    Zstd = 3,
    /// Stored prefix followed by a zstd stream.
    ZstdMulti = 4,
}

impl Compression {
    /// Parses a compression id (low nibble of the TOC type byte).
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Gzip),
            2 => Some(Self::Satellite),
            3 => Some(Self::Zstd),
            4 => Some(Self::ZstdMulti),
            _ => None,
        }
    }

    /// Returns the compression id.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Returns a human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Satellite => "satellite",
            Self::Zstd => "zstd",
            Self::ZstdMulti => "zstd-multi",
        }
    }

    /// Returns `true` if entries of this kind can be decompressed.
    pub fn is_decodable(self) -> bool {
        !matches!(self, Self::Satellite)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for decompression decoders.
pub trait Decoder: Read + Send {
    /// Returns the compression kind this decoder handles.
    fn compression(&self) -> Compression;
}

/// Trait for compression encoders.
pub trait Encoder: Write + Send {
    /// Returns the compression kind this encoder produces.
    fn compression(&self) -> Compression;

    /// Finishes encoding and flushes any remaining data.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Pass-through decoder for stored entries.
pub struct StoredDecoder<R> {
    inner: R,
}

impl<R> std::fmt::Debug for StoredDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredDecoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> StoredDecoder<R> {
    /// Creates a stored-bytes decoder.
    pub fn new(input: R) -> Self {
        Self { inner: input }
    }
}

impl<R: Read + Send> Read for StoredDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for StoredDecoder<R> {
    fn compression(&self) -> Compression {
        Compression::None
    }
}

/// Locates the start of the zstd stream inside a zstd-multi payload.
///
/// Everything before the returned offset is stored verbatim. A payload with
/// no zstd frame is treated as entirely stored.
pub fn zstd_multi_split(data: &[u8]) -> usize {
    data.windows(zstd::ZSTD_MAGIC.len())
        .position(|w| w == zstd::ZSTD_MAGIC)
        .unwrap_or(data.len())
}

/// Builds a streaming decoder over the stored bytes of an entry.
///
/// # Errors
///
/// Returns [`io::ErrorKind::Unsupported`] for satellite entries, or the
/// codec's initialization error.
pub fn build_decoder<'a>(compression: Compression, data: &'a [u8]) -> io::Result<Box<dyn Read + Send + 'a>> {
    match compression {
        Compression::None => Ok(Box::new(StoredDecoder::new(data))),
        Compression::Gzip => Ok(Box::new(gzip::GzipDecoder::new(data))),
        Compression::Zstd => Ok(Box::new(zstd::ZstdStreamDecoder::new(data)?)),
        Compression::ZstdMulti => {
            let split = zstd_multi_split(data);
            let (prefix, stream) = data.split_at(split);
            if stream.is_empty() {
                return Ok(Box::new(Cursor::new(prefix)));
            }
            let tail = zstd::ZstdStreamDecoder::new(stream)?;
            Ok(Box::new(Cursor::new(prefix).chain(tail)))
        }
        Compression::Satellite => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "satellite entries reference external data",
        )),
    }
}

/// Decompresses an entire entry.
///
/// `uncompressed_size` is only a capacity hint; size validation is the
/// caller's job.
pub fn decompress(compression: Compression, data: &[u8], uncompressed_size: usize) -> io::Result<Vec<u8>> {
    if compression == Compression::None {
        return Ok(data.to_vec());
    }
    let mut decoder = build_decoder(compression, data)?;
    let mut out = Vec::with_capacity(uncompressed_size);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Decompresses at most `len` bytes from the start of an entry.
///
/// Used for content sniffing, where only the first few bytes matter.
pub fn decompress_prefix(compression: Compression, data: &[u8], len: usize) -> io::Result<Vec<u8>> {
    let decoder = build_decoder(compression, data)?;
    let mut out = Vec::with_capacity(len);
    decoder.take(len as u64).read_to_end(&mut out)?;
    Ok(out)
}

/// Compresses `data` with the given kind.
///
/// `level` is interpreted per codec (gzip 0-9, zstd 1-22). Zstd-multi output
/// is produced as a plain zstd stream, which is a valid zstd-multi payload
/// with an empty prefix.
///
/// # Errors
///
/// Returns [`io::ErrorKind::Unsupported`] for satellite entries.
pub fn compress(compression: Compression, data: &[u8], level: i32) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder: Box<dyn Encoder + '_> = match compression {
        Compression::None => return Ok(data.to_vec()),
        Compression::Gzip => Box::new(gzip::GzipEncoder::new(
            &mut out,
            &gzip::GzipEncoderOptions::with_level(level.clamp(0, 9) as u32),
        )),
        Compression::Zstd | Compression::ZstdMulti => Box::new(zstd::ZstdEncoder::new(
            &mut out,
            &zstd::ZstdEncoderOptions::with_level(level),
        )?),
        Compression::Satellite => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "satellite entries cannot be produced",
            ));
        }
    };
    encoder.write_all(data)?;
    encoder.finish()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"PROP\x03\x00\x00\x00 anchored rectangles anchored rectangles anchored";

    #[test]
    fn test_compression_ids() {
        for id in 0..=4 {
            let kind = Compression::from_id(id).unwrap();
            assert_eq!(kind.id(), id);
        }
        assert_eq!(Compression::from_id(5), None);
        assert!(!Compression::Satellite.is_decodable());
        assert_eq!(Compression::ZstdMulti.to_string(), "zstd-multi");
    }

    #[test]
    fn test_stored_passthrough() {
        let packed = compress(Compression::None, SAMPLE, 0).unwrap();
        assert_eq!(packed, SAMPLE);
        assert_eq!(decompress(Compression::None, &packed, SAMPLE.len()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_gzip_and_zstd() {
        for kind in [Compression::Gzip, Compression::Zstd] {
            let packed = compress(kind, SAMPLE, 3).unwrap();
            assert_ne!(packed, SAMPLE);
            let unpacked = decompress(kind, &packed, SAMPLE.len()).unwrap();
            assert_eq!(unpacked, SAMPLE, "{kind}");
        }
    }

    #[test]
    fn test_zstd_multi_with_stored_prefix() {
        let (head, tail) = SAMPLE.split_at(8);
        let mut payload = head.to_vec();
        payload.extend(compress(Compression::Zstd, tail, 3).unwrap());

        assert_eq!(zstd_multi_split(&payload), 8);
        let unpacked = decompress(Compression::ZstdMulti, &payload, SAMPLE.len()).unwrap();
        assert_eq!(unpacked, SAMPLE);
    }

    #[test]
    fn test_zstd_multi_without_frame_is_stored() {
        assert_eq!(zstd_multi_split(b"PROP"), 4);
        let unpacked = decompress(Compression::ZstdMulti, b"PROP", 4).unwrap();
        assert_eq!(unpacked, b"PROP");
    }

    #[test]
    fn test_prefix_decoding() {
        let packed = compress(Compression::Zstd, SAMPLE, 3).unwrap();
        let head = decompress_prefix(Compression::Zstd, &packed, 4).unwrap();
        assert_eq!(head, b"PROP");
    }

    #[test]
    fn test_satellite_unsupported() {
        let err = decompress(Compression::Satellite, b"x", 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert!(compress(Compression::Satellite, b"x", 0).is_err());
    }
}
