//! Entry content detection.
//!
//! Entry paths are stored only as hashes, so the kind of a payload is
//! inferred from the magic bytes at the start of its decompressed data.

/// Number of decompressed bytes [`ContentType::detect`] looks at.
pub const SNIFF_LEN: usize = 8;

/// Detected entry content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Property bin (`PROP`, or `PTCH` for patch bins).
    PropertyBin,
    /// League texture (`TEX\0`).
    Texture,
    /// DirectDraw surface (`DDS `).
    Dds,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// Wwise sound bank (`BKHD`).
    WwiseBank,
    /// Wwise package (`AKPK`).
    WwisePackage,
    /// Unknown or unrecognized content.
    Unknown,
}

impl ContentType {
    /// Detects the content type from the first bytes of decompressed data.
    pub fn detect(data: &[u8]) -> Self {
        let starts = |magic: &[u8]| data.starts_with(magic);
        if starts(b"PROP") || starts(b"PTCH") {
            ContentType::PropertyBin
        } else if starts(b"TEX\0") {
            ContentType::Texture
        } else if starts(b"DDS ") {
            ContentType::Dds
        } else if starts(b"\x89PNG") {
            ContentType::Png
        } else if starts(&[0xFF, 0xD8, 0xFF]) {
            ContentType::Jpeg
        } else if starts(b"BKHD") {
            ContentType::WwiseBank
        } else if starts(b"AKPK") {
            ContentType::WwisePackage
        } else {
            ContentType::Unknown
        }
    }

    /// Returns the typical file extension for this content.
    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::PropertyBin => "bin",
            ContentType::Texture => "tex",
            ContentType::Dds => "dds",
            ContentType::Png => "png",
            ContentType::Jpeg => "jpg",
            ContentType::WwiseBank => "bnk",
            ContentType::WwisePackage => "wpk",
            ContentType::Unknown => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_property_bins() {
        assert_eq!(ContentType::detect(b"PROP\x03\x00\x00\x00"), ContentType::PropertyBin);
        assert_eq!(ContentType::detect(b"PTCH\x01\x00\x00\x00"), ContentType::PropertyBin);
    }

    #[test]
    fn test_detect_media() {
        assert_eq!(ContentType::detect(b"TEX\0\x01"), ContentType::Texture);
        assert_eq!(ContentType::detect(b"DDS \x7c"), ContentType::Dds);
        assert_eq!(ContentType::detect(b"\x89PNG\r\n\x1a\n"), ContentType::Png);
        assert_eq!(ContentType::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), ContentType::Jpeg);
        assert_eq!(ContentType::detect(b"BKHD"), ContentType::WwiseBank);
        assert_eq!(ContentType::detect(b"AKPK"), ContentType::WwisePackage);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(ContentType::detect(b""), ContentType::Unknown);
        assert_eq!(ContentType::detect(b"PRO"), ContentType::Unknown);
        assert_eq!(ContentType::Unknown.extension(), "");
    }
}
