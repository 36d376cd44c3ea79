//! Property type tags.

/// Type tag of a property value.
///
/// Tags below `0x80` are primitives with a fixed or length-prefixed
/// encoding; tags from `0x80` are composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyKind {
    /// No payload.
    None = 0x00,
    /// Boolean stored as one byte.
    Bool = 0x01,
    /// Signed 8-bit integer.
    I8 = 0x02,
    /// Unsigned 8-bit integer.
    U8 = 0x03,
    /// Signed 16-bit integer.
    I16 = 0x04,
    /// Unsigned 16-bit integer.
    U16 = 0x05,
    /// Signed 32-bit integer.
    I32 = 0x06,
    /// Unsigned 32-bit integer.
    U32 = 0x07,
    /// Signed 64-bit integer.
    I64 = 0x08,
    /// Unsigned 64-bit integer.
    U64 = 0x09,
    /// 32-bit float.
    F32 = 0x0A,
    /// Two floats.
    Vector2 = 0x0B,
    /// Three floats.
    Vector3 = 0x0C,
    /// Four floats.
    Vector4 = 0x0D,
    /// Sixteen floats, row major.
    Matrix44 = 0x0E,
    /// RGBA color, one byte per channel.
    Color = 0x0F,
    /// UTF-8 string with a 16-bit length prefix.
    String = 0x10,
    /// 32-bit FNV-1a hash.
    Hash = 0x11,
    /// 64-bit XXH64 path hash of a container entry.
    WadChunkLink = 0x12,
    /// Ordered list of same-typed items.
    Container = 0x80,
    /// Unordered list of same-typed items.
    UnorderedContainer = 0x81,
    /// Class instance referenced by value.
    Struct = 0x82,
    /// Class instance embedded in its owner.
    Embedded = 0x83,
    /// Path hash of another object.
    ObjectLink = 0x84,
    /// Zero or one item.
    Optional = 0x85,
    /// Key/value pairs.
    Map = 0x86,
    /// Boolean packed as one byte.
    BitBool = 0x87,
}

impl PropertyKind {
    /// Parses a type tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        use PropertyKind::*;
        Some(match tag {
            0x00 => None,
            0x01 => Bool,
            0x02 => I8,
            0x03 => U8,
            0x04 => I16,
            0x05 => U16,
            0x06 => I32,
            0x07 => U32,
            0x08 => I64,
            0x09 => U64,
            0x0A => F32,
            0x0B => Vector2,
            0x0C => Vector3,
            0x0D => Vector4,
            0x0E => Matrix44,
            0x0F => Color,
            0x10 => String,
            0x11 => Hash,
            0x12 => WadChunkLink,
            0x80 => Container,
            0x81 => UnorderedContainer,
            0x82 => Struct,
            0x83 => Embedded,
            0x84 => ObjectLink,
            0x85 => Optional,
            0x86 => Map,
            0x87 => BitBool,
            _ => return Option::None,
        })
    }

    /// Returns the type tag.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns `true` for composite kinds (tags `0x80` and above).
    pub fn is_composite(self) -> bool {
        self.tag() & 0x80 != 0
    }

    /// Returns the encoded size of a value of this kind, if it is fixed.
    pub fn fixed_size(self) -> Option<usize> {
        use PropertyKind::*;
        match self {
            None => Some(0),
            Bool | I8 | U8 | BitBool => Some(1),
            I16 | U16 => Some(2),
            I32 | U32 | F32 | Hash | ObjectLink | Color => Some(4),
            I64 | U64 | WadChunkLink | Vector2 => Some(8),
            Vector3 => Some(12),
            Vector4 => Some(16),
            Matrix44 => Some(64),
            String | Container | UnorderedContainer | Struct | Embedded | Optional | Map => {
                Option::None
            }
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
