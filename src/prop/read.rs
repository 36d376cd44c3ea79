//! Property tree decoding.

use std::ops::Range;

use super::kind::PropertyKind;
use super::value::{BinContainer, BinMap, BinOptional, BinProperty, BinStruct, PropertyValue};
use super::{BinObject, BinPatch, BinTree, MAX_DEPTH, PROP_MAGIC, PTCH_MAGIC, next_source_id};
use crate::{Error, Result};

/// Bounds-checked little-endian reader over a byte slice.
///
/// Errors carry the offset at which reading failed.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::entry_format(
                self.pos,
                format!("unexpected end of data: need {} bytes, {} left", len, self.remaining()),
            ));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn floats<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0f32; N];
        for v in &mut out {
            *v = self.f32()?;
        }
        Ok(out)
    }

    pub(crate) fn string(&mut self) -> Result<String> {
        let len = self.u16()? as usize;
        let start = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::entry_format(start, "string is not valid UTF-8"))
    }
}

/// Decodes a complete property tree, taking ownership of its source bytes.
pub(crate) fn decode_tree(source: Vec<u8>) -> Result<BinTree> {
    let source_id = next_source_id();
    let mut r = ByteReader::new(&source);

    let patch_header = if source.starts_with(PTCH_MAGIC) {
        r.take(4)?;
        Some(r.u64()?)
    } else {
        None
    };

    let magic_at = r.pos();
    if r.take(4).ok() != Some(PROP_MAGIC.as_slice()) {
        return Err(Error::entry_format(magic_at, "missing PROP marker"));
    }

    let version_at = r.pos();
    let version = r.u32()?;
    if !(1..=3).contains(&version) {
        return Err(Error::entry_format(
            version_at,
            format!("unsupported property tree version {version}"),
        ));
    }

    let mut dependencies = Vec::new();
    if version >= 2 {
        let count = r.u32()? as usize;
        dependencies.reserve(count.min(r.remaining() / 2));
        for _ in 0..count {
            dependencies.push(r.string()?);
        }
    }

    let object_count = r.u32()? as usize;
    let mut class_hashes = Vec::with_capacity(object_count.min(r.remaining() / 4));
    for _ in 0..object_count {
        class_hashes.push(r.u32()?);
    }

    let mut objects = Vec::with_capacity(class_hashes.len());
    for class_hash in class_hashes {
        objects.push(read_object(&mut r, class_hash, source_id)?);
    }

    let mut patches = Vec::new();
    if patch_header.is_some() && version >= 3 {
        let count = r.u32()? as usize;
        patches.reserve(count.min(r.remaining() / 11));
        for _ in 0..count {
            patches.push(read_patch(&mut r)?);
        }
    }

    if r.remaining() != 0 {
        return Err(Error::entry_format(
            r.pos(),
            format!("{} unexpected trailing bytes", r.remaining()),
        ));
    }

    Ok(BinTree {
        source,
        source_id,
        patch_header,
        version,
        dependencies,
        objects,
        patches,
    })
}

fn read_object(r: &mut ByteReader<'_>, class_hash: u32, origin: u64) -> Result<BinObject> {
    let start = r.pos();
    let size = r.u32()? as usize;
    let body = r.pos();
    let path_hash = r.u32()?;
    let count = r.u16()? as usize;
    let mut properties = Vec::with_capacity(count.min(r.remaining() / 5));
    for _ in 0..count {
        properties.push(read_property(r, 0)?);
    }
    expect_size(r, body, size, "object")?;
    Ok(BinObject::decoded(
        class_hash,
        path_hash,
        properties,
        start..r.pos(),
        origin,
    ))
}

fn read_patch(r: &mut ByteReader<'_>) -> Result<BinPatch> {
    let start = r.pos();
    let path_hash = r.u32()?;
    let size = r.u32()? as usize;
    let body = r.pos();
    let kind = read_kind(r)?;
    let path = r.string()?;
    let value = read_value(r, kind, 0)?;
    expect_size(r, body, size, "patch")?;
    Ok(BinPatch {
        path_hash,
        path,
        value,
        span: Some(start..r.pos()),
    })
}

fn read_property(r: &mut ByteReader<'_>, depth: usize) -> Result<BinProperty> {
    let start = r.pos();
    let name_hash = r.u32()?;
    let kind = read_kind(r)?;
    let value = read_value(r, kind, depth)?;
    let span: Range<usize> = start..r.pos();
    Ok(BinProperty::decoded(name_hash, value, span))
}

fn read_kind(r: &mut ByteReader<'_>) -> Result<PropertyKind> {
    let at = r.pos();
    let tag = r.u8()?;
    PropertyKind::from_tag(tag)
        .ok_or_else(|| Error::entry_format(at, format!("unknown type tag {tag:#04x}")))
}

fn expect_size(r: &ByteReader<'_>, body: usize, declared: usize, what: &str) -> Result<()> {
    let consumed = r.pos() - body;
    if consumed != declared {
        return Err(Error::entry_format(
            body,
            format!("{what} declares {declared} bytes but {consumed} were read"),
        ));
    }
    Ok(())
}

/// Returns the end of a sized body, which must lie inside the data.
fn body_end(r: &ByteReader<'_>, body: usize, size: usize, what: &str) -> Result<usize> {
    if size > r.remaining() {
        return Err(Error::entry_format(
            body,
            format!("{what} declares {size} bytes but only {} remain", r.remaining()),
        ));
    }
    Ok(body + size)
}

/// Rejects item counts that cannot fit between the reader and `end`.
///
/// Items are assumed to take at least `item_len` bytes each; zero-width
/// items count as one byte, so runs of them are bounded by the body size.
fn check_count(
    r: &ByteReader<'_>,
    end: usize,
    count: usize,
    item_len: usize,
    what: &str,
) -> Result<()> {
    let available = end.saturating_sub(r.pos());
    if count.saturating_mul(item_len.max(1)) > available {
        return Err(Error::entry_format(
            r.pos().saturating_sub(4),
            format!("{what} declares {count} items but its body holds {available} bytes"),
        ));
    }
    Ok(())
}

fn check_within(r: &ByteReader<'_>, end: usize, what: &str) -> Result<()> {
    if r.pos() > end {
        return Err(Error::entry_format(
            end,
            format!("{what} item runs past the end of its body"),
        ));
    }
    Ok(())
}

/// Smallest encoding of a value of this kind, zero-width kinds counting as one byte.
fn min_encoded_len(kind: PropertyKind) -> usize {
    match kind.fixed_size() {
        Some(size) => size.max(1),
        None => match kind {
            PropertyKind::String | PropertyKind::Optional => 2,
            PropertyKind::Struct | PropertyKind::Embedded => 4,
            PropertyKind::Container | PropertyKind::UnorderedContainer => 9,
            PropertyKind::Map => 10,
            _ => 1,
        },
    }
}

fn read_value(r: &mut ByteReader<'_>, kind: PropertyKind, depth: usize) -> Result<PropertyValue> {
    if depth > MAX_DEPTH {
        return Err(Error::entry_format(r.pos(), "values nested too deeply"));
    }
    Ok(match kind {
        PropertyKind::None => PropertyValue::None,
        PropertyKind::Bool => PropertyValue::Bool(r.u8()? != 0),
        PropertyKind::I8 => PropertyValue::I8(r.u8()? as i8),
        PropertyKind::U8 => PropertyValue::U8(r.u8()?),
        PropertyKind::I16 => PropertyValue::I16(r.u16()? as i16),
        PropertyKind::U16 => PropertyValue::U16(r.u16()?),
        PropertyKind::I32 => PropertyValue::I32(r.u32()? as i32),
        PropertyKind::U32 => PropertyValue::U32(r.u32()?),
        PropertyKind::I64 => PropertyValue::I64(r.u64()? as i64),
        PropertyKind::U64 => PropertyValue::U64(r.u64()?),
        PropertyKind::F32 => PropertyValue::F32(r.f32()?),
        PropertyKind::Vector2 => PropertyValue::Vector2(r.floats()?),
        PropertyKind::Vector3 => PropertyValue::Vector3(r.floats()?),
        PropertyKind::Vector4 => PropertyValue::Vector4(r.floats()?),
        PropertyKind::Matrix44 => PropertyValue::Matrix44(r.floats()?),
        PropertyKind::Color => PropertyValue::Color(r.array()?),
        PropertyKind::String => PropertyValue::String(r.string()?),
        PropertyKind::Hash => PropertyValue::Hash(r.u32()?),
        PropertyKind::WadChunkLink => PropertyValue::WadChunkLink(r.u64()?),
        PropertyKind::Container => PropertyValue::Container(read_container(r, depth)?),
        PropertyKind::UnorderedContainer => {
            PropertyValue::UnorderedContainer(read_container(r, depth)?)
        }
        PropertyKind::Struct => PropertyValue::Struct(read_struct(r, depth)?),
        PropertyKind::Embedded => PropertyValue::Embedded(read_struct(r, depth)?),
        PropertyKind::ObjectLink => PropertyValue::ObjectLink(r.u32()?),
        PropertyKind::Optional => {
            let item_kind = read_kind(r)?;
            let present = r.u8()? != 0;
            let value = if present {
                Some(Box::new(read_value(r, item_kind, depth + 1)?))
            } else {
                None
            };
            PropertyValue::Optional(BinOptional { item_kind, value })
        }
        PropertyKind::Map => {
            let key_kind = read_kind(r)?;
            let value_kind = read_kind(r)?;
            let size = r.u32()? as usize;
            let body = r.pos();
            let end = body_end(r, body, size, "map")?;
            let count = r.u32()? as usize;
            let item_len = min_encoded_len(key_kind) + min_encoded_len(value_kind);
            check_count(r, end, count, item_len, "map")?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let key = read_value(r, key_kind, depth + 1)?;
                let value = read_value(r, value_kind, depth + 1)?;
                check_within(r, end, "map")?;
                entries.push((key, value));
            }
            expect_size(r, body, size, "map")?;
            PropertyValue::Map(BinMap {
                key_kind,
                value_kind,
                entries,
            })
        }
        PropertyKind::BitBool => PropertyValue::BitBool(r.u8()? != 0),
    })
}

fn read_container(r: &mut ByteReader<'_>, depth: usize) -> Result<BinContainer> {
    let item_kind = read_kind(r)?;
    let size = r.u32()? as usize;
    let body = r.pos();
    let end = body_end(r, body, size, "container")?;
    let count = r.u32()? as usize;
    check_count(r, end, count, min_encoded_len(item_kind), "container")?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_value(r, item_kind, depth + 1)?);
        check_within(r, end, "container")?;
    }
    expect_size(r, body, size, "container")?;
    Ok(BinContainer { item_kind, items })
}

fn read_struct(r: &mut ByteReader<'_>, depth: usize) -> Result<BinStruct> {
    let class_hash = r.u32()?;
    if class_hash == 0 {
        return Ok(BinStruct::default());
    }
    let size = r.u32()? as usize;
    let body = r.pos();
    let count = r.u16()? as usize;
    let mut properties = Vec::with_capacity(count.min(r.remaining() / 5));
    for _ in 0..count {
        properties.push(read_property(r, depth + 1)?);
    }
    expect_size(r, body, size, "struct")?;
    Ok(BinStruct::new(class_hash, properties))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_bounds() {
        let mut r = ByteReader::new(&[1, 0, 0]);
        assert_eq!(r.u16().unwrap(), 1);
        let err = r.u32().unwrap_err();
        assert!(matches!(err, Error::EntryFormat { offset: 2, .. }));
    }

    #[test]
    fn test_reader_string() {
        let mut r = ByteReader::new(b"\x03\x00abc\x02\x00\xff\xfe");
        assert_eq!(r.string().unwrap(), "abc");
        assert!(r.string().is_err());
    }

    #[test]
    fn test_missing_prop_marker() {
        let err = decode_tree(b"PROX\x01\x00\x00\x00".to_vec()).unwrap_err();
        assert!(err.to_string().contains("missing PROP marker"));
    }

    #[test]
    fn test_unsupported_version() {
        let err = decode_tree(b"PROP\x04\x00\x00\x00\x00\x00\x00\x00".to_vec()).unwrap_err();
        assert!(matches!(err, Error::EntryFormat { offset: 4, .. }));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let mut data = b"PROP\x01\x00\x00\x00".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes()); // one object
        data.extend_from_slice(&0xAAAA_AAAAu32.to_le_bytes()); // class hash
        data.extend_from_slice(&11u32.to_le_bytes()); // object size
        data.extend_from_slice(&0x1234u32.to_le_bytes()); // path hash
        data.extend_from_slice(&1u16.to_le_bytes()); // one property
        data.extend_from_slice(&0x5678u32.to_le_bytes()); // name hash
        data.push(0x42); // bogus tag
        let err = decode_tree(data).unwrap_err();
        assert!(err.to_string().contains("unknown type tag 0x42"));
    }

    #[test]
    fn test_size_disagreement() {
        let mut data = b"PROP\x01\x00\x00\x00".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&9u32.to_le_bytes()); // declared 9, body is 6
        data.extend_from_slice(&0x1234u32.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        let err = decode_tree(data).unwrap_err();
        assert!(err.to_string().contains("object declares 9 bytes"));
    }

    /// One object holding one container property of `item` with the given size and count.
    fn container_bin(item: PropertyKind, size: u32, count: u32, body: &[u8]) -> Vec<u8> {
        let mut data = b"PROP\x01\x00\x00\x00".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0xAAAA_AAAAu32.to_le_bytes());
        data.extend_from_slice(&(20 + body.len() as u32).to_le_bytes());
        data.extend_from_slice(&0x1234u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&0x5678u32.to_le_bytes());
        data.push(PropertyKind::Container.tag());
        data.push(item.tag());
        data.extend_from_slice(&size.to_le_bytes());
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_zero_width_items_are_bounded() {
        let data = container_bin(PropertyKind::None, 4, u32::MAX, &[]);
        assert_eq!(data.len(), 40);
        let err = decode_tree(data).unwrap_err();
        assert!(err.to_string().contains("declares 4294967295 items"));

        let empty = container_bin(PropertyKind::None, 4, 0, &[]);
        assert!(decode_tree(empty).is_ok());
    }

    #[test]
    fn test_count_larger_than_body() {
        let data = container_bin(PropertyKind::U16, 8, 3, &[1, 0, 2, 0]);
        let err = decode_tree(data).unwrap_err();
        assert!(matches!(err, Error::EntryFormat { .. }));
        assert!(err.to_string().contains("declares 3 items"));

        let ok = container_bin(PropertyKind::U16, 8, 2, &[1, 0, 2, 0]);
        assert!(decode_tree(ok).is_ok());
    }

    #[test]
    fn test_size_past_end_of_data() {
        let data = container_bin(PropertyKind::U8, 0x7FFF_FFFF, 1, &[7]);
        let err = decode_tree(data).unwrap_err();
        assert!(err.to_string().contains("remain"));
    }

    #[test]
    fn test_zero_width_map_is_bounded() {
        let mut data = b"PROP\x01\x00\x00\x00".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0xAAAA_AAAAu32.to_le_bytes());
        data.extend_from_slice(&21u32.to_le_bytes());
        data.extend_from_slice(&0x1234u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&0x5678u32.to_le_bytes());
        data.push(PropertyKind::Map.tag());
        data.push(PropertyKind::None.tag());
        data.push(PropertyKind::None.tag());
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        let err = decode_tree(data).unwrap_err();
        assert!(err.to_string().contains("map declares"));
    }

    #[test]
    fn test_trailing_bytes() {
        let data = b"PROP\x01\x00\x00\x00\x00\x00\x00\x00!".to_vec();
        let err = decode_tree(data).unwrap_err();
        assert!(matches!(err, Error::EntryFormat { offset: 12, .. }));
    }
}
