//! Property tree encoding.
//!
//! Objects and properties that still carry a source range are copied from
//! the tree's source bytes; everything else is serialized with freshly
//! computed size fields. Objects decoded from a different buffer are always
//! serialized fresh.

use super::kind::PropertyKind;
use super::value::{BinContainer, BinProperty, BinStruct, PropertyValue};
use super::{BinObject, BinPatch, BinTree, PROP_MAGIC, PTCH_MAGIC};
use crate::{Error, Result};

pub(crate) fn encode_tree(tree: &BinTree) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tree.source.len());
    let source = tree.source.as_slice();

    if let Some(header) = tree.patch_header {
        out.extend_from_slice(PTCH_MAGIC);
        out.extend_from_slice(&header.to_le_bytes());
    }
    out.extend_from_slice(PROP_MAGIC);
    out.extend_from_slice(&tree.version.to_le_bytes());

    if tree.version >= 2 {
        put_u32(&mut out, len_u32(tree.dependencies.len(), "dependency list")?);
        for dependency in &tree.dependencies {
            put_string(&mut out, dependency)?;
        }
    }

    put_u32(&mut out, len_u32(tree.objects.len(), "object list")?);
    for object in &tree.objects {
        put_u32(&mut out, object.class_hash());
    }
    for object in &tree.objects {
        // Objects moved in from another tree cannot borrow from this source.
        let object_source: &[u8] = if object.origin() == tree.source_id {
            source
        } else {
            &[]
        };
        write_object(&mut out, object_source, object)?;
    }

    if tree.patch_header.is_some() && tree.version >= 3 {
        put_u32(&mut out, len_u32(tree.patches.len(), "patch list")?);
        for patch in &tree.patches {
            write_patch(&mut out, source, patch)?;
        }
    } else if !tree.patches.is_empty() {
        return Err(Error::Encode(
            "patch records need a PTCH tree of version 3".into(),
        ));
    }

    Ok(out)
}

fn write_object(out: &mut Vec<u8>, source: &[u8], object: &BinObject) -> Result<()> {
    if let Some(bytes) = object.span().and_then(|span| source.get(span.clone())) {
        out.extend_from_slice(bytes);
        return Ok(());
    }
    let size_at = begin_sized(out);
    put_u32(out, object.path_hash());
    put_u16(out, len_u16(object.properties().len(), "object property list")?);
    for property in object.properties() {
        write_property(out, source, property)?;
    }
    end_sized(out, size_at, "object")
}

fn write_patch(out: &mut Vec<u8>, source: &[u8], patch: &BinPatch) -> Result<()> {
    if let Some(bytes) = patch.span.as_ref().and_then(|span| source.get(span.clone())) {
        out.extend_from_slice(bytes);
        return Ok(());
    }
    put_u32(out, patch.path_hash);
    let size_at = begin_sized(out);
    out.push(patch.value.kind().tag());
    put_string(out, &patch.path)?;
    write_value(out, source, &patch.value)?;
    end_sized(out, size_at, "patch")
}

fn write_property(out: &mut Vec<u8>, source: &[u8], property: &BinProperty) -> Result<()> {
    if let Some(bytes) = property.span().and_then(|span| source.get(span.clone())) {
        out.extend_from_slice(bytes);
        return Ok(());
    }
    put_u32(out, property.name_hash());
    out.push(property.kind().tag());
    write_value(out, source, property.value())
}

fn write_value(out: &mut Vec<u8>, source: &[u8], value: &PropertyValue) -> Result<()> {
    match value {
        PropertyValue::None => {}
        PropertyValue::Bool(v) | PropertyValue::BitBool(v) => out.push(*v as u8),
        PropertyValue::I8(v) => out.push(*v as u8),
        PropertyValue::U8(v) => out.push(*v),
        PropertyValue::I16(v) => out.extend_from_slice(&v.to_le_bytes()),
        PropertyValue::U16(v) => put_u16(out, *v),
        PropertyValue::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
        PropertyValue::U32(v) | PropertyValue::Hash(v) | PropertyValue::ObjectLink(v) => {
            put_u32(out, *v)
        }
        PropertyValue::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
        PropertyValue::U64(v) | PropertyValue::WadChunkLink(v) => {
            out.extend_from_slice(&v.to_le_bytes())
        }
        PropertyValue::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
        PropertyValue::Vector2(v) => put_floats(out, v),
        PropertyValue::Vector3(v) => put_floats(out, v),
        PropertyValue::Vector4(v) => put_floats(out, v),
        PropertyValue::Matrix44(v) => put_floats(out, v),
        PropertyValue::Color(v) => out.extend_from_slice(v),
        PropertyValue::String(v) => put_string(out, v)?,
        PropertyValue::Container(c) | PropertyValue::UnorderedContainer(c) => {
            write_container(out, source, c)?
        }
        PropertyValue::Struct(s) | PropertyValue::Embedded(s) => write_struct(out, source, s)?,
        PropertyValue::Optional(o) => {
            out.push(o.item_kind.tag());
            out.push(o.value.is_some() as u8);
            if let Some(item) = &o.value {
                check_kind(item, o.item_kind, "optional")?;
                write_value(out, source, item)?;
            }
        }
        PropertyValue::Map(m) => {
            out.push(m.key_kind.tag());
            out.push(m.value_kind.tag());
            let size_at = begin_sized(out);
            put_u32(out, len_u32(m.entries.len(), "map")?);
            for (key, value) in &m.entries {
                check_kind(key, m.key_kind, "map key")?;
                check_kind(value, m.value_kind, "map value")?;
                write_value(out, source, key)?;
                write_value(out, source, value)?;
            }
            end_sized(out, size_at, "map")?;
        }
    }
    Ok(())
}

fn write_container(out: &mut Vec<u8>, source: &[u8], container: &BinContainer) -> Result<()> {
    out.push(container.item_kind.tag());
    let size_at = begin_sized(out);
    put_u32(out, len_u32(container.items.len(), "container")?);
    for item in &container.items {
        check_kind(item, container.item_kind, "container item")?;
        write_value(out, source, item)?;
    }
    end_sized(out, size_at, "container")
}

fn write_struct(out: &mut Vec<u8>, source: &[u8], value: &BinStruct) -> Result<()> {
    put_u32(out, value.class_hash());
    if value.is_null() {
        if !value.properties().is_empty() {
            return Err(Error::Encode("null struct cannot hold properties".into()));
        }
        return Ok(());
    }
    let size_at = begin_sized(out);
    put_u16(out, len_u16(value.properties().len(), "struct property list")?);
    for property in value.properties() {
        write_property(out, source, property)?;
    }
    end_sized(out, size_at, "struct")
}

fn check_kind(value: &PropertyValue, expected: PropertyKind, what: &str) -> Result<()> {
    if value.kind() != expected {
        return Err(Error::Encode(format!(
            "{what} is {} but {expected} was declared",
            value.kind()
        )));
    }
    Ok(())
}

/// Reserves a u32 size field and returns its position.
fn begin_sized(out: &mut Vec<u8>) -> usize {
    let at = out.len();
    out.extend_from_slice(&[0; 4]);
    at
}

/// Patches the size field at `at` with the number of bytes written since.
fn end_sized(out: &mut [u8], at: usize, what: &str) -> Result<()> {
    let size = len_u32(out.len() - at - 4, what)?;
    out[at..at + 4].copy_from_slice(&size.to_le_bytes());
    Ok(())
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_floats(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    put_u16(out, len_u16(s.len(), "string")?);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn len_u16(len: usize, what: &str) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::Encode(format!("{what} too long: {len}")))
}

fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Encode(format!("{what} too long: {len}")))
}
