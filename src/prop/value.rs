//! Property values.

use std::ops::Range;

use super::kind::PropertyKind;
use crate::{Error, Result};

/// A named property: 32-bit FNV-1a name hash and a tagged value.
///
/// A decoded property remembers the byte range it was read from. The range
/// is dropped as soon as mutable access is handed out, which forces the
/// encoder to serialize the property instead of copying its source bytes.
/// Equality ignores the source range.
#[derive(Debug, Clone)]
pub struct BinProperty {
    name_hash: u32,
    value: PropertyValue,
    span: Option<Range<usize>>,
}

impl PartialEq for BinProperty {
    fn eq(&self, other: &Self) -> bool {
        self.name_hash == other.name_hash && self.value == other.value
    }
}

impl BinProperty {
    /// Creates a new property without a source range.
    pub fn new(name_hash: u32, value: PropertyValue) -> Self {
        Self {
            name_hash,
            value,
            span: None,
        }
    }

    pub(crate) fn decoded(name_hash: u32, value: PropertyValue, span: Range<usize>) -> Self {
        Self {
            name_hash,
            value,
            span: Some(span),
        }
    }

    /// Returns the name hash.
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    /// Returns the value.
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut PropertyValue {
        self.span = None;
        &mut self.value
    }

    /// Returns mutable access to the payload if it has type `T`.
    ///
    /// The source range is forgotten only when the type matches.
    pub fn get_mut<T: PropertyType>(&mut self) -> Option<&mut T> {
        T::from_value(&self.value)?;
        T::from_value_mut(self.value_mut())
    }

    /// Replaces the value, keeping the property's kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `value` has a different kind.
    pub fn set(&mut self, value: PropertyValue) -> Result<()> {
        if value.kind() != self.kind() {
            return Err(Error::Encode(format!(
                "property {:08x} is {} and cannot hold {}",
                self.name_hash,
                self.kind(),
                value.kind()
            )));
        }
        *self.value_mut() = value;
        Ok(())
    }

    /// Returns the value's kind.
    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }

    /// Returns the source byte range, if the property is unmodified.
    pub fn span(&self) -> Option<&Range<usize>> {
        self.span.as_ref()
    }

    /// Forgets every source range in this property, recursively.
    pub(crate) fn detach(&mut self) {
        self.span = None;
        self.value.detach();
    }
}

/// An ordered, possibly empty, list of same-typed items.
#[derive(Debug, Clone, PartialEq)]
pub struct BinContainer {
    /// Kind of every item.
    pub item_kind: PropertyKind,
    /// The items.
    pub items: Vec<PropertyValue>,
}

/// A class instance: class name hash and its properties.
///
/// A class hash of zero denotes a null instance, encoded without a body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinStruct {
    class_hash: u32,
    properties: Vec<BinProperty>,
}

impl BinStruct {
    /// Creates a struct instance.
    pub fn new(class_hash: u32, properties: Vec<BinProperty>) -> Self {
        Self {
            class_hash,
            properties,
        }
    }

    /// Returns the class name hash.
    pub fn class_hash(&self) -> u32 {
        self.class_hash
    }

    /// Returns `true` for a null instance.
    pub fn is_null(&self) -> bool {
        self.class_hash == 0
    }

    /// Returns the properties in source order.
    pub fn properties(&self) -> &[BinProperty] {
        &self.properties
    }

    /// Returns the first property with this name hash.
    pub fn property(&self, name_hash: u32) -> Option<&BinProperty> {
        self.properties.iter().find(|p| p.name_hash == name_hash)
    }

    /// Returns the first property with this name hash whose value has type `T`.
    pub fn property_as<T: PropertyType>(&self, name_hash: u32) -> Option<&T> {
        find_as(&self.properties, name_hash)
    }

    /// Mutable variant of [`property_as`](Self::property_as).
    ///
    /// Only the returned property loses its source range; the caller
    /// already went through the enclosing property's `value_mut`.
    pub fn property_as_mut<T: PropertyType>(&mut self, name_hash: u32) -> Option<&mut T> {
        find_as_mut(&mut self.properties, name_hash)
    }

    /// Appends a property.
    pub fn push(&mut self, mut property: BinProperty) {
        property.detach();
        self.properties.push(property);
    }
}

/// Zero or one item.
#[derive(Debug, Clone, PartialEq)]
pub struct BinOptional {
    /// Kind of the item.
    pub item_kind: PropertyKind,
    /// The item, if present.
    pub value: Option<Box<PropertyValue>>,
}

/// Key/value pairs in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct BinMap {
    /// Kind of every key.
    pub key_kind: PropertyKind,
    /// Kind of every value.
    pub value_kind: PropertyKind,
    /// The pairs.
    pub entries: Vec<(PropertyValue, PropertyValue)>,
}

/// A tagged property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// No payload.
    None,
    /// Boolean.
    Bool(bool),
    /// Signed 8-bit integer.
    I8(i8),
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Signed 16-bit integer.
    I16(i16),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 32-bit float.
    F32(f32),
    /// Two floats.
    Vector2([f32; 2]),
    /// Three floats.
    Vector3([f32; 3]),
    /// Four floats.
    Vector4([f32; 4]),
    /// Sixteen floats.
    Matrix44([f32; 16]),
    /// RGBA color.
    Color([u8; 4]),
    /// UTF-8 string.
    String(String),
    /// FNV-1a hash.
    Hash(u32),
    /// Container entry path hash.
    WadChunkLink(u64),
    /// Ordered list.
    Container(BinContainer),
    /// Unordered list.
    UnorderedContainer(BinContainer),
    /// Class instance.
    Struct(BinStruct),
    /// Embedded class instance.
    Embedded(BinStruct),
    /// Object path hash.
    ObjectLink(u32),
    /// Zero or one item.
    Optional(BinOptional),
    /// Key/value pairs.
    Map(BinMap),
    /// Packed boolean.
    BitBool(bool),
}

impl PropertyValue {
    /// Returns the kind (type tag) of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::None => PropertyKind::None,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::I8(_) => PropertyKind::I8,
            PropertyValue::U8(_) => PropertyKind::U8,
            PropertyValue::I16(_) => PropertyKind::I16,
            PropertyValue::U16(_) => PropertyKind::U16,
            PropertyValue::I32(_) => PropertyKind::I32,
            PropertyValue::U32(_) => PropertyKind::U32,
            PropertyValue::I64(_) => PropertyKind::I64,
            PropertyValue::U64(_) => PropertyKind::U64,
            PropertyValue::F32(_) => PropertyKind::F32,
            PropertyValue::Vector2(_) => PropertyKind::Vector2,
            PropertyValue::Vector3(_) => PropertyKind::Vector3,
            PropertyValue::Vector4(_) => PropertyKind::Vector4,
            PropertyValue::Matrix44(_) => PropertyKind::Matrix44,
            PropertyValue::Color(_) => PropertyKind::Color,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Hash(_) => PropertyKind::Hash,
            PropertyValue::WadChunkLink(_) => PropertyKind::WadChunkLink,
            PropertyValue::Container(_) => PropertyKind::Container,
            PropertyValue::UnorderedContainer(_) => PropertyKind::UnorderedContainer,
            PropertyValue::Struct(_) => PropertyKind::Struct,
            PropertyValue::Embedded(_) => PropertyKind::Embedded,
            PropertyValue::ObjectLink(_) => PropertyKind::ObjectLink,
            PropertyValue::Optional(_) => PropertyKind::Optional,
            PropertyValue::Map(_) => PropertyKind::Map,
            PropertyValue::BitBool(_) => PropertyKind::BitBool,
        }
    }

    fn detach(&mut self) {
        match self {
            PropertyValue::Struct(s) | PropertyValue::Embedded(s) => {
                for property in &mut s.properties {
                    property.detach();
                }
            }
            PropertyValue::Container(c) | PropertyValue::UnorderedContainer(c) => {
                c.items.iter_mut().for_each(PropertyValue::detach);
            }
            PropertyValue::Optional(o) => {
                if let Some(item) = &mut o.value {
                    item.detach();
                }
            }
            PropertyValue::Map(m) => {
                for (key, value) in &mut m.entries {
                    key.detach();
                    value.detach();
                }
            }
            _ => {}
        }
    }
}

/// Rust types a [`PropertyValue`] can be viewed as.
///
/// Each implementation matches exactly the kinds whose payload has that
/// type: `[f32; 4]` is a `Vector4`, `u16` a `U16`, and [`BinStruct`] either
/// a `Struct` or an `Embedded`.
pub trait PropertyType {
    /// Borrows the payload if the value has a matching kind.
    fn from_value(value: &PropertyValue) -> Option<&Self>;

    /// Mutably borrows the payload if the value has a matching kind.
    fn from_value_mut(value: &mut PropertyValue) -> Option<&mut Self>;
}

macro_rules! impl_property_type {
    ($ty:ty, $($variant:ident)|+) => {
        impl PropertyType for $ty {
            fn from_value(value: &PropertyValue) -> Option<&Self> {
                match value {
                    $(PropertyValue::$variant(inner))|+ => Some(inner),
                    _ => None,
                }
            }

            fn from_value_mut(value: &mut PropertyValue) -> Option<&mut Self> {
                match value {
                    $(PropertyValue::$variant(inner))|+ => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_property_type!(bool, Bool);
impl_property_type!(i8, I8);
impl_property_type!(u8, U8);
impl_property_type!(i16, I16);
impl_property_type!(u16, U16);
impl_property_type!(i32, I32);
impl_property_type!(u32, U32);
impl_property_type!(i64, I64);
impl_property_type!(u64, U64);
impl_property_type!(f32, F32);
impl_property_type!([f32; 2], Vector2);
impl_property_type!([f32; 3], Vector3);
impl_property_type!([f32; 4], Vector4);
impl_property_type!([f32; 16], Matrix44);
impl_property_type!(String, String);
impl_property_type!(BinContainer, Container | UnorderedContainer);
impl_property_type!(BinStruct, Struct | Embedded);
impl_property_type!(BinOptional, Optional);
impl_property_type!(BinMap, Map);

pub(crate) fn find_as<T: PropertyType>(properties: &[BinProperty], name_hash: u32) -> Option<&T> {
    properties
        .iter()
        .filter(|p| p.name_hash == name_hash)
        .find_map(|p| T::from_value(&p.value))
}

pub(crate) fn find_as_mut<T: PropertyType>(
    properties: &mut [BinProperty],
    name_hash: u32,
) -> Option<&mut T> {
    let index = properties
        .iter()
        .position(|p| p.name_hash == name_hash && T::from_value(&p.value).is_some())?;
    T::from_value_mut(properties[index].value_mut())
}
