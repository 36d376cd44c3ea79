//! Property bin (`PROP`) trees.
//!
//! A property bin is a flat list of objects, each an instance of a class
//! identified by the FNV-1a hash of its name and addressed by the FNV-1a
//! hash of its path. Objects hold named, typed properties which may nest
//! through structs, containers, optionals and maps.
//!
//! ## Layout
//!
//! ```text
//! ["PTCH" u64]                 patch bins only
//! "PROP" u32 version           1..=3
//! [u32 n, n × string]          dependencies, version >= 2
//! u32 n, n × u32               class hash of every object
//! n × object                   u32 size, u32 path hash, u16 count, properties
//! [u32 n, n × patch]           PTCH bins of version >= 3
//! ```
//!
//! ## Lossless re-encoding
//!
//! Decoding records the source byte range of every object and of every
//! named property at any depth. [`BinTree::to_bytes`] copies those ranges
//! verbatim and only serializes what lost its range. Ranges are dropped
//! whenever mutable access to a property is obtained, together with the
//! range of every enclosing property and of the owning object, so an
//! untouched tree re-encodes to exactly its input.
//!
//! ```rust
//! use widefix::hash::fnv1a;
//! use widefix::prop::{BinObject, BinProperty, BinTree, PropertyValue};
//!
//! let mut tree = BinTree::new(3);
//! let mut object = BinObject::new(fnv1a("UiElementRegionData"), fnv1a("Hud/Minimap"));
//! object.push(BinProperty::new(fnv1a("mRectSourceResolutionWidth"), PropertyValue::U16(1024)));
//! tree.push(object);
//!
//! let bytes = tree.to_bytes()?;
//! let decoded = widefix::prop::BinTree::from_bytes(bytes.clone())?;
//! assert_eq!(decoded.to_bytes()?, bytes);
//! # Ok::<(), widefix::Error>(())
//! ```

mod kind;
mod read;
mod value;
mod write;

pub use kind::PropertyKind;
pub use value::{
    BinContainer, BinMap, BinOptional, BinProperty, BinStruct, PropertyType, PropertyValue,
};

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Result;

pub(crate) const PROP_MAGIC: &[u8; 4] = b"PROP";
pub(crate) const PTCH_MAGIC: &[u8; 4] = b"PTCH";

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Returns an identifier unique to one decoded source buffer. Zero is never returned.
pub(crate) fn next_source_id() -> u64 {
    NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Deepest value nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

/// A decoded property bin.
///
/// The tree owns the bytes it was decoded from; unmodified parts are
/// re-emitted from them.
#[derive(Debug, Clone)]
pub struct BinTree {
    source: Vec<u8>,
    source_id: u64,
    patch_header: Option<u64>,
    version: u32,
    dependencies: Vec<String>,
    objects: Vec<BinObject>,
    patches: Vec<BinPatch>,
}

impl BinTree {
    /// Creates an empty tree of the given version.
    pub fn new(version: u32) -> Self {
        Self {
            source: Vec::new(),
            source_id: 0,
            patch_header: None,
            version,
            dependencies: Vec::new(),
            objects: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Decodes a tree, taking ownership of its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryFormat`](crate::Error::EntryFormat) if the data is
    /// not a well-formed property bin.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        read::decode_tree(data)
    }

    /// Decodes a tree from a borrowed slice.
    pub fn read(data: &[u8]) -> Result<Self> {
        Self::from_bytes(data.to_vec())
    }

    /// Encodes the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`](crate::Error::Encode) if a modified value
    /// does not fit its wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        write::encode_tree(self)
    }

    /// Returns the format version (1 to 3).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the `PTCH` header value of a patch bin.
    pub fn patch_header(&self) -> Option<u64> {
        self.patch_header
    }

    /// Returns `true` if the tree is a patch bin.
    pub fn is_patch(&self) -> bool {
        self.patch_header.is_some()
    }

    /// Returns the paths of the bins this tree depends on.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Returns the objects in source order.
    pub fn objects(&self) -> &[BinObject] {
        &self.objects
    }

    /// Returns the objects for in-place modification.
    ///
    /// An object moved in from another tree is re-serialized on encoding;
    /// source ranges are only honored for objects decoded from this tree.
    pub fn objects_mut(&mut self) -> &mut [BinObject] {
        &mut self.objects
    }

    /// Returns the first object with this path hash.
    pub fn object(&self, path_hash: u32) -> Option<&BinObject> {
        self.objects.iter().find(|o| o.path_hash == path_hash)
    }

    /// Returns the first object with this path hash for modification.
    pub fn object_mut(&mut self, path_hash: u32) -> Option<&mut BinObject> {
        self.objects.iter_mut().find(|o| o.path_hash == path_hash)
    }

    /// Appends an object.
    pub fn push(&mut self, mut object: BinObject) {
        object.detach();
        self.objects.push(object);
    }

    /// Returns the patch records of a `PTCH` bin.
    pub fn patches(&self) -> &[BinPatch] {
        &self.patches
    }

    /// Returns `true` if no byte of the source has been invalidated.
    pub fn is_pristine(&self) -> bool {
        self.objects
            .iter()
            .all(|o| o.span.is_some() && o.origin == self.source_id)
            && self.patches.iter().all(|p| p.span.is_some())
    }
}

/// An object: class, path and properties.
#[derive(Debug, Clone)]
pub struct BinObject {
    class_hash: u32,
    path_hash: u32,
    properties: Vec<BinProperty>,
    span: Option<Range<usize>>,
    /// Source buffer `span` and the property ranges refer to.
    origin: u64,
}

impl PartialEq for BinObject {
    fn eq(&self, other: &Self) -> bool {
        self.class_hash == other.class_hash
            && self.path_hash == other.path_hash
            && self.properties == other.properties
    }
}

impl BinObject {
    /// Creates an empty object.
    pub fn new(class_hash: u32, path_hash: u32) -> Self {
        Self {
            class_hash,
            path_hash,
            properties: Vec::new(),
            span: None,
            origin: 0,
        }
    }

    pub(crate) fn decoded(
        class_hash: u32,
        path_hash: u32,
        properties: Vec<BinProperty>,
        span: Range<usize>,
        origin: u64,
    ) -> Self {
        Self {
            class_hash,
            path_hash,
            properties,
            span: Some(span),
            origin,
        }
    }

    pub(crate) fn origin(&self) -> u64 {
        self.origin
    }

    /// Returns the class name hash.
    pub fn class_hash(&self) -> u32 {
        self.class_hash
    }

    /// Returns the object path hash.
    pub fn path_hash(&self) -> u32 {
        self.path_hash
    }

    /// Returns the properties in source order.
    pub fn properties(&self) -> &[BinProperty] {
        &self.properties
    }

    /// Returns the first property with this name hash.
    pub fn property(&self, name_hash: u32) -> Option<&BinProperty> {
        self.properties.iter().find(|p| p.name_hash() == name_hash)
    }

    /// Returns the first property with this name hash whose value has type `T`.
    pub fn property_as<T: PropertyType>(&self, name_hash: u32) -> Option<&T> {
        value::find_as(&self.properties, name_hash)
    }

    /// Mutable variant of [`property_as`](Self::property_as).
    ///
    /// On a match, both the property and this object lose their source range.
    pub fn property_as_mut<T: PropertyType>(&mut self, name_hash: u32) -> Option<&mut T> {
        value::find_as::<T>(&self.properties, name_hash)?;
        self.span = None;
        value::find_as_mut(&mut self.properties, name_hash)
    }

    /// Returns mutable access to the first property with this name hash.
    ///
    /// This object loses its source range; the property keeps its own until
    /// its value is changed.
    pub fn property_mut(&mut self, name_hash: u32) -> Option<&mut BinProperty> {
        let index = self.properties.iter().position(|p| p.name_hash() == name_hash)?;
        self.span = None;
        Some(&mut self.properties[index])
    }

    /// Appends a property.
    pub fn push(&mut self, mut property: BinProperty) {
        property.detach();
        self.span = None;
        self.properties.push(property);
    }

    /// Returns the source byte range, if the object is unmodified.
    pub fn span(&self) -> Option<&Range<usize>> {
        self.span.as_ref()
    }

    fn detach(&mut self) {
        self.span = None;
        for property in &mut self.properties {
            property.detach();
        }
    }
}

/// A patch record of a `PTCH` bin: a value to write at an object path.
#[derive(Debug, Clone)]
pub struct BinPatch {
    /// Hash of the patched object's path.
    pub path_hash: u32,
    /// Property path inside the object, e.g. `mRect`.
    pub path: String,
    /// The value to apply.
    pub value: PropertyValue,
    span: Option<Range<usize>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::fnv1a;

    fn sample() -> BinTree {
        let mut tree = BinTree::new(3);
        let mut object = BinObject::new(fnv1a("UiElementIconData"), fnv1a("ClientStates/Hud/Icon"));
        object.push(BinProperty::new(
            fnv1a("mAnchors"),
            PropertyValue::Embedded(BinStruct::new(
                fnv1a("AnchorSingle"),
                vec![BinProperty::new(fnv1a("Anchor"), PropertyValue::Vector2([1.0, 0.0]))],
            )),
        ));
        object.push(BinProperty::new(fnv1a("mRect"), PropertyValue::Vector4([0.0, 0.0, 100.0, 50.0])));
        object.push(BinProperty::new(fnv1a("mRectSourceResolutionWidth"), PropertyValue::U16(1024)));
        tree.push(object);
        tree.push(BinObject::new(fnv1a("UiElementGroupData"), fnv1a("ClientStates/Hud")));
        tree
    }

    #[test]
    fn test_untouched_tree_is_byte_identical() {
        let bytes = sample().to_bytes().unwrap();
        let tree = BinTree::from_bytes(bytes.clone()).unwrap();
        assert!(tree.is_pristine());
        assert_eq!(tree.objects().len(), 2);
        assert_eq!(tree.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_empty_tree() {
        for version in 1..=3 {
            let bytes = BinTree::new(version).to_bytes().unwrap();
            let tree = BinTree::from_bytes(bytes.clone()).unwrap();
            assert!(tree.objects().is_empty());
            assert_eq!(tree.to_bytes().unwrap(), bytes);
        }
    }

    #[test]
    fn test_nested_mutation_only_dirties_its_path() {
        let bytes = sample().to_bytes().unwrap();
        let mut tree = BinTree::from_bytes(bytes).unwrap();

        let object = &mut tree.objects_mut()[0];
        let anchor = object
            .property_as_mut::<BinStruct>(fnv1a("mAnchors"))
            .and_then(|s| s.property_as_mut::<[f32; 2]>(fnv1a("Anchor")))
            .unwrap();
        anchor[0] = 0.5;

        let object = &tree.objects()[0];
        assert!(object.span().is_none());
        assert!(object.property(fnv1a("mAnchors")).unwrap().span().is_none());
        assert!(object.property(fnv1a("mRect")).unwrap().span().is_some());
        assert!(tree.objects()[1].span().is_some());
        assert!(!tree.is_pristine());

        let reencoded = BinTree::from_bytes(tree.to_bytes().unwrap()).unwrap();
        let anchors = reencoded.objects()[0]
            .property_as::<BinStruct>(fnv1a("mAnchors"))
            .unwrap();
        assert_eq!(anchors.property_as::<[f32; 2]>(fnv1a("Anchor")), Some(&[0.5, 0.0]));
        assert_eq!(reencoded.objects()[0].property(fnv1a("mAnchors")).unwrap().kind(), PropertyKind::Embedded);
    }

    #[test]
    fn test_failed_typed_lookup_keeps_span() {
        let bytes = sample().to_bytes().unwrap();
        let mut tree = BinTree::from_bytes(bytes.clone()).unwrap();
        assert!(tree.objects_mut()[0].property_as_mut::<u32>(fnv1a("mRect")).is_none());
        assert!(tree.is_pristine());
        assert_eq!(tree.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_object_from_another_tree_is_reserialized() {
        let mut other = BinTree::new(3);
        let mut object = BinObject::new(fnv1a("UiElementTextData"), fnv1a("ClientStates/Hud/Label"));
        object.push(BinProperty::new(fnv1a("mText"), PropertyValue::String("a longer label".into())));
        object.push(BinProperty::new(fnv1a("mEnabled"), PropertyValue::Bool(true)));
        other.push(object);
        let other = BinTree::from_bytes(other.to_bytes().unwrap()).unwrap();
        let foreign = other.objects()[0].clone();
        assert!(foreign.span().is_some());

        let mut tree = BinTree::from_bytes(sample().to_bytes().unwrap()).unwrap();
        tree.objects_mut()[1] = foreign.clone();
        assert!(!tree.is_pristine());

        let decoded = BinTree::from_bytes(tree.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.objects()[1], foreign);
        assert_eq!(decoded.objects()[0], tree.objects()[0]);
    }

    #[test]
    fn test_object_lookup() {
        let tree = sample();
        assert!(tree.object(fnv1a("ClientStates/Hud")).is_some());
        assert!(tree.object(fnv1a("ClientStates/Nope")).is_none());
    }

    #[test]
    fn test_ptch_tree_round_trip() {
        let mut data = b"PTCH".to_vec();
        data.extend_from_slice(&1u64.to_le_bytes());
        data.extend_from_slice(b"PROP");
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes()); // one dependency
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(b"a.bin");
        data.extend_from_slice(&0u32.to_le_bytes()); // no objects
        data.extend_from_slice(&1u32.to_le_bytes()); // one patch
        data.extend_from_slice(&0xCAFEu32.to_le_bytes());
        data.extend_from_slice(&(1u32 + 2 + 5 + 4).to_le_bytes());
        data.push(PropertyKind::F32.tag());
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(b"mRect");
        data.extend_from_slice(&2.5f32.to_le_bytes());

        let tree = BinTree::from_bytes(data.clone()).unwrap();
        assert!(tree.is_patch());
        assert_eq!(tree.dependencies(), ["a.bin"]);
        assert_eq!(tree.patches().len(), 1);
        assert_eq!(tree.patches()[0].path, "mRect");
        assert_eq!(tree.patches()[0].value, PropertyValue::F32(2.5));
        assert_eq!(tree.to_bytes().unwrap(), data);
    }
}
