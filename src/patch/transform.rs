//! Recentering of the anchored rectangles of a property tree.

use crate::hash::fnv1a_const;
use crate::prop::{BinObject, BinStruct, BinTree};
use crate::recenter::{self, Anchor, Rect, TargetWidth};

/// `mAnchors`: the anchor set struct of a UI element.
pub const ANCHORS: u32 = fnv1a_const("mAnchors");
/// `Anchor`: the attachment point inside the anchor set.
pub const ANCHOR: u32 = fnv1a_const("Anchor");
/// `mRect`: the element rectangle.
pub const RECT: u32 = fnv1a_const("mRect");
/// `mRectSourceResolutionWidth`: the width the rectangle was authored for.
pub const RECT_SOURCE_WIDTH: u32 = fnv1a_const("mRectSourceResolutionWidth");

/// Recenters every object of the tree; returns the number of objects changed.
///
/// Objects missing any of the anchor set, its anchor, the rectangle or the
/// source width (with the expected types) are left alone, as are objects
/// whose rectangle would not move. Untouched objects keep their source bytes.
pub fn recenter_tree(tree: &mut BinTree, target: TargetWidth) -> usize {
    tree.objects_mut()
        .iter_mut()
        .map(|object| recenter_object(object, target))
        .filter(|changed| *changed)
        .count()
}

/// Recenters one object; returns `true` if it changed.
pub fn recenter_object(object: &mut BinObject, target: TargetWidth) -> bool {
    let Some((rect, anchor, source_width)) = layout(object) else {
        return false;
    };
    if !recenter::is_anchor_supported(anchor) {
        return false;
    }

    let out = recenter::recenter(rect, anchor, source_width, target);
    if out.rect == rect {
        return false;
    }

    if let Some(value) = object.property_as_mut::<[f32; 4]>(RECT) {
        *value = out.rect.into();
    }
    if let Some(value) = object
        .property_as_mut::<BinStruct>(ANCHORS)
        .and_then(|anchors| anchors.property_as_mut::<[f32; 2]>(ANCHOR))
    {
        *value = out.anchor.into();
    }
    true
}

fn layout(object: &BinObject) -> Option<(Rect, Anchor, u16)> {
    let anchors = object.property_as::<BinStruct>(ANCHORS)?;
    let anchor = anchors.property_as::<[f32; 2]>(ANCHOR)?;
    let rect = object.property_as::<[f32; 4]>(RECT)?;
    let source_width = object.property_as::<u16>(RECT_SOURCE_WIDTH)?;
    Some(((*rect).into(), (*anchor).into(), *source_width))
}
