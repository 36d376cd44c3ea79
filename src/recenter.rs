//! Anchor recentering.
//!
//! HUD elements are laid out against a reference width of [`MAGIC_VALUE`]
//! pixels and attached to the left (`anchor.x == 0`) or right
//! (`anchor.x == 1`) screen edge. On a wider screen those elements drift
//! to the far edges. Recentering moves the rectangle by the extra width the
//! target resolution adds on its side and re-attaches it to the screen
//! center (`anchor.x == 0.5`), which keeps the layout inside a
//! reference-width area in the middle of the screen.
//!
//! ```rust
//! use widefix::recenter::{recenter, Anchor, Rect, TargetWidth};
//!
//! let target = TargetWidth::new(1920)?;
//! let out = recenter(
//!     Rect::new(0.0, 0.0, 100.0, 50.0),
//!     Anchor::new(1.0, 0.0),
//!     1024,
//!     target,
//! );
//! assert_eq!(out.anchor, Anchor::new(0.5, 0.0));
//! assert!((out.rect.x0 - 170.7).abs() < 1e-4);
//! # Ok::<(), widefix::Error>(())
//! ```

use crate::{Error, Result};

/// Reference width in pixels the game lays out anchored rectangles against.
pub const MAGIC_VALUE: f64 = 1440.0;

/// Validated target display width, strictly greater than [`MAGIC_VALUE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetWidth(u32);

impl TargetWidth {
    /// Validates a target width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for widths at or below the reference
    /// width, where recentering would be a no-op or move elements off-screen.
    pub fn new(width: u32) -> Result<Self> {
        if (width as f64) <= MAGIC_VALUE {
            return Err(Error::Configuration(format!(
                "target width {} must be greater than {}",
                width, MAGIC_VALUE as u32
            )));
        }
        Ok(Self(width))
    }

    /// Returns the width in pixels.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TargetWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An anchored rectangle: left/top and right/bottom corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl Rect {
    /// Creates a rectangle.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<[f32; 4]> for Rect {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<Rect> for [f32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x0, rect.y0, rect.x1, rect.y1]
    }
}

/// A normalized attachment point; `x` is 0 for left, 1 for right.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    /// Horizontal attachment.
    pub x: f32,
    /// Vertical attachment.
    pub y: f32,
}

impl Anchor {
    /// Creates an anchor.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Anchor {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Anchor> for [f32; 2] {
    fn from(anchor: Anchor) -> Self {
        [anchor.x, anchor.y]
    }
}

/// Result of [`recenter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recentered {
    /// The moved rectangle.
    pub rect: Rect,
    /// The new anchor.
    pub anchor: Anchor,
}

/// Returns `true` for anchors attached to the left or right edge exactly.
pub fn is_anchor_supported(anchor: Anchor) -> bool {
    anchor.x == 0.0 || anchor.x == 1.0
}

/// Recomputes a rectangle for a centered anchor at the target width.
///
/// Unsupported anchors (see [`is_anchor_supported`]) are returned unchanged
/// together with their rectangle. Otherwise both horizontal edges move by
/// `(target / 1440 - 1) / 2 * source_width`, negated for left anchors, and
/// are rounded to one decimal (ties to even); the vertical edges stay and
/// the anchor's `x` becomes 0.5.
pub fn recenter(rect: Rect, anchor: Anchor, source_width: u16, target: TargetWidth) -> Recentered {
    if !is_anchor_supported(anchor) {
        return Recentered { rect, anchor };
    }

    let ratio = target.get() as f64 / MAGIC_VALUE;
    let mut offset = (ratio - 1.0) / 2.0;
    if anchor.x == 0.0 {
        offset = -offset.abs();
    }
    let shift = offset * source_width as f64;

    Recentered {
        rect: Rect {
            x0: round1(rect.x0 as f64 + shift) as f32,
            y0: rect.y0,
            x1: round1(rect.x1 as f64 + shift) as f32,
            y1: rect.y1,
        },
        anchor: Anchor {
            x: 0.5,
            y: anchor.y,
        },
    }
}

/// Rounds to one decimal place, ties to even.
fn round1(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}
