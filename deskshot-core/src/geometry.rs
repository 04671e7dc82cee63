//! Rectangles in virtual desktop coordinates.
//!
//! The virtual desktop is the shared coordinate system spanning every
//! monitor.  The primary monitor usually sits at the origin, so monitors
//! placed to its left or above it have negative coordinates.
//!
//! Edges are half-open: a [`Rect`] covers `left..right` and `top..bottom`.
//! `right`/`bottom` are computed as `i64` so `i32::MAX + width` never wraps.

use serde::Serialize;

/// Axis-aligned rectangle with an origin and a size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its edges; inverted edges give an empty rect.
    ///
    /// Returns `None` if the result does not fit the `i32` origin / `u32`
    /// size representation.
    pub fn from_edges(left: i64, top: i64, right: i64, bottom: i64) -> Option<Self> {
        let width = (right - left).max(0);
        let height = (bottom - top).max(0);
        Some(Self {
            x: i32::try_from(left).ok()?,
            y: i32::try_from(top).ok()?,
            width: u32::try_from(width).ok()?,
            height: u32::try_from(height).ok()?,
        })
    }

    pub fn left(&self) -> i64 {
        i64::from(self.x)
    }

    pub fn top(&self) -> i64 {
        i64::from(self.y)
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// A rectangle with no pixels.  Its origin is irrelevant.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Smallest rectangle containing both `self` and `other`.
    ///
    /// Empty operands are ignored, so [`Rect::EMPTY`] is the identity and
    /// folding a list of monitors from it yields their bounding box.
    /// Returns `None` if the hull is wider or taller than `u32::MAX`.
    pub fn union(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() {
            return Some(*other);
        }
        if other.is_empty() {
            return Some(*self);
        }
        Rect::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// True if every pixel of `other` lies inside `self`.
    ///
    /// An empty rectangle is contained anywhere.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Offset of this rectangle's origin relative to `origin`'s origin.
    ///
    /// This is where a frame with these bounds lands inside a canvas whose
    /// bounds are `origin`.
    pub fn offset_from(&self, origin: &Rect) -> (i64, i64) {
        (self.left() - origin.left(), self.top() - origin.top())
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

/// Fold rectangles into their bounding box.
///
/// Returns [`Rect::EMPTY`] for an empty input and `None` if the hull does
/// not fit a [`Rect`].  The result does not depend on iteration order.
pub fn bounding_box<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects
        .into_iter()
        .try_fold(Rect::EMPTY, |acc, rect| acc.union(rect))
}
