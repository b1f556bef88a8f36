#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Page-space values are in points (`f64`), origin at the page's top-left
//! corner with y growing downward. Grid-space values are cell indices.

use serde::{Deserialize, Serialize};

/// A point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Grow the rectangle outward by `amount` on every side.
    ///
    /// Negative amounts shrink it; the size never goes below zero.
    pub fn outset(&self, amount: f64) -> Rect {
        Rect {
            x: self.x - amount,
            y: self.y - amount,
            width: (self.width + 2.0 * amount).max(0.0),
            height: (self.height + 2.0 * amount).max(0.0),
        }
    }

    /// Create a new rectangle inside the current one with the given margin.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x + margin.left,
            y: self.y + margin.top,
            width: (self.width - margin.horizontal_sum()).max(0.0),
            height: (self.height - margin.vertical_sum()).max(0.0),
        }
    }
}

/// Sides for padding/margin, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: f64) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }

    /// Replace negative or non-finite sides with zero.
    pub fn sanitized(self) -> Self {
        let fix = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            top: fix(self.top),
            right: fix(self.right),
            bottom: fix(self.bottom),
            left: fix(self.left),
        }
    }
}

impl From<f64> for Sides {
    fn from(val: f64) -> Self {
        Self::all(val)
    }
}

/// A position on the virtual grid.
///
/// `column` is the logical column index, increasing in placement order (the
/// renderer maps it right-to-left). `row` may be fractional when distribute
/// mode spreads content inside a column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridCoord {
    pub page: u32,
    pub column: u16,
    pub row: f64,
}

impl GridCoord {
    /// Create a new grid coordinate.
    #[inline]
    pub const fn new(page: u32, column: u16, row: f64) -> Self {
        Self { page, column, row }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(r.right(), 6.0);
        assert_eq!(r.bottom(), 8.0);
        assert!(!r.is_empty());
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
    }

    #[test]
    fn rect_inner_reduces() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = rect.inner(Sides::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(inner, Rect::new(4.0, 1.0, 4.0, 6.0));
    }

    #[test]
    fn rect_inner_never_negative() {
        let rect = Rect::new(0.0, 0.0, 2.0, 2.0);
        let inner = rect.inner(Sides::all(5.0));
        assert_eq!(inner.width, 0.0);
        assert_eq!(inner.height, 0.0);
    }

    #[test]
    fn outset_grows_and_shrinks() {
        let r = Rect::new(10.0, 10.0, 4.0, 4.0);
        assert_eq!(r.outset(1.0), Rect::new(9.0, 9.0, 6.0, 6.0));
        assert_eq!(r.outset(-3.0).width, 0.0);
    }

    #[test]
    fn sides_sanitized_drops_negatives() {
        let s = Sides::new(-1.0, f64::NAN, 3.0, 4.0).sanitized();
        assert_eq!(s, Sides::new(0.0, 0.0, 3.0, 4.0));
        assert_eq!(s.horizontal_sum(), 4.0);
        assert_eq!(s.vertical_sum(), 3.0);
    }
}
