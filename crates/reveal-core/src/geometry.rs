#![forbid(unsafe_code)]

//! Viewport intersection for hosts without a native visibility observer.
//!
//! Mirrors the browser's intersection rules closely enough to drive the
//! activator from layout rectangles: the root is grown or shrunk by its
//! margin, edge contact counts as intersecting, and a zero-area target
//! reports a ratio of 1 when it touches the root.

use crate::margin::RootMargin;

/// Axis-aligned rectangle in page pixels (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Apply a root margin. Percentages resolve against this rectangle.
    #[must_use]
    pub fn expand(&self, margin: &RootMargin) -> Self {
        let top = margin.top.resolve(self.height);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        let right = margin.right.resolve(self.width);
        Self {
            x: self.x - left,
            y: self.y - top,
            width: self.width + left + right,
            height: self.height + top + bottom,
        }
    }

    /// Overlap with `other`, including zero-area edge contact.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < x || bottom < y {
            return None;
        }
        Some(Self::new(x, y, right - x, bottom - y))
    }
}

/// Result of testing one target against the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Visible fraction of the target's area in `[0, 1]`.
    pub ratio: f64,
    /// Whether the target touches the margin-adjusted root at all.
    pub is_intersecting: bool,
}

impl Intersection {
    /// Not visible.
    pub const NONE: Self = Self {
        ratio: 0.0,
        is_intersecting: false,
    };

    /// Whether this intersection satisfies `threshold`.
    ///
    /// A zero threshold accepts any contact; otherwise the ratio must reach
    /// the threshold.
    #[must_use]
    pub fn meets(&self, threshold: f64) -> bool {
        self.is_intersecting && (threshold <= 0.0 || self.ratio >= threshold)
    }
}

/// Intersect `target` with `root` after applying `margin` to the root.
#[must_use]
pub fn intersection(target: &Rect, root: &Rect, margin: &RootMargin) -> Intersection {
    let root = root.expand(margin);
    if root.width < 0.0 || root.height < 0.0 {
        return Intersection::NONE;
    }
    let Some(overlap) = target.intersect(&root) else {
        return Intersection::NONE;
    };
    let target_area = target.area();
    let ratio = if target_area > 0.0 {
        (overlap.area() / target_area).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Intersection {
        ratio,
        is_intersecting: true,
    }
}
