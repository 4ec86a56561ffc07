//! Rectangle and page bounding-box primitives.
//!
//! All rectangles in this crate are axis-aligned and canonicalized so that
//! `x0 <= x1` and `y0 <= y1`. Interactive drag gestures can produce either
//! corner order (or a zero/negative extent), so every constructor that
//! accepts raw corners goes through [`Rect::normalized`].

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in some stated coordinate space.
///
/// The coordinate space (document, raster, or viewport) is a property of
/// where the value came from, not of the type; the transform functions in
/// [`crate::mapper`] document which space they expect on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from two opposite corners in any order.
    pub fn normalized(xa: f64, ya: f64, xb: f64, yb: f64) -> Self {
        Self {
            x0: xa.min(xb),
            y0: ya.min(yb),
            x1: xa.max(xb),
            y1: ya.max(yb),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Whether a point lies inside the rectangle (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Translate the rectangle by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// All four coordinates are finite (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

impl From<[f64; 4]> for Rect {
    fn from(v: [f64; 4]) -> Self {
        Rect::normalized(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [f64; 4] {
    fn from(r: Rect) -> Self {
        [r.x0, r.y0, r.x1, r.y1]
    }
}

/// A document page's native bounding box.
///
/// Unlike a plain [`Rect`] this may carry a non-zero origin (PDF MediaBoxes
/// sometimes do), which is why the extraction pipeline reads it fresh for
/// every document rather than assuming the reference page's box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageBBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}
