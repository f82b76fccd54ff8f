//! Points, sizes, rectangles and page sizes.
//!
//! All lengths are `f32` points (1/72 inch). Layout coordinates grow
//! downward: `Rect::y` is the top edge of the rectangle.

use std::fmt;

/// Tolerance used when comparing lengths.
pub const EPSILON: f32 = 1e-3;

/// A position in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset this point.
    #[must_use]
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Size of this rectangle.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Offset this rectangle.
    #[must_use]
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrink by the given insets (top, right, bottom, left).
    ///
    /// Width and height never go below zero.
    #[must_use]
    pub fn inset(self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    /// Keep the top edge, consume `height` from the top and return the rest.
    #[must_use]
    pub fn below(self, height: f32) -> Self {
        Self::new(
            self.x,
            self.y + height,
            self.width,
            (self.height - height).max(0.0),
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}x{:.2}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Standard page sizes in points (portrait).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize(pub Size);

impl PageSize {
    pub const A4: Self = Self(Size::new(595.0, 842.0));
    pub const A6: Self = Self(Size::new(298.0, 420.0));
    pub const A7: Self = Self(Size::new(210.0, 298.0));
    pub const LETTER: Self = Self(Size::new(612.0, 792.0));

    /// A custom page size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self(Size::new(width, height))
    }

    /// Swap width and height (landscape).
    #[must_use]
    pub const fn rotate(self) -> Self {
        Self(Size::new(self.0.height, self.0.width))
    }

    #[must_use]
    pub const fn width(&self) -> f32 {
        self.0.width
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.0.height
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Compare two lengths with [`EPSILON`] tolerance.
#[must_use]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

/// `a <= b` with [`EPSILON`] tolerance.
#[must_use]
pub fn fits_within(a: f32, b: f32) -> bool {
    a <= b + EPSILON
}
