//! Border values and the collapsing comparator.
//!
//! A [`Border`] describes the paint of one edge. [`Border::None`] is an
//! explicit "render nothing" value; an un-set edge is represented by
//! `Option::None` at the owning scope and inherits from the next scope in
//! the chain (cell, row, header/footer, table).
//!
//! When two scopes contribute to the same edge, the collapsing comparator
//! picks exactly one winner:
//!
//! 1. the wider border wins,
//! 2. equal widths fall back to kind priority (solid > double > dashed > dotted),
//! 3. equal width and kind fall back to the scope supplied by the caller
//!    (cell > row > header/footer > table).
//!
//! ```
//! use std::cmp::Ordering;
//! use pagegrid::border::{Border, BorderScope};
//!
//! let thin = Border::solid(1.0);
//! let thick = Border::dotted(3.0);
//! assert_eq!(
//!     thick.compare_collapsed(BorderScope::Table, &thin, BorderScope::Cell),
//!     Ordering::Greater
//! );
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use bitflags::bitflags;
use regex::Regex;

use crate::color::{Color, ColorParseError};

/// Width and color of a painted border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    /// Create a stroke. Negative widths are clamped to zero.
    #[must_use]
    pub fn new(width: f32, color: Color) -> Self {
        Self {
            width: width.max(0.0),
            color,
        }
    }
}

/// Kind of border, without width or color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderKind {
    None,
    Solid,
    Double,
    Dashed,
    Dotted,
}

impl BorderKind {
    /// Tie-break priority used when two borders have the same width.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Solid => 4,
            Self::Double => 3,
            Self::Dashed => 2,
            Self::Dotted => 1,
            Self::None => 0,
        }
    }

    /// Lowercase name, as accepted by [`Border::parse`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Double => "double",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

/// The paint style of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Border {
    /// Explicitly no border. Zero width.
    #[default]
    None,
    Solid(Stroke),
    Double(Stroke),
    Dashed(Stroke),
    Dotted(Stroke),
}

impl Border {
    /// Explicitly no border.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// A solid black border.
    #[must_use]
    pub fn solid(width: f32) -> Self {
        Self::Solid(Stroke::new(width, Color::BLACK))
    }

    /// A double black border.
    #[must_use]
    pub fn double(width: f32) -> Self {
        Self::Double(Stroke::new(width, Color::BLACK))
    }

    /// A dashed black border.
    #[must_use]
    pub fn dashed(width: f32) -> Self {
        Self::Dashed(Stroke::new(width, Color::BLACK))
    }

    /// A dotted black border.
    #[must_use]
    pub fn dotted(width: f32) -> Self {
        Self::Dotted(Stroke::new(width, Color::BLACK))
    }

    /// Build a border of the given kind.
    #[must_use]
    pub fn of_kind(kind: BorderKind, width: f32, color: Color) -> Self {
        let stroke = Stroke::new(width, color);
        match kind {
            BorderKind::None => Self::None,
            BorderKind::Solid => Self::Solid(stroke),
            BorderKind::Double => Self::Double(stroke),
            BorderKind::Dashed => Self::Dashed(stroke),
            BorderKind::Dotted => Self::Dotted(stroke),
        }
    }

    /// Replace the color, keeping kind and width.
    #[must_use]
    pub fn with_color(self, color: Color) -> Self {
        Self::of_kind(self.kind(), self.width(), color)
    }

    /// Stroke of a painted border.
    #[must_use]
    pub const fn stroke(&self) -> Option<&Stroke> {
        match self {
            Self::None => None,
            Self::Solid(s) | Self::Double(s) | Self::Dashed(s) | Self::Dotted(s) => Some(s),
        }
    }

    /// Width in points; zero for [`Border::None`].
    #[must_use]
    pub fn width(&self) -> f32 {
        self.stroke().map_or(0.0, |s| s.width)
    }

    #[must_use]
    pub const fn kind(&self) -> BorderKind {
        match self {
            Self::None => BorderKind::None,
            Self::Solid(_) => BorderKind::Solid,
            Self::Double(_) => BorderKind::Double,
            Self::Dashed(_) => BorderKind::Dashed,
            Self::Dotted(_) => BorderKind::Dotted,
        }
    }

    /// Color of a painted border.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.stroke().map(|s| s.color)
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether this border paints anything.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.is_none() && self.width() > 0.0
    }

    /// Collapsing comparator.
    ///
    /// Returns `Ordering::Greater` when `self` (owned by `scope`) wins over
    /// `other` (owned by `other_scope`), `Ordering::Less` when it loses and
    /// `Ordering::Equal` on a full tie.
    #[must_use]
    pub fn compare_collapsed(
        &self,
        scope: BorderScope,
        other: &Self,
        other_scope: BorderScope,
    ) -> Ordering {
        self.width()
            .total_cmp(&other.width())
            .then_with(|| self.kind().priority().cmp(&other.kind().priority()))
            .then_with(|| scope.cmp(&other_scope))
    }

    /// Parse a border description such as `"solid 2"`, `"dotted 0.5pt red"`
    /// or `"none"`.
    ///
    /// # Errors
    ///
    /// Returns `BorderParseError` for unknown kinds, bad widths or colors.
    pub fn parse(spec: &str) -> Result<Self, BorderParseError> {
        static BORDER_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([a-z]+)\s+(\d+(?:\.\d+)?)(?:pt)?(?:\s+(.+))?$").expect("valid regex")
        });

        let spec = spec.trim().to_lowercase();
        if spec.is_empty() {
            return Err(BorderParseError::Empty);
        }
        if spec == "none" {
            return Ok(Self::None);
        }

        let caps = BORDER_RE
            .captures(&spec)
            .ok_or_else(|| BorderParseError::Malformed(spec.clone()))?;
        let kind = match &caps[1] {
            "solid" => BorderKind::Solid,
            "double" => BorderKind::Double,
            "dashed" => BorderKind::Dashed,
            "dotted" => BorderKind::Dotted,
            other => return Err(BorderParseError::UnknownKind(other.to_string())),
        };
        let width: f32 = caps[2]
            .parse()
            .map_err(|_| BorderParseError::Malformed(spec.clone()))?;
        let color = match caps.get(3) {
            Some(m) => Color::parse(m.as_str())?,
            None => Color::BLACK,
        };
        Ok(Self::of_kind(kind, width, color))
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stroke() {
            None => write!(f, "none"),
            Some(s) => write!(f, "{} {} {}", self.kind().name(), s.width, s.color),
        }
    }
}

/// Error produced by [`Border::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorderParseError {
    Empty,
    Malformed(String),
    UnknownKind(String),
    Color(ColorParseError),
}

impl fmt::Display for BorderParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty border specification"),
            Self::Malformed(s) => write!(f, "Malformed border specification: {s}"),
            Self::UnknownKind(s) => write!(f, "Unknown border kind: {s}"),
            Self::Color(e) => write!(f, "Invalid border color: {e}"),
        }
    }
}

impl std::error::Error for BorderParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Color(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ColorParseError> for BorderParseError {
    fn from(value: ColorParseError) -> Self {
        Self::Color(value)
    }
}

/// The scope that contributed a border, from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BorderScope {
    Table,
    HeaderFooter,
    Row,
    Cell,
}

/// One side of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The facing edge of the neighbouring box.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    const fn side(self) -> Sides {
        match self {
            Self::Top => Sides::TOP,
            Self::Right => Sides::RIGHT,
            Self::Bottom => Sides::BOTTOM,
            Self::Left => Sides::LEFT,
        }
    }
}

bitflags! {
    /// A set of edges, for setting several borders at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        const TOP = 1 << 0;
        const RIGHT = 1 << 1;
        const BOTTOM = 1 << 2;
        const LEFT = 1 << 3;
        const HORIZONTAL = Self::TOP.bits() | Self::BOTTOM.bits();
        const VERTICAL = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Sides {
    /// Iterate the edges contained in this set.
    pub fn edges(self) -> impl Iterator<Item = Edge> {
        Edge::ALL.into_iter().filter(move |e| self.contains(e.side()))
    }
}

/// A value per edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Clone> Edges<T> {
    /// The same value on every edge.
    pub fn all(value: T) -> Self {
        Self {
            top: value.clone(),
            right: value.clone(),
            bottom: value.clone(),
            left: value,
        }
    }

    /// Set the value on every edge in `sides`.
    pub fn set_sides(&mut self, sides: Sides, value: &T) {
        for edge in sides.edges() {
            self.set(edge, value.clone());
        }
    }
}

impl<T> Edges<T> {
    pub const fn get(&self, edge: Edge) -> &T {
        match edge {
            Edge::Top => &self.top,
            Edge::Right => &self.right,
            Edge::Bottom => &self.bottom,
            Edge::Left => &self.left,
        }
    }

    pub fn set(&mut self, edge: Edge, value: T) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
        }
    }
}
