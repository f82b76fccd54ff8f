//! Measurement protocol for content width requirements.
//!
//! A [`Measurement`] captures the narrowest width content can be laid out
//! in (the widest unbreakable word, a fixed box) and the width it would
//! take unconstrained (the longest line). Auto-width tables use it to
//! size their columns.

/// Minimum and maximum width requirements, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Narrowest usable width.
    pub minimum: f32,
    /// Ideal unconstrained width.
    pub maximum: f32,
}

impl Measurement {
    /// Create a new measurement. Swaps the bounds if given out of order.
    #[must_use]
    pub fn new(minimum: f32, maximum: f32) -> Self {
        let minimum = minimum.max(0.0);
        let maximum = maximum.max(0.0);
        if minimum <= maximum {
            Self { minimum, maximum }
        } else {
            Self {
                minimum: maximum,
                maximum: minimum,
            }
        }
    }

    /// A measurement where min equals max.
    #[must_use]
    pub fn exact(width: f32) -> Self {
        Self::new(width, width)
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self {
            minimum: 0.0,
            maximum: 0.0,
        }
    }

    /// Difference between maximum and minimum.
    #[must_use]
    pub fn span(&self) -> f32 {
        (self.maximum - self.minimum).max(0.0)
    }

    /// Clamp both bounds to at most `width`.
    #[must_use]
    pub fn with_maximum(&self, width: f32) -> Self {
        Self {
            minimum: self.minimum.min(width),
            maximum: self.maximum.min(width),
        }
    }

    /// Raise both bounds to at least `width`.
    #[must_use]
    pub fn with_minimum(&self, width: f32) -> Self {
        Self {
            minimum: self.minimum.max(width),
            maximum: self.maximum.max(width),
        }
    }

    /// Combine two measurements of content stacked vertically: the result
    /// has to satisfy both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            minimum: self.minimum.max(other.minimum),
            maximum: self.maximum.max(other.maximum),
        }
    }

    /// Add a constant (padding, borders) to both bounds.
    #[must_use]
    pub fn add(&self, width: f32) -> Self {
        Self::new(self.minimum + width, self.maximum + width)
    }

    /// Whether `width` lies within the bounds.
    #[must_use]
    pub fn fits(&self, width: f32) -> bool {
        width >= self.minimum && width <= self.maximum
    }
}

impl std::ops::Add for Measurement {
    type Output = Self;

    /// Side-by-side content: widths add up.
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.minimum + rhs.minimum, self.maximum + rhs.maximum)
    }
}

impl std::iter::Sum for Measurement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| acc + m)
    }
}
