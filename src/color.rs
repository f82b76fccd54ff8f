//! Paint colors for borders and cell backgrounds.
//!
//! Colors are plain RGB triplets. They can be built directly or parsed from
//! text:
//!
//! ```
//! use pagegrid::color::Color;
//!
//! let red = Color::parse("red").unwrap();
//! assert_eq!(red, Color::rgb(255, 0, 0));
//! assert_eq!(Color::parse("#0f0").unwrap(), Color::rgb(0, 255, 0));
//! assert_eq!(Color::parse("rgb(0, 0, 255)").unwrap(), Color::BLUE);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex};

use lru::LruCache;
use regex::Regex;

use crate::sync::lock_recover;

/// RGB color with components 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const ORANGE: Self = Self::rgb(255, 200, 0);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create a color from RGB components.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// CSS-style hex format `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Normalized components in range 0.0-1.0, as page-description
    /// operators expect them.
    #[must_use]
    pub fn normalized(&self) -> (f32, f32, f32) {
        (
            f32::from(self.red) / 255.0,
            f32::from(self.green) / 255.0,
            f32::from(self.blue) / 255.0,
        )
    }

    /// Parse a color string (cached).
    ///
    /// Supported formats:
    /// - Named colors: `red`, `gray`, `orange`
    /// - Hex format: `#FF0000` or `#F00`
    /// - RGB format: `rgb(255,0,0)`
    ///
    /// # Errors
    ///
    /// Returns `ColorParseError` if the color string is empty or malformed.
    pub fn parse(color: &str) -> Result<Self, ColorParseError> {
        static CACHE: LazyLock<Mutex<LruCache<String, Color>>> =
            LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(256).expect("non-zero"))));

        let normalized = color.trim().to_lowercase();

        if let Some(cached) = lock_recover(&CACHE).get(&normalized) {
            return Ok(*cached);
        }

        let result = Self::parse_uncached(&normalized)?;
        lock_recover(&CACHE).put(normalized, result);
        Ok(result)
    }

    fn parse_uncached(color: &str) -> Result<Self, ColorParseError> {
        static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
                .expect("valid regex")
        });

        if color.is_empty() {
            return Err(ColorParseError::Empty);
        }

        if let Some(hex) = color.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(color.to_string()));
        }

        if let Some(caps) = RGB_RE.captures(color) {
            let parts: Option<Vec<u8>> = (1..=3).map(|i| caps[i].parse::<u8>().ok()).collect();
            return match parts.as_deref() {
                Some(&[r, g, b]) => Ok(Self::rgb(r, g, b)),
                _ => Err(ColorParseError::InvalidRgb(color.to_string())),
            };
        }

        NAMED_COLORS
            .get(color)
            .copied()
            .ok_or_else(|| ColorParseError::UnknownColor(color.to_string()))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => Some(Self::rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
                Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::rgb(red, green, blue)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

static NAMED_COLORS: LazyLock<HashMap<&'static str, Color>> = LazyLock::new(|| {
    HashMap::from([
        ("black", Color::BLACK),
        ("white", Color::WHITE),
        ("red", Color::RED),
        ("green", Color::GREEN),
        ("blue", Color::BLUE),
        ("yellow", Color::YELLOW),
        ("magenta", Color::MAGENTA),
        ("cyan", Color::CYAN),
        ("orange", Color::ORANGE),
        ("gray", Color::GRAY),
        ("grey", Color::GRAY),
    ])
});

/// Error produced by [`Color::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    Empty,
    InvalidHex(String),
    InvalidRgb(String),
    UnknownColor(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty color string"),
            Self::InvalidHex(s) => write!(f, "Invalid hex color: {s}"),
            Self::InvalidRgb(s) => write!(f, "Invalid RGB color: {s}"),
            Self::UnknownColor(s) => write!(f, "Unknown color: {s}"),
        }
    }
}

impl std::error::Error for ColorParseError {}
