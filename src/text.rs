//! Text measurement seam.
//!
//! Layout never touches glyphs directly. It asks a [`TextMeasurer`] how
//! wide a run of text is in a given font and whether a character can be
//! encoded at all. [`MonospaceMeasurer`] is a dependency-free
//! implementation built on Unicode display widths, good enough for tests
//! and previews.

use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use lru::LruCache;
use unicode_width::UnicodeWidthChar;

use crate::sync::lock_recover;

/// Replacement for characters the font cannot encode.
pub const REPLACEMENT_CHAR: char = '?';

/// Minimum string length to cache (shorter strings have minimal overhead).
const CACHE_MIN_LEN: usize = 8;

static CELL_LEN_CACHE: LazyLock<Mutex<LruCache<String, usize>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(1024).expect("non-zero"))));

/// Font family and size for a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
}

impl FontSpec {
    #[must_use]
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size: size.max(0.0),
        }
    }

    /// Same family, different size.
    #[must_use]
    pub fn with_size(&self, size: f32) -> Self {
        Self::new(self.family.clone(), size)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Helvetica", 12.0)
    }
}

/// Font metrics provider.
///
/// Implementations must be pure: the same input always yields the same
/// width, so layout stays deterministic.
pub trait TextMeasurer {
    /// Advance width of `text` in points.
    fn measure_width(&self, text: &str, font: &str, size: f32) -> f32;

    /// Whether `c` can be encoded by the font.
    fn can_encode(&self, c: char) -> bool;
}

/// Replace characters the measurer cannot encode with [`REPLACEMENT_CHAR`].
#[must_use]
pub fn encode_lossy<'a>(measurer: &dyn TextMeasurer, text: &'a str) -> Cow<'a, str> {
    if text.chars().all(|c| measurer.can_encode(c)) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if measurer.can_encode(c) { c } else { REPLACEMENT_CHAR })
                .collect(),
        )
    }
}

/// A measurer where every display cell has the same advance.
///
/// Wide characters (CJK, emoji) count as two cells, control characters as
/// zero, following Unicode East Asian Width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    advance: f32,
    max_code_point: Option<u32>,
}

impl MonospaceMeasurer {
    /// Default advance as a fraction of the font size.
    pub const DEFAULT_ADVANCE: f32 = 0.6;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            advance: Self::DEFAULT_ADVANCE,
            max_code_point: None,
        }
    }

    /// A measurer that can only encode Latin-1, like a standard 14 font.
    #[must_use]
    pub const fn latin1() -> Self {
        Self {
            advance: Self::DEFAULT_ADVANCE,
            max_code_point: Some(0xFF),
        }
    }

    /// Set the per-cell advance as a fraction of the font size.
    #[must_use]
    pub fn advance(mut self, advance: f32) -> Self {
        self.advance = advance.max(0.0);
        self
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_width(&self, text: &str, _font: &str, size: f32) -> f32 {
        #[expect(clippy::cast_precision_loss, reason = "cell counts are small")]
        let cells = cell_len(text) as f32;
        cells * size * self.advance
    }

    fn can_encode(&self, c: char) -> bool {
        self.max_code_point.is_none_or(|max| u32::from(c) <= max)
    }
}

/// Display cell width of a single character.
#[must_use]
pub fn char_cells(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Total display cells of a string (cached for longer strings).
#[must_use]
pub fn cell_len(text: &str) -> usize {
    if text.len() < CACHE_MIN_LEN {
        return text.chars().map(char_cells).sum();
    }

    if let Some(&cached) = lock_recover(&CELL_LEN_CACHE).get(text) {
        return cached;
    }

    let width = text.chars().map(char_cells).sum();
    lock_recover(&CELL_LEN_CACHE).put(text.to_string(), width);
    width
}
