//! Cell content: paragraphs, fixed boxes and nested tables.
//!
//! The layout engine only asks content one question: given a width and a
//! height, how much fits? [`ContentFit`] answers with the consumed height,
//! the placed pieces (positioned relative to the content box) and, when
//! the content had to be split, the residue to continue with.

use std::ops::Range;

use crate::error::LayoutWarning;
use crate::geometry::{EPSILON, Point, Rect};
use crate::layout::{LayoutArea, LayoutStatus, TableFragment};
use crate::measure::Measurement;
use crate::table::Table;
use crate::text::{FontSpec, TextMeasurer};

/// Default line height as a multiple of the font size.
pub const DEFAULT_LEADING: f32 = 1.2;

/// A piece of cell or page content.
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    /// An unsplittable box, such as an image or a rule.
    Fixed { height: f32, label: String },
    /// A table laid out by the same engine as its parent.
    Table(Box<Table>),
}

impl Block {
    /// A paragraph in the default font.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(Paragraph::new(text))
    }

    #[must_use]
    pub fn fixed(height: f32, label: impl Into<String>) -> Self {
        Self::Fixed {
            height: height.max(0.0),
            label: label.into(),
        }
    }

    /// Fit this block into `width` x `height`.
    #[must_use]
    pub fn fit(&self, width: f32, height: f32, measurer: &dyn TextMeasurer) -> ContentFit {
        match self {
            Self::Paragraph(p) => p.fit(width, height, measurer),
            Self::Fixed { height: h, label } => {
                if *h <= height + EPSILON {
                    ContentFit::Full {
                        height: *h,
                        placed: vec![PlacedBlock::Fixed {
                            bounds: Rect::new(0.0, 0.0, width, *h),
                            label: label.clone(),
                        }],
                    }
                } else {
                    ContentFit::Nothing
                }
            }
            Self::Table(table) => {
                let area = LayoutArea::new(Rect::new(0.0, 0.0, width, height));
                let result = table.layout(&area, measurer);
                let Some(fragment) = result.fragment else {
                    return ContentFit::Nothing;
                };
                let height = fragment.bounds.height;
                let placed = vec![PlacedBlock::Table(fragment)];
                match (result.status, result.continuation) {
                    (LayoutStatus::Partial, Some(continuation)) => ContentFit::Partial {
                        height,
                        placed,
                        residue: vec![Self::Table(Box::new(continuation))],
                    },
                    (LayoutStatus::Nothing, _) => ContentFit::Nothing,
                    _ => ContentFit::Full { height, placed },
                }
            }
        }
    }

    /// Minimum and maximum width of this block.
    #[must_use]
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> Measurement {
        match self {
            Self::Paragraph(p) => p.measure(measurer),
            Self::Fixed { .. } => Measurement::zero(),
            Self::Table(table) => table.measure(measurer),
        }
    }

    /// Whether this block is a paragraph without text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Paragraph(p) if p.is_empty())
    }
}

impl From<Paragraph> for Block {
    fn from(value: Paragraph) -> Self {
        Self::Paragraph(value)
    }
}

impl From<Table> for Block {
    fn from(value: Table) -> Self {
        Self::Table(Box::new(value))
    }
}

impl From<&str> for Block {
    fn from(value: &str) -> Self {
        Self::paragraph(value)
    }
}

impl From<String> for Block {
    fn from(value: String) -> Self {
        Self::paragraph(value)
    }
}

/// A run of text broken into lines greedily.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    text: String,
    font: FontSpec,
    leading: f32,
}

impl Paragraph {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: FontSpec::default(),
            leading: DEFAULT_LEADING,
        }
    }

    #[must_use]
    pub fn font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Keep the family, change the size.
    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.font = self.font.with_size(size);
        self
    }

    /// Line height as a multiple of the font size.
    #[must_use]
    pub fn leading(mut self, leading: f32) -> Self {
        self.leading = leading.max(0.0);
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn font_spec(&self) -> &FontSpec {
        &self.font
    }

    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.font.size * self.leading
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn width_of(&self, text: &str, measurer: &dyn TextMeasurer) -> f32 {
        measurer.measure_width(text, &self.font.family, self.font.size)
    }

    /// Byte ranges of the lines this paragraph breaks into at `width`.
    ///
    /// Ranges exclude surrounding whitespace. `\n` always ends a line;
    /// a word wider than `width` is broken between characters.
    #[must_use]
    pub fn break_lines(&self, width: f32, measurer: &dyn TextMeasurer) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        if self.text.is_empty() {
            return lines;
        }
        let mut base = 0;
        for hard in self.text.split('\n') {
            self.break_hard_line(base, hard, width, measurer, &mut lines);
            base += hard.len() + 1;
        }
        lines
    }

    fn break_hard_line(
        &self,
        base: usize,
        line: &str,
        width: f32,
        measurer: &dyn TextMeasurer,
        lines: &mut Vec<Range<usize>>,
    ) {
        let words = word_spans(line);
        if words.is_empty() {
            lines.push(base..base);
            return;
        }

        let fits = |range: &Range<usize>| self.width_of(&line[range.clone()], measurer) <= width + EPSILON;
        let mut current: Option<Range<usize>> = None;
        for word in words {
            if let Some(cur) = current.take() {
                let joined = cur.start..word.end;
                if fits(&joined) {
                    current = Some(joined);
                    continue;
                }
                lines.push(base + cur.start..base + cur.end);
            }

            if fits(&word) {
                current = Some(word);
                continue;
            }
            // Break the word between characters, at least one per line.
            let mut start = word.start;
            let mut end = start;
            for (i, c) in line[word.clone()].char_indices() {
                let next = word.start + i + c.len_utf8();
                if end > start && !fits(&(start..next)) {
                    lines.push(base + start..base + end);
                    start = end;
                }
                end = next;
            }
            current = Some(start..end);
        }
        if let Some(cur) = current {
            lines.push(base + cur.start..base + cur.end);
        }
    }

    /// Split at a byte offset. The two parts concatenate to the original.
    #[must_use]
    pub fn split_at(&self, offset: usize) -> (Self, Self) {
        let (head, tail) = self.text.split_at(offset.min(self.text.len()));
        (
            Self {
                text: head.to_string(),
                ..self.clone()
            },
            Self {
                text: tail.to_string(),
                ..self.clone()
            },
        )
    }

    /// Fit as many lines as possible into `height`.
    #[must_use]
    pub fn fit(&self, width: f32, height: f32, measurer: &dyn TextMeasurer) -> ContentFit {
        let lines = self.break_lines(width, measurer);
        if lines.is_empty() {
            return ContentFit::Full {
                height: 0.0,
                placed: Vec::new(),
            };
        }

        let line_height = self.line_height();
        let count = if line_height <= 0.0 {
            lines.len()
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "clamped to non-negative, saturating cast"
            )]
            let n = ((height + EPSILON) / line_height).floor().max(0.0) as usize;
            n.min(lines.len())
        };
        if count == 0 {
            return ContentFit::Nothing;
        }

        let split = if count == lines.len() {
            self.text.len()
        } else {
            lines[count].start
        };
        let (placed_part, residue) = self.split_at(split);
        let placed_lines = lines[..count]
            .iter()
            .enumerate()
            .map(|(i, range)| {
                #[expect(clippy::cast_precision_loss, reason = "line counts are small")]
                let y = i as f32 * line_height;
                PlacedLine {
                    text: self.text[range.clone()].to_string(),
                    offset: Point::new(0.0, y),
                }
            })
            .collect();
        #[expect(clippy::cast_precision_loss, reason = "line counts are small")]
        let consumed = count as f32 * line_height;
        let placed = vec![PlacedBlock::Text {
            source: placed_part.text,
            lines: placed_lines,
            font: self.font.clone(),
        }];

        if count == lines.len() {
            ContentFit::Full {
                height: consumed,
                placed,
            }
        } else {
            ContentFit::Partial {
                height: consumed,
                placed,
                residue: vec![Block::Paragraph(residue)],
            }
        }
    }

    /// Widest word (minimum) and widest hard line (maximum).
    #[must_use]
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> Measurement {
        let mut minimum: f32 = 0.0;
        let mut maximum: f32 = 0.0;
        for hard in self.text.split('\n') {
            for word in word_spans(hard) {
                minimum = minimum.max(self.width_of(&hard[word], measurer));
            }
            maximum = maximum.max(self.width_of(hard.trim(), measurer));
        }
        Measurement::new(minimum, maximum)
    }
}

fn word_spans(line: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push(s..i);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push(s..line.len());
    }
    spans
}

/// One placed line of text, offset from the content box origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub offset: Point,
}

/// Content positioned relative to the content box origin.
#[derive(Debug, Clone)]
pub enum PlacedBlock {
    Text {
        /// The exact slice of the paragraph these lines came from.
        source: String,
        lines: Vec<PlacedLine>,
        font: FontSpec,
    },
    Fixed {
        bounds: Rect,
        label: String,
    },
    Table(TableFragment),
}

impl PlacedBlock {
    /// Move by `(dx, dy)`.
    #[must_use]
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        match self {
            Self::Text {
                source,
                lines,
                font,
            } => Self::Text {
                source,
                lines: lines
                    .into_iter()
                    .map(|l| PlacedLine {
                        text: l.text,
                        offset: l.offset.translate(dx, dy),
                    })
                    .collect(),
                font,
            },
            Self::Fixed { bounds, label } => Self::Fixed {
                bounds: bounds.translate(dx, dy),
                label,
            },
            Self::Table(fragment) => Self::Table(fragment.translate(dx, dy)),
        }
    }

    /// Layout warnings carried by a placed table, empty for other blocks.
    #[must_use]
    pub fn warnings(&self) -> &[LayoutWarning] {
        match self {
            Self::Table(fragment) => &fragment.warnings,
            Self::Text { .. } | Self::Fixed { .. } => &[],
        }
    }
}

/// Result of fitting content into an area.
#[derive(Debug, Clone)]
pub enum ContentFit {
    /// Everything fits.
    Full {
        height: f32,
        placed: Vec<PlacedBlock>,
    },
    /// Part fits; `residue` holds the rest, to be continued elsewhere.
    Partial {
        height: f32,
        placed: Vec<PlacedBlock>,
        residue: Vec<Block>,
    },
    /// Not even the first piece fits.
    Nothing,
}

impl ContentFit {
    /// Consumed height; zero for [`ContentFit::Nothing`].
    #[must_use]
    pub const fn height(&self) -> f32 {
        match self {
            Self::Full { height, .. } | Self::Partial { height, .. } => *height,
            Self::Nothing => 0.0,
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    /// Move placed content by `(dx, dy)` and add `extra` to the height.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32, extra: f32) -> Self {
        let shift = |placed: Vec<PlacedBlock>| -> Vec<PlacedBlock> {
            placed.into_iter().map(|p| p.translate(dx, dy)).collect()
        };
        match self {
            Self::Full { height, placed } => Self::Full {
                height: height + extra,
                placed: shift(placed),
            },
            Self::Partial {
                height,
                placed,
                residue,
            } => Self::Partial {
                height: height + extra,
                placed: shift(placed),
                residue,
            },
            Self::Nothing => Self::Nothing,
        }
    }
}

/// Stack `blocks` vertically into `width` x `height`.
#[must_use]
pub fn fit_blocks(
    blocks: &[Block],
    width: f32,
    height: f32,
    measurer: &dyn TextMeasurer,
) -> ContentFit {
    let mut placed: Vec<PlacedBlock> = Vec::new();
    let mut y = 0.0;
    for (i, block) in blocks.iter().enumerate() {
        match block.fit(width, height - y, measurer) {
            ContentFit::Full { height: h, placed: p } => {
                placed.extend(p.into_iter().map(|b| b.translate(0.0, y)));
                y += h;
            }
            ContentFit::Partial {
                height: h,
                placed: p,
                mut residue,
            } => {
                placed.extend(p.into_iter().map(|b| b.translate(0.0, y)));
                residue.extend(blocks[i + 1..].iter().cloned());
                return ContentFit::Partial {
                    height: y + h,
                    placed,
                    residue,
                };
            }
            ContentFit::Nothing if placed.is_empty() => return ContentFit::Nothing,
            ContentFit::Nothing => {
                return ContentFit::Partial {
                    height: y,
                    placed,
                    residue: blocks[i..].to_vec(),
                };
            }
        }
    }
    ContentFit::Full { height: y, placed }
}

/// Combined measurement of vertically stacked blocks.
#[must_use]
pub fn measure_blocks(blocks: &[Block], measurer: &dyn TextMeasurer) -> Measurement {
    blocks
        .iter()
        .map(|b| b.measure(measurer))
        .fold(Measurement::zero(), |acc, m| acc.union(&m))
}
