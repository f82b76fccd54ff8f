//! Painting placed content onto a drawing surface.
//!
//! Layout produces geometry only. A [`Painter`] receives the primitives a
//! page is made of, in paint order: backgrounds first, then text and
//! fixed boxes, then border segments on top. [`DisplayList`] is a painter
//! that records those primitives, for tests and for back ends that
//! serialize pages later.

use std::borrow::Cow;

use crate::border::Border;
use crate::color::Color;
use crate::content::PlacedBlock;
use crate::geometry::{PageSize, Point, Rect};
use crate::layout::TableFragment;
use crate::text::{FontSpec, TextMeasurer, encode_lossy};

/// A drawing surface.
pub trait Painter {
    /// Start page `index` (zero based) of `size`.
    fn begin_page(&mut self, index: usize, size: PageSize);

    /// Fill and/or stroke `bounds`. A border segment arrives as its own
    /// rectangle with `border` set; a background with `background` set.
    fn paint_rectangle(&mut self, bounds: Rect, border: Option<&Border>, background: Option<Color>);

    /// Draw one line of text with its top-left corner at `position`.
    fn place_text(&mut self, run: &str, position: Point, font: &FontSpec);
}

/// One recorded paint call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    BeginPage {
        index: usize,
        size: PageSize,
    },
    Rectangle {
        bounds: Rect,
        border: Option<Border>,
        background: Option<Color>,
    },
    Text {
        run: String,
        position: Point,
        font: FontSpec,
    },
}

/// A [`Painter`] that records every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    ops: Vec<PaintOp>,
}

impl DisplayList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of pages begun.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, PaintOp::BeginPage { .. }))
            .count()
    }

    /// Text runs in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Text { run, .. } => Some(run.as_str()),
            _ => None,
        })
    }

    /// Border segments in paint order.
    pub fn borders(&self) -> impl Iterator<Item = (Rect, &Border)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Rectangle {
                bounds,
                border: Some(border),
                ..
            } => Some((*bounds, border)),
            _ => None,
        })
    }

    /// Background fills in paint order.
    pub fn backgrounds(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Rectangle {
                bounds,
                background: Some(color),
                ..
            } => Some((*bounds, *color)),
            _ => None,
        })
    }
}

impl Painter for DisplayList {
    fn begin_page(&mut self, index: usize, size: PageSize) {
        self.ops.push(PaintOp::BeginPage { index, size });
    }

    fn paint_rectangle(&mut self, bounds: Rect, border: Option<&Border>, background: Option<Color>) {
        self.ops.push(PaintOp::Rectangle {
            bounds,
            border: border.copied(),
            background,
        });
    }

    fn place_text(&mut self, run: &str, position: Point, font: &FontSpec) {
        self.ops.push(PaintOp::Text {
            run: run.to_string(),
            position,
            font: font.clone(),
        });
    }
}

/// Paint one placed block. Characters the measurer cannot encode are
/// replaced before they reach the painter.
pub fn paint_block(block: &PlacedBlock, painter: &mut dyn Painter, measurer: &dyn TextMeasurer) {
    match block {
        PlacedBlock::Text { lines, font, .. } => {
            for line in lines {
                let run: Cow<'_, str> = encode_lossy(measurer, &line.text);
                if !run.is_empty() {
                    painter.place_text(&run, line.offset, font);
                }
            }
        }
        PlacedBlock::Fixed { bounds, .. } => painter.paint_rectangle(*bounds, None, None),
        PlacedBlock::Table(fragment) => fragment.paint(painter, measurer),
    }
}

impl TableFragment {
    /// Paint backgrounds, cell content and border segments, in that order.
    pub fn paint(&self, painter: &mut dyn Painter, measurer: &dyn TextMeasurer) {
        if let Some(color) = self.background {
            painter.paint_rectangle(self.bounds, None, Some(color));
        }
        for cell in &self.cells {
            if let Some(color) = cell.background {
                painter.paint_rectangle(cell.bounds, None, Some(color));
            }
        }
        for cell in &self.cells {
            for block in &cell.content {
                paint_block(block, painter, measurer);
            }
        }
        for segment in &self.segments {
            painter.paint_rectangle(segment.bounds, Some(&segment.border), None);
        }
    }
}
