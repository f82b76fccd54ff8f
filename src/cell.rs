//! A single logical table cell.

use crate::border::{Border, Edge, Edges, Sides};
use crate::color::Color;
use crate::content::{Block, ContentFit, fit_blocks, measure_blocks};
use crate::geometry::EPSILON;
use crate::measure::Measurement;
use crate::text::TextMeasurer;

/// Default padding on every side, in points.
pub const DEFAULT_PADDING: f32 = 2.0;

/// A table cell: content, spans and per-edge border overrides.
///
/// Border overrides are `None` when unset; the edge then inherits from the
/// row, the header/footer group or the table. `Some(Border::None)` is an
/// explicit "no border" that wins against any neighbour.
#[derive(Debug, Clone)]
pub struct Cell {
    content: Vec<Block>,
    rowspan: usize,
    colspan: usize,
    borders: Edges<Option<Border>>,
    background: Option<Color>,
    padding: Edges<f32>,
    min_height: Option<f32>,
    keep_together: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Cell {
    /// Create an empty cell. Spans below one are raised to one.
    #[must_use]
    pub fn new(rowspan: usize, colspan: usize) -> Self {
        Self {
            content: Vec::new(),
            rowspan: rowspan.max(1),
            colspan: colspan.max(1),
            borders: Edges::default(),
            background: None,
            padding: Edges::all(DEFAULT_PADDING),
            min_height: None,
            keep_together: false,
        }
    }

    /// A 1x1 cell holding one paragraph.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::default().add(Block::paragraph(text))
    }

    /// Append content.
    #[must_use]
    pub fn add(mut self, block: impl Into<Block>) -> Self {
        self.content.push(block.into());
        self
    }

    /// Override all four edges.
    #[must_use]
    pub fn border(mut self, border: Border) -> Self {
        self.borders = Edges::all(Some(border));
        self
    }

    #[must_use]
    pub fn border_edge(mut self, edge: Edge, border: Border) -> Self {
        self.borders.set(edge, Some(border));
        self
    }

    #[must_use]
    pub fn border_sides(mut self, sides: Sides, border: Border) -> Self {
        self.borders.set_sides(sides, &Some(border));
        self
    }

    #[must_use]
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Same padding on every side.
    #[must_use]
    pub fn padding(mut self, padding: f32) -> Self {
        self.padding = Edges::all(padding.max(0.0));
        self
    }

    #[must_use]
    pub fn padding_edges(mut self, padding: Edges<f32>) -> Self {
        self.padding = padding;
        self
    }

    /// Minimum height of the cell box, padding included.
    #[must_use]
    pub fn height(mut self, height: f32) -> Self {
        self.min_height = Some(height.max(0.0));
        self
    }

    /// Forbid splitting this cell across pages.
    #[must_use]
    pub fn keep_together(mut self, keep: bool) -> Self {
        self.keep_together = keep;
        self
    }

    #[must_use]
    pub const fn rowspan(&self) -> usize {
        self.rowspan
    }

    #[must_use]
    pub const fn colspan(&self) -> usize {
        self.colspan
    }

    #[must_use]
    pub fn content(&self) -> &[Block] {
        &self.content
    }

    #[must_use]
    pub const fn borders(&self) -> &Edges<Option<Border>> {
        &self.borders
    }

    /// The explicit override on `edge`, if any.
    #[must_use]
    pub const fn border_override(&self, edge: Edge) -> Option<Border> {
        *self.borders.get(edge)
    }

    #[must_use]
    pub const fn background_color(&self) -> Option<Color> {
        self.background
    }

    #[must_use]
    pub const fn padding_box(&self) -> &Edges<f32> {
        &self.padding
    }

    #[must_use]
    pub const fn min_height(&self) -> Option<f32> {
        self.min_height
    }

    #[must_use]
    pub const fn is_keep_together(&self) -> bool {
        self.keep_together
    }

    /// Whether the cell has no visible content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(Block::is_empty)
    }

    /// Fit the content into a cell box of `width` x `height` (inside the
    /// borders). Heights and positions include the padding.
    #[must_use]
    pub fn fit(&self, width: f32, height: f32, measurer: &dyn TextMeasurer) -> ContentFit {
        let p = &self.padding;
        let vertical = p.top + p.bottom;
        if self.is_empty() {
            return ContentFit::Full {
                height: vertical,
                placed: Vec::new(),
            };
        }
        let inner_height = height - vertical;
        if inner_height < -EPSILON {
            return ContentFit::Nothing;
        }
        let inner_width = (width - p.left - p.right).max(0.0);
        fit_blocks(&self.content, inner_width, inner_height, measurer).offset(
            p.left,
            p.top,
            vertical,
        )
    }

    /// Natural height at `width`, ignoring the minimum height.
    #[must_use]
    pub fn natural_height(&self, width: f32, measurer: &dyn TextMeasurer) -> f32 {
        self.fit(width, f32::INFINITY, measurer).height()
    }

    /// Width requirements including horizontal padding.
    #[must_use]
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> Measurement {
        measure_blocks(&self.content, measurer).add(self.padding.left + self.padding.right)
    }

    /// The same cell (spans, borders, style) holding `content` instead.
    #[must_use]
    pub fn with_content(&self, content: Vec<Block>) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    pub(crate) fn set_rowspan(&mut self, rowspan: usize) {
        self.rowspan = rowspan.max(1);
    }

    pub(crate) fn set_min_height(&mut self, min_height: Option<f32>) {
        self.min_height = min_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Paragraph;
    use crate::text::MonospaceMeasurer;

    #[test]
    fn test_spans_clamped() {
        let cell = Cell::new(0, 0);
        assert_eq!(cell.rowspan(), 1);
        assert_eq!(cell.colspan(), 1);
    }

    #[test]
    fn test_border_builders() {
        let cell = Cell::default()
            .border(Border::solid(1.0))
            .border_edge(Edge::Top, Border::None)
            .border_sides(Sides::VERTICAL, Border::dotted(2.0));
        assert_eq!(cell.border_override(Edge::Top), Some(Border::None));
        assert_eq!(cell.border_override(Edge::Bottom), Some(Border::solid(1.0)));
        assert_eq!(cell.border_override(Edge::Left), Some(Border::dotted(2.0)));
        assert_eq!(Cell::default().border_override(Edge::Left), None);
    }

    #[test]
    fn test_fit_includes_padding() {
        let m = MonospaceMeasurer::new();
        let cell = Cell::default()
            .padding(3.0)
            .add(Paragraph::new("abc").size(10.0));
        let fit = cell.fit(100.0, 100.0, &m);
        assert!(fit.is_full());
        assert!((fit.height() - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_cell_fits_with_padding_only() {
        let m = MonospaceMeasurer::new();
        let fit = Cell::default().fit(50.0, 0.0, &m);
        assert!((fit.height() - 2.0 * DEFAULT_PADDING).abs() < 1e-4);
    }

    #[test]
    fn test_fit_nothing_when_padding_exceeds_height() {
        let m = MonospaceMeasurer::new();
        let cell = Cell::text("hello").padding(10.0);
        assert!(matches!(cell.fit(100.0, 5.0, &m), ContentFit::Nothing));
    }

    #[test]
    fn test_measure_adds_padding() {
        let m = MonospaceMeasurer::new();
        let cell = Cell::default()
            .padding(5.0)
            .add(Paragraph::new("abcd").size(10.0));
        let measured = cell.measure(&m);
        assert!((measured.minimum - 34.0).abs() < 1e-4);
    }
}
