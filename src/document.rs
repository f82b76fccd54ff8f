//! Page loop: stacks top-level blocks onto pages.
//!
//! ```
//! use pagegrid::prelude::*;
//!
//! let mut table = Table::new(UnitValue::percent_array(2));
//! for i in 0..40 {
//!     table.add_cell(Cell::text(&format!("row {i}"))).unwrap();
//!     table.add_cell(Cell::text("value")).unwrap();
//! }
//! let mut document = Document::builder().page_size(PageSize::A7).build();
//! document.add(table);
//!
//! let pages = document.layout().unwrap();
//! assert!(pages.len() > 1);
//!
//! let mut list = DisplayList::new();
//! document.render(&pages, &mut list);
//! assert_eq!(list.page_count(), pages.len());
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::border::Edges;
use crate::content::{Block, ContentFit, PlacedBlock};
use crate::error::{ForcedPlacement, LayoutError, LayoutWarning};
use crate::geometry::{EPSILON, PageSize, Rect};
use crate::layout::{LayoutArea, LayoutStatus, TableFragment};
use crate::paint::{Painter, paint_block};
use crate::text::{MonospaceMeasurer, TextMeasurer};

/// Default page margin on every side, in points.
pub const DEFAULT_MARGIN: f32 = 36.0;

/// Upper bound on pages produced by one [`Document::layout`] call.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Document configuration, created by [`Document::builder`].
pub struct DocumentOptions {
    page_size: PageSize,
    margins: Edges<f32>,
    measurer: Box<dyn TextMeasurer + Send + Sync>,
    max_pages: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margins: Edges::all(DEFAULT_MARGIN),
            measurer: Box::new(MonospaceMeasurer::new()),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl fmt::Debug for DocumentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentOptions")
            .field("page_size", &self.page_size)
            .field("margins", &self.margins)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

impl DocumentOptions {
    #[must_use]
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Same margin on every side.
    #[must_use]
    pub fn margin(mut self, margin: f32) -> Self {
        self.margins = Edges::all(margin.max(0.0));
        self
    }

    #[must_use]
    pub fn margins(mut self, margins: Edges<f32>) -> Self {
        self.margins = margins;
        self
    }

    /// Font metrics used for line breaking and encoding checks.
    #[must_use]
    pub fn measurer(mut self, measurer: impl TextMeasurer + Send + Sync + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    #[must_use]
    pub fn build(self) -> Document {
        Document {
            options: self,
            blocks: Vec::new(),
        }
    }
}

/// One laid-out page.
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub size: PageSize,
    /// The page minus its margins.
    pub content: Rect,
    /// Placed content in page coordinates.
    pub blocks: Vec<PlacedBlock>,
    pub warnings: Vec<LayoutWarning>,
    used: f32,
}

impl Page {
    fn new(index: usize, size: PageSize, content: Rect) -> Self {
        Self {
            index,
            size,
            content,
            blocks: Vec::new(),
            warnings: Vec::new(),
            used: 0.0,
        }
    }

    /// Table fragments placed directly on the page.
    pub fn fragments(&self) -> impl Iterator<Item = &TableFragment> + '_ {
        self.blocks.iter().filter_map(|b| match b {
            PlacedBlock::Table(fragment) => Some(fragment),
            _ => None,
        })
    }

    /// Height taken from the top of the content area.
    #[must_use]
    pub const fn used_height(&self) -> f32 {
        self.used
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn remaining(&self) -> Rect {
        self.content.below(self.used)
    }
}

enum Placement {
    Placed {
        blocks: Vec<PlacedBlock>,
        height: f32,
        residue: Vec<Block>,
        warnings: Vec<LayoutWarning>,
    },
    Nothing,
}

/// A sequence of top-level blocks flowed onto pages.
#[derive(Debug, Default)]
pub struct Document {
    options: DocumentOptions,
    blocks: Vec<Block>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> DocumentOptions {
        DocumentOptions::default()
    }

    #[must_use]
    pub const fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Append a top-level block.
    pub fn add(&mut self, block: impl Into<Block>) -> &mut Self {
        self.blocks.push(block.into());
        self
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Flow every block onto pages.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::PageLimitExceeded`] when more than
    /// `max_pages` pages would be needed.
    pub fn layout(&self) -> Result<Vec<Page>, LayoutError> {
        let size = self.options.page_size;
        let m = &self.options.margins;
        let content = Rect::from_size(size.0).inset(m.top, m.right, m.bottom, m.left);

        let mut pages = vec![Page::new(0, size, content)];
        let mut queue: VecDeque<Block> = self.blocks.iter().cloned().collect();
        while let Some(block) = queue.pop_front() {
            let page = pages.last_mut().ok_or(LayoutError::PageLimitExceeded {
                limit: self.options.max_pages,
            })?;
            let fresh = page.is_empty();
            let area = LayoutArea::new(page.remaining()).fresh(fresh);

            match self.place(&block, &area) {
                Placement::Placed {
                    blocks,
                    height,
                    residue,
                    warnings,
                } => {
                    page.blocks.extend(blocks);
                    page.warnings.extend(warnings);
                    page.used += height;
                    if !residue.is_empty() {
                        for rest in residue.into_iter().rev() {
                            queue.push_front(rest);
                        }
                        self.new_page(&mut pages, content)?;
                    }
                }
                Placement::Nothing if fresh => {
                    let (blocks, warnings, height) = self.force(&block, &area);
                    page.warnings.extend(warnings);
                    page.blocks.extend(blocks);
                    page.used += height;
                }
                // The retry lays the block out again and reports anew.
                Placement::Nothing => {
                    queue.push_front(block);
                    self.new_page(&mut pages, content)?;
                }
            }
        }

        log::info!("document laid out on {} page(s)", pages.len());
        Ok(pages)
    }

    /// Paint `pages` in order, one `begin_page` each.
    pub fn render(&self, pages: &[Page], painter: &mut impl Painter) {
        let measurer = self.options.measurer.as_ref();
        for page in pages {
            painter.begin_page(page.index, page.size);
            for block in &page.blocks {
                paint_block(block, painter, measurer);
            }
        }
    }

    fn new_page(&self, pages: &mut Vec<Page>, content: Rect) -> Result<(), LayoutError> {
        let limit = self.options.max_pages;
        if pages.len() >= limit {
            log::warn!("page limit of {limit} reached");
            return Err(LayoutError::PageLimitExceeded { limit });
        }
        log::debug!("starting page {}", pages.len());
        pages.push(Page::new(pages.len(), self.options.page_size, content));
        Ok(())
    }

    fn place(&self, block: &Block, area: &LayoutArea) -> Placement {
        let measurer = self.options.measurer.as_ref();
        let bounds = area.bounds;
        if let Block::Table(table) = block {
            let result = table.layout(area, measurer);
            return match (result.status, result.fragment) {
                (LayoutStatus::Nothing, _) | (_, None) => Placement::Nothing,
                (_, Some(fragment)) => Placement::Placed {
                    height: fragment.bounds.height,
                    blocks: vec![PlacedBlock::Table(fragment)],
                    residue: result.continuation.map(Block::from).into_iter().collect(),
                    warnings: result.warnings,
                },
            };
        }

        let shift = |placed: Vec<PlacedBlock>| -> Vec<PlacedBlock> {
            placed
                .into_iter()
                .map(|b| b.translate(bounds.x, bounds.y))
                .collect()
        };
        match block.fit(bounds.width, bounds.height, measurer) {
            ContentFit::Full { height, placed } => Placement::Placed {
                warnings: carried_warnings(&placed),
                blocks: shift(placed),
                height,
                residue: Vec::new(),
            },
            ContentFit::Partial {
                height,
                placed,
                residue,
            } => Placement::Placed {
                warnings: carried_warnings(&placed),
                blocks: shift(placed),
                height,
                residue,
            },
            ContentFit::Nothing => Placement::Nothing,
        }
    }

    /// Place a block that does not fit even an empty page, at its natural
    /// height.
    fn force(
        &self,
        block: &Block,
        area: &LayoutArea,
    ) -> (Vec<PlacedBlock>, Vec<LayoutWarning>, f32) {
        let bounds = area.bounds;
        let fit = block.fit(bounds.width, f32::INFINITY, self.options.measurer.as_ref());
        let height = fit.height();
        let warning = ForcedPlacement {
            row: 0,
            required: height,
            available: bounds.height,
        };
        log::warn!("{warning}");
        let placed = match fit {
            ContentFit::Full { placed, .. } | ContentFit::Partial { placed, .. } => placed,
            ContentFit::Nothing => Vec::new(),
        };
        let mut warnings = carried_warnings(&placed);
        warnings.push(warning.into());
        let placed = placed
            .into_iter()
            .map(|b| b.translate(bounds.x, bounds.y))
            .collect();
        (placed, warnings, height.max(EPSILON))
    }
}

/// Warnings carried by placed tables, in placement order.
fn carried_warnings(placed: &[PlacedBlock]) -> Vec<LayoutWarning> {
    placed
        .iter()
        .flat_map(PlacedBlock::warnings)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::content::Paragraph;
    use crate::paint::DisplayList;
    use crate::table::Table;
    use crate::unit::UnitValue;

    fn small_page() -> DocumentOptions {
        Document::builder().page_size(PageSize::new(200.0, 140.0)).margin(20.0)
    }

    #[test]
    fn test_defaults() {
        let document = Document::new();
        assert_eq!(document.options().page_size, PageSize::A4);
        assert_eq!(document.options().max_pages, DEFAULT_MAX_PAGES);
        assert!(document.layout().unwrap().len() == 1);
    }

    #[test]
    fn test_blocks_stack_on_one_page() {
        let mut document = small_page().build();
        document.add(Block::fixed(30.0, "a")).add(Block::fixed(40.0, "b"));
        let pages = document.layout().unwrap();
        assert_eq!(pages.len(), 1);
        assert!((pages[0].used_height() - 70.0).abs() < 1e-3);
        let PlacedBlock::Fixed { bounds, .. } = &pages[0].blocks[1] else {
            panic!("expected a fixed block");
        };
        assert!((bounds.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_fixed_block_moves_to_next_page() {
        let mut document = small_page().build();
        document.add(Block::fixed(60.0, "a")).add(Block::fixed(60.0, "b"));
        let pages = document.layout().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].blocks.len(), 1);
    }

    #[test]
    fn test_oversized_fixed_block_is_forced() {
        let mut document = small_page().build();
        document.add(Block::fixed(500.0, "poster"));
        let pages = document.layout().unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].warnings.iter().any(LayoutWarning::is_forced_placement));
    }

    #[test]
    fn test_paragraph_continues_on_next_page() {
        let mut document = small_page().build();
        let text = (0..30).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        document.add(Paragraph::new(text).size(10.0));
        let pages = document.layout().unwrap();
        assert!(pages.len() > 1);
    }

    #[test]
    fn test_page_limit() {
        let mut document = small_page().max_pages(2).build();
        let mut table = Table::with_column_count(1);
        for _ in 0..20 {
            table.add_cell(Cell::default().height(40.0)).unwrap();
        }
        document.add(table);
        assert_eq!(
            document.layout().unwrap_err(),
            LayoutError::PageLimitExceeded { limit: 2 }
        );
    }

    #[test]
    fn test_deferred_table_reports_width_warning_once() {
        let mut document = small_page().build();
        let mut table = Table::new(UnitValue::point_array(&[50.0, 50.0]))
            .width(UnitValue::points(150.0))
            .keep_together(true);
        for _ in 0..4 {
            table.add_cell(Cell::default().height(20.0)).unwrap();
        }
        document.add(Block::fixed(80.0, "intro")).add(table);
        let pages = document.layout().unwrap();
        assert_eq!(pages.len(), 2);

        let reported: Vec<usize> = pages
            .iter()
            .flat_map(|p| p.warnings.iter().map(move |w| (p.index, w)))
            .filter(|(_, w)| w.is_invalid_width_spec())
            .map(|(index, _)| index)
            .collect();
        assert_eq!(reported, vec![1]);
    }

    #[test]
    fn test_render_begins_each_page() {
        let mut document = small_page().build();
        document.add(Block::fixed(60.0, "a")).add(Block::fixed(60.0, "b"));
        let pages = document.layout().unwrap();
        let mut list = DisplayList::new();
        document.render(&pages, &mut list);
        assert_eq!(list.page_count(), 2);
        assert_eq!(list.len(), 4);
    }
}
