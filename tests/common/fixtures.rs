//! Table and document builders shared by the integration tests.

#![allow(dead_code)]

use pagegrid::prelude::*;

/// A document whose content area is exactly `width` x `height`.
pub fn bare_page(width: f32, height: f32) -> DocumentOptions {
    Document::builder()
        .page_size(PageSize::new(width, height))
        .margin(0.0)
}

/// A one-column table without borders whose body rows have fixed heights.
pub fn fixed_rows(heights: &[f32]) -> Table {
    let mut table = Table::with_column_count(1).cell_border(None);
    for &h in heights {
        table.add_cell(Cell::default().height(h)).unwrap();
    }
    table
}

/// A one-column borderless table of unsplittable rows.
pub fn rigid_rows(heights: &[f32]) -> Table {
    let mut table = Table::with_column_count(1).cell_border(None);
    for (i, &h) in heights.iter().enumerate() {
        table
            .add_cell(
                Cell::default()
                    .padding(0.0)
                    .add(Block::fixed(h, format!("row {i}"))),
            )
            .unwrap();
    }
    table
}

/// Header and footer of 30pt around five 40pt body rows, no borders.
pub fn repeating_table(skip_first_header: bool, skip_last_footer: bool) -> Table {
    let mut table = Table::with_column_count(1)
        .cell_border(None)
        .skip_first_header(skip_first_header)
        .skip_last_footer(skip_last_footer);
    table
        .add_header_cell(Cell::default().padding(0.0).height(30.0))
        .unwrap();
    table
        .add_footer_cell(Cell::default().padding(0.0).height(30.0))
        .unwrap();
    for _ in 0..5 {
        table
            .add_cell(Cell::default().padding(0.0).height(40.0))
            .unwrap();
    }
    table
}

/// Every table fragment of every page, in page order.
pub fn fragments(pages: &[Page]) -> Vec<&TableFragment> {
    pages.iter().flat_map(Page::fragments).collect()
}

/// Lay `table` out into a non-fresh area of `width` x `height`.
pub fn layout_in(table: &Table, width: f32, height: f32) -> LayoutResult {
    table.layout(
        &LayoutArea::new(Rect::new(0.0, 0.0, width, height)),
        &MonospaceMeasurer::new(),
    )
}
