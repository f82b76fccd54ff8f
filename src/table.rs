//! Table model and configuration.
//!
//! A [`Table`] owns a fixed list of column specifications, a body
//! [`Grid`], optional header and footer [`RowGroup`]s and the border
//! defaults of every scope. Layout never mutates a table: rows that do not
//! fit are handed back as a fresh continuation table.
//!
//! ```
//! use pagegrid::prelude::*;
//!
//! let mut table = Table::new(UnitValue::percent_array(2))
//!     .border(Border::solid(2.0))
//!     .skip_first_header(true);
//! table.add_header_cell(Cell::text("Name")).unwrap();
//! table.add_header_cell(Cell::text("Value")).unwrap();
//! table.add_cell(Cell::text("width")).unwrap();
//! table.add_cell(Cell::text("100%")).unwrap();
//! assert_eq!(table.body().rows(), 1);
//! ```

use crate::border::{Border, Edge, Edges};
use crate::cell::Cell;
use crate::collapse::BorderStyles;
use crate::color::Color;
use crate::error::GridConflict;
use crate::grid::{CellHandle, Grid};
use crate::layout::{ColumnGeometry, LayoutArea, LayoutResult, layout_table};
use crate::measure::Measurement;
use crate::text::TextMeasurer;
use crate::unit::UnitValue;

/// Border width of the default cell border.
pub const DEFAULT_CELL_BORDER_WIDTH: f32 = 0.5;

/// How column widths are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Column specifications are authoritative.
    #[default]
    Fixed,
    /// Columns are sized by their content.
    Auto,
}

/// Which part of a table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Header,
    Body,
    Footer,
}

/// Header or footer rows, repeated on every page fragment.
#[derive(Debug, Clone)]
pub struct RowGroup {
    grid: Grid,
    frame: Edges<Option<Border>>,
    cell_border: Option<Border>,
}

impl RowGroup {
    fn new(columns: usize) -> Self {
        Self {
            grid: Grid::new(columns),
            frame: Edges::default(),
            cell_border: None,
        }
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Border around the group as a whole.
    #[must_use]
    pub const fn frame(&self) -> &Edges<Option<Border>> {
        &self.frame
    }

    /// Default border of the group's cells.
    #[must_use]
    pub const fn cell_border(&self) -> Option<Border> {
        self.cell_border
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }
}

/// A table with a fixed column count.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<UnitValue>,
    width: Option<UnitValue>,
    mode: LayoutMode,
    body: Grid,
    header: Option<RowGroup>,
    footer: Option<RowGroup>,
    frame: Edges<Option<Border>>,
    cell_border: Option<Border>,
    background: Option<Color>,
    skip_first_header: bool,
    skip_last_footer: bool,
    keep_together: bool,
    geometry: Option<ColumnGeometry>,
}

impl Table {
    /// Create a table with the given column specifications.
    #[must_use]
    pub fn new(columns: Vec<UnitValue>) -> Self {
        let count = columns.len();
        Self {
            columns,
            width: None,
            mode: LayoutMode::Fixed,
            body: Grid::new(count),
            header: None,
            footer: None,
            frame: Edges::default(),
            cell_border: Some(Border::solid(DEFAULT_CELL_BORDER_WIDTH)),
            background: None,
            skip_first_header: false,
            skip_last_footer: false,
            keep_together: false,
            geometry: None,
        }
    }

    /// `n` equal percentage columns.
    #[must_use]
    pub fn with_column_count(n: usize) -> Self {
        Self::new(UnitValue::percent_array(n))
    }

    /// Declared table width. Without one the table fills the available
    /// width, or hugs its columns when they are all absolute.
    #[must_use]
    pub fn width(mut self, width: UnitValue) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn layout_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    /// Omit the header on the first page fragment.
    #[must_use]
    pub fn skip_first_header(mut self, skip: bool) -> Self {
        self.skip_first_header = skip;
        self
    }

    /// Omit the footer on the last page fragment.
    #[must_use]
    pub fn skip_last_footer(mut self, skip: bool) -> Self {
        self.skip_last_footer = skip;
        self
    }

    /// Move the whole table to the next page rather than split it.
    #[must_use]
    pub fn keep_together(mut self, keep: bool) -> Self {
        self.keep_together = keep;
        self
    }

    /// Table frame on all four sides.
    #[must_use]
    pub fn border(mut self, border: Border) -> Self {
        self.frame = Edges::all(Some(border));
        self
    }

    #[must_use]
    pub fn border_edge(mut self, edge: Edge, border: Border) -> Self {
        self.frame.set(edge, Some(border));
        self
    }

    /// Default border for cell edges nothing else specifies.
    /// `None` leaves such edges without a contribution.
    #[must_use]
    pub fn cell_border(mut self, border: Option<Border>) -> Self {
        self.cell_border = border;
        self
    }

    #[must_use]
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Frame around the header rows.
    #[must_use]
    pub fn header_border(mut self, border: Border) -> Self {
        self.header_mut().frame = Edges::all(Some(border));
        self
    }

    /// Frame around the footer rows.
    #[must_use]
    pub fn footer_border(mut self, border: Border) -> Self {
        self.footer_mut().frame = Edges::all(Some(border));
        self
    }

    #[must_use]
    pub fn header_cell_border(mut self, border: Option<Border>) -> Self {
        self.header_mut().cell_border = border;
        self
    }

    #[must_use]
    pub fn footer_cell_border(mut self, border: Option<Border>) -> Self {
        self.footer_mut().cell_border = border;
        self
    }

    /// Append a body cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridConflict`] when the cell spans more columns than the
    /// table has.
    pub fn add_cell(&mut self, cell: Cell) -> Result<CellHandle, GridConflict> {
        self.body.add_cell(cell)
    }

    /// Place a body cell at an explicit grid position.
    ///
    /// # Errors
    ///
    /// Returns [`GridConflict`] when the cell is out of bounds or overlaps
    /// another cell.
    pub fn add_cell_at(
        &mut self,
        row: usize,
        col: usize,
        cell: Cell,
    ) -> Result<CellHandle, GridConflict> {
        self.body.add_cell_at(row, col, cell)
    }

    /// Append a header cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridConflict`] when the cell spans more columns than the
    /// table has.
    pub fn add_header_cell(&mut self, cell: Cell) -> Result<CellHandle, GridConflict> {
        self.header_mut().grid.add_cell(cell)
    }

    /// Append a footer cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridConflict`] when the cell spans more columns than the
    /// table has.
    pub fn add_footer_cell(&mut self, cell: Cell) -> Result<CellHandle, GridConflict> {
        self.footer_mut().grid.add_cell(cell)
    }

    /// Finish the current body row.
    pub fn start_new_row(&mut self) {
        self.body.start_new_row();
    }

    /// Uniform border for the cells of body row `row`.
    pub fn set_row_border(&mut self, row: usize, border: Border) {
        self.body.set_row_border(row, Some(border));
    }

    fn header_mut(&mut self) -> &mut RowGroup {
        let columns = self.columns.len();
        self.header.get_or_insert_with(|| RowGroup::new(columns))
    }

    fn footer_mut(&mut self) -> &mut RowGroup {
        let columns = self.columns.len();
        self.footer.get_or_insert_with(|| RowGroup::new(columns))
    }

    #[must_use]
    pub fn columns(&self) -> &[UnitValue] {
        &self.columns
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub const fn declared_width(&self) -> Option<UnitValue> {
        self.width
    }

    #[must_use]
    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    #[must_use]
    pub const fn body(&self) -> &Grid {
        &self.body
    }

    /// Header rows, if any header cell was added.
    #[must_use]
    pub fn header(&self) -> Option<&RowGroup> {
        self.header.as_ref().filter(|g| g.rows() > 0)
    }

    /// Footer rows, if any footer cell was added.
    #[must_use]
    pub fn footer(&self) -> Option<&RowGroup> {
        self.footer.as_ref().filter(|g| g.rows() > 0)
    }

    #[must_use]
    pub const fn frame(&self) -> &Edges<Option<Border>> {
        &self.frame
    }

    #[must_use]
    pub const fn default_cell_border(&self) -> Option<Border> {
        self.cell_border
    }

    #[must_use]
    pub const fn background_color(&self) -> Option<Color> {
        self.background
    }

    #[must_use]
    pub const fn skips_first_header(&self) -> bool {
        self.skip_first_header
    }

    #[must_use]
    pub const fn skips_last_footer(&self) -> bool {
        self.skip_last_footer
    }

    #[must_use]
    pub const fn is_keep_together(&self) -> bool {
        self.keep_together
    }

    /// Whether this table holds the rows left over from a previous page.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.geometry.is_some()
    }

    pub(crate) const fn geometry(&self) -> Option<&ColumnGeometry> {
        self.geometry.as_ref()
    }

    /// Border defaults of every scope, for the resolver.
    #[must_use]
    pub fn border_styles(&self) -> BorderStyles {
        let group = |g: &Option<RowGroup>| {
            g.as_ref()
                .map(|g| (g.frame, g.cell_border))
                .unwrap_or_default()
        };
        let (header_frame, header_cell) = group(&self.header);
        let (footer_frame, footer_cell) = group(&self.footer);
        BorderStyles {
            table_frame: self.frame,
            table_cell: self.cell_border,
            header_frame,
            header_cell,
            footer_frame,
            footer_cell,
        }
    }

    /// Lay out into `area`.
    ///
    /// Returns the placed fragment and, when not everything fit, a
    /// continuation table to lay out on the next page.
    #[must_use]
    pub fn layout(&self, area: &LayoutArea, measurer: &dyn TextMeasurer) -> LayoutResult {
        layout_table(self, area, measurer)
    }

    /// Width requirements, summed over columns.
    #[must_use]
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> Measurement {
        self.column_measurements(measurer)
            .into_iter()
            .zip(&self.columns)
            .map(|(m, spec)| match spec {
                UnitValue::Point(w) => Measurement::exact(*w),
                UnitValue::Percent(_) => m,
            })
            .sum()
    }

    /// Per-column measurement of the single-column cells of every group.
    pub(crate) fn column_measurements(&self, measurer: &dyn TextMeasurer) -> Vec<Measurement> {
        let mut result = vec![Measurement::zero(); self.columns.len()];
        let grids = [
            self.header.as_ref().map(RowGroup::grid),
            Some(&self.body),
            self.footer.as_ref().map(RowGroup::grid),
        ];
        for grid in grids.into_iter().flatten() {
            for handle in grid.handles() {
                let cell = grid.cell(handle);
                let (_, col) = grid.origin(handle);
                if cell.colspan() == 1 {
                    result[col] = result[col].union(&cell.measure(measurer));
                }
            }
        }
        result
    }

    /// A table with the same configuration holding `body` instead,
    /// laid out with the frozen column `geometry`.
    pub(crate) fn continuation(&self, body: Grid, geometry: ColumnGeometry) -> Self {
        Self {
            columns: self.columns.clone(),
            width: self.width,
            mode: self.mode,
            body,
            header: self.header.clone(),
            footer: self.footer.clone(),
            frame: self.frame,
            cell_border: self.cell_border,
            background: self.background,
            skip_first_header: self.skip_first_header,
            skip_last_footer: self.skip_last_footer,
            keep_together: self.keep_together,
            geometry: Some(geometry),
        }
    }
}
