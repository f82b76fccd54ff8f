//! Table layout engine.
//!
//! [`Table::layout`] places as many body rows as fit into a [`LayoutArea`],
//! repeating header and footer rows, and hands back the rest as a
//! continuation table for the next page.
//!
//! Body rows are processed in span groups, the smallest row ranges no row
//! span crosses. Each group goes through [`RowState`]s:
//!
//! ```text
//! Pending -> Measuring -> Placed
//!                      -> SplitPending (top part placed, rest continues)
//!                      -> Deferred     (whole group continues)
//! ```
//!
//! A single-row group may split inside its cells. A multi-row group only
//! splits at a row boundary, and only when none of its cells is
//! keep-together; otherwise it moves to the next page as one unit.
//!
//! Vertically, horizontal grid lines take their full width between rows,
//! so a fragment is as tall as its line widths plus its row heights.
//! Horizontally, vertical lines are centred on column boundaries and the
//! grid is inset by half the widest frame segment on each side.

use std::ops::Range;
use std::rc::Rc;

use crate::border::Border;
use crate::cell::Cell;
use crate::collapse::{BorderMap, BorderStyles, Section};
use crate::color::Color;
use crate::content::{Block, ContentFit, PlacedBlock};
use crate::error::{ForcedPlacement, IncompleteRow, LayoutWarning};
use crate::geometry::{EPSILON, Rect, fits_within};
use crate::grid::Grid;
use crate::table::{GroupKind, LayoutMode, RowGroup, Table};
use crate::text::TextMeasurer;
use crate::unit;

/// Where a table may be placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutArea {
    pub bounds: Rect,
    /// Nothing else occupies the page yet. Only a fresh area forces
    /// content that does not fit.
    pub fresh: bool,
}

impl LayoutArea {
    #[must_use]
    pub const fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            fresh: false,
        }
    }

    #[must_use]
    pub const fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }
}

/// Outcome tag of a layout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStatus {
    /// Every row was placed.
    Full,
    /// Some rows were placed; the rest is in the continuation.
    Partial,
    /// Nothing was placed.
    Nothing,
}

/// Processing state of a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Pending,
    Measuring,
    Placed,
    SplitPending,
    Deferred,
}

/// A recorded [`RowState`] change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowTransition {
    /// Body row index within the laid-out table.
    pub row: usize,
    pub from: RowState,
    pub to: RowState,
}

/// Resolved column widths and frame insets, kept by continuation tables
/// so every fragment of a table has the same columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGeometry {
    pub widths: Vec<f32>,
    pub left_inset: f32,
    pub right_inset: f32,
}

impl ColumnGeometry {
    /// Column boundary offsets from the table's left edge.
    #[must_use]
    pub fn boundaries(&self) -> Vec<f32> {
        let mut x = self.left_inset;
        let mut result = Vec::with_capacity(self.widths.len() + 1);
        result.push(x);
        for w in &self.widths {
            x += w;
            result.push(x);
        }
        result
    }

    /// Full table width, insets included.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.left_inset + self.widths.iter().sum::<f32>() + self.right_inset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A resolved border segment and the rectangle it paints.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderSegment {
    pub bounds: Rect,
    pub border: Border,
    pub orientation: Orientation,
}

/// A row of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub group: GroupKind,
    /// Body row index within the laid-out table.
    pub source: Option<usize>,
    pub bounds: Rect,
}

/// A cell of a fragment. `bounds` is the box inside the borders.
#[derive(Debug, Clone)]
pub struct PlacedCell {
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
    pub bounds: Rect,
    pub background: Option<Color>,
    pub content: Vec<PlacedBlock>,
}

/// The part of a table placed in one area.
#[derive(Debug, Clone)]
pub struct TableFragment {
    pub bounds: Rect,
    pub background: Option<Color>,
    pub rows: Vec<PlacedRow>,
    pub cells: Vec<PlacedCell>,
    pub segments: Vec<BorderSegment>,
    pub transitions: Vec<RowTransition>,
    /// Conditions raised while laying this fragment out, including those
    /// of tables nested in its cells.
    pub warnings: Vec<LayoutWarning>,
}

impl TableFragment {
    /// Move the whole fragment by `(dx, dy)`.
    #[must_use]
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            bounds: self.bounds.translate(dx, dy),
            background: self.background,
            rows: self
                .rows
                .into_iter()
                .map(|r| PlacedRow {
                    bounds: r.bounds.translate(dx, dy),
                    ..r
                })
                .collect(),
            cells: self
                .cells
                .into_iter()
                .map(|c| PlacedCell {
                    bounds: c.bounds.translate(dx, dy),
                    content: c.content.into_iter().map(|b| b.translate(dx, dy)).collect(),
                    ..c
                })
                .collect(),
            segments: self
                .segments
                .into_iter()
                .map(|s| BorderSegment {
                    bounds: s.bounds.translate(dx, dy),
                    ..s
                })
                .collect(),
            transitions: self.transitions,
            warnings: self.warnings,
        }
    }

    /// Warnings of the tables nested in this fragment's cells.
    pub fn nested_warnings(&self) -> impl Iterator<Item = &LayoutWarning> + '_ {
        self.cells
            .iter()
            .flat_map(|c| &c.content)
            .flat_map(PlacedBlock::warnings)
    }

    /// Number of rows from `group`.
    #[must_use]
    pub fn rows_in(&self, group: GroupKind) -> usize {
        self.rows.iter().filter(|r| r.group == group).count()
    }

    #[must_use]
    pub fn header_rows(&self) -> usize {
        self.rows_in(GroupKind::Header)
    }

    #[must_use]
    pub fn body_rows(&self) -> usize {
        self.rows_in(GroupKind::Body)
    }

    #[must_use]
    pub fn footer_rows(&self) -> usize {
        self.rows_in(GroupKind::Footer)
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.bounds.height
    }
}

/// Result of [`Table::layout`].
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub status: LayoutStatus,
    pub fragment: Option<TableFragment>,
    /// Rows left for the next area, as an independent table.
    pub continuation: Option<Table>,
    pub warnings: Vec<LayoutWarning>,
}

impl LayoutResult {
    fn nothing(warnings: Vec<LayoutWarning>) -> Self {
        Self {
            status: LayoutStatus::Nothing,
            fragment: None,
            continuation: None,
            warnings,
        }
    }

    /// Occupied bounds; empty when nothing was placed.
    #[must_use]
    pub fn occupied(&self) -> Rect {
        self.fragment.as_ref().map(|f| f.bounds).unwrap_or_default()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.status == LayoutStatus::Full
    }
}

/// Content fitted ahead of placement, for cells cut by a page break.
#[derive(Debug, Clone)]
struct Prefit {
    height: f32,
    placed: Vec<PlacedBlock>,
}

impl Prefit {
    const fn empty() -> Self {
        Self {
            height: 0.0,
            placed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct CellSpec {
    col: usize,
    rowspan: usize,
    colspan: usize,
    cell: Rc<Cell>,
    prefit: Option<Rc<Prefit>>,
}

#[derive(Debug, Clone)]
struct RowSpec {
    group: GroupKind,
    border: Option<Border>,
    source: Option<usize>,
    cells: Vec<CellSpec>,
}

fn rows_from_grid(grid: &Grid, group: GroupKind) -> Vec<RowSpec> {
    let rows = grid.rows();
    (0..rows)
        .map(|r| RowSpec {
            group,
            border: grid.row_border(r),
            source: (group == GroupKind::Body).then_some(r),
            cells: grid
                .cells_in_row(r)
                .into_iter()
                .map(|h| {
                    let cell = grid.cell(h);
                    CellSpec {
                        col: grid.origin(h).1,
                        rowspan: cell.rowspan().min(rows - r),
                        colspan: cell.colspan(),
                        cell: Rc::new(cell.clone()),
                        prefit: None,
                    }
                })
                .collect(),
        })
        .collect()
}

fn grid_from_rows(columns: usize, rows: &[RowSpec]) -> Grid {
    let mut grid = Grid::new(columns);
    grid.ensure_rows(rows.len());
    for (r, row) in rows.iter().enumerate() {
        if row.border.is_some() {
            grid.set_row_border(r, row.border);
        }
        for spec in &row.cells {
            let mut cell = (*spec.cell).clone();
            cell.set_rowspan(spec.rowspan);
            grid.place(r, spec.col, cell);
        }
    }
    grid
}

fn section_of(columns: usize, rows: &[RowSpec]) -> Section {
    let mut section = Section::new(columns);
    for (r, row) in rows.iter().enumerate() {
        section.push_row(row.group, row.border);
        for spec in &row.cells {
            section.add_cell(r, spec.col, spec.rowspan, spec.colspan, *spec.cell.borders());
        }
    }
    section
}

/// Split a cell's fit into what is placed now and what continues.
fn split_fit(cell: &Cell, fit: ContentFit) -> (Prefit, Vec<Block>, bool) {
    match fit {
        ContentFit::Full { height, placed } => {
            (Prefit { height, placed }, Vec::new(), !cell.is_empty())
        }
        ContentFit::Partial {
            height,
            placed,
            residue,
        } => (Prefit { height, placed }, residue, true),
        ContentFit::Nothing => (Prefit::empty(), cell.content().to_vec(), false),
    }
}

struct Measured {
    map: BorderMap,
    heights: Vec<f32>,
    total: f32,
}

impl Measured {
    /// Height of rows `rows` and the lines between them.
    fn span_height(&self, rows: Range<usize>) -> f32 {
        let interior: f32 = (rows.start + 1..rows.end)
            .map(|l| self.map.line_width(l))
            .sum();
        self.heights[rows].iter().sum::<f32>() + interior
    }
}

/// State threaded through one layout call.
pub struct LayoutContext<'a> {
    pub area: LayoutArea,
    pub measurer: &'a dyn TextMeasurer,
    pub geometry: ColumnGeometry,
    /// Height left below the rows placed so far.
    pub remaining: f32,
    pub warnings: Vec<LayoutWarning>,
    pub transitions: Vec<RowTransition>,
    styles: BorderStyles,
    columns: usize,
    boundaries: Vec<f32>,
    header: Vec<RowSpec>,
    footer: Vec<RowSpec>,
    states: Vec<RowState>,
}

impl<'a> LayoutContext<'a> {
    fn new(
        area: LayoutArea,
        measurer: &'a dyn TextMeasurer,
        geometry: ColumnGeometry,
        styles: BorderStyles,
        body_rows: usize,
    ) -> Self {
        let boundaries = geometry.boundaries();
        Self {
            area,
            measurer,
            columns: geometry.widths.len(),
            geometry,
            remaining: area.bounds.height,
            warnings: Vec::new(),
            transitions: Vec::new(),
            styles,
            boundaries,
            header: Vec::new(),
            footer: Vec::new(),
            states: vec![RowState::Pending; body_rows],
        }
    }

    /// Whether the active header is shown on this fragment.
    #[must_use]
    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    /// Whether the active footer is shown on this fragment.
    #[must_use]
    pub fn has_footer(&self) -> bool {
        !self.footer.is_empty()
    }

    /// Current state of body row `row`.
    #[must_use]
    pub fn state(&self, row: usize) -> Option<RowState> {
        self.states.get(row).copied()
    }

    fn fits(&self, total: f32) -> bool {
        fits_within(total, self.area.bounds.height)
    }

    fn transition(&mut self, rows: Range<usize>, to: RowState) {
        for row in rows {
            let from = self.states[row];
            if from == to {
                continue;
            }
            log::debug!("row {row}: {from:?} -> {to:?}");
            self.transitions.push(RowTransition { row, from, to });
            self.states[row] = to;
        }
    }

    fn page_rows(&self, body: &[RowSpec]) -> Vec<RowSpec> {
        self.header
            .iter()
            .chain(body)
            .chain(&self.footer)
            .cloned()
            .collect()
    }

    fn cell_width(&self, spec: &CellSpec, row: usize, span: usize, map: &BorderMap) -> f32 {
        let end = (spec.col + spec.colspan).min(self.columns);
        let rows = row..row + span;
        let left = map.vertical_span_width(rows.clone(), spec.col) / 2.0;
        let right = map.vertical_span_width(rows, end) / 2.0;
        (self.boundaries[end] - self.boundaries[spec.col] - left - right).max(0.0)
    }

    fn cell_height(&self, spec: &CellSpec, row: usize, span: usize, map: &BorderMap) -> f32 {
        let content = match &spec.prefit {
            Some(prefit) => prefit.height,
            None => spec
                .cell
                .natural_height(self.cell_width(spec, row, span, map), self.measurer),
        };
        content.max(spec.cell.min_height().unwrap_or(0.0))
    }

    fn measure(&self, rows: &[RowSpec]) -> Measured {
        let map = BorderMap::resolve(&section_of(self.columns, rows), &self.styles);
        let mut measured = Measured {
            heights: vec![0.0; rows.len()],
            total: 0.0,
            map,
        };
        // Single-row cells first, then spanning cells stretch their last row.
        for spanning in [false, true] {
            for (r, row) in rows.iter().enumerate() {
                for spec in &row.cells {
                    let span = spec.rowspan.min(rows.len() - r);
                    if (span > 1) != spanning {
                        continue;
                    }
                    let needed = self.cell_height(spec, r, span, &measured.map);
                    let have = measured.span_height(r..r + span);
                    if needed > have {
                        measured.heights[r + span - 1] += needed - have;
                    }
                }
            }
        }
        measured.total = measured.heights.iter().sum::<f32>()
            + (0..=rows.len())
                .map(|l| measured.map.line_width(l))
                .sum::<f32>();
        measured
    }

    fn split(&self, placed: &[RowSpec], rows: &[RowSpec]) -> Option<(Vec<RowSpec>, Vec<RowSpec>)> {
        if rows.len() == 1 {
            self.split_row(placed, &rows[0])
        } else {
            self.split_span_group(placed, rows)
        }
    }

    /// Split one row inside its cells at the remaining height.
    fn split_row(&self, placed: &[RowSpec], row: &RowSpec) -> Option<(Vec<RowSpec>, Vec<RowSpec>)> {
        let body = [placed, std::slice::from_ref(row)].concat();
        let measured = self.measure(&self.page_rows(&body));
        let index = self.header.len() + placed.len();
        let available = self.area.bounds.height - (measured.total - measured.heights[index]);
        if available <= EPSILON {
            log::debug!("no room left to split row ({available:.2}pt)");
            return None;
        }

        let mut top = RowSpec {
            cells: Vec::with_capacity(row.cells.len()),
            ..row.clone()
        };
        let mut bottom = top.clone();
        let mut placed_any = false;
        let mut stuck = false;
        let mut min_consumed = false;
        for spec in &row.cells {
            let width = self.cell_width(spec, index, 1, &measured.map);
            let fit = spec.cell.fit(width, available, self.measurer);
            stuck |= matches!(fit, ContentFit::Nothing);
            let (prefit, residue, placed_content) = split_fit(&spec.cell, fit);
            placed_any |= placed_content;

            let min = spec.cell.min_height();
            let top_min = min.map(|m| m.min(available));
            let bottom_min = min
                .zip(top_min)
                .map(|(m, t)| m - t)
                .filter(|&rest| rest > EPSILON);
            min_consumed |= top_min.is_some_and(|m| m > EPSILON);

            let mut top_cell = (*spec.cell).clone();
            top_cell.set_min_height(top_min);
            let mut bottom_cell = spec.cell.with_content(residue);
            bottom_cell.set_min_height(bottom_min);
            top.cells.push(CellSpec {
                cell: Rc::new(top_cell),
                prefit: Some(Rc::new(prefit)),
                ..spec.clone()
            });
            bottom.cells.push(CellSpec {
                cell: Rc::new(bottom_cell),
                prefit: None,
                ..spec.clone()
            });
        }
        // Minimum height alone only moves a row forward when no content is
        // blocked from starting.
        if !placed_any && (stuck || !min_consumed) {
            return None;
        }

        let leftover = bottom
            .cells
            .iter()
            .any(|c| !c.cell.is_empty() || c.cell.min_height().is_some());
        log::debug!("split row at {available:.2}pt, leftover: {leftover}");
        Some((vec![top], if leftover { vec![bottom] } else { Vec::new() }))
    }

    /// Split a span group at the lowest row boundary that fits.
    fn split_span_group(
        &self,
        placed: &[RowSpec],
        rows: &[RowSpec],
    ) -> Option<(Vec<RowSpec>, Vec<RowSpec>)> {
        let base = self.header.len() + placed.len();
        for cut in (1..rows.len()).rev() {
            let mut top = rows[..cut].to_vec();
            let mut crossing = Vec::new();
            for (r, row) in top.iter_mut().enumerate() {
                for (i, spec) in row.cells.iter_mut().enumerate() {
                    if r + spec.rowspan > cut {
                        crossing.push((r, i, spec.clone()));
                        let mut clipped = (*spec.cell).clone();
                        clipped.set_min_height(None);
                        spec.rowspan = cut - r;
                        spec.cell = Rc::new(clipped);
                        spec.prefit = Some(Rc::new(Prefit::empty()));
                    }
                }
            }

            let body = [placed, top.as_slice()].concat();
            let measured = self.measure(&self.page_rows(&body));
            if !self.fits(measured.total) {
                continue;
            }
            let slack = (self.area.bounds.height - measured.total).max(0.0);

            let mut continued = Vec::with_capacity(crossing.len());
            for (r, i, original) in crossing {
                let row = base + r;
                let span = cut - r;
                let width = self.cell_width(&top[r].cells[i], row, span, &measured.map);
                let available = measured.span_height(row..row + span) + slack;
                let fit = original.cell.fit(width, available, self.measurer);
                let (prefit, residue, _) = split_fit(&original.cell, fit);
                top[r].cells[i].prefit = Some(Rc::new(prefit));

                let mut rest = original.cell.with_content(residue);
                rest.set_min_height(
                    original
                        .cell
                        .min_height()
                        .map(|m| m - available)
                        .filter(|&m| m > EPSILON),
                );
                continued.push(CellSpec {
                    rowspan: original.rowspan - span,
                    cell: Rc::new(rest),
                    prefit: None,
                    ..original
                });
            }

            let mut bottom = rows[cut..].to_vec();
            bottom[0].cells.extend(continued);
            bottom[0].cells.sort_by_key(|c| c.col);
            log::debug!("split span group of {} rows after row {cut}", rows.len());
            return Some((top, bottom));
        }
        None
    }

    /// Run the row state machine over the body rows.
    fn run(mut self, table: &Table, body: &[RowSpec]) -> LayoutResult {
        let height = self.area.bounds.height;

        if self.has_footer() && table.skips_last_footer() {
            let footer = std::mem::take(&mut self.footer);
            let without = self.measure(&self.page_rows(body));
            if self.fits(without.total) {
                log::debug!("remaining rows fit without the footer; omitting it");
            } else {
                self.footer = footer;
            }
        }

        if table.is_keep_together() && !self.area.fresh {
            let total = self.measure(&self.page_rows(body)).total;
            if !self.fits(total) {
                log::debug!("keep-together table needs {total:.2}pt of {height:.2}pt; deferring");
                return LayoutResult::nothing(self.warnings);
            }
        }

        if body.is_empty() {
            let total = self.measure(&self.page_rows(&[])).total;
            if !self.fits(total) {
                if !self.area.fresh {
                    return LayoutResult::nothing(self.warnings);
                }
                self.force(0, total);
            }
            return self.finish(table, &[], Vec::new());
        }

        let mut placed: Vec<RowSpec> = Vec::new();
        let mut carry: Vec<RowSpec> = Vec::new();
        for group in table.body().span_groups() {
            let rows = &body[group.clone()];
            self.transition(group.clone(), RowState::Measuring);

            let candidate = [placed.as_slice(), rows].concat();
            let measured = self.measure(&self.page_rows(&candidate));
            if self.fits(measured.total) {
                placed.extend_from_slice(rows);
                self.remaining = height - measured.total;
                self.transition(group, RowState::Placed);
                continue;
            }

            let relaxed = self.area.fresh && placed.is_empty();
            let keep = rows
                .iter()
                .flat_map(|r| &r.cells)
                .any(|c| c.cell.is_keep_together());
            if (!keep || relaxed)
                && let Some((top, bottom)) = self.split(&placed, rows)
            {
                self.transition(group.clone(), RowState::SplitPending);
                placed.extend(top);
                carry.extend(bottom);
                carry.extend_from_slice(&body[group.end..]);
                break;
            }

            if relaxed {
                self.force(group.start, measured.total);
                placed.extend_from_slice(rows);
                self.remaining = height - measured.total;
                self.transition(group, RowState::Placed);
                continue;
            }

            self.transition(group.clone(), RowState::Deferred);
            carry.extend_from_slice(&body[group.start..]);
            break;
        }

        if placed.is_empty() {
            log::debug!("no body row fits into {height:.2}pt");
            return LayoutResult::nothing(self.warnings);
        }
        self.finish(table, &placed, carry)
    }

    fn force(&mut self, row: usize, required: f32) {
        let warning = ForcedPlacement {
            row,
            required,
            available: self.area.bounds.height,
        };
        log::warn!("{warning}");
        self.warnings.push(warning.into());
    }

    fn finish(mut self, table: &Table, placed: &[RowSpec], carry: Vec<RowSpec>) -> LayoutResult {
        let mut fragment = self.build_fragment(placed, table.background_color());
        let nested: Vec<LayoutWarning> = fragment.nested_warnings().copied().collect();
        for warning in nested {
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }
        fragment.warnings.clone_from(&self.warnings);
        let status = if carry.is_empty() {
            LayoutStatus::Full
        } else {
            LayoutStatus::Partial
        };
        log::debug!(
            "table fragment {}: {} body rows placed, {} continue",
            fragment.bounds,
            fragment.body_rows(),
            carry.len()
        );
        let continuation = (!carry.is_empty()).then(|| {
            table.continuation(grid_from_rows(self.columns, &carry), self.geometry.clone())
        });
        LayoutResult {
            status,
            fragment: Some(fragment),
            continuation,
            warnings: self.warnings,
        }
    }

    fn build_fragment(&self, placed: &[RowSpec], background: Option<Color>) -> TableFragment {
        let rows = self.page_rows(placed);
        let measured = self.measure(&rows);
        let map = &measured.map;
        let n = rows.len();
        let origin = self.area.bounds.origin();
        let xs: Vec<f32> = self.boundaries.iter().map(|b| origin.x + b).collect();

        let mut line_y = Vec::with_capacity(n + 1);
        let mut row_y = Vec::with_capacity(n);
        let mut y = origin.y;
        for (r, h) in measured.heights.iter().enumerate() {
            line_y.push(y);
            y += map.line_width(r);
            row_y.push(y);
            y += h;
        }
        line_y.push(y);
        y += map.line_width(n);

        let grid_left = xs[0];
        let grid_width = xs[self.columns] - grid_left;
        let placed_rows = rows
            .iter()
            .enumerate()
            .map(|(r, row)| PlacedRow {
                group: row.group,
                source: row.source,
                bounds: Rect::new(grid_left, row_y[r], grid_width, measured.heights[r]),
            })
            .collect();

        let mut cells = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            for spec in &row.cells {
                let span = spec.rowspan.min(n - r);
                let end = (spec.col + spec.colspan).min(self.columns);
                let left = map.vertical_span_width(r..r + span, spec.col) / 2.0;
                let width = self.cell_width(spec, r, span, map);
                let top = row_y[r];
                let bottom = row_y[r + span - 1] + measured.heights[r + span - 1];
                let bounds = Rect::new(xs[spec.col] + left, top, width, bottom - top);
                let content = match &spec.prefit {
                    Some(prefit) => prefit.placed.clone(),
                    None => match spec.cell.fit(width, bounds.height, self.measurer) {
                        ContentFit::Full { placed, .. } | ContentFit::Partial { placed, .. } => {
                            placed
                        }
                        ContentFit::Nothing => Vec::new(),
                    },
                };
                cells.push(PlacedCell {
                    row: r,
                    col: spec.col,
                    rowspan: span,
                    colspan: end - spec.col,
                    bounds,
                    background: spec.cell.background_color(),
                    content: content
                        .into_iter()
                        .map(|b| b.translate(bounds.x, bounds.y))
                        .collect(),
                });
            }
        }

        let mut segments = Vec::new();
        let left_extent = map.column_line_width(0) / 2.0;
        let right_extent = map.column_line_width(self.columns) / 2.0;
        for line in 0..=n {
            let line_width = map.line_width(line);
            for col in 0..self.columns {
                let border = map.horizontal(line, col);
                if !border.is_visible() {
                    continue;
                }
                let start = if col == 0 { xs[0] - left_extent } else { xs[col] };
                let end = if col + 1 == self.columns {
                    xs[col + 1] + right_extent
                } else {
                    xs[col + 1]
                };
                let w = border.width();
                segments.push(BorderSegment {
                    bounds: Rect::new(start, line_y[line] + (line_width - w) / 2.0, end - start, w),
                    border,
                    orientation: Orientation::Horizontal,
                });
            }
        }
        for r in 0..n {
            let top = line_y[r];
            let bottom = if r + 1 == n { y } else { line_y[r + 1] };
            for line in 0..=self.columns {
                let border = map.vertical(r, line);
                if !border.is_visible() {
                    continue;
                }
                let w = border.width();
                segments.push(BorderSegment {
                    bounds: Rect::new(xs[line] - w / 2.0, top, w, bottom - top),
                    border,
                    orientation: Orientation::Vertical,
                });
            }
        }

        TableFragment {
            bounds: Rect::new(origin.x, origin.y, self.geometry.width(), y - origin.y),
            background,
            rows: placed_rows,
            cells,
            segments,
            transitions: self.transitions.clone(),
            warnings: Vec::new(),
        }
    }
}

/// Resolve column widths and frame insets for `table` in `area`.
fn compute_geometry(
    table: &Table,
    area: &LayoutArea,
    rows: &[RowSpec],
    styles: &BorderStyles,
    measurer: &dyn TextMeasurer,
    warnings: &mut Vec<LayoutWarning>,
) -> ColumnGeometry {
    let columns = table.column_count();
    let map = BorderMap::resolve(&section_of(columns, rows), styles);
    let left_inset = map.column_line_width(0) / 2.0;
    let right_inset = map.column_line_width(columns) / 2.0;

    let specs = table.columns();
    let table_width = unit::table_width(table.declared_width(), specs, area.bounds.width).max(0.0);
    let column_area = (table_width - left_inset - right_inset).max(0.0);

    let widths = match table.mode() {
        LayoutMode::Fixed => {
            // Declared widths are checked before the frame insets come off.
            let declared = table.declared_width().map(|_| table_width);
            if let Err(warning) =
                unit::resolve_column_widths(table_width, specs).check_declared(declared)
            {
                log::warn!("{warning}");
                warnings.push(warning.into());
            }
            let mut widths = unit::resolve_column_widths(column_area, specs).widths;
            fit_inside_frame(&mut widths, column_area, table_width);
            widths
        }
        LayoutMode::Auto => {
            let content: Vec<_> = table
                .column_measurements(measurer)
                .into_iter()
                .enumerate()
                .map(|(c, m)| {
                    m.add((map.column_line_width(c) + map.column_line_width(c + 1)) / 2.0)
                })
                .collect();
            let auto = unit::auto_column_widths(
                column_area,
                specs,
                &content,
                table.declared_width().is_some(),
            );
            if auto.overflow {
                let warning = ForcedPlacement {
                    row: 0,
                    required: auto.widths.iter().sum(),
                    available: column_area,
                };
                log::warn!("{warning}");
                warnings.push(warning.into());
            }
            auto.widths
        }
    };

    ColumnGeometry {
        widths,
        left_inset,
        right_inset,
    }
}

/// Shrink columns that fill the whole table width so the outer frame
/// lines fit inside it. Columns wider than the table are left alone.
fn fit_inside_frame(widths: &mut [f32], column_area: f32, table_width: f32) {
    let total: f32 = widths.iter().sum();
    if total <= column_area + EPSILON || total > table_width + unit::WIDTH_TOLERANCE {
        return;
    }
    let scale = column_area / total;
    for width in widths.iter_mut() {
        *width *= scale;
    }
}

/// Warn once per row group whose last row leaves positions uncovered.
fn report_incomplete_rows(table: &Table, warnings: &mut Vec<LayoutWarning>) {
    let groups = [
        (GroupKind::Header, table.header().map(RowGroup::grid)),
        (GroupKind::Body, Some(table.body())),
        (GroupKind::Footer, table.footer().map(RowGroup::grid)),
    ];
    for (group, grid) in groups {
        if let Some(row) = grid.and_then(Grid::incomplete_last_row) {
            let warning = IncompleteRow { group, row };
            log::warn!("{warning}");
            warnings.push(warning.into());
        }
    }
}

pub(crate) fn layout_table(
    table: &Table,
    area: &LayoutArea,
    measurer: &dyn TextMeasurer,
) -> LayoutResult {
    let styles = table.border_styles();
    let header = table
        .header()
        .map(|g| rows_from_grid(g.grid(), GroupKind::Header))
        .unwrap_or_default();
    let footer = table
        .footer()
        .map(|g| rows_from_grid(g.grid(), GroupKind::Footer))
        .unwrap_or_default();
    let body = rows_from_grid(table.body(), GroupKind::Body);

    let mut warnings = Vec::new();
    if !table.is_continuation() {
        report_incomplete_rows(table, &mut warnings);
    }
    let geometry = match table.geometry() {
        Some(geometry) => geometry.clone(),
        None => {
            let all = [header.as_slice(), &body, &footer].concat();
            compute_geometry(table, area, &all, &styles, measurer, &mut warnings)
        }
    };

    let mut ctx = LayoutContext::new(*area, measurer, geometry, styles, body.len());
    ctx.warnings = warnings;
    if !(table.skips_first_header() && !table.is_continuation()) {
        ctx.header = header;
    }
    ctx.footer = footer;
    ctx.run(table, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::text::MonospaceMeasurer;
    use crate::unit::UnitValue;

    fn area(height: f32) -> LayoutArea {
        LayoutArea::new(Rect::new(0.0, 0.0, 200.0, height))
    }

    fn fixed_rows(n: usize, height: f32) -> Table {
        let mut table = Table::with_column_count(1).cell_border(None);
        for _ in 0..n {
            table.add_cell(Cell::default().height(height)).unwrap();
        }
        table
    }

    #[test]
    fn test_full_layout_height_is_rows_plus_lines() {
        let mut table = Table::with_column_count(2);
        for _ in 0..4 {
            table.add_cell(Cell::default().height(10.0)).unwrap();
        }
        let result = table.layout(&area(500.0), &MonospaceMeasurer::new());
        assert_eq!(result.status, LayoutStatus::Full);
        // Two rows of 10pt and three 0.5pt lines.
        assert!((result.occupied().height - 21.5).abs() < 1e-3);
        assert!(result.continuation.is_none());
    }

    #[test]
    fn test_partial_layout_defers_rest() {
        let table = fixed_rows(5, 40.0);
        let result = table.layout(&area(100.0), &MonospaceMeasurer::new());
        assert_eq!(result.status, LayoutStatus::Partial);
        let fragment = result.fragment.unwrap();
        assert_eq!(fragment.body_rows(), 3);
        let continuation = result.continuation.unwrap();
        assert!(continuation.is_continuation());
        assert!(continuation.body().rows() >= 2);
    }

    #[test]
    fn test_nothing_when_first_row_does_not_fit() {
        let mut table = fixed_rows(1, 40.0);
        table.add_cell(Cell::default().height(40.0).keep_together(true)).unwrap();
        let result = table.layout(&area(20.0), &MonospaceMeasurer::new());
        // The first row splits by min height; keep-together is not involved.
        assert_eq!(result.status, LayoutStatus::Partial);

        let mut kept = Table::with_column_count(1).cell_border(None);
        kept.add_cell(Cell::default().height(40.0).keep_together(true))
            .unwrap();
        let result = kept.layout(&area(20.0), &MonospaceMeasurer::new());
        assert_eq!(result.status, LayoutStatus::Nothing);
        assert!(result.fragment.is_none());
    }

    #[test]
    fn test_forced_on_fresh_area() {
        let mut table = Table::with_column_count(1).cell_border(None);
        table
            .add_cell(Cell::default().height(40.0).keep_together(true).add(Block::fixed(60.0, "img")))
            .unwrap();
        let result = table.layout(&area(20.0).fresh(true), &MonospaceMeasurer::new());
        assert_eq!(result.status, LayoutStatus::Full);
        assert!(result.warnings.iter().any(LayoutWarning::is_forced_placement));
        assert!(result.occupied().height > 20.0);
    }

    #[test]
    fn test_row_states_recorded() {
        let table = fixed_rows(3, 40.0);
        let result = table.layout(&area(100.0), &MonospaceMeasurer::new());
        let transitions = result.fragment.unwrap().transitions;
        assert!(transitions.contains(&RowTransition {
            row: 0,
            from: RowState::Measuring,
            to: RowState::Placed,
        }));
        assert!(transitions.iter().any(|t| t.row == 2 && t.to == RowState::SplitPending));
    }

    #[test]
    fn test_invalid_width_spec_reported() {
        let mut table = Table::new(UnitValue::point_array(&[100.0, 100.0]))
            .width(UnitValue::points(300.0))
            .cell_border(None);
        table.add_cell(Cell::text("a")).unwrap();
        table.add_cell(Cell::text("b")).unwrap();
        let result = table.layout(&area(100.0), &MonospaceMeasurer::new());
        assert!(result.is_full());
        assert!(result.warnings.iter().any(LayoutWarning::is_invalid_width_spec));
        assert!((result.occupied().width - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_consistent_absolute_widths_with_default_border() {
        let mut table = Table::new(UnitValue::point_array(&[75.0, 75.0]))
            .width(UnitValue::points(150.0));
        table.add_cell(Cell::text("a")).unwrap();
        table.add_cell(Cell::text("b")).unwrap();
        let result = table.layout(&area(100.0), &MonospaceMeasurer::new());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!((result.occupied().width - 150.0).abs() < 1e-3);

        let mut hugging = Table::new(UnitValue::point_array(&[60.0, 40.0]));
        hugging.add_cell(Cell::text("a")).unwrap();
        hugging.add_cell(Cell::text("b")).unwrap();
        let result = hugging.layout(&area(100.0), &MonospaceMeasurer::new());
        assert!(result.warnings.is_empty());
        assert!((result.occupied().width - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_incomplete_last_row_reported_per_group() {
        // | One | Two |
        // | Three | (Two) |
        // | Four |
        let mut table = Table::with_column_count(2);
        table.add_header_cell(Cell::text("h")).unwrap();
        for cell in [Cell::text("One"), Cell::new(2, 1).add("Two"), Cell::text("Three")] {
            table.add_cell(cell).unwrap();
        }
        let result = table.layout(&area(200.0), &MonospaceMeasurer::new());
        assert_eq!(
            result.warnings,
            vec![LayoutWarning::from(IncompleteRow {
                group: GroupKind::Header,
                row: 0
            })]
        );

        table.add_cell(Cell::text("Four")).unwrap();
        let result = table.layout(&area(200.0), &MonospaceMeasurer::new());
        assert!(result.warnings.contains(&LayoutWarning::from(IncompleteRow {
            group: GroupKind::Body,
            row: 2
        })));
        assert_eq!(result.warnings.len(), 2);
        assert!(result.is_full());
    }

    #[test]
    fn test_incomplete_row_not_repeated_by_continuation() {
        let mut table = fixed_rows(5, 40.0);
        table.start_new_row();
        let result = table.layout(&area(100.0), &MonospaceMeasurer::new());
        assert_eq!(result.status, LayoutStatus::Partial);
        assert!(result.warnings.iter().any(LayoutWarning::is_incomplete_row));

        let rest = result.continuation.unwrap();
        let result = rest.layout(&area(500.0), &MonospaceMeasurer::new());
        assert!(result.is_full());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_nested_warnings_reach_outer_result() {
        let mut inner = Table::with_column_count(2);
        inner.add_cell(Cell::text("a")).unwrap();
        let mut outer = Table::with_column_count(1);
        outer.add_cell(Cell::default().add(inner)).unwrap();

        let result = outer.layout(&area(200.0), &MonospaceMeasurer::new());
        let expected = LayoutWarning::from(IncompleteRow {
            group: GroupKind::Body,
            row: 0,
        });
        assert_eq!(result.warnings, vec![expected]);
        assert_eq!(result.fragment.unwrap().warnings, vec![expected]);
    }

    #[test]
    fn test_geometry_insets_from_frame() {
        let mut table = Table::with_column_count(2).border(Border::solid(4.0));
        table.add_cell(Cell::text("a")).unwrap();
        table.add_cell(Cell::text("b")).unwrap();
        let result = table.layout(&area(100.0), &MonospaceMeasurer::new());
        let fragment = result.fragment.unwrap();
        assert!((fragment.bounds.width - 200.0).abs() < 1e-3);
        // Grid starts 2pt in; first cell box starts after half the 4pt line.
        assert!((fragment.rows[0].bounds.x - 2.0).abs() < 1e-3);
        assert!((fragment.cells[0].bounds.x - 4.0).abs() < 1e-3);
    }
}
