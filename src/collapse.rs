//! Border collapsing.
//!
//! A [`Section`] is the stack of rows that end up together in one page
//! fragment: repeated header rows, the body rows placed on the page and
//! the footer rows. [`BorderMap::resolve`] walks every grid line of a
//! section, segment by segment, gathers the borders that touch the
//! segment and keeps exactly one winner.
//!
//! Horizontal line `i` runs above row `i` (line `rows` is the bottom
//! edge) and has one segment per column. Vertical line `j` runs left of
//! column `j` and has one segment per row.

use smallvec::SmallVec;

use crate::border::{Border, BorderScope, Edge, Edges};
use crate::table::GroupKind;

/// Border defaults of every scope of a table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderStyles {
    pub table_frame: Edges<Option<Border>>,
    pub table_cell: Option<Border>,
    pub header_frame: Edges<Option<Border>>,
    pub header_cell: Option<Border>,
    pub footer_frame: Edges<Option<Border>>,
    pub footer_cell: Option<Border>,
}

impl BorderStyles {
    fn group_frame(&self, group: GroupKind) -> Option<&Edges<Option<Border>>> {
        match group {
            GroupKind::Header => Some(&self.header_frame),
            GroupKind::Footer => Some(&self.footer_frame),
            GroupKind::Body => None,
        }
    }

    fn group_cell(&self, group: GroupKind) -> Option<Border> {
        match group {
            GroupKind::Header => self.header_cell,
            GroupKind::Footer => self.footer_cell,
            GroupKind::Body => None,
        }
    }
}

/// One border touching a segment, tagged with the scope it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub border: Border,
    pub scope: BorderScope,
}

impl Contribution {
    #[must_use]
    pub const fn new(border: Border, scope: BorderScope) -> Self {
        Self { border, scope }
    }
}

/// Pick the winning border among `contributions`.
///
/// An explicit [`Border::None`] from a cell beats everything. Otherwise
/// the collapsing comparator decides and full ties keep the earlier
/// contribution. No contribution at all yields [`Border::None`].
#[must_use]
pub fn pick_winner(contributions: &[Contribution]) -> Border {
    if contributions
        .iter()
        .any(|c| c.scope == BorderScope::Cell && c.border.is_none())
    {
        return Border::None;
    }
    let mut iter = contributions.iter();
    let Some(mut winner) = iter.next() else {
        return Border::None;
    };
    for candidate in iter {
        if candidate
            .border
            .compare_collapsed(candidate.scope, &winner.border, winner.scope)
            .is_gt()
        {
            winner = candidate;
        }
    }
    winner.border
}

#[derive(Debug, Clone, Copy)]
struct SectionRow {
    group: GroupKind,
    border: Option<Border>,
}

#[derive(Debug, Clone)]
struct SectionCell {
    row: usize,
    col: usize,
    rowspan: usize,
    colspan: usize,
    borders: Edges<Option<Border>>,
}

/// Rows stacked for one page fragment, reduced to what border
/// resolution needs: spans and border overrides.
#[derive(Debug, Clone)]
pub struct Section {
    columns: usize,
    rows: Vec<SectionRow>,
    cells: Vec<SectionCell>,
}

impl Section {
    #[must_use]
    pub const fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Append a row and return its index.
    pub fn push_row(&mut self, group: GroupKind, border: Option<Border>) -> usize {
        self.rows.push(SectionRow { group, border });
        self.rows.len() - 1
    }

    /// Add a cell with its top-left corner at `(row, col)`.
    ///
    /// Spans reaching past the last row or column are clipped when the
    /// section is resolved.
    pub fn add_cell(
        &mut self,
        row: usize,
        col: usize,
        rowspan: usize,
        colspan: usize,
        borders: Edges<Option<Border>>,
    ) {
        self.cells.push(SectionCell {
            row,
            col,
            rowspan: rowspan.max(1),
            colspan: colspan.max(1),
            borders,
        });
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn group(&self, row: usize) -> Option<GroupKind> {
        self.rows.get(row).map(|r| r.group)
    }

    fn slots(&self) -> Vec<Vec<Option<usize>>> {
        let mut slots = vec![vec![None; self.columns]; self.rows.len()];
        for (index, cell) in self.cells.iter().enumerate() {
            let bottom = (cell.row + cell.rowspan).min(self.rows.len());
            let right = (cell.col + cell.colspan).min(self.columns);
            for row in slots.iter_mut().take(bottom).skip(cell.row) {
                for slot in row.iter_mut().take(right).skip(cell.col) {
                    *slot = Some(index);
                }
            }
        }
        slots
    }

    /// The contribution of one cell edge, walking cell override, row
    /// border, group default and table default in that order.
    fn cell_edge(&self, index: usize, edge: Edge, styles: &BorderStyles) -> Option<Contribution> {
        let cell = &self.cells[index];
        let row = &self.rows[cell.row];
        if let Some(border) = *cell.borders.get(edge) {
            return Some(Contribution::new(border, BorderScope::Cell));
        }
        if let Some(border) = row.border {
            return Some(Contribution::new(border, BorderScope::Row));
        }
        if let Some(border) = styles.group_cell(row.group) {
            return Some(Contribution::new(border, BorderScope::HeaderFooter));
        }
        styles
            .table_cell
            .map(|border| Contribution::new(border, BorderScope::Table))
    }
}

type Contributions = SmallVec<[Contribution; 6]>;

fn push_frame(
    out: &mut Contributions,
    frame: Option<&Edges<Option<Border>>>,
    edge: Edge,
    scope: BorderScope,
) {
    if let Some(border) = frame.and_then(|f| *f.get(edge)) {
        out.push(Contribution::new(border, scope));
    }
}

/// Winning border of every grid line segment of a [`Section`].
#[derive(Debug, Clone, PartialEq)]
pub struct BorderMap {
    rows: usize,
    columns: usize,
    horizontal: Vec<Border>,
    vertical: Vec<Border>,
}

impl BorderMap {
    /// Resolve every segment of `section`.
    #[must_use]
    pub fn resolve(section: &Section, styles: &BorderStyles) -> Self {
        let rows = section.rows();
        let columns = section.columns();
        let slots = section.slots();
        let at = |r: usize, c: usize| slots.get(r).and_then(|row| row[c]);

        let mut horizontal = Vec::with_capacity((rows + 1) * columns);
        for line in 0..=rows {
            for col in 0..columns {
                let above = line.checked_sub(1).and_then(|r| at(r, col));
                let below = if line < rows { at(line, col) } else { None };
                if above.is_some() && above == below {
                    horizontal.push(Border::None);
                    continue;
                }
                let mut found = Contributions::new();
                found.extend(above.and_then(|i| section.cell_edge(i, Edge::Bottom, styles)));
                found.extend(below.and_then(|i| section.cell_edge(i, Edge::Top, styles)));

                let group_above = line.checked_sub(1).and_then(|r| section.group(r));
                let group_below = section.group(line);
                let table_frame = Some(&styles.table_frame);
                if line == 0 {
                    push_frame(&mut found, table_frame, Edge::Top, BorderScope::Table);
                }
                if line == rows {
                    push_frame(&mut found, table_frame, Edge::Bottom, BorderScope::Table);
                }
                if group_above != group_below {
                    let scope = BorderScope::HeaderFooter;
                    if let Some(group) = group_above {
                        push_frame(&mut found, styles.group_frame(group), Edge::Bottom, scope);
                    }
                    if let Some(group) = group_below {
                        push_frame(&mut found, styles.group_frame(group), Edge::Top, scope);
                    }
                }
                horizontal.push(pick_winner(&found));
            }
        }

        let mut vertical = Vec::with_capacity(rows * (columns + 1));
        for row in 0..rows {
            let group = section.group(row);
            for line in 0..=columns {
                let left = line.checked_sub(1).and_then(|c| at(row, c));
                let right = if line < columns { at(row, line) } else { None };
                if left.is_some() && left == right {
                    vertical.push(Border::None);
                    continue;
                }
                let mut found = Contributions::new();
                found.extend(left.and_then(|i| section.cell_edge(i, Edge::Right, styles)));
                found.extend(right.and_then(|i| section.cell_edge(i, Edge::Left, styles)));
                let table_frame = Some(&styles.table_frame);
                let group_frame = group.and_then(|g| styles.group_frame(g));
                for (edge, at_edge) in [(Edge::Left, line == 0), (Edge::Right, line == columns)] {
                    if at_edge {
                        push_frame(&mut found, table_frame, edge, BorderScope::Table);
                        push_frame(&mut found, group_frame, edge, BorderScope::HeaderFooter);
                    }
                }
                vertical.push(pick_winner(&found));
            }
        }

        log::trace!(
            "resolved borders for {rows}x{columns} section: {} horizontal, {} vertical segments",
            horizontal.len(),
            vertical.len()
        );
        Self {
            rows,
            columns,
            horizontal,
            vertical,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Winner on horizontal line `line` (0..=rows) over column `col`.
    #[must_use]
    pub fn horizontal(&self, line: usize, col: usize) -> Border {
        self.horizontal
            .get(line * self.columns + col)
            .copied()
            .unwrap_or_default()
    }

    /// Winner on vertical line `line` (0..=columns) beside row `row`.
    #[must_use]
    pub fn vertical(&self, row: usize, line: usize) -> Border {
        self.vertical
            .get(row * (self.columns + 1) + line)
            .copied()
            .unwrap_or_default()
    }

    /// Vertical space taken by horizontal line `line`: its widest segment.
    #[must_use]
    pub fn line_width(&self, line: usize) -> f32 {
        (0..self.columns)
            .map(|col| self.horizontal(line, col).width())
            .fold(0.0, f32::max)
    }

    /// Widest segment of vertical line `line` over all rows.
    #[must_use]
    pub fn column_line_width(&self, line: usize) -> f32 {
        self.vertical_span_width(0..self.rows, line)
    }

    /// Widest segment of vertical line `line` over `rows`.
    #[must_use]
    pub fn vertical_span_width(&self, rows: std::ops::Range<usize>, line: usize) -> f32 {
        rows.map(|row| self.vertical(row, line).width())
            .fold(0.0, f32::max)
    }
}
