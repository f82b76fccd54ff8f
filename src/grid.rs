//! Cell placement grid.
//!
//! Cells live in a flat arena in insertion order. A separate row x column
//! table maps every grid position to the [`CellHandle`] of the cell that
//! covers it, so a spanning cell is owned once and referenced from each
//! position it spans.

use std::ops::Range;

use crate::border::Border;
use crate::cell::Cell;
use crate::error::{ConflictKind, GridConflict};

/// Most rows a single cell may add to a grid, through its row span or an
/// explicit position past the last row.
pub const MAX_ROW_GROWTH: usize = 4096;

/// Index of a cell in its grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellHandle(usize);

impl CellHandle {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    cell: Cell,
    row: usize,
    col: usize,
}

/// A sparse matrix of cell placements with a fixed column count.
#[derive(Debug, Clone)]
pub struct Grid {
    columns: usize,
    entries: Vec<Entry>,
    slots: Vec<Vec<Option<CellHandle>>>,
    row_borders: Vec<Option<Border>>,
    cursor: (usize, usize),
}

impl Grid {
    #[must_use]
    pub const fn new(columns: usize) -> Self {
        Self {
            columns,
            entries: Vec::new(),
            slots: Vec::new(),
            row_borders: Vec::new(),
            cursor: (0, 0),
        }
    }

    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows, including rows only reached by row spans.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cells in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append a cell at the next free position that can hold its spans.
    ///
    /// # Errors
    ///
    /// Returns [`GridConflict`] when the cell spans more columns than the
    /// grid has, or more rows than [`MAX_ROW_GROWTH`].
    pub fn add_cell(&mut self, cell: Cell) -> Result<CellHandle, GridConflict> {
        let colspan = cell.colspan();
        let (mut row, mut col) = self.cursor;
        self.check_rows(row, col, cell.rowspan())?;
        if colspan > self.columns {
            return Err(GridConflict {
                row,
                col,
                kind: ConflictKind::SpanOutOfBounds {
                    colspan,
                    columns: self.columns,
                },
            });
        }
        loop {
            if col + colspan > self.columns {
                row += 1;
                col = 0;
                continue;
            }
            if self.first_occupied(row, col, cell.rowspan(), colspan).is_none() {
                break;
            }
            col += 1;
        }
        let handle = self.insert(row, col, cell);
        self.cursor = (row, col + colspan);
        Ok(handle)
    }

    /// Place a cell at an explicit position.
    ///
    /// # Errors
    ///
    /// Returns [`GridConflict`] when the cell's columns extend past the
    /// column count, it would grow the grid by more than
    /// [`MAX_ROW_GROWTH`] rows, or any covered position is already taken.
    pub fn add_cell_at(
        &mut self,
        row: usize,
        col: usize,
        cell: Cell,
    ) -> Result<CellHandle, GridConflict> {
        let colspan = cell.colspan();
        self.check_rows(row, col, cell.rowspan())?;
        if col.checked_add(colspan).is_none_or(|right| right > self.columns) {
            return Err(GridConflict {
                row,
                col,
                kind: ConflictKind::SpanOutOfBounds {
                    colspan,
                    columns: self.columns,
                },
            });
        }
        if let Some((r, c)) = self.first_occupied(row, col, cell.rowspan(), colspan) {
            return Err(GridConflict {
                row: r,
                col: c,
                kind: ConflictKind::Occupied,
            });
        }
        let handle = self.insert(row, col, cell);
        self.cursor = self.cursor.max((row, col + colspan));
        Ok(handle)
    }

    /// Finish the current row; the next [`Grid::add_cell`] starts a new one.
    /// Does nothing when the current row has no cells yet.
    pub fn start_new_row(&mut self) {
        if self.cursor.1 > 0 {
            self.cursor = (self.cursor.0 + 1, 0);
        }
    }

    /// Uniform border for every cell edge of `row` that has no override.
    pub fn set_row_border(&mut self, row: usize, border: Option<Border>) {
        if self.row_borders.len() <= row {
            self.row_borders.resize(row + 1, None);
        }
        self.row_borders[row] = border;
    }

    #[must_use]
    pub fn row_border(&self, row: usize) -> Option<Border> {
        self.row_borders.get(row).copied().flatten()
    }

    #[must_use]
    pub fn cell(&self, handle: CellHandle) -> &Cell {
        &self.entries[handle.0].cell
    }

    /// Grid position of a cell's top-left corner.
    #[must_use]
    pub fn origin(&self, handle: CellHandle) -> (usize, usize) {
        let entry = &self.entries[handle.0];
        (entry.row, entry.col)
    }

    /// The cell covering `(row, col)`, if any.
    #[must_use]
    pub fn handle_at(&self, row: usize, col: usize) -> Option<CellHandle> {
        self.slots.get(row)?.get(col).copied().flatten()
    }

    /// All handles in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = CellHandle> + '_ {
        (0..self.entries.len()).map(CellHandle)
    }

    /// Cells whose top-left corner lies in `row`, left to right.
    #[must_use]
    pub fn cells_in_row(&self, row: usize) -> Vec<CellHandle> {
        let mut handles: Vec<CellHandle> = self
            .handles()
            .filter(|&h| self.entries[h.0].row == row)
            .collect();
        handles.sort_by_key(|&h| self.entries[h.0].col);
        handles
    }

    /// Index of the last row when some of its positions are uncovered.
    ///
    /// A row opened by [`Grid::start_new_row`] that never received a cell
    /// counts as the last row.
    #[must_use]
    pub fn incomplete_last_row(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let (cursor_row, cursor_col) = self.cursor;
        if cursor_col == 0 && cursor_row >= self.rows() {
            return Some(cursor_row);
        }
        let last = self.rows().checked_sub(1)?;
        self.slots[last]
            .iter()
            .any(Option::is_none)
            .then_some(last)
    }

    /// Minimal contiguous row ranges that no row span crosses.
    #[must_use]
    pub fn span_groups(&self) -> Vec<Range<usize>> {
        let mut reach = vec![0usize; self.rows()];
        for entry in &self.entries {
            let end = entry.row + entry.cell.rowspan();
            reach[entry.row] = reach[entry.row].max(end);
        }

        let mut groups = Vec::new();
        let mut start = 0;
        while start < self.rows() {
            let mut end = start + 1;
            let mut row = start;
            while row < end {
                end = end.max(reach[row]);
                row += 1;
            }
            groups.push(start..end);
            start = end;
        }
        groups
    }

    /// Place a cell whose position is known to be free and in bounds.
    pub(crate) fn place(&mut self, row: usize, col: usize, cell: Cell) {
        let colspan = cell.colspan();
        self.insert(row, col, cell);
        self.cursor = self.cursor.max((row, col + colspan));
    }

    /// Make sure `rows` rows exist, even if no cell reaches them.
    pub(crate) fn ensure_rows(&mut self, rows: usize) {
        let columns = self.columns;
        if self.slots.len() < rows {
            self.slots.resize_with(rows, || vec![None; columns]);
        }
    }

    fn check_rows(&self, row: usize, col: usize, rowspan: usize) -> Result<(), GridConflict> {
        let limit = self.rows().saturating_add(MAX_ROW_GROWTH);
        match row.checked_add(rowspan) {
            Some(bottom) if rowspan <= MAX_ROW_GROWTH && bottom <= limit => Ok(()),
            _ => Err(GridConflict {
                row,
                col,
                kind: ConflictKind::RowSpanTooLarge {
                    rows: rowspan.max(row.saturating_sub(self.rows())),
                    max: MAX_ROW_GROWTH,
                },
            }),
        }
    }

    fn first_occupied(
        &self,
        row: usize,
        col: usize,
        rowspan: usize,
        colspan: usize,
    ) -> Option<(usize, usize)> {
        (row..row + rowspan)
            .flat_map(|r| (col..col + colspan).map(move |c| (r, c)))
            .find(|&(r, c)| self.handle_at(r, c).is_some())
    }

    fn insert(&mut self, row: usize, col: usize, cell: Cell) -> CellHandle {
        let handle = CellHandle(self.entries.len());
        let bottom = row + cell.rowspan();
        let columns = self.columns;
        if self.slots.len() < bottom {
            self.slots.resize_with(bottom, || vec![None; columns]);
        }
        for slots in &mut self.slots[row..bottom] {
            for slot in &mut slots[col..col + cell.colspan()] {
                *slot = Some(handle);
            }
        }
        self.entries.push(Entry { cell, row, col });
        handle
    }
}
