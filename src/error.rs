//! Error and warning types.
//!
//! Only grid construction can fail hard ([`GridConflict`]): a cell that
//! does not fit the declared columns, or that lands on an occupied
//! position, would silently shift every later cell. Everything the layout
//! engine can recover from is reported as a [`LayoutWarning`] next to the
//! result instead.

use std::fmt;

use crate::table::GroupKind;

/// Why a cell could not be placed in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The cell's column range extends past the column count.
    SpanOutOfBounds { colspan: usize, columns: usize },
    /// Another cell already covers the position.
    Occupied,
    /// The row span, or the rows an explicit position would open, exceed
    /// what a grid may grow by in one step.
    RowSpanTooLarge { rows: usize, max: usize },
}

/// Malformed grid construction. Fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConflict {
    pub row: usize,
    pub col: usize,
    pub kind: ConflictKind,
}

impl fmt::Display for GridConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConflictKind::SpanOutOfBounds { colspan, columns } => write!(
                f,
                "cell at ({}, {}) with colspan {colspan} does not fit in {columns} columns",
                self.row, self.col
            ),
            ConflictKind::Occupied => write!(
                f,
                "grid position ({}, {}) is already occupied",
                self.row, self.col
            ),
            ConflictKind::RowSpanTooLarge { rows, max } => write!(
                f,
                "cell at ({}, {}) would add {rows} rows, more than the limit of {max}",
                self.row, self.col
            ),
        }
    }
}

impl std::error::Error for GridConflict {}

/// Column widths inconsistent with the declared table width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidWidthSpec {
    pub declared: f32,
    pub resolved: f32,
}

impl fmt::Display for InvalidWidthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column widths sum to {:.2}pt but the table is {:.2}pt wide",
            self.resolved, self.declared
        )
    }
}

impl std::error::Error for InvalidWidthSpec {}

/// Content placed although it does not fit the available area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcedPlacement {
    /// Row index within the laid-out table.
    pub row: usize,
    pub required: f32,
    pub available: f32,
}

impl fmt::Display for ForcedPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} forced into {:.2}pt although it needs {:.2}pt",
            self.row, self.available, self.required
        )
    }
}

impl std::error::Error for ForcedPlacement {}

/// The last row of a row group has positions no cell covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteRow {
    pub group: GroupKind,
    pub row: usize,
}

impl fmt::Display for IncompleteRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = match self.group {
            GroupKind::Header => "header",
            GroupKind::Body => "body",
            GroupKind::Footer => "footer",
        };
        write!(f, "last {group} row {} is not complete", self.row)
    }
}

impl std::error::Error for IncompleteRow {}

/// Recoverable layout conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutWarning {
    InvalidWidthSpec(InvalidWidthSpec),
    ForcedPlacement(ForcedPlacement),
    IncompleteRow(IncompleteRow),
}

impl LayoutWarning {
    #[must_use]
    pub const fn is_incomplete_row(&self) -> bool {
        matches!(self, Self::IncompleteRow(_))
    }

    #[must_use]
    pub const fn is_forced_placement(&self) -> bool {
        matches!(self, Self::ForcedPlacement(_))
    }

    #[must_use]
    pub const fn is_invalid_width_spec(&self) -> bool {
        matches!(self, Self::InvalidWidthSpec(_))
    }
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWidthSpec(w) => write!(f, "invalid width spec: {w}"),
            Self::ForcedPlacement(w) => write!(f, "forced placement: {w}"),
            Self::IncompleteRow(w) => write!(f, "incomplete row: {w}"),
        }
    }
}

impl From<InvalidWidthSpec> for LayoutWarning {
    fn from(value: InvalidWidthSpec) -> Self {
        Self::InvalidWidthSpec(value)
    }
}

impl From<ForcedPlacement> for LayoutWarning {
    fn from(value: ForcedPlacement) -> Self {
        Self::ForcedPlacement(value)
    }
}

impl From<IncompleteRow> for LayoutWarning {
    fn from(value: IncompleteRow) -> Self {
        Self::IncompleteRow(value)
    }
}

/// Errors returned by the document driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    Grid(GridConflict),
    /// The page loop produced more pages than allowed.
    PageLimitExceeded { limit: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(err) => write!(f, "{err}"),
            Self::PageLimitExceeded { limit } => {
                write!(f, "layout did not finish within {limit} pages")
            }
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            Self::PageLimitExceeded { .. } => None,
        }
    }
}

impl From<GridConflict> for LayoutError {
    fn from(value: GridConflict) -> Self {
        Self::Grid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_conflict_display() {
        let err = GridConflict {
            row: 1,
            col: 2,
            kind: ConflictKind::Occupied,
        };
        assert_eq!(err.to_string(), "grid position (1, 2) is already occupied");

        let err = GridConflict {
            row: 0,
            col: 1,
            kind: ConflictKind::SpanOutOfBounds {
                colspan: 3,
                columns: 2,
            },
        };
        assert!(err.to_string().contains("colspan 3"));

        let err = GridConflict {
            row: 0,
            col: 0,
            kind: ConflictKind::RowSpanTooLarge {
                rows: 9000,
                max: 4096,
            },
        };
        assert_eq!(
            err.to_string(),
            "cell at (0, 0) would add 9000 rows, more than the limit of 4096"
        );
    }

    #[test]
    fn test_warning_conversions() {
        let w: LayoutWarning = ForcedPlacement {
            row: 0,
            required: 120.0,
            available: 40.0,
        }
        .into();
        assert!(w.is_forced_placement());
        assert!(w.to_string().starts_with("forced placement"));

        let w: LayoutWarning = InvalidWidthSpec {
            declared: 300.0,
            resolved: 250.0,
        }
        .into();
        assert!(w.is_invalid_width_spec());

        let w: LayoutWarning = IncompleteRow {
            group: GroupKind::Footer,
            row: 3,
        }
        .into();
        assert!(w.is_incomplete_row());
        assert_eq!(w.to_string(), "incomplete row: last footer row 3 is not complete");
    }

    #[test]
    fn test_layout_error_source() {
        use std::error::Error;
        let err: LayoutError = GridConflict {
            row: 0,
            col: 0,
            kind: ConflictKind::Occupied,
        }
        .into();
        assert!(err.source().is_some());
        assert!(
            LayoutError::PageLimitExceeded { limit: 3 }
                .source()
                .is_none()
        );
    }
}
