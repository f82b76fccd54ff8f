//! # pagegrid
//!
//! Table layout and border collapsing for paginated documents.
//!
//! A [`Table`] is a grid of [`Cell`]s with row and column spans, optional
//! repeating header and footer rows and borders declared at table, group,
//! row and cell scope. [`Table::layout`] places as much of the table as
//! fits into an area, resolves every shared border segment to exactly one
//! winner and returns the rows that did not fit as a continuation table.
//! [`Document`] runs that loop over pages; a [`Painter`] draws the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use pagegrid::prelude::*;
//!
//! let mut table = Table::new(UnitValue::percent_array(2)).border(Border::solid(1.0));
//! table.add_header_cell(Cell::text("Key")).unwrap();
//! table.add_header_cell(Cell::text("Value")).unwrap();
//! table.add_cell(Cell::text("One")).unwrap();
//! table.add_cell(Cell::new(2, 1).add("Two")).unwrap();
//! table.add_cell(Cell::text("Three")).unwrap();
//!
//! let area = LayoutArea::new(Rect::new(0.0, 0.0, 300.0, 400.0));
//! let result = table.layout(&area, &MonospaceMeasurer::new());
//! assert_eq!(result.status, LayoutStatus::Full);
//! ```
//!
//! ## Core Concepts
//!
//! - **Border**: a styled stroke; collapsing picks the widest, then the
//!   strongest kind, then the most specific scope
//! - **Grid**: cell arena plus a position table for spans
//! - **Layout**: row state machine that splits, defers or forces rows
//! - **Fragment**: the placed part of a table on one page
//! - **Painter**: the drawing surface fragments are painted onto

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod border;
pub mod cell;
pub mod collapse;
pub mod color;
pub mod content;
pub mod document;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod measure;
pub mod paint;
pub mod sync;
pub mod table;
pub mod text;
pub mod unit;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::border::{Border, BorderKind, BorderScope, Edge, Edges, Sides, Stroke};
    pub use crate::cell::Cell;
    pub use crate::color::Color;
    pub use crate::content::{Block, ContentFit, Paragraph, PlacedBlock};
    pub use crate::document::{Document, DocumentOptions, Page};
    pub use crate::error::{GridConflict, LayoutError, LayoutWarning};
    pub use crate::geometry::{PageSize, Point, Rect, Size};
    pub use crate::layout::{LayoutArea, LayoutResult, LayoutStatus, RowState, TableFragment};
    pub use crate::paint::{DisplayList, PaintOp, Painter};
    pub use crate::table::{GroupKind, LayoutMode, Table};
    pub use crate::text::{FontSpec, MonospaceMeasurer, TextMeasurer};
    pub use crate::unit::UnitValue;
}

// Re-export key types at crate root
pub use border::{Border, BorderKind, BorderScope};
pub use cell::Cell;
pub use color::Color;
pub use content::Block;
pub use document::{Document, DocumentOptions, Page};
pub use error::{LayoutError, LayoutWarning};
pub use layout::{LayoutArea, LayoutResult, LayoutStatus, TableFragment};
pub use paint::{DisplayList, Painter};
pub use table::Table;
pub use unit::UnitValue;

#[cfg(feature = "tracing")]
pub use logging::LayoutTracingLayer;
pub use logging::LayoutLogger;
