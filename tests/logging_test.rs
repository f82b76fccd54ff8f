//! Integration tests for the layout logger.
//!
//! The logger is process-global, so every test here installs the same
//! [`LayoutLogger`] once and reads back only what it produced itself.
//!
//! Run with: cargo test --test logging_test -- --nocapture

mod common;

use std::sync::OnceLock;

use log::{Level, LevelFilter};
use serial_test::serial;

use common::fixtures::{bare_page, fixed_rows, layout_in, rigid_rows};
use pagegrid::logging::{LayoutLogger, LogBuffer};
use pagegrid::prelude::*;

static BUFFER: OnceLock<LogBuffer> = OnceLock::new();

fn buffer() -> &'static LogBuffer {
    BUFFER.get_or_init(|| {
        let buffer = LogBuffer::new();
        LayoutLogger::new(buffer.clone())
            .level(LevelFilter::Debug)
            .show_time(false)
            .target_prefix("pagegrid")
            .init()
            .expect("no other logger in this test binary");
        buffer
    })
}

/// Run `f` and return the log lines it produced.
fn capture(f: impl FnOnce()) -> Vec<String> {
    let buffer = buffer();
    let before = buffer.contents().len();
    f();
    buffer.contents()[before..]
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
#[serial]
fn test_row_transitions_logged_at_debug() {
    let lines = capture(|| {
        let result = layout_in(&fixed_rows(&[20.0, 20.0]), 100.0, 100.0);
        assert!(result.is_full());
    });

    let transitions: Vec<&String> = lines.iter().filter(|l| l.contains("->")).collect();
    assert!(!transitions.is_empty(), "no transitions in {lines:#?}");
    for line in &transitions {
        assert!(line.starts_with("DEBUG "), "unexpected level: {line}");
        assert!(line.contains("pagegrid::layout: row "), "unexpected target: {line}");
    }
    assert!(lines.iter().any(|l| l.contains("Measuring -> Placed")));
}

#[test]
#[serial]
fn test_forced_placement_logged_as_warning() {
    let lines = capture(|| {
        let mut document = bare_page(100.0, 50.0).build();
        document.add(rigid_rows(&[80.0]));
        let pages = document.layout().unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].warnings.iter().any(LayoutWarning::is_forced_placement));
    });

    let warnings: Vec<&String> = lines
        .iter()
        .filter(|l| l.starts_with("WARN "))
        .collect();
    assert!(
        warnings.iter().any(|l| l.contains("forced placement: row 0")),
        "missing forced placement in {lines:#?}"
    );
}

#[test]
#[serial]
fn test_document_summary_logged_at_info() {
    let lines = capture(|| {
        let mut document = bare_page(100.0, 100.0).build();
        document.add(rigid_rows(&[60.0, 60.0]));
        document.layout().unwrap();
    });

    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("INFO ") && l.contains("document laid out on 2 page(s)")),
        "missing summary in {lines:#?}"
    );
    assert!(lines.iter().any(|l| l.contains("starting page 1")));
}

#[test]
#[serial]
fn test_width_warning_logged() {
    let lines = capture(|| {
        let mut table = Table::new(UnitValue::point_array(&[100.0, 100.0]))
            .width(UnitValue::points(300.0));
        table.add_cell(Cell::text("a")).unwrap();
        table.add_cell(Cell::text("b")).unwrap();
        let result = layout_in(&table, 400.0, 100.0);
        assert!(result.warnings.iter().any(LayoutWarning::is_invalid_width_spec));
    });

    assert!(
        lines
            .iter()
            .any(|l| l.contains("invalid width spec: column widths sum to 200.00pt")),
        "missing width warning in {lines:#?}"
    );
}

#[test]
#[serial]
fn test_buffer_filters_by_level() {
    let buffer = buffer();
    capture(|| {
        let mut document = bare_page(100.0, 50.0).build();
        document.add(rigid_rows(&[80.0]));
        document.layout().unwrap();
    });

    let warnings = buffer.lines_at(Level::Warn);
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|l| l.starts_with("WARN ")));
}
