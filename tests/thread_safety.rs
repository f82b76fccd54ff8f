//! Thread safety tests for pagegrid.
//!
//! This module verifies:
//! 1. Public model and result types are Send + Sync (compile-time verification)
//! 2. The global parse and measurement caches work under concurrent access
//! 3. Independent documents can be laid out in parallel

mod common;

use std::thread;

use common::fixtures::{bare_page, fragments, repeating_table};
use common::init_test_logging;
use pagegrid::prelude::*;

// ============================================================================
// COMPILE-TIME SEND + SYNC VERIFICATION
// ============================================================================

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_model_types_are_send_sync() {
    assert_send_sync::<Border>();
    assert_send_sync::<Color>();
    assert_send_sync::<Cell>();
    assert_send_sync::<Block>();
    assert_send_sync::<Table>();
    assert_send_sync::<Document>();
}

#[test]
fn test_result_types_are_send_sync() {
    assert_send_sync::<LayoutResult>();
    assert_send_sync::<TableFragment>();
    assert_send_sync::<Page>();
    assert_send_sync::<LayoutWarning>();
    assert_send_sync::<LayoutError>();
    assert_send_sync::<DisplayList>();
}

#[test]
fn test_measurers_are_send_sync() {
    assert_send_sync::<MonospaceMeasurer>();
    assert_send_sync::<pagegrid::logging::LayoutLogger>();
}

// ============================================================================
// CONCURRENT CACHE ACCESS
// ============================================================================

#[test]
fn test_concurrent_color_parsing() {
    init_test_logging();

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..200 {
                    assert_eq!(Color::parse("red"), Ok(Color::RED));
                    assert_eq!(Color::parse("#0000ff"), Ok(Color::BLUE));
                    assert!(Color::parse("not-a-color").is_err());
                }
            });
        }
    });
}

#[test]
fn test_concurrent_text_measurement() {
    init_test_logging();

    let measurer = MonospaceMeasurer::new();
    let font = FontSpec::default();
    let expected = measurer.measure_width("concurrent \u{4e16}\u{754c}", &font.family, font.size);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..200 {
                    let width =
                        measurer.measure_width("concurrent \u{4e16}\u{754c}", &font.family, font.size);
                    assert!((width - expected).abs() < f32::EPSILON);
                }
            });
        }
    });
}

// ============================================================================
// PARALLEL LAYOUT
// ============================================================================

#[test]
fn test_parallel_document_layout() {
    init_test_logging();

    let page_counts: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut document = bare_page(200.0, 100.0).build();
                    document.add(repeating_table(false, false));
                    let pages = document.layout().unwrap();
                    assert_eq!(fragments(&pages).len(), pages.len());
                    pages.len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(page_counts.iter().all(|&n| n == page_counts[0]));
    assert_eq!(page_counts[0], 5);
}

#[test]
fn test_shared_table_laid_out_from_many_threads() {
    init_test_logging();

    let table = repeating_table(false, false);
    let measurer = MonospaceMeasurer::new();
    let area = LayoutArea::new(Rect::new(0.0, 0.0, 200.0, 100.0));
    let reference = table.layout(&area, &measurer);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let result = table.layout(&area, &measurer);
                assert_eq!(result.status, reference.status);
                let (a, b) = (result.fragment.unwrap(), reference.fragment.as_ref().unwrap());
                assert_eq!(a.rows, b.rows);
            });
        }
    });
}
