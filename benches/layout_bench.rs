//! Benchmarks for pagegrid layout.

use criterion::{Criterion, criterion_group, criterion_main};
use pagegrid::collapse::{BorderMap, Section};
use pagegrid::prelude::*;
use pagegrid::unit::resolve_column_widths;
use std::hint::black_box;

fn sample_table(rows: usize, columns: usize) -> Table {
    let mut table = Table::with_column_count(columns).border(Border::solid(1.0));
    for c in 0..columns {
        table.add_header_cell(Cell::text(&format!("Column {c}"))).ok();
    }
    for r in 0..rows {
        for c in 0..columns {
            table
                .add_cell(Cell::text(&format!("row {r} col {c} with some wrapping text")))
                .ok();
        }
    }
    table
}

fn benchmark_border_parse(c: &mut Criterion) {
    c.bench_function("border_parse_simple", |b| {
        b.iter(|| black_box(Border::parse("solid 1")));
    });

    c.bench_function("border_parse_colored", |b| {
        b.iter(|| black_box(Border::parse("dashed 0.75pt #336699")));
    });
}

fn benchmark_column_widths(c: &mut Criterion) {
    let specs = UnitValue::weighted_array(&[1.0, 2.0, 3.0, 1.5, 0.5, 2.0]);

    c.bench_function("resolve_column_widths_6", |b| {
        b.iter(|| black_box(resolve_column_widths(black_box(523.0), &specs)));
    });
}

fn benchmark_border_resolve(c: &mut Criterion) {
    let mut section = Section::new(8);
    for r in 0..50 {
        section.push_row(GroupKind::Body, None);
        for col in 0..8 {
            section.add_cell(r, col, 1, 1, Edges::default());
        }
    }
    let styles = sample_table(1, 8).border_styles();

    c.bench_function("border_resolve_50x8", |b| {
        b.iter(|| black_box(BorderMap::resolve(&section, &styles)));
    });
}

fn benchmark_table_layout(c: &mut Criterion) {
    let small = sample_table(3, 3);
    let medium = sample_table(40, 5);
    let measurer = MonospaceMeasurer::new();
    let area = LayoutArea::new(Rect::new(0.0, 0.0, 523.0, 770.0));

    c.bench_function("table_layout_3x3", |b| {
        b.iter(|| black_box(small.layout(&area, &measurer)));
    });

    c.bench_function("table_layout_40x5", |b| {
        b.iter(|| black_box(medium.layout(&area, &measurer)));
    });
}

fn benchmark_document_layout(c: &mut Criterion) {
    c.bench_function("document_layout_200_rows", |b| {
        b.iter(|| {
            let mut document = Document::builder().page_size(PageSize::A4).build();
            document.add(sample_table(200, 4));
            black_box(document.layout())
        });
    });
}

criterion_group!(
    benches,
    benchmark_border_parse,
    benchmark_column_widths,
    benchmark_border_resolve,
    benchmark_table_layout,
    benchmark_document_layout,
);
criterion_main!(benches);
