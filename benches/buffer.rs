//! Cell buffer benchmarks: drawing and frame diffing.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use termscene::{BorderStyle, CellBuffer, Rgba};

fn buffer_creation(c: &mut Criterion) {
    c.bench_function("buffer_new_80x24", |b| {
        b.iter(|| CellBuffer::new(black_box(80), black_box(24)));
    });

    c.bench_function("buffer_new_200x50", |b| {
        b.iter(|| CellBuffer::new(black_box(200), black_box(50)));
    });
}

fn buffer_drawing(c: &mut Criterion) {
    let mut buffer = CellBuffer::new(200, 50);

    c.bench_function("buffer_clear", |b| {
        b.iter(|| buffer.clear(black_box(Some(Rgba::BLACK))))
    });

    c.bench_function("buffer_draw_text_short", |b| {
        b.iter(|| buffer.draw_text(0, 0, black_box("Hello, World!"), Some(Rgba::WHITE), None))
    });

    c.bench_function("buffer_draw_text_graphemes", |b| {
        let text = "e\u{301}👨‍👩‍👧 ".repeat(20);
        b.iter(|| buffer.draw_text(0, 1, black_box(&text), Some(Rgba::WHITE), None))
    });

    c.bench_function("buffer_draw_box_single", |b| {
        b.iter(|| {
            buffer.draw_box(
                black_box(10),
                black_box(5),
                60,
                20,
                BorderStyle::Single,
                Some(Rgba::CYAN),
                Some(Rgba::BLUE),
            )
        })
    });
}

/// Frame with a box and a column of text, shifted by `offset` rows.
fn scene_frame(width: u32, height: u32, offset: i32) -> CellBuffer {
    let mut buf = CellBuffer::new(width, height);
    buf.draw_box(2, 1, width as i32 - 4, height as i32 - 2, BorderStyle::Round, Some(Rgba::WHITE), Some(Rgba::BLACK));
    for row in 0..height as i32 - 4 {
        buf.draw_text(4, 2 + row, &format!("line {}", row + offset), Some(Rgba::GREEN), None);
    }
    buf
}

fn buffer_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_ansi");
    for (w, h) in [(80u32, 24u32), (200, 50)] {
        let base = scene_frame(w, h, 0);
        let scrolled = scene_frame(w, h, 1);
        let size = format!("{w}x{h}");

        group.bench_with_input(BenchmarkId::new("full", &size), &base, |b, frame| {
            b.iter(|| black_box(frame.to_ansi(None)))
        });
        group.bench_with_input(BenchmarkId::new("unchanged", &size), &base, |b, frame| {
            b.iter(|| black_box(frame.to_ansi(Some(&base))))
        });
        group.bench_with_input(BenchmarkId::new("scrolled", &size), &scrolled, |b, frame| {
            b.iter(|| black_box(frame.to_ansi(Some(&base))))
        });
    }
    group.finish();
}

criterion_group!(benches, buffer_creation, buffer_drawing, buffer_diff);
criterion_main!(benches);
