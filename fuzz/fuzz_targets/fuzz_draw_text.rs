//! Fuzz target for text drawing and the frame diff.
//!
//! Arbitrary text at arbitrary (possibly off-screen) positions must never
//! panic, and a frame diffed against itself must emit only the reset.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use termscene::ansi::sequences::RESET;
use termscene::buffer::ClipRect;
use termscene::{CellBuffer, Rgba};

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    x: i32,
    y: i32,
    scissor: Option<(i32, i32, u16, u16)>,
    text: String,
}

fuzz_target!(|input: Input| {
    let width = u32::from(input.width % 64);
    let height = u32::from(input.height % 32);
    let mut buf = CellBuffer::new(width, height);
    if let Some((x, y, w, h)) = input.scissor {
        buf.push_scissor(ClipRect {
            x,
            y,
            width: u32::from(w),
            height: u32::from(h),
        });
    }
    buf.draw_text(input.x, input.y, &input.text, Some(Rgba::WHITE), None);
    buf.pop_scissor();

    let copy = buf.clone();
    assert_eq!(buf.to_ansi(Some(&copy)), RESET);
});
