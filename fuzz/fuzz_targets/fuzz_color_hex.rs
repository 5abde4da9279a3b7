//! Fuzz target for color parsing.
//!
//! `Rgba::from_hex` and the lenient `parse_color` must accept any string
//! without panicking, and a parsed hex color must survive `to_hex`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use termscene::color::{Rgba, parse_color};

fuzz_target!(|data: &str| {
    if let Some(color) = Rgba::from_hex(data) {
        let again = Rgba::from_hex(&color.to_hex()).map(Rgba::to_ints);
        let (r, g, b, _) = color.to_ints();
        assert_eq!(again.map(|(r, g, b, _)| (r, g, b)), Some((r, g, b)));
    }

    let _ = parse_color(data);
    let _ = data.parse::<Rgba>();

    // Suffixes starting on a char boundary
    for (i, _) in data.char_indices().take(10) {
        let _ = Rgba::from_hex(&data[i..]);
        let _ = parse_color(&data[i..]);
    }
});
