//! RGBA color type and color-input parsing.
//!
//! This module provides the [`Rgba`] type, which stores red/green/blue as
//! 0-255 integers and alpha as a 0.0-1.0 float, plus [`parse_color`], the
//! lenient parser every drawing entry point funnels caller input through:
//!
//! - **Named colors**: `black`, `white`, `red`, `green`, `blue`, `yellow`,
//!   `cyan`, `magenta`, `gray`/`grey` (case-insensitive)
//! - **Hex literals**: `#RRGGBB` or `#RRGGBBAA`, leading `#` optional
//! - **Tuples**: `(r, g, b)` is opaque, `(r, g, b, a)` scales `a` from 0-255
//!
//! Anything unrecognized parses to opaque black. Use [`str::parse`] for the
//! strict variant that reports an error instead.
//!
//! # Examples
//!
//! ```
//! use termscene::color::{Rgba, parse_color};
//!
//! assert_eq!(parse_color("red"), parse_color("#ff0000"));
//! assert_eq!(parse_color((0, 0, 255)), Rgba::BLUE);
//! assert_eq!(parse_color("not a color"), Rgba::BLACK);
//! assert!(Rgba::from_ints(0, 0, 0, 0).is_transparent());
//! ```

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// RGBA color with integer channels and a fractional alpha.
///
/// Equality is exact channel equality, alpha included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in [0.0, 1.0].
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// Opaque cyan.
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    /// Opaque magenta.
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create a color from channels and a 0.0-1.0 alpha.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color whose alpha is given on the 0-255 scale.
    #[must_use]
    pub fn from_ints(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: f32::from(a) / 255.0,
        }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional, case-insensitive).
    ///
    /// Returns `None` for any other shape, including the short `#RGB` form.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::from_ints(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => None,
        }
    }

    /// Channels with alpha rounded onto the 0-255 scale.
    #[must_use]
    pub fn to_ints(self) -> (u8, u8, u8, u8) {
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        (self.r, self.g, self.b, a)
    }

    /// `#rrggbb` (alpha is not encoded).
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0.0
    }

    #[must_use]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    /// Look up a color in the named-color table.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "cyan" => Self::CYAN,
            "magenta" => Self::MAGENTA,
            "gray" | "grey" => Self::GRAY,
            _ => return None,
        };
        Some(color)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.to_ints();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Strict parse: names and hex only, errors instead of falling back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .or_else(|| Self::from_hex(s))
            .ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

/// Any of the accepted color input shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorInput {
    Rgba(Rgba),
    Text(String),
    Rgb(u8, u8, u8),
    /// Alpha on the 0-255 scale.
    Rgba8(u8, u8, u8, u8),
}

impl From<Rgba> for ColorInput {
    fn from(color: Rgba) -> Self {
        Self::Rgba(color)
    }
}

impl From<&str> for ColorInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ColorInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<(u8, u8, u8)> for ColorInput {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl From<(u8, u8, u8, u8)> for ColorInput {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::Rgba8(r, g, b, a)
    }
}

/// Lenient color parse. Unrecognized text yields opaque black.
#[must_use]
pub fn parse_color(input: impl Into<ColorInput>) -> Rgba {
    match input.into() {
        ColorInput::Rgba(color) => color,
        ColorInput::Text(s) => Rgba::from_name(&s)
            .or_else(|| Rgba::from_hex(&s))
            .unwrap_or(Rgba::BLACK),
        ColorInput::Rgb(r, g, b) => Rgba::rgb(r, g, b),
        ColorInput::Rgba8(r, g, b, a) => Rgba::from_ints(r, g, b, a),
    }
}
