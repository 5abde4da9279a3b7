//! Box-model properties forwarded to the flexbox solver.
//!
//! [`LayoutStyle`] is the scene-side description of a node's box model. It is
//! converted to a [`taffy::Style`] whenever it changes; the solver owns the
//! actual layout computation.

use crate::error::{Error, Result};
use std::str::FromStr;
use taffy::{
    Dimension as TaffyDimension, Display, LengthPercentage, LengthPercentageAuto, Rect, Size,
    Style,
};

/// A length along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dimension {
    #[default]
    Auto,
    /// Absolute size in terminal cells.
    Cells(f32),
    /// Percentage of the parent (0–100).
    Percent(f32),
}

impl Dimension {
    fn to_taffy(self) -> TaffyDimension {
        match self {
            Self::Auto => TaffyDimension::Auto,
            Self::Cells(n) => TaffyDimension::Length(n),
            Self::Percent(p) => TaffyDimension::Percent(p / 100.0),
        }
    }

    fn to_lpa(self) -> LengthPercentageAuto {
        match self {
            Self::Auto => LengthPercentageAuto::Auto,
            Self::Cells(n) => LengthPercentageAuto::Length(n),
            Self::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
        }
    }

    // Padding has no auto form
    fn to_lp(self) -> LengthPercentage {
        match self {
            Self::Auto => LengthPercentage::Length(0.0),
            Self::Cells(n) => LengthPercentage::Length(n),
            Self::Percent(p) => LengthPercentage::Percent(p / 100.0),
        }
    }
}

impl FromStr for Dimension {
    type Err = Error;

    /// Parses `auto`, `12` and `50%`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "auto" {
            return Ok(Self::Auto);
        }
        let invalid = || Error::InvalidProperty {
            name: "dimension".to_string(),
            value: s.to_string(),
        };
        if let Some(pct) = s.strip_suffix('%') {
            return pct.trim().parse().map(Self::Percent).map_err(|_| invalid());
        }
        s.parse().map(Self::Cells).map_err(|_| invalid())
    }
}

impl From<f32> for Dimension {
    fn from(n: f32) -> Self {
        Self::Cells(n)
    }
}

impl From<i32> for Dimension {
    fn from(n: i32) -> Self {
        Self::Cells(n as f32)
    }
}

/// One value per box edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
}

impl Edges {
    /// The same value on every edge.
    #[must_use]
    pub const fn all(value: Dimension) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Zero on every edge.
    #[must_use]
    pub const fn zero() -> Self {
        Self::all(Dimension::Cells(0.0))
    }

    fn to_lpa(self) -> Rect<LengthPercentageAuto> {
        Rect {
            top: self.top.to_lpa(),
            right: self.right.to_lpa(),
            bottom: self.bottom.to_lpa(),
            left: self.left.to_lpa(),
        }
    }

    fn to_lp(self) -> Rect<LengthPercentage> {
        Rect {
            top: self.top.to_lp(),
            right: self.right.to_lp(),
            bottom: self.bottom.to_lp(),
            left: self.left.to_lp(),
        }
    }
}

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $prop:literal { $($variant:ident = $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::InvalidProperty {
                        name: $prop.to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

keyword_enum! {
    /// Main axis direction.
    FlexDirection => "flexDirection" {
        Row = "row",
        Column = "column",
        RowReverse = "row-reverse",
        ColumnReverse = "column-reverse",
    }
}

keyword_enum! {
    FlexWrap => "flexWrap" {
        NoWrap = "nowrap",
        Wrap = "wrap",
        WrapReverse = "wrap-reverse",
    }
}

keyword_enum! {
    /// Cross-axis alignment for `alignItems` / `alignSelf`.
    Align => "align" {
        FlexStart = "flex-start",
        Center = "center",
        FlexEnd = "flex-end",
        Stretch = "stretch",
        Auto = "auto",
    }
}

keyword_enum! {
    JustifyContent => "justifyContent" {
        FlexStart = "flex-start",
        Center = "center",
        FlexEnd = "flex-end",
        SpaceBetween = "space-between",
        SpaceAround = "space-around",
        SpaceEvenly = "space-evenly",
    }
}

keyword_enum! {
    Overflow => "overflow" {
        Visible = "visible",
        Hidden = "hidden",
        Scroll = "scroll",
    }
}

keyword_enum! {
    PositionType => "position" {
        Relative = "relative",
        Absolute = "absolute",
    }
}

impl Align {
    fn to_taffy(self) -> Option<taffy::AlignItems> {
        match self {
            Self::FlexStart => Some(taffy::AlignItems::FlexStart),
            Self::Center => Some(taffy::AlignItems::Center),
            Self::FlexEnd => Some(taffy::AlignItems::FlexEnd),
            Self::Stretch => Some(taffy::AlignItems::Stretch),
            Self::Auto => None,
        }
    }
}

/// Box-model property set of a scene node.
///
/// Defaults match a column flex container whose items start at the top-left
/// and may shrink but not grow.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutStyle {
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,

    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub align_items: Align,
    /// `Auto` defers to the parent's `align_items`.
    pub align_self: Align,
    pub justify_content: JustifyContent,

    pub position: PositionType,
    pub overflow: Overflow,
    /// Offsets (`top`/`right`/`bottom`/`left`).
    pub inset: Edges,
    pub margin: Edges,
    pub padding: Edges,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            flex_direction: FlexDirection::Column,
            flex_wrap: FlexWrap::NoWrap,
            align_items: Align::FlexStart,
            align_self: Align::Auto,
            justify_content: JustifyContent::FlexStart,
            position: PositionType::Relative,
            overflow: Overflow::Visible,
            inset: Edges::all(Dimension::Auto),
            margin: Edges::zero(),
            padding: Edges::zero(),
        }
    }
}

impl LayoutStyle {
    #[must_use]
    pub fn size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self.height = height.into();
        self
    }

    #[must_use]
    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self
    }

    #[must_use]
    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = height.into();
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = direction;
        self
    }

    #[must_use]
    pub fn grow(mut self, grow: f32) -> Self {
        self.flex_grow = grow;
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: impl Into<Dimension>) -> Self {
        self.padding = Edges::all(padding.into());
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: impl Into<Dimension>) -> Self {
        self.margin = Edges::all(margin.into());
        self
    }

    /// Absolute positioning at `(left, top)` within the parent.
    #[must_use]
    pub fn absolute(mut self, left: impl Into<Dimension>, top: impl Into<Dimension>) -> Self {
        self.position = PositionType::Absolute;
        self.inset.left = left.into();
        self.inset.top = top.into();
        self
    }

    /// Solver style. Invisible nodes are taken out of layout with
    /// `display: none`.
    #[must_use]
    pub fn to_taffy(&self, visible: bool) -> Style {
        Style {
            display: if visible { Display::Flex } else { Display::None },
            position: match self.position {
                PositionType::Relative => taffy::Position::Relative,
                PositionType::Absolute => taffy::Position::Absolute,
            },
            overflow: {
                let axis = match self.overflow {
                    Overflow::Visible => taffy::Overflow::Visible,
                    Overflow::Hidden => taffy::Overflow::Hidden,
                    Overflow::Scroll => taffy::Overflow::Scroll,
                };
                taffy::Point { x: axis, y: axis }
            },
            inset: self.inset.to_lpa(),
            margin: self.margin.to_lpa(),
            padding: self.padding.to_lp(),

            size: Size {
                width: self.width.to_taffy(),
                height: self.height.to_taffy(),
            },
            min_size: Size {
                width: self.min_width.to_taffy(),
                height: self.min_height.to_taffy(),
            },
            max_size: Size {
                width: self.max_width.to_taffy(),
                height: self.max_height.to_taffy(),
            },

            flex_direction: match self.flex_direction {
                FlexDirection::Row => taffy::FlexDirection::Row,
                FlexDirection::Column => taffy::FlexDirection::Column,
                FlexDirection::RowReverse => taffy::FlexDirection::RowReverse,
                FlexDirection::ColumnReverse => taffy::FlexDirection::ColumnReverse,
            },
            flex_wrap: match self.flex_wrap {
                FlexWrap::NoWrap => taffy::FlexWrap::NoWrap,
                FlexWrap::Wrap => taffy::FlexWrap::Wrap,
                FlexWrap::WrapReverse => taffy::FlexWrap::WrapReverse,
            },
            flex_grow: self.flex_grow,
            flex_shrink: self.flex_shrink,
            flex_basis: self.flex_basis.to_taffy(),
            align_items: self.align_items.to_taffy(),
            align_self: self.align_self.to_taffy(),
            justify_content: Some(match self.justify_content {
                JustifyContent::FlexStart => taffy::JustifyContent::FlexStart,
                JustifyContent::Center => taffy::JustifyContent::Center,
                JustifyContent::FlexEnd => taffy::JustifyContent::FlexEnd,
                JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
                JustifyContent::SpaceAround => taffy::JustifyContent::SpaceAround,
                JustifyContent::SpaceEvenly => taffy::JustifyContent::SpaceEvenly,
            }),
            ..Style::default()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)] // Exact float comparison is intentional in tests
    use super::*;

    #[test]
    fn test_dimension_parse() {
        assert_eq!("auto".parse::<Dimension>().unwrap(), Dimension::Auto);
        assert_eq!("12".parse::<Dimension>().unwrap(), Dimension::Cells(12.0));
        assert_eq!("50%".parse::<Dimension>().unwrap(), Dimension::Percent(50.0));
        assert!("wide".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_keyword_parse() {
        assert_eq!("row".parse::<FlexDirection>().unwrap(), FlexDirection::Row);
        assert_eq!(
            "space-between".parse::<JustifyContent>().unwrap(),
            JustifyContent::SpaceBetween
        );
        let err = "sideways".parse::<FlexDirection>().unwrap_err();
        assert!(err.to_string().contains("flexDirection"));
        assert_eq!(Align::Stretch.as_str(), "stretch");
    }

    #[test]
    fn test_defaults_to_taffy() {
        let style = LayoutStyle::default().to_taffy(true);
        assert_eq!(style.display, Display::Flex);
        assert_eq!(style.flex_direction, taffy::FlexDirection::Column);
        assert_eq!(style.flex_shrink, 1.0);
        assert_eq!(style.align_items, Some(taffy::AlignItems::FlexStart));
        assert_eq!(style.align_self, None);
    }

    #[test]
    fn test_invisible_is_display_none() {
        let style = LayoutStyle::default().to_taffy(false);
        assert_eq!(style.display, Display::None);
    }

    #[test]
    fn test_percent_scaled_for_solver() {
        let style = LayoutStyle::default().width(Dimension::Percent(50.0)).to_taffy(true);
        assert_eq!(style.size.width, TaffyDimension::Percent(0.5));
    }
}
