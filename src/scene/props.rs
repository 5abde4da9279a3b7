//! Name-based property writes.
//!
//! Declarative front ends address node properties by name (`width`,
//! `borderStyle`, `content`, ...). [`SceneGraph::set_property`] maps those
//! names onto typed fields. Both camelCase and snake_case spellings are
//! accepted.

use super::{Dimension, Edges, LayoutStyle, NodeId, NodeKind, SceneGraph};
use crate::buffer::BorderStyle;
use crate::color::{Rgba, parse_color};
use crate::error::{Error, Result};
use std::fmt;

/// A dynamically typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Unset / removed.
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Color(Rgba),
    /// Nested property bag, as used by `style`.
    Map(Vec<(String, PropValue)>),
}

impl PropValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text rendering of scalar values; integral numbers print without a
    /// fractional part.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Color(c) => c.to_hex(),
            Self::Map(_) => "[map]".to_string(),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Rgba> for PropValue {
    fn from(c: Rgba) -> Self {
        Self::Color(c)
    }
}

fn invalid(name: &str, value: &PropValue) -> Error {
    Error::InvalidProperty {
        name: name.to_string(),
        value: value.to_text(),
    }
}

fn as_dimension(name: &str, value: &PropValue) -> Result<Dimension> {
    match value {
        PropValue::Null => Ok(Dimension::Auto),
        PropValue::Number(n) => Ok(Dimension::Cells(*n as f32)),
        PropValue::Text(s) => s.parse().map_err(|_| invalid(name, value)),
        _ => Err(invalid(name, value)),
    }
}

fn as_number(name: &str, value: &PropValue) -> Result<f64> {
    match value {
        PropValue::Number(n) => Ok(*n),
        PropValue::Text(s) => s.trim().parse().map_err(|_| invalid(name, value)),
        _ => Err(invalid(name, value)),
    }
}

fn as_bool(name: &str, value: &PropValue) -> Result<bool> {
    match value {
        PropValue::Null => Ok(false),
        PropValue::Bool(b) => Ok(*b),
        _ => Err(invalid(name, value)),
    }
}

fn as_keyword<T: std::str::FromStr<Err = Error>>(name: &str, value: &PropValue) -> Result<T> {
    match value {
        PropValue::Text(s) => s.parse(),
        _ => Err(invalid(name, value)),
    }
}

/// Optional color; strings go through the lenient color parser.
fn as_color(name: &str, value: &PropValue) -> Result<Option<Rgba>> {
    match value {
        PropValue::Null => Ok(None),
        PropValue::Color(c) => Ok(Some(*c)),
        PropValue::Text(s) => Ok(Some(parse_color(s.as_str()))),
        _ => Err(invalid(name, value)),
    }
}

/// `snake_case` → `camelCase`.
fn canonical(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Apply a box-model property. Returns `Ok(false)` when `name` is not one.
fn apply_layout(style: &mut LayoutStyle, name: &str, value: &PropValue) -> Result<bool> {
    let edge = |edges: &mut Edges, which: &str| -> Result<()> {
        let d = as_dimension(name, value)?;
        match which {
            "Top" => edges.top = d,
            "Right" => edges.right = d,
            "Bottom" => edges.bottom = d,
            "Left" => edges.left = d,
            "" => *edges = Edges::all(d),
            _ => return Err(invalid(name, value)),
        }
        Ok(())
    };

    match name {
        "width" => style.width = as_dimension(name, value)?,
        "height" => style.height = as_dimension(name, value)?,
        "minWidth" => style.min_width = as_dimension(name, value)?,
        "minHeight" => style.min_height = as_dimension(name, value)?,
        "maxWidth" => style.max_width = as_dimension(name, value)?,
        "maxHeight" => style.max_height = as_dimension(name, value)?,
        "flexGrow" => style.flex_grow = as_number(name, value)? as f32,
        "flexShrink" => style.flex_shrink = as_number(name, value)? as f32,
        "flexBasis" => style.flex_basis = as_dimension(name, value)?,
        "flexDirection" => style.flex_direction = as_keyword(name, value)?,
        "flexWrap" => style.flex_wrap = as_keyword(name, value)?,
        "alignItems" => style.align_items = as_keyword(name, value)?,
        "alignSelf" => style.align_self = as_keyword(name, value)?,
        "justifyContent" => style.justify_content = as_keyword(name, value)?,
        "position" => style.position = as_keyword(name, value)?,
        "overflow" => style.overflow = as_keyword(name, value)?,
        "top" => style.inset.top = as_dimension(name, value)?,
        "right" => style.inset.right = as_dimension(name, value)?,
        "bottom" => style.inset.bottom = as_dimension(name, value)?,
        "left" => style.inset.left = as_dimension(name, value)?,
        _ => {
            if let Some(which) = name.strip_prefix("margin") {
                edge(&mut style.margin, which)?;
            } else if let Some(which) = name.strip_prefix("padding") {
                edge(&mut style.padding, which)?;
            } else {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Apply a kind-specific paint property. Returns `Ok(false)` when the kind
/// has no such property.
fn apply_kind(kind: &mut NodeKind, name: &str, value: &PropValue) -> Result<bool> {
    match kind {
        NodeKind::Box(props) => match name {
            "borderStyle" => {
                props.border_style = match value {
                    PropValue::Null => BorderStyle::None,
                    _ => as_keyword(name, value)?,
                };
            }
            "borderColor" => props.border_color = as_color(name, value)?,
            "backgroundColor" => props.background_color = as_color(name, value)?,
            _ => return Ok(false),
        },
        NodeKind::Text(props) => match name {
            "content" => props.content = value.to_text(),
            "color" => props.color = as_color(name, value)?,
            "backgroundColor" => props.background_color = as_color(name, value)?,
            "bold" => props.bold = as_bool(name, value)?,
            "italic" => props.italic = as_bool(name, value)?,
            "underline" => props.underline = as_bool(name, value)?,
            _ => return Ok(false),
        },
        NodeKind::Root => return Ok(false),
    }
    Ok(true)
}

impl SceneGraph {
    /// Write a property by name.
    ///
    /// `id` renames the node, `style` expands a [`PropValue::Map`] into one
    /// write per entry, and everything else is routed to the node's common,
    /// box-model or kind-specific fields. Unknown names and uninterpretable
    /// values are reported as [`Error::InvalidProperty`]. Writes to dead
    /// nodes are ignored.
    pub fn set_property(&mut self, node: NodeId, name: &str, value: &PropValue) -> Result<()> {
        if !self.contains(node) {
            return Ok(());
        }
        let name = canonical(name);
        match name.as_str() {
            "id" => match value {
                PropValue::Text(_) | PropValue::Number(_) => {
                    self.set_id(node, value.to_text());
                    Ok(())
                }
                _ => Err(invalid("id", value)),
            },
            "style" => match value {
                PropValue::Map(entries) => {
                    for (key, entry) in entries {
                        self.set_property(node, key, entry)?;
                    }
                    Ok(())
                }
                PropValue::Null => Ok(()),
                _ => Err(invalid("style", value)),
            },
            "visible" => {
                let visible = match value {
                    PropValue::Null => true,
                    _ => as_bool("visible", value)?,
                };
                self.set_visible(node, visible);
                Ok(())
            }
            "zIndex" => {
                let z = match value {
                    PropValue::Null => 0.0,
                    _ => as_number("zIndex", value)?,
                };
                self.set_z_index(node, z as i32);
                Ok(())
            }
            _ => self.set_typed_property(node, &name, value),
        }
    }

    fn set_typed_property(&mut self, node: NodeId, name: &str, value: &PropValue) -> Result<()> {
        let Some(current) = self.node(node) else {
            return Ok(());
        };

        // Validate against copies first so a failed write leaves the node
        // untouched.
        let mut style = current.style.clone();
        if apply_layout(&mut style, name, value)? {
            self.update_style(node, |s| *s = style);
            return Ok(());
        }

        let mut kind = current.kind.clone();
        if apply_kind(&mut kind, name, value)? {
            self.update_kind(node, |k| *k = kind);
            return Ok(());
        }

        Err(invalid(name, value))
    }
}
