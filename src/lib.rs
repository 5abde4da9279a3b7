//! `termscene` - retained-mode terminal rendering
//!
//! A double-buffered cell grid diffed into ANSI output, a flexbox scene
//! graph painted into it in z-order, a frame-scheduling render engine, and
//! a keyed reconciler that drives the scene graph from declarative values.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow scene::SceneGraph etc
#![allow(clippy::struct_excessive_bools)] // Terminal state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::type_complexity)] // Callback types in the reactive runtime

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod event;
pub mod reconciler;
pub mod renderer;
pub mod scene;
pub mod services;
pub mod style;
pub mod terminal;

// Re-export core types at crate root
pub use cell::{Cell, CellContent};
pub use color::{Rgba, parse_color};
pub use error::{Error, Result};
pub use event::{LogLevel, clear_log_callback, emit_log, set_log_callback};
pub use style::{CellStyle, TextAttributes};

pub use ansi::AnsiWriter;
pub use buffer::{BorderStyle, CellBuffer};
pub use reconciler::{Adapter, Anchor, Reconciler, SceneAdapter, Value};
pub use renderer::{RenderEngine, RenderStats, RendererConfig};
pub use scene::{Destroyed, NodeId, NodeOptions, SceneGraph, SharedScene, destroy_shared};
pub use terminal::{RawModeGuard, TerminalSession, enable_raw_mode, is_tty, terminal_size};
