//! Shared helpers for integration tests.
//!
//! - [`RecordingAdapter`]: an in-memory node tree that logs every structural
//!   call made by the reconciler, so tests can count inserts, moves and removals
//! - [`headless_engine`]: a render engine writing into a `Vec<u8>`
//! - [`init_tracing`]: routes the library log callback into `tracing`

#![allow(dead_code)] // Shared test helper; not every integration test uses every utility
#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Once;
use termscene::error::{Error, Result};
use termscene::renderer::{RenderEngine, RendererConfig};
use termscene::{Adapter, LogLevel};

/// One structural call observed by [`RecordingAdapter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// A node that had no parent was inserted.
    Insert { node: u32, before: Option<u32> },
    /// A node that already had a parent was re-inserted.
    Move { node: u32, before: Option<u32> },
    Remove { node: u32 },
    Text { node: u32, value: String },
}

/// Node tree keyed by `u32` with DOM-like move semantics: inserting an
/// attached node takes it out of its current place first.
#[derive(Default)]
pub struct RecordingAdapter {
    children: RefCell<HashMap<u32, Vec<u32>>>,
    parents: RefCell<HashMap<u32, u32>>,
    texts: RefCell<HashMap<u32, String>>,
    kinds: RefCell<HashMap<u32, String>>,
    props: RefCell<Vec<(u32, String, String)>>,
    next: Cell<u32>,
    ops: RefCell<Vec<Op>>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh detached element.
    pub fn node(&self) -> u32 {
        let n = self.next.get() + 1;
        self.next.set(n);
        n
    }

    pub fn children_of(&self, parent: u32) -> Vec<u32> {
        self.children.borrow().get(&parent).cloned().unwrap_or_default()
    }

    /// Text content of the children of `parent`, joined with `|`.
    pub fn text_of(&self, parent: u32) -> String {
        self.children_of(parent)
            .iter()
            .map(|n| self.texts.borrow().get(n).cloned().unwrap_or_else(|| format!("<{n}>")))
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn kind_of(&self, node: u32) -> Option<String> {
        self.kinds.borrow().get(&node).cloned()
    }

    pub fn props(&self) -> Vec<(u32, String, String)> {
        self.props.borrow().clone()
    }

    /// Drain the operation log.
    pub fn take_ops(&self) -> Vec<Op> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    pub fn created(&self) -> u32 {
        self.next.get()
    }

    fn detach(&self, node: u32) -> bool {
        let Some(parent) = self.parents.borrow_mut().remove(&node) else {
            return false;
        };
        if let Some(list) = self.children.borrow_mut().get_mut(&parent) {
            list.retain(|&c| c != node);
        }
        true
    }
}

impl Adapter for RecordingAdapter {
    type Node = u32;
    type Prop = String;

    fn create_element(&self, kind: &str) -> Result<u32> {
        match kind {
            "box" | "text" => {
                let n = self.node();
                self.kinds.borrow_mut().insert(n, kind.to_string());
                Ok(n)
            }
            other => Err(Error::UnknownElement(other.to_string())),
        }
    }

    fn create_text_node(&self, value: &str) -> Result<u32> {
        let n = self.node();
        self.texts.borrow_mut().insert(n, value.to_string());
        Ok(n)
    }

    fn replace_text(&self, node: &u32, value: &str) {
        self.ops.borrow_mut().push(Op::Text {
            node: *node,
            value: value.to_string(),
        });
        self.texts.borrow_mut().insert(*node, value.to_string());
    }

    fn set_property(&self, node: &u32, name: &str, value: &String, _prev: Option<&String>) {
        self.props
            .borrow_mut()
            .push((*node, name.to_string(), value.clone()));
    }

    fn is_text_node(&self, node: &u32) -> bool {
        self.texts.borrow().contains_key(node)
    }

    fn insert_node(&self, parent: &u32, node: &u32, anchor: Option<&u32>) {
        // DOM semantics: inserting a node before itself keeps its place
        let before = if anchor == Some(node) {
            self.get_next_sibling(node)
        } else {
            anchor.copied()
        };
        let moved = self.detach(*node);
        self.ops.borrow_mut().push(if moved {
            Op::Move { node: *node, before }
        } else {
            Op::Insert { node: *node, before }
        });
        let mut children = self.children.borrow_mut();
        let list = children.entry(*parent).or_default();
        let at = before
            .and_then(|a| list.iter().position(|&c| c == a))
            .unwrap_or(list.len());
        list.insert(at, *node);
        self.parents.borrow_mut().insert(*node, *parent);
    }

    fn remove_node(&self, _parent: &u32, node: &u32) {
        self.ops.borrow_mut().push(Op::Remove { node: *node });
        self.detach(*node);
    }

    fn get_parent_node(&self, node: &u32) -> Option<u32> {
        self.parents.borrow().get(node).copied()
    }

    fn get_first_child(&self, node: &u32) -> Option<u32> {
        self.children_of(*node).first().copied()
    }

    fn get_next_sibling(&self, node: &u32) -> Option<u32> {
        let parent = self.get_parent_node(node)?;
        let siblings = self.children_of(parent);
        let at = siblings.iter().position(|c| c == node)?;
        siblings.get(at + 1).copied()
    }
}

/// Count operations by type: `(inserts, moves, removes)`.
pub fn tally(ops: &[Op]) -> (usize, usize, usize) {
    ops.iter().fold((0, 0, 0), |(i, m, r), op| match op {
        Op::Insert { .. } => (i + 1, m, r),
        Op::Move { .. } => (i, m + 1, r),
        Op::Remove { .. } => (i, m, r + 1),
        Op::Text { .. } => (i, m, r),
    })
}

/// Engine with no terminal side effects, writing into memory.
pub fn headless_engine(width: u32, height: u32) -> RenderEngine<Vec<u8>> {
    RenderEngine::new(Vec::new(), width, height, RendererConfig::headless())
        .expect("engine construction")
}

/// Install a `tracing` subscriber once and forward library logs into it.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
        termscene::set_log_callback(|level, message| match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        });
    });
}
