//! Retained-mode scene graph.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are addressed by
//! generation-checked [`NodeId`] handles. A parent owns its children; the
//! child keeps only the parent's handle. Layout is delegated to taffy: every
//! scene node mirrors a solver node whose style is derived from the scene
//! node's [`LayoutStyle`].
//!
//! # Examples
//!
//! ```
//! use termscene::scene::{LayoutStyle, NodeOptions, SceneGraph, TextProps};
//! use termscene::CellBuffer;
//!
//! let mut graph = SceneGraph::new(20, 4).unwrap();
//! let root = graph.root();
//! let label = graph
//!     .create_text(TextProps::new("hi"), NodeOptions::default())
//!     .unwrap();
//! graph.add(root, label, None);
//!
//! let mut buf = CellBuffer::new(20, 4);
//! graph.render(&mut buf).unwrap();
//! assert!(buf.row_text(0).starts_with("hi"));
//! ```

mod kind;
mod layout;
mod props;

pub use kind::{BoxProps, NodeKind, TextProps};
pub use layout::{
    Align, Dimension, Edges, FlexDirection, FlexWrap, JustifyContent, LayoutStyle, Overflow,
    PositionType,
};
pub use props::PropValue;

use crate::buffer::CellBuffer;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use taffy::{AvailableSpace, Size, TaffyTree};

/// Id given to the root node.
pub const ROOT_ID: &str = "__root__";

/// Receiver of render requests raised by scene mutations.
pub trait RenderContext {
    fn request_render(&self);
}

/// Handle to a node in a [`SceneGraph`].
///
/// Handles of destroyed nodes stay safe to use: the slot's generation moves
/// on, so lookups through a stale handle find nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Computed absolute geometry of a node, valid after a layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Construction options shared by every node kind.
#[derive(Clone, Debug)]
pub struct NodeOptions {
    /// Defaults to `renderable-{n}`.
    pub id: Option<String>,
    pub style: LayoutStyle,
    pub visible: bool,
    pub z_index: i32,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            id: None,
            style: LayoutStyle::default(),
            visible: true,
            z_index: 0,
        }
    }
}

impl NodeOptions {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

type DestroyListener = Box<dyn FnOnce(NodeId)>;

/// Intrinsic size handed to the solver's measure callback for text leaves.
#[derive(Clone, Copy, Debug, Default)]
struct TextMeasure {
    width: f32,
    height: f32,
}

/// A node's state.
pub struct SceneNode {
    num: u64,
    id: String,
    kind: NodeKind,
    style: LayoutStyle,
    visible: bool,
    z_index: i32,

    parent: Option<NodeId>,
    children: Vec<NodeId>,
    children_by_z: Vec<NodeId>,
    needs_z_sort: bool,
    children_by_id: HashMap<String, NodeId>,

    layout_node: taffy::NodeId,
    bounds: Bounds,
    destroy_listeners: Vec<DestroyListener>,
}

impl SceneNode {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Graph-wide creation number.
    #[must_use]
    pub fn num(&self) -> u64 {
        self.num
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn style(&self) -> &LayoutStyle {
        &self.style
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("num", &self.num)
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("visible", &self.visible)
            .field("z_index", &self.z_index)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Arena of scene nodes plus the layout solver tree that mirrors it.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    solver: TaffyTree<TextMeasure>,
    next_num: u64,
    by_number: HashMap<u64, NodeId>,
    root: NodeId,
    width: u32,
    height: u32,
    context: Option<Rc<dyn RenderContext>>,
    pending_release: Vec<NodeId>,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("root", &self.root)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("live_nodes", &self.by_number.len())
            .finish_non_exhaustive()
    }
}

/// Scene shared between the engine and reconciler adapters on one thread.
pub type SharedScene = Rc<std::cell::RefCell<SceneGraph>>;

/// Destroy listeners detached from their nodes and not yet called.
#[must_use = "destroy listeners only run through notify"]
#[derive(Default)]
pub struct Destroyed {
    listeners: Vec<(NodeId, DestroyListener)>,
}

impl Destroyed {
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Call every listener in destruction order.
    pub fn notify(self) {
        for (id, listener) in self.listeners {
            listener(id);
        }
    }
}

impl fmt::Debug for Destroyed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destroyed")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Destroy `id` and its subtree, calling destroy listeners once the scene
/// is no longer borrowed. Listeners may read or edit the scene.
pub fn destroy_shared(scene: &SharedScene, id: NodeId) {
    let destroyed = scene.borrow_mut().destroy_deferred(id);
    destroyed.notify();
}

impl SceneGraph {
    /// Create a graph whose root is a column flex container of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            solver: TaffyTree::new(),
            next_num: 0,
            by_number: HashMap::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            width,
            height,
            context: None,
            pending_release: Vec::new(),
        };
        let style = LayoutStyle::default()
            .direction(FlexDirection::Column)
            .size(width as f32, height as f32);
        graph.root = graph.create_node(NodeKind::Root, NodeOptions::default().id(ROOT_ID).style(style))?;
        Ok(graph)
    }

    /// Wrap in the shared handle used by the engine and adapters.
    #[must_use]
    pub fn into_shared(self) -> SharedScene {
        Rc::new(std::cell::RefCell::new(self))
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Install the receiver of render requests.
    pub fn set_context(&mut self, context: Option<Rc<dyn RenderContext>>) {
        self.context = context;
    }

    fn request_render(&self) {
        if let Some(ctx) = &self.context {
            ctx.request_render();
        }
    }

    // ------------------------------------------------------------------
    // Arena
    // ------------------------------------------------------------------

    /// Look up a live node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Like [`node`](Self::node) but reports stale handles as an error.
    pub fn try_node(&self, id: NodeId) -> Result<&SceneNode> {
        self.node(id).ok_or(Error::NodeNotFound(id))
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether `id` no longer refers to a live node.
    #[must_use]
    pub fn is_destroyed(&self, id: NodeId) -> bool {
        !self.contains(id)
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Look a node up by its creation number.
    #[must_use]
    pub fn node_by_number(&self, num: u64) -> Option<NodeId> {
        self.by_number.get(&num).copied()
    }

    /// Create a detached node.
    pub fn create_node(&mut self, kind: NodeKind, options: NodeOptions) -> Result<NodeId> {
        let taffy_style = options.style.to_taffy(options.visible);
        let layout_node = match &kind {
            NodeKind::Text(props) => {
                let (width, height) = props.measure();
                self.solver
                    .new_leaf_with_context(taffy_style, TextMeasure { width, height })?
            }
            _ => self.solver.new_leaf(taffy_style)?,
        };

        self.next_num += 1;
        let num = self.next_num;
        let node = SceneNode {
            num,
            id: options.id.unwrap_or_else(|| format!("renderable-{num}")),
            kind,
            style: options.style,
            visible: options.visible,
            z_index: options.z_index,
            parent: None,
            children: Vec::new(),
            children_by_z: Vec::new(),
            needs_z_sort: false,
            children_by_id: HashMap::new(),
            layout_node,
            bounds: Bounds::default(),
            destroy_listeners: Vec::new(),
        };

        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        };
        self.by_number.insert(num, id);
        Ok(id)
    }

    pub fn create_box(&mut self, props: BoxProps, options: NodeOptions) -> Result<NodeId> {
        self.create_node(NodeKind::Box(props), options)
    }

    pub fn create_text(&mut self, props: TextProps, options: NodeOptions) -> Result<NodeId> {
        self.create_node(NodeKind::Text(props), options)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children in insertion order (empty for unknown nodes).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Direct child of `parent` with the given id.
    #[must_use]
    pub fn get_renderable(&self, parent: NodeId, id: &str) -> Option<NodeId> {
        self.node(parent)
            .and_then(|n| n.children_by_id.get(id).copied())
    }

    /// Depth-first search below `from` (excluding `from` itself).
    #[must_use]
    pub fn find_descendant_by_id(&self, from: NodeId, id: &str) -> Option<NodeId> {
        for &child in self.children(from) {
            if self.node(child).is_some_and(|n| n.id == id) {
                return Some(child);
            }
            if let Some(found) = self.find_descendant_by_id(child, id) {
                return Some(found);
            }
        }
        None
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Attach `child` under `parent` at `index` (default: the end).
    ///
    /// A child already under another parent is detached first; a child
    /// already under `parent` is moved. Returns the index it was inserted at,
    /// or `None` when either node is dead or the move would create a cycle.
    pub fn add(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Option<usize> {
        if !self.contains(parent) || !self.contains(child) {
            return None;
        }
        if self.is_ancestor_or_self(child, parent) {
            emit_log(
                LogLevel::Warn,
                &format!("refusing to add node {child} under its own descendant {parent}"),
            );
            return None;
        }

        let (child_layout, child_id, old_parent) = {
            let c = self.node(child)?;
            (c.layout_node, c.id.clone(), c.parent)
        };
        let parent_layout = self.node(parent)?.layout_node;

        if old_parent == Some(parent) {
            let _ = self.solver.remove_child(parent_layout, child_layout);
            let p = self.node_mut(parent)?;
            if let Some(pos) = p.children.iter().position(|&c| c == child) {
                p.children.remove(pos);
            }
        } else {
            if let Some(old) = old_parent {
                self.remove(old, &child_id);
            }
            self.node_mut(child)?.parent = Some(parent);
            let p = self.node_mut(parent)?;
            p.needs_z_sort = true;
            p.children_by_id.insert(child_id, child);
            p.children_by_z.push(child);
        }

        let p = self.node_mut(parent)?;
        let at = index.unwrap_or(p.children.len()).min(p.children.len());
        p.children.insert(at, child);
        if let Err(e) = self.solver.insert_child_at_index(parent_layout, at, child_layout) {
            emit_log(LogLevel::Error, &format!("layout insert failed: {e}"));
        }
        self.request_render();
        Some(at)
    }

    /// Insert `child` immediately before `anchor`, or append when the anchor
    /// is absent or not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Option<usize> {
        let children = self.children(parent);
        let Some(mut at) = anchor.and_then(|a| children.iter().position(|&c| c == a)) else {
            return self.add(parent, child, None);
        };
        // Moving forward within the same parent: the anchor shifts left once
        // the child is taken out.
        if let Some(current) = children.iter().position(|&c| c == child) {
            if current < at {
                at -= 1;
            }
        }
        self.add(parent, child, Some(at))
    }

    /// Detach the child with the given id. No-op when there is none.
    pub fn remove(&mut self, parent: NodeId, id: &str) {
        let Some(parent_layout) = self.node(parent).map(|p| p.layout_node) else {
            return;
        };
        let Some(child) = self.node_mut(parent).and_then(|p| p.children_by_id.remove(id)) else {
            return;
        };

        if let Some(p) = self.node_mut(parent) {
            if let Some(pos) = p.children.iter().position(|&c| c == child) {
                p.children.remove(pos);
            }
            if let Some(pos) = p.children_by_z.iter().position(|&c| c == child) {
                p.children_by_z.remove(pos);
            }
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
            let child_layout = c.layout_node;
            let _ = self.solver.remove_child(parent_layout, child_layout);
        }
        self.request_render();
    }

    /// Detach `child` from whatever parent it has.
    pub fn detach(&mut self, child: NodeId) {
        let Some((parent, id)) = self
            .node(child)
            .and_then(|c| c.parent.map(|p| (p, c.id.clone())))
        else {
            return;
        };
        self.remove(parent, &id);
    }

    // ------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------

    /// Register a callback fired once when `id` is destroyed.
    pub fn on_destroy(&mut self, id: NodeId, listener: impl FnOnce(NodeId) + 'static) {
        if let Some(node) = self.node_mut(id) {
            node.destroy_listeners.push(Box::new(listener));
        }
    }

    /// Destroy a node and, recursively, all of its children.
    ///
    /// Idempotent: destroying a dead handle does nothing. Listeners run once
    /// the graph is consistent again; on a [`SharedScene`] use
    /// [`destroy_shared`] so they run after the borrow is released.
    pub fn destroy(&mut self, id: NodeId) {
        self.destroy_deferred(id).notify();
    }

    /// Destroy like [`destroy`](Self::destroy) but hand the fired listeners
    /// back instead of calling them.
    pub fn destroy_deferred(&mut self, id: NodeId) -> Destroyed {
        let mut destroyed = Destroyed::default();
        self.teardown(id, &mut destroyed);
        destroyed
    }

    fn teardown(&mut self, id: NodeId, destroyed: &mut Destroyed) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);

        let children = self.children(id).to_vec();
        for child in children {
            self.teardown(child, destroyed);
        }

        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.by_number.remove(&node.num);
        self.pending_release.retain(|&n| n != id);
        if let Err(e) = self.solver.remove(node.layout_node) {
            emit_log(LogLevel::Error, &format!("layout release failed: {e}"));
        }
        destroyed
            .listeners
            .extend(node.destroy_listeners.into_iter().map(|listener| (id, listener)));
    }

    /// Destroy leaves first, then each parent on the way back up.
    pub fn destroy_recursively(&mut self, id: NodeId) {
        self.destroy_recursively_deferred(id).notify();
    }

    /// [`destroy_recursively`](Self::destroy_recursively) without calling
    /// the listeners.
    pub fn destroy_recursively_deferred(&mut self, id: NodeId) -> Destroyed {
        let mut destroyed = Destroyed::default();
        self.unwind(id, &mut destroyed);
        destroyed
    }

    fn unwind(&mut self, id: NodeId, destroyed: &mut Destroyed) {
        let children = self.children(id).to_vec();
        for child in children {
            self.unwind(child, destroyed);
        }
        self.teardown(id, destroyed);
    }

    /// Queue a removed node for release at the start of the next frame.
    pub fn schedule_release(&mut self, id: NodeId) {
        if self.contains(id) && !self.pending_release.contains(&id) {
            self.pending_release.push(id);
        }
    }

    /// Destroy queued nodes that are still detached. Nodes re-attached since
    /// they were queued are kept.
    pub fn release_detached(&mut self) -> usize {
        let (released, destroyed) = self.release_detached_deferred();
        destroyed.notify();
        released
    }

    /// [`release_detached`](Self::release_detached) without calling the
    /// listeners.
    pub fn release_detached_deferred(&mut self) -> (usize, Destroyed) {
        let queued = std::mem::take(&mut self.pending_release);
        let mut destroyed = Destroyed::default();
        let mut released = 0;
        for id in queued {
            if self.contains(id) && self.parent(id).is_none() && id != self.root {
                self.unwind(id, &mut destroyed);
                released += 1;
            }
        }
        (released, destroyed)
    }

    #[must_use]
    pub fn pending_release_count(&self) -> usize {
        self.pending_release.len()
    }

    // ------------------------------------------------------------------
    // Node properties
    // ------------------------------------------------------------------

    #[must_use]
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.id.as_str())
    }

    /// Rename a node, keeping its parent's id map in sync.
    pub fn set_id(&mut self, node: NodeId, new_id: impl Into<String>) {
        let new_id = new_id.into();
        let Some((old_id, parent)) = self.node(node).map(|n| (n.id.clone(), n.parent)) else {
            return;
        };
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            if p.children_by_id.get(&old_id) == Some(&node) {
                p.children_by_id.remove(&old_id);
            }
            p.children_by_id.insert(new_id.clone(), node);
        }
        if let Some(n) = self.node_mut(node) {
            n.id = new_id;
        }
    }

    /// Show or hide a node. Hidden nodes keep their state but take no part
    /// in layout or paint.
    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        if n.visible == visible {
            return;
        }
        n.visible = visible;
        self.sync_style(node);
        self.request_render();
    }

    pub fn set_z_index(&mut self, node: NodeId, z_index: i32) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        if n.z_index == z_index {
            return;
        }
        n.z_index = z_index;
        let parent = n.parent;
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.needs_z_sort = true;
        }
        self.request_render();
    }

    /// Edit a node's box-model properties.
    pub fn update_style(&mut self, node: NodeId, edit: impl FnOnce(&mut LayoutStyle)) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        edit(&mut n.style);
        self.sync_style(node);
        self.request_render();
    }

    /// Edit a node's kind-specific paint properties. Text content changes
    /// are re-measured for layout.
    pub fn update_kind(&mut self, node: NodeId, edit: impl FnOnce(&mut NodeKind)) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        edit(&mut n.kind);
        let measure = n.kind.as_text().map(TextProps::measure);
        let layout_node = n.layout_node;
        if let Some((width, height)) = measure {
            let ctx = Some(TextMeasure { width, height });
            let synced = self
                .solver
                .set_node_context(layout_node, ctx)
                .and_then(|()| self.solver.mark_dirty(layout_node));
            if let Err(e) = synced {
                emit_log(LogLevel::Error, &format!("text measure update failed: {e}"));
            }
        }
        self.request_render();
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, node: NodeId, content: impl Into<String>) {
        let content = content.into();
        self.update_kind(node, |kind| {
            if let NodeKind::Text(props) = kind {
                props.content = content;
            }
        });
    }

    fn sync_style(&mut self, node: NodeId) {
        let Some(n) = self.node(node) else {
            return;
        };
        let style = n.style.to_taffy(n.visible);
        let layout_node = n.layout_node;
        if let Err(e) = self.solver.set_style(layout_node, style) {
            emit_log(LogLevel::Error, &format!("layout style update failed: {e}"));
        }
    }

    /// Resize the root to the terminal dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let root = self.root;
        self.update_style(root, |style| {
            style.width = Dimension::Cells(width as f32);
            style.height = Dimension::Cells(height as f32);
        });
    }

    // ------------------------------------------------------------------
    // Layout & paint
    // ------------------------------------------------------------------

    /// Computed geometry of a node.
    #[must_use]
    pub fn bounds(&self, node: NodeId) -> Option<Bounds> {
        self.node(node).map(|n| n.bounds)
    }

    /// Children of `node` in paint order: ascending z-index, insertion order
    /// among equals.
    pub fn z_ordered_children(&mut self, node: NodeId) -> Vec<NodeId> {
        self.ensure_z_sorted(node);
        self.node(node)
            .map(|n| n.children_by_z.clone())
            .unwrap_or_default()
    }

    fn ensure_z_sorted(&mut self, node: NodeId) {
        let Some(n) = self.node(node) else {
            return;
        };
        if !n.needs_z_sort {
            return;
        }
        let mut order = n.children_by_z.clone();
        order.sort_by_key(|&c| self.node(c).map_or(0, |c| c.z_index));
        if let Some(n) = self.node_mut(node) {
            n.children_by_z = order;
            n.needs_z_sort = false;
        }
    }

    /// Solve layout for the whole tree against the root size, then store
    /// absolute geometry on every visible node.
    pub fn compute_layout(&mut self) -> Result<()> {
        let Some(root_layout) = self.node(self.root).map(|n| n.layout_node) else {
            return Ok(());
        };
        let available = Size {
            width: AvailableSpace::Definite(self.width as f32),
            height: AvailableSpace::Definite(self.height as f32),
        };
        self.solver.compute_layout_with_measure(
            root_layout,
            available,
            |known, _available, _node, context: Option<&mut TextMeasure>, _style| match context {
                Some(text) => Size {
                    width: known.width.unwrap_or(text.width),
                    height: known.height.unwrap_or(text.height),
                },
                None => Size::ZERO,
            },
        )?;
        self.update_layout(self.root, 0, 0)
    }

    fn update_layout(&mut self, node: NodeId, origin_x: i32, origin_y: i32) -> Result<()> {
        let Some(n) = self.node(node) else {
            return Ok(());
        };
        if !n.visible {
            return Ok(());
        }
        let layout = self.solver.layout(n.layout_node)?;
        let bounds = Bounds {
            x: origin_x + layout.location.x.round() as i32,
            y: origin_y + layout.location.y.round() as i32,
            width: layout.size.width.round().max(1.0) as u32,
            height: layout.size.height.round().max(1.0) as u32,
        };
        if let Some(n) = self.node_mut(node) {
            n.bounds = bounds;
        }

        for child in self.z_ordered_children(node) {
            self.update_layout(child, bounds.x, bounds.y)?;
        }
        Ok(())
    }

    /// Paint `node` and its visible descendants. Parents paint first;
    /// siblings paint in z-order.
    pub fn paint(&self, node: NodeId, buffer: &mut CellBuffer) {
        let Some(n) = self.node(node) else {
            return;
        };
        if !n.visible {
            return;
        }
        let b = n.bounds;
        n.kind.paint(buffer, b.x, b.y, b.width, b.height);
        for &child in &n.children_by_z {
            self.paint(child, buffer);
        }
    }

    /// Full frame for the root: solve layout, then paint.
    pub fn render(&mut self, buffer: &mut CellBuffer) -> Result<()> {
        self.compute_layout()?;
        self.paint(self.root, buffer);
        Ok(())
    }
}
