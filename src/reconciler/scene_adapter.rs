//! [`Adapter`] over a shared [`SceneGraph`].

use super::Adapter;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::scene::{BoxProps, NodeId, NodeOptions, PropValue, SceneGraph, SharedScene, TextProps};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Builds a detached node for an element kind.
pub type ElementFactory = Rc<dyn Fn(&mut SceneGraph, NodeOptions) -> Result<NodeId>>;

/// Reconciles into a [`SceneGraph`].
///
/// Element kinds are looked up in a catalogue seeded with `box` and `text`;
/// more can be added with [`register_element`](Self::register_element).
/// Created nodes get ids of the form `{kind}-{n}`, literals `text-node-{n}`,
/// all numbered from one counter.
///
/// Removed nodes are detached immediately and destroyed at the start of the
/// next frame unless they have been re-attached in the meantime, so a node
/// can move between insertion points within one update.
pub struct SceneAdapter {
    scene: SharedScene,
    catalogue: RefCell<HashMap<String, ElementFactory>>,
    next_id: Cell<u64>,
}

impl fmt::Debug for SceneAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self.catalogue.borrow().keys().cloned().collect();
        kinds.sort();
        f.debug_struct("SceneAdapter")
            .field("kinds", &kinds)
            .field("next_id", &self.next_id.get())
            .finish_non_exhaustive()
    }
}

impl SceneAdapter {
    pub fn new(scene: SharedScene) -> Self {
        let adapter = Self {
            scene,
            catalogue: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        };
        adapter.register_element("box", |scene, options| {
            scene.create_box(BoxProps::default(), options)
        });
        adapter.register_element("text", |scene, options| {
            scene.create_text(TextProps::default(), options)
        });
        adapter
    }

    #[must_use]
    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    /// Add or replace the factory for an element kind.
    pub fn register_element(
        &self,
        kind: impl Into<String>,
        factory: impl Fn(&mut SceneGraph, NodeOptions) -> Result<NodeId> + 'static,
    ) {
        self.catalogue
            .borrow_mut()
            .insert(kind.into(), Rc::new(factory));
    }

    #[must_use]
    pub fn has_element(&self, kind: &str) -> bool {
        self.catalogue.borrow().contains_key(kind)
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl Adapter for SceneAdapter {
    type Node = NodeId;
    type Prop = PropValue;

    fn create_element(&self, kind: &str) -> Result<NodeId> {
        let factory = self
            .catalogue
            .borrow()
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::UnknownElement(kind.to_string()))?;
        let options = NodeOptions::default().id(format!("{kind}-{}", self.next_id()));
        factory(&mut self.scene.borrow_mut(), options)
    }

    fn create_text_node(&self, value: &str) -> Result<NodeId> {
        let options = NodeOptions::default().id(format!("text-node-{}", self.next_id()));
        self.scene
            .borrow_mut()
            .create_text(TextProps::literal(value), options)
    }

    fn replace_text(&self, node: &NodeId, value: &str) {
        if !self.is_text_node(node) {
            return;
        }
        self.scene.borrow_mut().set_text(*node, value);
    }

    fn set_property(&self, node: &NodeId, name: &str, value: &PropValue, _prev: Option<&PropValue>) {
        if let Err(e) = self.scene.borrow_mut().set_property(*node, name, value) {
            emit_log(LogLevel::Warn, &format!("property {name} on {node}: {e}"));
        }
    }

    fn is_text_node(&self, node: &NodeId) -> bool {
        self.scene
            .borrow()
            .node(*node)
            .and_then(|n| n.kind().as_text())
            .is_some_and(|text| text.literal)
    }

    fn insert_node(&self, parent: &NodeId, node: &NodeId, anchor: Option<&NodeId>) {
        self.scene
            .borrow_mut()
            .insert_before(*parent, *node, anchor.copied());
    }

    fn remove_node(&self, parent: &NodeId, node: &NodeId) {
        let mut scene = self.scene.borrow_mut();
        if scene.parent(*node) == Some(*parent) {
            scene.detach(*node);
        }
        scene.schedule_release(*node);
    }

    fn get_parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.scene.borrow().parent(*node)
    }

    fn get_first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.scene.borrow().children(*node).first().copied()
    }

    fn get_next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let scene = self.scene.borrow();
        let parent = scene.parent(*node)?;
        let siblings = scene.children(parent);
        let at = siblings.iter().position(|c| c == node)?;
        siblings.get(at + 1).copied()
    }
}
