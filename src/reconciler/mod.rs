//! Backend-agnostic declarative reconciler.
//!
//! A [`Reconciler`] turns [`Value`]s (text, nodes, lists and reactive
//! computations) into structural edits on a node tree it only knows through
//! an [`Adapter`]. Each insertion point remembers what it currently owns as a
//! [`Slot`]; the next value is reconciled against that slot so unchanged
//! nodes are left alone and lists are diffed by node identity.
//!
//! Reactivity comes from `spark-signals` through the
//! [`Runtime`](reactive::Runtime) in [`reactive`]: a [`Value::Dynamic`] is
//! re-evaluated inside an effect and re-reconciled whenever a signal it read
//! changes.
//!
//! # Examples
//!
//! ```
//! use termscene::reconciler::{Anchor, Reconciler, SceneAdapter, Value};
//! use termscene::scene::SceneGraph;
//!
//! let scene = SceneGraph::new(20, 2).unwrap().into_shared();
//! let root = scene.borrow().root();
//! let reconciler = Reconciler::new(SceneAdapter::new(scene.clone()));
//!
//! let count = reconciler.runtime().create_signal(1);
//! let c = count.clone();
//! reconciler.insert(&root, Value::dynamic(move || Value::from(c.get())), Anchor::Exclusive);
//! count.set(2);
//!
//! let scene = scene.borrow();
//! let label = scene.children(root)[0];
//! assert_eq!(scene.node(label).unwrap().kind().as_text().unwrap().content, "2");
//! ```

mod arrays;
pub mod reactive;
mod scene_adapter;

pub use reactive::{Disposer, Memo, Runtime, Signal};
pub use scene_adapter::{ElementFactory, SceneAdapter};

use crate::error::Result;
use crate::event::{LogLevel, emit_log};
use arrays::{reconcile_arrays, replace_node};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// The structural operations a node tree must offer to be reconciled.
pub trait Adapter {
    /// Handle to a node. Equality is node identity.
    type Node: Clone + Eq + Hash + fmt::Debug + 'static;
    /// Property values written through [`set_property`](Self::set_property).
    type Prop: Clone + PartialEq + 'static;

    /// Create an element of the given kind. Unknown kinds are an error.
    fn create_element(&self, kind: &str) -> Result<Self::Node>;
    fn create_text_node(&self, value: &str) -> Result<Self::Node>;
    /// Change the content of a node created by
    /// [`create_text_node`](Self::create_text_node).
    fn replace_text(&self, node: &Self::Node, value: &str);
    fn set_property(
        &self,
        node: &Self::Node,
        name: &str,
        value: &Self::Prop,
        prev: Option<&Self::Prop>,
    );
    /// Whether `node` came from [`create_text_node`](Self::create_text_node).
    fn is_text_node(&self, node: &Self::Node) -> bool;
    /// Insert (or move) `node` under `parent`, before `anchor` or at the end.
    fn insert_node(&self, parent: &Self::Node, node: &Self::Node, anchor: Option<&Self::Node>);
    fn remove_node(&self, parent: &Self::Node, node: &Self::Node);
    fn get_parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
    fn get_first_child(&self, node: &Self::Node) -> Option<Self::Node>;
    fn get_next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
}

/// Something that can be rendered into an insertion point.
pub enum Value<N> {
    /// Renders nothing. `false`, `true` and `None` convert to this.
    Empty,
    /// A text literal; numbers convert to this.
    Text(String),
    Node(N),
    /// Nested lists are flattened.
    List(Vec<Value<N>>),
    /// Re-evaluated whenever a signal it reads changes.
    Dynamic(Rc<dyn Fn() -> Value<N>>),
}

impl<N> Value<N> {
    pub fn dynamic(f: impl Fn() -> Value<N> + 'static) -> Self {
        Self::Dynamic(Rc::new(f))
    }

    pub fn node(node: N) -> Self {
        Self::Node(node)
    }

    pub fn list(items: impl IntoIterator<Item = Value<N>>) -> Self {
        Self::List(items.into_iter().collect())
    }
}

impl<N: Clone> Clone for Value<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Text(t) => Self::Text(t.clone()),
            Self::Node(n) => Self::Node(n.clone()),
            Self::List(items) => Self::List(items.clone()),
            Self::Dynamic(f) => Self::Dynamic(Rc::clone(f)),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Value<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Node(n) => f.debug_tuple("Node").field(n).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<N> From<&str> for Value<N> {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<N> From<String> for Value<N> {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<N> From<i32> for Value<N> {
    fn from(n: i32) -> Self {
        Self::Text(n.to_string())
    }
}

impl<N> From<i64> for Value<N> {
    fn from(n: i64) -> Self {
        Self::Text(n.to_string())
    }
}

impl<N> From<usize> for Value<N> {
    fn from(n: usize) -> Self {
        Self::Text(n.to_string())
    }
}

impl<N> From<f64> for Value<N> {
    fn from(n: f64) -> Self {
        Self::Text(n.to_string())
    }
}

impl<N> From<bool> for Value<N> {
    fn from(_: bool) -> Self {
        Self::Empty
    }
}

impl<N, T: Into<Value<N>>> From<Option<T>> for Value<N> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<N> From<Vec<Value<N>>> for Value<N> {
    fn from(items: Vec<Value<N>>) -> Self {
        Self::List(items)
    }
}

/// What an insertion point currently owns.
#[derive(Clone, Debug)]
pub enum Slot<N> {
    Empty,
    /// Text rendered as the parent's only child.
    Text(String),
    Node(N),
    Nodes(Vec<N>),
    /// Owned by a reactive computation that keeps the inner slot current.
    Tracked(Rc<RefCell<Slot<N>>>),
}

impl<N: Clone> Slot<N> {
    /// Follow tracked slots to the concrete one.
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Tracked(inner) => inner.borrow().clone().resolve(),
            other => other,
        }
    }

    /// Nodes owned through this slot.
    #[must_use]
    pub fn nodes(&self) -> Vec<N> {
        match self {
            Self::Node(n) => vec![n.clone()],
            Self::Nodes(nodes) => nodes.clone(),
            Self::Tracked(inner) => inner.borrow().nodes(),
            Self::Empty | Self::Text(_) => Vec::new(),
        }
    }
}

/// Where an insertion point sits among its parent's children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Anchor<N> {
    /// The insertion point is the parent's only content.
    Exclusive,
    /// Shares the parent; new nodes go at the end.
    Append,
    /// Shares the parent; new nodes go before this node.
    Before(N),
}

impl<N> Anchor<N> {
    fn is_shared(&self) -> bool {
        !matches!(self, Self::Exclusive)
    }

    fn node(&self) -> Option<&N> {
        match self {
            Self::Before(n) => Some(n),
            _ => None,
        }
    }
}

/// Children, properties and a node reference callback for
/// [`Reconciler::spread`].
pub struct Props<N, P> {
    pub children: Option<Value<N>>,
    /// Applied in order; only values that changed since the last application
    /// are written.
    pub values: Vec<(String, P)>,
    pub reference: Option<Rc<dyn Fn(&N)>>,
}

impl<N, P> Default for Props<N, P> {
    fn default() -> Self {
        Self {
            children: None,
            values: Vec::new(),
            reference: None,
        }
    }
}

impl<N: Clone, P: Clone> Clone for Props<N, P> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            values: self.values.clone(),
            reference: self.reference.clone(),
        }
    }
}

impl<N, P> Props<N, P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn child(mut self, children: impl Into<Value<N>>) -> Self {
        self.children = Some(children.into());
        self
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<P>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn reference(mut self, f: impl Fn(&N) + 'static) -> Self {
        self.reference = Some(Rc::new(f));
        self
    }
}

/// Last applied state of a spread.
struct Applied<N, P> {
    children: Slot<N>,
    values: HashMap<String, P>,
}

impl<N, P> Default for Applied<N, P> {
    fn default() -> Self {
        Self {
            children: Slot::Empty,
            values: HashMap::new(),
        }
    }
}

/// Reconciles values into an adapter's node tree.
pub struct Reconciler<A: Adapter> {
    adapter: Rc<A>,
    runtime: Runtime,
}

impl<A: Adapter> Clone for Reconciler<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Rc::clone(&self.adapter),
            runtime: self.runtime.clone(),
        }
    }
}

impl<A: Adapter> fmt::Debug for Reconciler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

type NodeOf<A> = <A as Adapter>::Node;
type PropOf<A> = <A as Adapter>::Prop;

impl<A: Adapter + 'static> Reconciler<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_runtime(Rc::new(adapter), Runtime::new())
    }

    /// Share an adapter and a runtime with other reconcilers.
    pub fn with_runtime(adapter: Rc<A>, runtime: Runtime) -> Self {
        Self { adapter, runtime }
    }

    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[must_use]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Render `code` as the whole content of `element` inside a new root.
    /// Disposing or dropping the returned handle stops every update it set up.
    pub fn render(&self, code: impl FnOnce() -> Value<NodeOf<A>>, element: &NodeOf<A>) -> Disposer {
        self.runtime.create_root(|| {
            self.insert(element, code(), Anchor::Exclusive);
        })
    }

    /// Insert `value` into `parent` at `anchor`.
    ///
    /// A dynamic value is tracked: it is re-evaluated and reconciled against
    /// what it rendered last whenever its inputs change.
    pub fn insert(
        &self,
        parent: &NodeOf<A>,
        value: Value<NodeOf<A>>,
        anchor: Anchor<NodeOf<A>>,
    ) -> Slot<NodeOf<A>> {
        let initial = if anchor.is_shared() {
            Slot::Nodes(Vec::new())
        } else {
            Slot::Empty
        };
        let Value::Dynamic(accessor) = value else {
            return self.insert_expression(parent, value, initial, &anchor, false);
        };
        let state = Rc::new(RefCell::new(initial));
        let this = self.clone();
        let parent = parent.clone();
        let tracked = Rc::clone(&state);
        self.runtime.create_effect(move || {
            let current = state.replace(Slot::Empty);
            let next = this.insert_expression(&parent, accessor(), current, &anchor, false);
            *state.borrow_mut() = next;
        });
        Slot::Tracked(tracked)
    }

    /// Apply `props` to `node`: children are reconciled into it and each
    /// other property is written when it differs from the last write.
    pub fn spread(&self, node: &NodeOf<A>, props: Props<NodeOf<A>, PropOf<A>>, skip_children: bool) {
        let applied = Rc::new(RefCell::new(Applied::default()));
        self.spread_expression(node, props, &applied, skip_children);
    }

    /// Like [`spread`](Self::spread), re-applied whenever a signal read by
    /// `accessor` changes.
    pub fn spread_dynamic(
        &self,
        node: &NodeOf<A>,
        accessor: impl Fn() -> Props<NodeOf<A>, PropOf<A>> + 'static,
        skip_children: bool,
    ) {
        let applied = Rc::new(RefCell::new(Applied::default()));
        let this = self.clone();
        let node = node.clone();
        self.runtime.create_effect(move || {
            this.spread_expression(&node, accessor(), &applied, skip_children);
        });
    }

    pub fn create_element(&self, kind: &str) -> Result<NodeOf<A>> {
        self.adapter.create_element(kind)
    }

    pub fn create_text_node(&self, value: &str) -> Result<NodeOf<A>> {
        self.adapter.create_text_node(value)
    }

    pub fn insert_node(&self, parent: &NodeOf<A>, node: &NodeOf<A>, anchor: Option<&NodeOf<A>>) {
        self.adapter.insert_node(parent, node, anchor);
    }

    /// Write one property and hand the value back.
    pub fn set_prop(
        &self,
        node: &NodeOf<A>,
        name: &str,
        value: PropOf<A>,
        prev: Option<&PropOf<A>>,
    ) -> PropOf<A> {
        self.adapter.set_property(node, name, &value, prev);
        value
    }

    pub fn effect(&self, body: impl FnMut() + 'static) {
        self.runtime.create_effect(body);
    }

    pub fn memo<T: Clone + PartialEq + 'static>(&self, compute: impl Fn() -> T + 'static) -> Memo<T> {
        self.runtime.create_memo(compute)
    }

    /// Run a directive-style callback against `element` without tracking.
    pub fn use_directive<T, R>(&self, f: impl FnOnce(&NodeOf<A>, T) -> R, element: &NodeOf<A>, arg: T) -> R {
        self.runtime.untrack(|| f(element, arg))
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    fn insert_expression(
        &self,
        parent: &NodeOf<A>,
        value: Value<NodeOf<A>>,
        current: Slot<NodeOf<A>>,
        anchor: &Anchor<NodeOf<A>>,
        unwrap_lists: bool,
    ) -> Slot<NodeOf<A>> {
        let current = current.resolve();
        let unchanged = match (&value, &current) {
            (Value::Empty, Slot::Empty) => true,
            (Value::Text(a), Slot::Text(b)) => a == b,
            (Value::Node(a), Slot::Node(b)) => a == b,
            _ => false,
        };
        if unchanged {
            return current;
        }
        let shared = anchor.is_shared();

        match value {
            Value::Empty => Slot::Nodes(self.clean_children(parent, &current.nodes(), anchor, None)),

            Value::Text(text) => {
                if shared {
                    let owned = current.nodes();
                    let node = match owned.first() {
                        Some(first) if self.adapter.is_text_node(first) => {
                            self.adapter.replace_text(first, &text);
                            first.clone()
                        }
                        _ => match self.adapter.create_text_node(&text) {
                            Ok(node) => node,
                            Err(e) => {
                                emit_log(LogLevel::Error, &format!("text node creation failed: {e}"));
                                return current;
                            }
                        },
                    };
                    return Slot::Nodes(self.clean_children(parent, &owned, anchor, Some(node)));
                }
                let in_place = matches!(&current, Slot::Text(prev) if !prev.is_empty());
                if in_place {
                    if let Some(first) = self.adapter.get_first_child(parent) {
                        self.adapter.replace_text(&first, &text);
                    }
                } else {
                    match self.adapter.create_text_node(&text) {
                        Ok(node) => {
                            self.clean_children(parent, &current.nodes(), anchor, Some(node));
                        }
                        Err(e) => {
                            emit_log(LogLevel::Error, &format!("text node creation failed: {e}"));
                            return current;
                        }
                    }
                }
                Slot::Text(text)
            }

            Value::Dynamic(accessor) => {
                let state = Rc::new(RefCell::new(current));
                let tracked = Rc::clone(&state);
                let this = self.clone();
                let parent = parent.clone();
                let anchor = anchor.clone();
                self.runtime.create_effect(move || {
                    let mut value = accessor();
                    while let Value::Dynamic(next) = value {
                        value = next();
                    }
                    let current = state.replace(Slot::Empty);
                    let next = this.insert_expression(&parent, value, current, &anchor, false);
                    *state.borrow_mut() = next;
                });
                Slot::Tracked(tracked)
            }

            Value::List(items) => {
                let mut flat = Vec::new();
                if self.normalize(&mut flat, items, unwrap_lists) {
                    // Entries still have to be evaluated; do it under tracking
                    let state = Rc::new(RefCell::new(current));
                    let tracked = Rc::clone(&state);
                    let this = self.clone();
                    let parent = parent.clone();
                    let anchor = anchor.clone();
                    self.runtime.create_effect(move || {
                        let current = state.replace(Slot::Empty);
                        let next = this.insert_expression(
                            &parent,
                            Value::List(flat.clone()),
                            current,
                            &anchor,
                            true,
                        );
                        *state.borrow_mut() = next;
                    });
                    return Slot::Tracked(tracked);
                }

                // A node can sit in one place only: keep its first occurrence
                let mut seen = HashSet::new();
                let mut nodes: Vec<NodeOf<A>> = Vec::with_capacity(flat.len());
                for value in flat {
                    if let Value::Node(node) = value {
                        if seen.insert(node.clone()) {
                            nodes.push(node);
                        } else {
                            emit_log(LogLevel::Warn, "duplicate node in list ignored");
                        }
                    }
                }

                if nodes.is_empty() {
                    let replacement = self.clean_children(parent, &current.nodes(), anchor, None);
                    if shared {
                        return Slot::Nodes(replacement);
                    }
                } else {
                    match &current {
                        Slot::Nodes(prev) if prev.is_empty() => {
                            self.append_nodes(parent, &nodes, anchor.node());
                        }
                        Slot::Nodes(prev) => {
                            reconcile_arrays(&*self.adapter, parent, prev.clone(), &nodes);
                        }
                        Slot::Empty => self.append_nodes(parent, &nodes, None),
                        Slot::Text(prev) if prev.is_empty() => self.append_nodes(parent, &nodes, None),
                        _ => {
                            let prev = if shared {
                                current.nodes()
                            } else {
                                self.adapter.get_first_child(parent).into_iter().collect()
                            };
                            reconcile_arrays(&*self.adapter, parent, prev, &nodes);
                        }
                    }
                }
                Slot::Nodes(nodes)
            }

            Value::Node(node) => {
                if shared {
                    return Slot::Nodes(self.clean_children(parent, &current.nodes(), anchor, Some(node)));
                }
                match &current {
                    Slot::Nodes(prev) => {
                        self.clean_children(parent, prev, &Anchor::Exclusive, Some(node.clone()));
                    }
                    Slot::Empty => self.adapter.insert_node(parent, &node, None),
                    Slot::Text(prev) if prev.is_empty() => self.adapter.insert_node(parent, &node, None),
                    _ => match self.adapter.get_first_child(parent) {
                        Some(first) => replace_node(&*self.adapter, parent, &node, &first),
                        None => self.adapter.insert_node(parent, &node, None),
                    },
                }
                Slot::Node(node)
            }
        }
    }

    /// Flatten `items` into `out`, creating text nodes for literals.
    ///
    /// Dynamic entries are evaluated when `unwrap` is set and kept as-is
    /// otherwise. Returns whether any dynamic entry was kept.
    fn normalize(
        &self,
        out: &mut Vec<Value<NodeOf<A>>>,
        items: Vec<Value<NodeOf<A>>>,
        unwrap: bool,
    ) -> bool {
        let mut dynamic = false;
        for item in items {
            match item {
                Value::Empty => {}
                Value::List(inner) => dynamic = self.normalize(out, inner, false) || dynamic,
                Value::Text(text) => match self.adapter.create_text_node(&text) {
                    Ok(node) => out.push(Value::Node(node)),
                    Err(e) => emit_log(LogLevel::Error, &format!("text node creation failed: {e}")),
                },
                Value::Dynamic(accessor) if unwrap => {
                    let mut resolved = accessor();
                    while let Value::Dynamic(next) = resolved {
                        resolved = next();
                    }
                    let resolved = match resolved {
                        Value::List(inner) => inner,
                        single => vec![single],
                    };
                    dynamic = self.normalize(out, resolved, false) || dynamic;
                }
                Value::Dynamic(accessor) => {
                    out.push(Value::Dynamic(accessor));
                    dynamic = true;
                }
                Value::Node(node) => out.push(Value::Node(node)),
            }
        }
        dynamic
    }

    /// Remove what an insertion point owns, optionally leaving `replacement`
    /// in its place. Returns the new owned list.
    ///
    /// An exclusive insertion point wipes every child of `parent`; a shared
    /// one only touches the nodes in `current` that are still under `parent`.
    fn clean_children(
        &self,
        parent: &NodeOf<A>,
        current: &[NodeOf<A>],
        anchor: &Anchor<NodeOf<A>>,
        replacement: Option<NodeOf<A>>,
    ) -> Vec<NodeOf<A>> {
        if !anchor.is_shared() {
            while let Some(child) = self.adapter.get_first_child(parent) {
                self.adapter.remove_node(parent, &child);
                if self.adapter.get_first_child(parent).as_ref() == Some(&child) {
                    break;
                }
            }
            if let Some(node) = &replacement {
                self.adapter.insert_node(parent, node, None);
            }
            return replacement.into_iter().collect();
        }

        if current.is_empty() {
            if let Some(node) = &replacement {
                self.adapter.insert_node(parent, node, anchor.node());
            }
            return replacement.into_iter().collect();
        }

        let mut inserted = false;
        for (i, el) in current.iter().enumerate().rev() {
            if replacement.as_ref() == Some(el) {
                inserted = true;
                continue;
            }
            let is_child = self.adapter.get_parent_node(el).as_ref() == Some(parent);
            if !inserted && i == 0 {
                match &replacement {
                    Some(node) if is_child => replace_node(&*self.adapter, parent, node, el),
                    Some(node) => self.adapter.insert_node(parent, node, anchor.node()),
                    None if is_child => self.adapter.remove_node(parent, el),
                    None => {}
                }
            } else if is_child {
                self.adapter.remove_node(parent, el);
            }
        }
        replacement.into_iter().collect()
    }

    fn append_nodes(&self, parent: &NodeOf<A>, nodes: &[NodeOf<A>], anchor: Option<&NodeOf<A>>) {
        for node in nodes {
            self.adapter.insert_node(parent, node, anchor);
        }
    }

    fn spread_expression(
        &self,
        node: &NodeOf<A>,
        props: Props<NodeOf<A>, PropOf<A>>,
        applied: &Rc<RefCell<Applied<NodeOf<A>, PropOf<A>>>>,
        skip_children: bool,
    ) {
        let Props {
            children,
            values,
            reference,
        } = props;

        if !skip_children {
            let children = children.unwrap_or(Value::Empty);
            let this = self.clone();
            let node = node.clone();
            let applied = Rc::clone(applied);
            self.runtime.create_effect(move || {
                let current = std::mem::replace(&mut applied.borrow_mut().children, Slot::Empty);
                let next = this.insert_expression(&node, children.clone(), current, &Anchor::Exclusive, false);
                applied.borrow_mut().children = next;
            });
        }

        if let Some(reference) = reference {
            let node = node.clone();
            self.runtime.create_effect(move || reference(&node));
        }

        let adapter = Rc::clone(&self.adapter);
        let node = node.clone();
        let applied = Rc::clone(applied);
        self.runtime.create_effect(move || {
            for (name, value) in &values {
                let prev = applied.borrow().values.get(name).cloned();
                if prev.as_ref() == Some(value) {
                    continue;
                }
                adapter.set_property(&node, name, value, prev.as_ref());
                applied.borrow_mut().values.insert(name.clone(), value.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    /// Minimal in-memory tree that logs every structural call.
    #[derive(Default)]
    struct Tree {
        children: RefCell<HashMap<u32, Vec<u32>>>,
        parents: RefCell<HashMap<u32, u32>>,
        texts: RefCell<HashMap<u32, String>>,
        props: RefCell<Vec<(u32, String, i32)>>,
        next: Cell<u32>,
        ops: RefCell<Vec<String>>,
    }

    impl Tree {
        fn node(&self) -> u32 {
            self.next.set(self.next.get() + 1);
            self.next.get()
        }

        fn kids(&self, parent: u32) -> Vec<u32> {
            self.children.borrow().get(&parent).cloned().unwrap_or_default()
        }

        fn detach(&self, node: u32) {
            if let Some(p) = self.parents.borrow_mut().remove(&node) {
                if let Some(list) = self.children.borrow_mut().get_mut(&p) {
                    list.retain(|&c| c != node);
                }
            }
        }

        fn text_of(&self, parent: u32) -> String {
            self.kids(parent)
                .iter()
                .map(|n| self.texts.borrow().get(n).cloned().unwrap_or_else(|| format!("#{n}")))
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    impl Adapter for Tree {
        type Node = u32;
        type Prop = i32;

        fn create_element(&self, kind: &str) -> Result<u32> {
            if kind == "box" {
                Ok(self.node())
            } else {
                Err(Error::UnknownElement(kind.to_string()))
            }
        }

        fn create_text_node(&self, value: &str) -> Result<u32> {
            let n = self.node();
            self.texts.borrow_mut().insert(n, value.to_string());
            Ok(n)
        }

        fn replace_text(&self, node: &u32, value: &str) {
            self.ops.borrow_mut().push(format!("text {node}={value}"));
            self.texts.borrow_mut().insert(*node, value.to_string());
        }

        fn set_property(&self, node: &u32, name: &str, value: &i32, _prev: Option<&i32>) {
            self.props.borrow_mut().push((*node, name.to_string(), *value));
        }

        fn is_text_node(&self, node: &u32) -> bool {
            self.texts.borrow().contains_key(node)
        }

        fn insert_node(&self, parent: &u32, node: &u32, anchor: Option<&u32>) {
            self.ops.borrow_mut().push(format!("insert {node}"));
            // Inserting a node before itself leaves it where it is
            let anchor = if anchor == Some(node) {
                self.get_next_sibling(node)
            } else {
                anchor.copied()
            };
            self.detach(*node);
            let mut children = self.children.borrow_mut();
            let list = children.entry(*parent).or_default();
            let at = anchor
                .and_then(|a| list.iter().position(|&c| c == a))
                .unwrap_or(list.len());
            list.insert(at, *node);
            self.parents.borrow_mut().insert(*node, *parent);
        }

        fn remove_node(&self, _parent: &u32, node: &u32) {
            self.ops.borrow_mut().push(format!("remove {node}"));
            self.detach(*node);
        }

        fn get_parent_node(&self, node: &u32) -> Option<u32> {
            self.parents.borrow().get(node).copied()
        }

        fn get_first_child(&self, node: &u32) -> Option<u32> {
            self.kids(*node).first().copied()
        }

        fn get_next_sibling(&self, node: &u32) -> Option<u32> {
            let parent = self.get_parent_node(node)?;
            let kids = self.kids(parent);
            let i = kids.iter().position(|c| c == node)?;
            kids.get(i + 1).copied()
        }
    }

    fn setup() -> (Reconciler<Tree>, u32) {
        let r = Reconciler::new(Tree::default());
        let root = r.adapter().node();
        (r, root)
    }

    fn ops(r: &Reconciler<Tree>) -> Vec<String> {
        std::mem::take(&mut *r.adapter().ops.borrow_mut())
    }

    // ============================================
    // Literals
    // ============================================

    #[test]
    fn test_text_replaced_in_place() {
        let (r, root) = setup();
        let label = r.runtime().create_signal("a".to_string());
        let l = label.clone();
        r.insert(&root, Value::dynamic(move || Value::from(l.get())), Anchor::Exclusive);
        assert_eq!(r.adapter().text_of(root), "a");
        let first = r.adapter().kids(root)[0];
        ops(&r);

        label.set("b".to_string());
        assert_eq!(r.adapter().text_of(root), "b");
        assert_eq!(r.adapter().kids(root), vec![first]);
        assert_eq!(ops(&r), vec![format!("text {first}=b")]);
    }

    #[test]
    fn test_numbers_render_as_text() {
        let (r, root) = setup();
        r.insert(&root, Value::from(42), Anchor::Exclusive);
        r.insert(&root, Value::from(1.5), Anchor::Append);
        assert_eq!(r.adapter().text_of(root), "42,1.5");
    }

    #[test]
    fn test_empty_values_clear() {
        let (r, root) = setup();
        let show = r.runtime().create_signal(true);
        let s = show.clone();
        r.insert(
            &root,
            Value::dynamic(move || if s.get() { Value::from("x") } else { Value::from(false) }),
            Anchor::Exclusive,
        );
        assert_eq!(r.adapter().text_of(root), "x");
        show.set(false);
        assert!(r.adapter().kids(root).is_empty());
        show.set(true);
        assert_eq!(r.adapter().text_of(root), "x");
    }

    // ============================================
    // Shared insertion points
    // ============================================

    #[test]
    fn test_shared_slot_preserves_siblings() {
        let (r, root) = setup();
        let before = r.adapter().node();
        let after = r.adapter().node();
        r.adapter().insert_node(&root, &before, None);
        r.adapter().insert_node(&root, &after, None);

        let items = r.runtime().create_signal(vec!["a", "b"]);
        let it = items.clone();
        r.insert(
            &root,
            Value::dynamic(move || Value::list(it.get().into_iter().map(Value::from))),
            Anchor::Before(after),
        );
        assert_eq!(r.adapter().text_of(root), format!("#{before},a,b,#{after}"));

        items.set(vec![]);
        assert_eq!(r.adapter().kids(root), vec![before, after]);
    }

    #[test]
    fn test_shared_text_reuses_node() {
        let (r, root) = setup();
        let n = r.runtime().create_signal(1);
        let c = n.clone();
        r.insert(&root, Value::dynamic(move || Value::from(c.get())), Anchor::Append);
        let first = r.adapter().kids(root);
        n.set(2);
        assert_eq!(r.adapter().kids(root), first);
        assert_eq!(r.adapter().text_of(root), "2");
    }

    // ============================================
    // Nodes & lists
    // ============================================

    #[test]
    fn test_same_node_is_idempotent() {
        let (r, root) = setup();
        let child = r.create_element("box").unwrap();
        let tick = r.runtime().create_signal(0);
        let t = tick.clone();
        r.insert(
            &root,
            Value::dynamic(move || {
                let _ = t.get();
                Value::node(child)
            }),
            Anchor::Exclusive,
        );
        ops(&r);
        tick.set(1);
        assert!(ops(&r).is_empty());
    }

    #[test]
    fn test_node_replaces_node() {
        let (r, root) = setup();
        let a = r.create_element("box").unwrap();
        let b = r.create_element("box").unwrap();
        let which = r.runtime().create_signal(a);
        let w = which.clone();
        r.insert(&root, Value::dynamic(move || Value::node(w.get())), Anchor::Exclusive);
        ops(&r);
        which.set(b);
        assert_eq!(r.adapter().kids(root), vec![b]);
        assert_eq!(ops(&r), vec![format!("insert {b}"), format!("remove {a}")]);
    }

    #[test]
    fn test_list_reorder_keeps_nodes() {
        let (r, root) = setup();
        let nodes: Vec<u32> = (0..5).map(|_| r.create_element("box").unwrap()).collect();
        let order = r.runtime().create_signal(nodes.clone());
        let o = order.clone();
        r.insert(
            &root,
            Value::dynamic(move || Value::list(o.get().into_iter().map(Value::node))),
            Anchor::Exclusive,
        );
        assert_eq!(r.adapter().kids(root), nodes);

        let shuffled = vec![nodes[4], nodes[0], nodes[2], nodes[1], nodes[3]];
        let created = r.adapter().next.get();
        order.set(shuffled.clone());
        assert_eq!(r.adapter().kids(root), shuffled);
        assert_eq!(r.adapter().next.get(), created);
    }

    #[test]
    fn test_nested_lists_flatten() {
        let (r, root) = setup();
        let value = Value::list([
            Value::from("a"),
            Value::list([Value::from("b"), Value::Empty, Value::from("c")]),
            Value::from(true),
        ]);
        r.insert(&root, value, Anchor::Exclusive);
        assert_eq!(r.adapter().text_of(root), "a,b,c");
    }

    #[test]
    fn test_dynamic_list_entry() {
        let (r, root) = setup();
        let label = r.runtime().create_signal("x");
        let l = label.clone();
        let value = Value::list([
            Value::from("head"),
            Value::dynamic(move || Value::from(l.get())),
        ]);
        r.insert(&root, value, Anchor::Exclusive);
        assert_eq!(r.adapter().text_of(root), "head,x");
        label.set("y");
        assert_eq!(r.adapter().text_of(root), "head,y");
    }

    // ============================================
    // Spread & render
    // ============================================

    #[test]
    fn test_spread_writes_changed_props_only() {
        let (r, root) = setup();
        let width = r.runtime().create_signal(10);
        let w = width.clone();
        r.spread_dynamic(
            &root,
            move || Props::new().prop("width", w.get()).prop("height", 3),
            true,
        );
        width.set(20);
        let props = r.adapter().props.borrow().clone();
        assert_eq!(
            props,
            vec![
                (root, "width".to_string(), 10),
                (root, "height".to_string(), 3),
                (root, "width".to_string(), 20),
            ]
        );
    }

    #[test]
    fn test_spread_children_and_reference() {
        let (r, root) = setup();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        r.spread(
            &root,
            Props::new()
                .child(Value::list([Value::from("a"), Value::from("b")]))
                .reference(move |n: &u32| s.set(*n)),
            false,
        );
        assert_eq!(seen.get(), root);
        assert_eq!(r.adapter().text_of(root), "a,b");
    }

    #[test]
    fn test_render_dispose_stops_updates() {
        let (r, root) = setup();
        let n = r.runtime().create_signal(1);
        let c = n.clone();
        let dispose = r.render(move || Value::dynamic(move || Value::from(c.get())), &root);
        assert_eq!(r.adapter().text_of(root), "1");
        dispose.dispose();
        n.set(2);
        assert_eq!(r.adapter().text_of(root), "1");
    }

    #[test]
    fn test_unknown_element_fails() {
        let (r, _) = setup();
        assert!(matches!(r.create_element("canvas"), Err(Error::UnknownElement(k)) if k == "canvas"));
    }

    #[test]
    fn test_set_prop_returns_value() {
        let (r, root) = setup();
        assert_eq!(r.set_prop(&root, "z", 7, None), 7);
        assert_eq!(r.use_directive(|n, k: u32| n + k, &root, 1), root + 1);
    }
}
