// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless [`HostTree`] for tests and tooling.
//!
//! [`MemoryHost`] keeps nodes in a slot arena and logs every mutation as a
//! [`HostOp`], so tests can assert exactly which host calls a render made.
//! It is strict: touching a released node, detaching a node from the wrong
//! parent, attaching a node twice, or removing a listener that was never
//! added all panic.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;
use core::mem;

use crate::backend::{HostNode, HostTree};
use crate::element::{Event, Listener, NODE_VALUE, PropValue};

/// One recorded host mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    /// An element node was created with the given tag.
    CreateElement(HostNode, String),
    /// A text node was created.
    CreateText(HostNode),
    /// A property was assigned.
    SetProperty(HostNode, String),
    /// A property was deleted.
    RemoveProperty(HostNode, String),
    /// A listener was attached for the event.
    AddListener(HostNode, String),
    /// A listener was detached from the event.
    RemoveListener(HostNode, String),
    /// `(parent, child)`: the child was appended.
    AppendChild(HostNode, HostNode),
    /// `(parent, child, before)`: the child was inserted before a sibling.
    InsertBefore(HostNode, HostNode, HostNode),
    /// `(parent, child)`: the child was detached.
    RemoveChild(HostNode, HostNode),
    /// The node was released.
    Release(HostNode),
}

#[derive(Debug, Default)]
struct MemoryNode {
    /// `None` for text nodes.
    tag: Option<String>,
    props: BTreeMap<String, PropValue>,
    listeners: Vec<(String, Listener)>,
    children: Vec<HostNode>,
    parent: Option<HostNode>,
}

/// An in-memory presentation tree.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<Option<MemoryNode>>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container element to render into. Not logged.
    pub fn create_container(&mut self, tag: &str) -> HostNode {
        self.insert(MemoryNode {
            tag: Some(tag.into()),
            ..MemoryNode::default()
        })
    }

    /// Returns the mutations recorded so far.
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Returns and clears the recorded mutations.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        mem::take(&mut self.ops)
    }

    /// Clears the recorded mutations.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Returns whether `node` exists and has not been released.
    #[must_use]
    pub fn is_alive(&self, node: HostNode) -> bool {
        self.nodes
            .get(node.0 as usize)
            .is_some_and(Option::is_some)
    }

    /// Returns the number of nodes not yet released, containers included.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns the tag of an element node, or `None` for a text node.
    #[must_use]
    pub fn tag(&self, node: HostNode) -> Option<&str> {
        self.get(node).tag.as_deref()
    }

    /// Returns the text of a text node.
    #[must_use]
    pub fn text(&self, node: HostNode) -> Option<&str> {
        let n = self.get(node);
        if n.tag.is_some() {
            return None;
        }
        n.props.get(NODE_VALUE).and_then(PropValue::as_str)
    }

    /// Returns the current value of a property.
    #[must_use]
    pub fn property(&self, node: HostNode, name: &str) -> Option<&PropValue> {
        self.get(node).props.get(name)
    }

    /// Returns how many listeners are attached for `event`.
    #[must_use]
    pub fn listener_count(&self, node: HostNode, event: &str) -> usize {
        self.get(node)
            .listeners
            .iter()
            .filter(|(e, _)| e == event)
            .count()
    }

    /// Returns the children of a node in order.
    #[must_use]
    pub fn children(&self, node: HostNode) -> &[HostNode] {
        &self.get(node).children
    }

    /// Returns the parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, node: HostNode) -> Option<HostNode> {
        self.get(node).parent
    }

    /// Invokes every listener attached to `node` for `event`, in attachment
    /// order, and returns how many ran.
    pub fn dispatch(&self, node: HostNode, event: &str) -> usize {
        let listeners: Vec<Listener> = self
            .get(node)
            .listeners
            .iter()
            .filter(|(e, _)| e == event)
            .map(|(_, l)| l.clone())
            .collect();
        let e = Event {
            name: event,
            target: node,
        };
        for listener in &listeners {
            listener.call(&e);
        }
        listeners.len()
    }

    /// Serializes the subtree at `node` as markup.
    ///
    /// Elements print as `<tag key="value">…</tag>` with attributes in key
    /// order; text nodes print their text. Listeners are not shown.
    #[must_use]
    pub fn to_markup(&self, node: HostNode) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: HostNode, out: &mut String) {
        let n = self.get(node);
        let Some(tag) = &n.tag else {
            if let Some(value) = n.props.get(NODE_VALUE) {
                let _ = write!(out, "{value}");
            }
            return;
        };
        out.push('<');
        out.push_str(tag);
        for (key, value) in &n.props {
            let _ = write!(out, " {key}=\"{value}\"");
        }
        out.push('>');
        for &child in &n.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{tag}>");
    }

    fn insert(&mut self, node: MemoryNode) -> HostNode {
        let id = HostNode(
            u32::try_from(self.nodes.len()).unwrap_or_else(|_| panic!("too many host nodes")),
        );
        self.nodes.push(Some(node));
        id
    }

    fn get(&self, node: HostNode) -> &MemoryNode {
        match self.nodes.get(node.0 as usize) {
            Some(Some(n)) => n,
            _ => panic!("unknown or released {node:?}"),
        }
    }

    fn get_mut(&mut self, node: HostNode) -> &mut MemoryNode {
        match self.nodes.get_mut(node.0 as usize) {
            Some(Some(n)) => n,
            _ => panic!("unknown or released {node:?}"),
        }
    }
}

impl HostTree for MemoryHost {
    fn create_element(&mut self, tag: &str) -> HostNode {
        let node = self.insert(MemoryNode {
            tag: Some(tag.into()),
            ..MemoryNode::default()
        });
        self.ops.push(HostOp::CreateElement(node, tag.into()));
        node
    }

    fn create_text(&mut self) -> HostNode {
        let node = self.insert(MemoryNode::default());
        self.ops.push(HostOp::CreateText(node));
        node
    }

    fn set_property(&mut self, node: HostNode, name: &str, value: &PropValue) {
        self.get_mut(node).props.insert(name.into(), value.clone());
        self.ops.push(HostOp::SetProperty(node, name.into()));
    }

    fn remove_property(&mut self, node: HostNode, name: &str) {
        self.get_mut(node).props.remove(name);
        self.ops.push(HostOp::RemoveProperty(node, name.into()));
    }

    fn add_listener(&mut self, node: HostNode, event: &str, listener: &Listener) {
        self.get_mut(node)
            .listeners
            .push((event.into(), listener.clone()));
        self.ops.push(HostOp::AddListener(node, event.into()));
    }

    fn remove_listener(&mut self, node: HostNode, event: &str, listener: &Listener) {
        let listeners = &mut self.get_mut(node).listeners;
        let Some(pos) = listeners
            .iter()
            .position(|(e, l)| e == event && l == listener)
        else {
            panic!("listener for `{event}` is not attached to {node:?}");
        };
        listeners.remove(pos);
        self.ops.push(HostOp::RemoveListener(node, event.into()));
    }

    fn append_child(&mut self, parent: HostNode, child: HostNode) {
        let current = self.get(child).parent;
        assert!(current.is_none(), "{child:?} is already attached to {current:?}");
        self.get_mut(parent).children.push(child);
        self.get_mut(child).parent = Some(parent);
        self.ops.push(HostOp::AppendChild(parent, child));
    }

    fn insert_before(&mut self, parent: HostNode, child: HostNode, before: HostNode) {
        let current = self.get(child).parent;
        assert!(current.is_none(), "{child:?} is already attached to {current:?}");
        let children = &mut self.get_mut(parent).children;
        let Some(pos) = children.iter().position(|&c| c == before) else {
            panic!("{before:?} is not a child of {parent:?}");
        };
        children.insert(pos, child);
        self.get_mut(child).parent = Some(parent);
        self.ops.push(HostOp::InsertBefore(parent, child, before));
    }

    fn remove_child(&mut self, parent: HostNode, child: HostNode) {
        let children = &mut self.get_mut(parent).children;
        let Some(pos) = children.iter().position(|&c| c == child) else {
            panic!("{child:?} is not a child of {parent:?}");
        };
        children.remove(pos);
        self.get_mut(child).parent = None;
        self.ops.push(HostOp::RemoveChild(parent, child));
    }

    fn release(&mut self, node: HostNode) {
        let released = self.nodes.get_mut(node.0 as usize).and_then(Option::take);
        assert!(released.is_some(), "unknown or released {node:?}");
        self.ops.push(HostOp::Release(node));
    }
}

impl core::fmt::Display for HostOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CreateElement(n, tag) => write!(f, "create <{tag}> as {}", n.0),
            Self::CreateText(n) => write!(f, "create text as {}", n.0),
            Self::SetProperty(n, name) => write!(f, "set {}.{name}", n.0),
            Self::RemoveProperty(n, name) => write!(f, "remove {}.{name}", n.0),
            Self::AddListener(n, event) => write!(f, "listen {}:{event}", n.0),
            Self::RemoveListener(n, event) => write!(f, "unlisten {}:{event}", n.0),
            Self::AppendChild(p, c) => write!(f, "append {} to {}", c.0, p.0),
            Self::InsertBefore(p, c, b) => write!(f, "insert {} into {} before {}", c.0, p.0, b.0),
            Self::RemoveChild(p, c) => write!(f, "detach {} from {}", c.0, p.0),
            Self::Release(n) => write!(f, "release {}", n.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use core::cell::Cell;

    use super::*;

    #[test]
    fn builds_markup() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let p = host.create_element("p");
        host.set_property(p, "class", &PropValue::from("lead"));
        let t = host.create_text();
        host.set_property(t, NODE_VALUE, &PropValue::from("hello"));
        host.append_child(p, t);
        host.append_child(root, p);
        assert_eq!(host.to_markup(root), "<root><p class=\"lead\">hello</p></root>");
        assert_eq!(host.text(t), Some("hello"));
        assert_eq!(host.parent(t), Some(p));
    }

    #[test]
    fn dispatch_calls_attached_listeners() {
        let mut host = MemoryHost::new();
        let button = host.create_element("button");
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let listener = Listener::new(move |e| {
            assert_eq!(e.name, "click");
            counter.set(counter.get() + 1);
        });
        host.add_listener(button, "click", &listener);
        assert_eq!(host.dispatch(button, "click"), 1);
        assert_eq!(host.dispatch(button, "input"), 0);
        host.remove_listener(button, "click", &listener);
        assert_eq!(host.dispatch(button, "click"), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn release_frees_the_slot() {
        let mut host = MemoryHost::new();
        let n = host.create_element("div");
        assert_eq!(host.live_nodes(), 1);
        host.release(n);
        assert!(!host.is_alive(n));
        assert_eq!(host.live_nodes(), 0);
        assert_eq!(host.ops().last(), Some(&HostOp::Release(n)));
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn removing_a_stranger_panics() {
        let mut host = MemoryHost::new();
        let a = host.create_element("a");
        let b = host.create_element("b");
        host.remove_child(a, b);
    }

    #[test]
    #[should_panic(expected = "unknown or released")]
    fn touching_a_released_node_panics() {
        let mut host = MemoryHost::new();
        let n = host.create_element("div");
        host.release(n);
        host.set_property(n, "id", &PropValue::from("x"));
    }

    #[test]
    fn ops_display_compactly() {
        assert_eq!(
            HostOp::AppendChild(HostNode(1), HostNode(2)).to_string(),
            "append 2 to 1"
        );
        assert_eq!(HostOp::SetProperty(HostNode(3), "id".into()).to_string(), "set 3.id");
    }
}
