// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM host tree.
//!
//! [`DomHost`] issues [`HostNode`] handles for live DOM nodes. Properties are
//! assigned as JS properties (`node[name] = value`, so `nodeValue` sets the
//! text of a text node) and cleared by assigning an empty string. Listeners
//! are wrapped in JS closures that stay alive until the listener is removed
//! or its node released. Released handles are reissued to later nodes, so
//! the handle table stays as large as the peak number of live nodes.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use bramble_core::backend::{HostNode, HostTree};
use bramble_core::element::{Event, Listener, PropValue};
use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, Node};

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

struct Attached {
    node: HostNode,
    event: String,
    listener: Listener,
    closure: EventClosure,
}

/// Handle-indexed storage that reuses released slots.
#[derive(Debug)]
struct Slots<T> {
    items: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, item: T) -> HostNode {
        if let Some(idx) = self.free.pop() {
            self.items[idx as usize] = Some(item);
            return HostNode(idx);
        }
        let idx = u32::try_from(self.items.len()).expect("host node handles exhausted");
        self.items.push(Some(item));
        HostNode(idx)
    }

    fn get(&self, node: HostNode) -> Option<&T> {
        self.items.get(node.0 as usize).and_then(Option::as_ref)
    }

    /// Empties a slot and queues it for reuse. Returns `None` if it was
    /// already empty.
    fn remove(&mut self, node: HostNode) -> Option<T> {
        let item = self.items.get_mut(node.0 as usize)?.take()?;
        self.free.push(node.0);
        Some(item)
    }

    fn capacity(&self) -> usize {
        self.items.len()
    }

    fn live(&self) -> usize {
        self.items.len() - self.free.len()
    }
}

/// A [`HostTree`] over the nodes of a DOM document.
pub struct DomHost {
    document: Document,
    nodes: Slots<Node>,
    listeners: Vec<Attached>,
}

impl core::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHost")
            .field("live_nodes", &self.nodes.live())
            .field("capacity", &self.nodes.capacity())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl DomHost {
    /// Creates a host that builds nodes in `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            nodes: Slots::default(),
            listeners: Vec::new(),
        }
    }

    /// Creates a host for the current window's document, if there is one.
    #[must_use]
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    /// Registers an existing DOM node (typically the render container) and
    /// returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `u32::MAX` nodes are live at once.
    pub fn adopt(&mut self, node: Node) -> HostNode {
        self.nodes.insert(node)
    }

    /// Returns the DOM node behind a handle, if it has not been released.
    #[must_use]
    pub fn get(&self, node: HostNode) -> Option<&Node> {
        self.nodes.get(node)
    }

    fn detach_listener(&mut self, pos: usize) {
        let attached = self.listeners.swap_remove(pos);
        if let Some(target) = self.get(attached.node) {
            let _ = target.remove_event_listener_with_callback(
                &attached.event,
                attached.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

fn to_js(value: &PropValue) -> JsValue {
    match value {
        PropValue::Str(s) => JsValue::from_str(s),
        PropValue::Int(v) => JsValue::from_f64(*v as f64),
        PropValue::Float(v) => JsValue::from_f64(*v),
        PropValue::Bool(v) => JsValue::from_bool(*v),
        PropValue::Listener(_) => JsValue::UNDEFINED,
    }
}

impl HostTree for DomHost {
    /// # Panics
    ///
    /// Panics if the document rejects `tag` as an element name.
    fn create_element(&mut self, tag: &str) -> HostNode {
        let el = self
            .document
            .create_element(tag)
            .expect("create_element failed");
        self.nodes.insert(el.into())
    }

    fn create_text(&mut self) -> HostNode {
        let node: Node = self.document.create_text_node("").into();
        self.nodes.insert(node)
    }

    fn set_property(&mut self, node: HostNode, name: &str, value: &PropValue) {
        if let Some(target) = self.get(node) {
            let _ = Reflect::set(target, &JsValue::from_str(name), &to_js(value));
        }
    }

    fn remove_property(&mut self, node: HostNode, name: &str) {
        if let Some(target) = self.get(node) {
            let _ = Reflect::set(target, &JsValue::from_str(name), &JsValue::from_str(""));
        }
    }

    fn add_listener(&mut self, node: HostNode, event: &str, listener: &Listener) {
        let Some(target) = self.get(node) else {
            return;
        };
        let name = String::from(event);
        let callback = listener.clone();
        let closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
            callback.call(&Event {
                name: &name,
                target: node,
            });
        }) as Box<dyn FnMut(web_sys::Event)>);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        self.listeners.push(Attached {
            node,
            event: event.into(),
            listener: listener.clone(),
            closure,
        });
    }

    fn remove_listener(&mut self, node: HostNode, event: &str, listener: &Listener) {
        if let Some(pos) = self
            .listeners
            .iter()
            .position(|a| a.node == node && a.event == event && a.listener == *listener)
        {
            self.detach_listener(pos);
        }
    }

    fn append_child(&mut self, parent: HostNode, child: HostNode) {
        if let (Some(p), Some(c)) = (self.get(parent), self.get(child)) {
            let _ = p.append_child(c);
        }
    }

    fn insert_before(&mut self, parent: HostNode, child: HostNode, before: HostNode) {
        if let (Some(p), Some(c)) = (self.get(parent), self.get(child)) {
            let _ = p.insert_before(c, self.get(before));
        }
    }

    fn remove_child(&mut self, parent: HostNode, child: HostNode) {
        if let (Some(p), Some(c)) = (self.get(parent), self.get(child)) {
            let _ = p.remove_child(c);
        }
    }

    fn release(&mut self, node: HostNode) {
        while let Some(pos) = self.listeners.iter().position(|a| a.node == node) {
            self.detach_listener(pos);
        }
        self.nodes.remove(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_unmount_cycles_reuse_one_slot() {
        let mut slots = Slots::default();
        let container = slots.insert(0_u32);
        for cycle in 1..=1000 {
            let node = slots.insert(cycle);
            assert_eq!(node, HostNode(1), "cycle {cycle} got a fresh slot");
            assert_eq!(slots.remove(node), Some(cycle));
        }
        assert_eq!(slots.capacity(), 2, "table grew across cycles");
        assert_eq!(slots.live(), 1);
        assert_eq!(slots.get(container), Some(&0));
    }

    #[test]
    fn releasing_twice_frees_the_slot_once() {
        let mut slots = Slots::default();
        let a = slots.insert('a');
        assert_eq!(slots.remove(a), Some('a'));
        assert_eq!(slots.remove(a), None, "second release is a no-op");

        let b = slots.insert('b');
        let c = slots.insert('c');
        assert_ne!(b, c, "one freed slot must not be issued twice");
        assert_eq!(slots.get(b), Some(&'b'));
        assert_eq!(slots.get(c), Some(&'c'));
    }
}

