// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation adapter: creates and synchronizes host nodes from props.
//!
//! Keys starting with `on` are listeners; the event name is the remainder
//! lower-cased (`onClick` listens for `click`). Every other attribute is a
//! plain property. `children` is structural and never reaches the host.

use alloc::string::String;

use crate::backend::{HostNode, HostTree};
use crate::element::{EVENT_PREFIX, Props};

/// The kind of node to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// A typed element.
    Element(&'a str),
    /// A text node.
    Text,
}

/// Returns whether `key` names an event listener.
#[must_use]
pub fn is_event(key: &str) -> bool {
    key.len() > EVENT_PREFIX.len() && key.starts_with(EVENT_PREFIX)
}

/// Returns the event name for a listener key: `onClick` → `click`.
#[must_use]
pub fn event_name(key: &str) -> String {
    key[EVENT_PREFIX.len()..].to_ascii_lowercase()
}

/// Creates a node and applies `props` to it from an empty baseline.
pub fn create_node<H: HostTree + ?Sized>(host: &mut H, kind: NodeKind<'_>, props: &Props) -> HostNode {
    let node = match kind {
        NodeKind::Element(tag) => host.create_element(tag),
        NodeKind::Text => host.create_text(),
    };
    update_node(host, node, &Props::new(), props);
    node
}

/// Brings `node` from reflecting `prev` to reflecting `next`.
///
/// Runs four passes in order: stale listeners are removed, vanished
/// properties deleted, new or changed properties set, and new or changed
/// listeners added. An event dispatched between passes therefore never
/// reaches a replaced callback.
pub fn update_node<H: HostTree + ?Sized>(host: &mut H, node: HostNode, prev: &Props, next: &Props) {
    // Stale listeners.
    for (key, old) in prev.attrs() {
        let Some(listener) = old.as_listener() else {
            continue;
        };
        if !is_event(key) || next.get(key) == Some(old) {
            continue;
        }
        host.remove_listener(node, &event_name(key), listener);
    }

    // Vanished properties.
    for (key, _) in prev.attrs() {
        if !is_event(key) && next.get(key).is_none() {
            host.remove_property(node, key);
        }
    }

    // New or changed properties.
    for (key, value) in next.attrs() {
        if !is_event(key) && prev.get(key) != Some(value) {
            host.set_property(node, key, value);
        }
    }

    // New or changed listeners.
    for (key, value) in next.attrs() {
        let Some(listener) = value.as_listener() else {
            continue;
        };
        if !is_event(key) || prev.get(key) == Some(value) {
            continue;
        }
        host.add_listener(node, &event_name(key), listener);
    }
}

/// Detaches `node` from its presentation parent.
pub fn remove_node<H: HostTree + ?Sized>(host: &mut H, parent: HostNode, node: HostNode) {
    host.remove_child(parent, node);
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::element::{Listener, NODE_VALUE, PropValue};
    use crate::memory::{HostOp, MemoryHost};

    #[test]
    fn event_keys() {
        assert!(is_event("onClick"));
        assert!(is_event("oninput"));
        assert!(!is_event("on"));
        assert!(!is_event("title"));
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onKeyDown"), "keydown");
    }

    #[test]
    fn create_applies_initial_props() {
        let mut host = MemoryHost::new();
        let props = Props::new().with("id", "main").on("click", |_| {});
        let node = create_node(&mut host, NodeKind::Element("div"), &props);
        assert_eq!(host.tag(node), Some("div"));
        assert_eq!(host.property(node, "id"), Some(&PropValue::from("main")));
        assert_eq!(host.listener_count(node, "click"), 1);
    }

    #[test]
    fn create_text_carries_node_value() {
        let mut host = MemoryHost::new();
        let props = Props::new().with(NODE_VALUE, "hi");
        let node = create_node(&mut host, NodeKind::Text, &props);
        assert_eq!(host.tag(node), None);
        assert_eq!(host.text(node), Some("hi"));
    }

    #[test]
    fn update_touches_only_changed_keys() {
        let mut host = MemoryHost::new();
        let prev = Props::new().with("a", 1).with("b", 2).with("c", 3);
        let node = create_node(&mut host, NodeKind::Element("div"), &prev);
        host.clear_ops();

        let next = Props::new().with("a", 1).with("b", 20).with("d", 4);
        update_node(&mut host, node, &prev, &next);

        assert_eq!(
            host.ops(),
            &[
                HostOp::RemoveProperty(node, "c".into()),
                HostOp::SetProperty(node, "b".into()),
                HostOp::SetProperty(node, "d".into()),
            ]
        );
    }

    #[test]
    fn changed_listener_is_removed_before_added() {
        let mut host = MemoryHost::new();
        let old = Listener::new(|_| {});
        let prev = Props::new().with("onClick", old).with("title", "x");
        let node = create_node(&mut host, NodeKind::Element("button"), &prev);
        host.clear_ops();

        let next = Props::new().on("Click", |_| {}).with("title", "y");
        update_node(&mut host, node, &prev, &next);

        let ops: Vec<_> = host.take_ops();
        assert_eq!(
            ops,
            [
                HostOp::RemoveListener(node, "click".into()),
                HostOp::SetProperty(node, "title".into()),
                HostOp::AddListener(node, "click".into()),
            ]
        );
        assert_eq!(host.listener_count(node, "click"), 1);
    }

    #[test]
    fn unchanged_listener_is_left_alone() {
        let mut host = MemoryHost::new();
        let listener = Listener::new(|_| {});
        let prev = Props::new().with("onClick", listener.clone());
        let node = create_node(&mut host, NodeKind::Element("button"), &prev);
        host.clear_ops();

        let next = Props::new().with("onClick", listener);
        update_node(&mut host, node, &prev, &next);
        assert!(host.ops().is_empty());
    }

    #[test]
    fn on_prefixed_scalar_is_not_a_property() {
        let mut host = MemoryHost::new();
        let props = Props::new().with("onClick", true);
        let node = create_node(&mut host, NodeKind::Element("div"), &props);
        assert_eq!(host.property(node, "onClick"), None);
        assert_eq!(host.listener_count(node, "click"), 0);
    }
}
