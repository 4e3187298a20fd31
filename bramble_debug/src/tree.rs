// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented fiber tree dumps.
//!
//! [`dump`] renders the subtree under a fiber one line per fiber, children
//! indented two spaces under their parent:
//!
//! ```text
//! root #0 node=0
//!   <ul> #1 node=1
//!     <li> #2 node=2 [update]
//!       "first" #4 node=3
//!     Item #3 [placement]
//! ```
//!
//! Host fibers print their tag, text fibers their quoted text, and component
//! fibers their name. A pending effect is shown in brackets.

use std::fmt::Write as _;

use bramble_core::element::NODE_VALUE;
use bramble_core::fiber::{Effect, FiberId, FiberKind, FiberStore};

/// Renders the subtree rooted at `root` as indented text.
#[must_use]
pub fn dump(store: &FiberStore, root: FiberId) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0_usize)];
    while let Some((id, depth)) = stack.pop() {
        write_line(store, id, depth, &mut out);
        let children: Vec<_> = store.children(id).collect();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    out
}

fn write_line(store: &FiberStore, id: FiberId, depth: usize, out: &mut String) {
    let indent = depth * 2;
    let _ = write!(out, "{:indent$}", "");
    let _ = match store.kind(id) {
        FiberKind::Root => write!(out, "root"),
        FiberKind::Host(tag) => write!(out, "<{tag}>"),
        FiberKind::Text => {
            let value = store.props(id).get(NODE_VALUE).map(ToString::to_string);
            write!(out, "{:?}", value.unwrap_or_default())
        }
        FiberKind::Component(c) => write!(out, "{}", c.name()),
    };
    let _ = write!(out, " #{}", id.index());
    if let Some(node) = store.node(id) {
        let _ = write!(out, " node={}", node.0);
    }
    if let Some(effect) = store.effect(id) {
        let name = match effect {
            Effect::Placement => "placement",
            Effect::Update => "update",
            Effect::Deletion => "deletion",
        };
        let _ = write!(out, " [{name}]");
    }
    out.push('\n');
}
