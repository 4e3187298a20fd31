// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for presentation trees.
//!
//! Bramble never touches a real presentation tree directly. Each backend
//! provides the following pieces:
//!
//! - **Host tree**: Implements the [`HostTree`] trait: node creation,
//!   property and listener assignment, and child append/remove on a
//!   platform-native tree (DOM nodes, a headless arena).
//!
//! - **Slice driver**: Grants the [`Renderer`](crate::Renderer) recurring
//!   slices of time through a [`Deadline`](crate::timing::Deadline) (e.g.
//!   `requestIdleCallback`). This is backend-specific and not abstracted by a
//!   trait because the setup and lifecycle differ fundamentally across hosts.
//!
//! # Crate boundaries
//!
//! `bramble_core` owns the element model, the fiber graph, reconciliation,
//! scheduling, commit, and this contract module. Backend crates depend on
//! `bramble_core` and provide platform glue. Application code depends on both
//! and wires them together in a slice loop:
//!
//! ```rust,ignore
//! fn on_idle(deadline: &IdleDeadline) {
//!     match renderer.work(&mut host, deadline, &mut Tracer::none()) {
//!         Ok(WorkStatus::Committed(summary)) => log(summary),
//!         Ok(_) => {}
//!         Err(err) => report(err),
//!     }
//! }
//! ```

use core::fmt;

use crate::element::{Listener, PropValue};

/// An opaque handle to a node in a [`HostTree`].
///
/// The value is meaningful only to the host that issued it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostNode(pub u32);

impl fmt::Debug for HostNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostNode({})", self.0)
    }
}

/// A mutable presentation tree.
///
/// The [`adapter`](crate::adapter) module is the only code in this crate that
/// calls these methods outside of tests.
pub trait HostTree {
    /// Creates a detached element node with the given tag.
    fn create_element(&mut self, tag: &str) -> HostNode;

    /// Creates a detached, empty text node.
    fn create_text(&mut self) -> HostNode;

    /// Assigns a property, replacing any previous value.
    fn set_property(&mut self, node: HostNode, name: &str, value: &PropValue);

    /// Deletes a property.
    fn remove_property(&mut self, node: HostNode, name: &str);

    /// Attaches a listener for `event` (already lower-cased, without the `on`
    /// prefix).
    fn add_listener(&mut self, node: HostNode, event: &str, listener: &Listener);

    /// Detaches a listener previously attached with [`add_listener`].
    ///
    /// [`add_listener`]: Self::add_listener
    fn remove_listener(&mut self, node: HostNode, event: &str, listener: &Listener);

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: HostNode, child: HostNode);

    /// Inserts `child` into `parent` immediately before `before`, which must
    /// already be a child of `parent`.
    fn insert_before(&mut self, parent: HostNode, child: HostNode, before: HostNode);

    /// Detaches `child` from `parent`.
    fn remove_child(&mut self, parent: HostNode, child: HostNode);

    /// Signals that `node` will never be referenced again.
    ///
    /// Called after a node's subtree has been detached at commit, and for
    /// nodes created by a render cycle that was discarded before commit.
    fn release(&mut self, node: HostNode) {
        let _ = node;
    }
}
