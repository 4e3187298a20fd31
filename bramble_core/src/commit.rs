// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase: applies accumulated effects in one uninterrupted pass.
//!
//! Commit runs only after every unit of the cycle has been processed and
//! never yields. It makes two passes over the fiber graph:
//!
//! 1. Every pending deletion is detached from its presentation parent, and
//!    every node in the deleted subtree is released to the host.
//! 2. The working tree is walked in pre-order from the root's child.
//!    `Placement` attaches a fiber's node under the nearest ancestor node,
//!    before the next already-attached sibling node if there is one (so a
//!    replaced node keeps its slot) and at the end otherwise; `Update` syncs
//!    the node from the alternate's props.
//!
//! Afterwards the working root becomes the current root, the previous tree's
//! slots are freed, and alternates and effects on the new tree are cleared.

use alloc::vec::Vec;

use crate::adapter::{remove_node, update_node};
use crate::backend::{HostNode, HostTree};
use crate::fiber::{Effect, FiberId, FiberStore};
use crate::renderer::Renderer;
use crate::timing::Deadline;
use crate::trace::{PhaseKind, Tracer};
#[cfg(feature = "trace-rich")]
use crate::trace::EffectRecord;

/// What a commit applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Cycle counter of the committed cycle.
    pub cycle: u64,
    /// Fibers tagged `Placement`.
    pub placements: u32,
    /// Fibers tagged `Update`.
    pub updates: u32,
    /// Old fibers deleted.
    pub deletions: u32,
    /// Units of work the cycle took.
    pub units: u32,
    /// Slices the render phase spanned.
    pub slices: u32,
}

/// Returns the node of the nearest ancestor that has one.
///
/// # Panics
///
/// Panics if the walk runs past the top of the tree, which means the root
/// carries no container node.
#[must_use]
pub fn host_parent(store: &FiberStore, fiber: FiberId) -> HostNode {
    let mut cur = store.parent(fiber);
    while let Some(id) = cur {
        if let Some(node) = store.node(id) {
            return node;
        }
        cur = store.parent(id);
    }
    panic!("no ancestor of {fiber:?} has a presentation node; the root must carry its container");
}

/// Returns the first attached node that follows `fiber` among the children
/// of its host parent.
///
/// Siblings still waiting for placement are skipped: pre-order commit has
/// not attached them yet. Component fibers are looked through.
#[must_use]
pub fn host_sibling(store: &FiberStore, fiber: FiberId) -> Option<HostNode> {
    let mut cur = fiber;
    'siblings: loop {
        let next = loop {
            if let Some(sibling) = store.sibling(cur) {
                break sibling;
            }
            let parent = store.parent(cur)?;
            if store.node(parent).is_some() {
                return None;
            }
            cur = parent;
        };
        cur = next;
        loop {
            if store.effect(cur) == Some(Effect::Placement) {
                continue 'siblings;
            }
            if let Some(node) = store.node(cur) {
                return Some(node);
            }
            match store.child(cur) {
                Some(child) => cur = child,
                None => continue 'siblings,
            }
        }
    }
}

/// Detaches a deleted fiber's presentation from `parent`.
///
/// A fiber without a node of its own (a component) is skipped in favor of
/// its child, repeatedly, until one with a node is found.
pub fn commit_deletion<H: HostTree + ?Sized>(
    store: &FiberStore,
    host: &mut H,
    fiber: FiberId,
    parent: HostNode,
) {
    let mut cur = Some(fiber);
    while let Some(id) = cur {
        if let Some(node) = store.node(id) {
            remove_node(host, parent, node);
            return;
        }
        cur = store.child(id);
    }
}

impl Renderer {
    /// Applies the finished working tree and promotes it to current.
    pub(crate) fn commit<H, D>(
        &mut self,
        host: &mut H,
        deadline: &D,
        tracer: &mut Tracer<'_>,
    ) -> CommitSummary
    where
        H: HostTree + ?Sized,
        D: Deadline + ?Sized,
    {
        self.begin_phase(PhaseKind::Commit, deadline, tracer);
        let mut summary = CommitSummary {
            cycle: self.cycle,
            units: self.units,
            slices: self.slices,
            ..CommitSummary::default()
        };
        #[cfg(feature = "trace-rich")]
        let mut records: Vec<EffectRecord> = Vec::new();

        // Pass 1: deletions.
        for &old in &self.deletions {
            let parent = host_parent(&self.store, old);
            commit_deletion(&self.store, host, old, parent);
            for id in self.store.pre_order(old) {
                if let Some(node) = self.store.node(id) {
                    host.release(node);
                }
            }
            summary.deletions += 1;
            #[cfg(feature = "trace-rich")]
            if tracer.is_active() {
                records.push(EffectRecord {
                    fiber: old.index(),
                    kind: self.store.kind(old).tag(),
                    effect: Effect::Deletion,
                });
            }
        }

        // Pass 2: placements and updates, parents before children.
        if let Some(root) = self.wip_root {
            let order: Vec<FiberId> = self.store.pre_order(root).collect();
            for id in order {
                let effect = self.store.effect(id);
                match effect {
                    Some(Effect::Placement) => {
                        if let Some(node) = self.store.node(id) {
                            let parent = host_parent(&self.store, id);
                            match host_sibling(&self.store, id) {
                                Some(before) => host.insert_before(parent, node, before),
                                None => host.append_child(parent, node),
                            }
                        }
                        summary.placements += 1;
                    }
                    Some(Effect::Update) => {
                        if let (Some(node), Some(alt)) = (self.store.node(id), self.store.alternate(id)) {
                            update_node(host, node, self.store.props(alt), self.store.props(id));
                        }
                        summary.updates += 1;
                    }
                    // Deletions live in the old tree and were handled above.
                    Some(Effect::Deletion) | None => {}
                }
                #[cfg(feature = "trace-rich")]
                if let Some(effect) = effect
                    && tracer.is_active()
                {
                    records.push(EffectRecord {
                        fiber: id.index(),
                        kind: self.store.kind(id).tag(),
                        effect,
                    });
                }
                self.store.set_effect(id, None);
                self.store.set_alternate(id, None);
            }
        }

        // Promote.
        let previous = core::mem::replace(&mut self.current_root, self.wip_root.take());
        if let Some(old_root) = previous {
            self.store.release_subtree(old_root);
        }
        self.deletions.clear();
        self.next_unit = None;

        self.end_phase(PhaseKind::Commit, deadline, tracer);
        #[cfg(feature = "trace-rich")]
        tracer.effects(summary.cycle, &records);
        tracer.cycle_summary(&self.timings.finish(&summary));
        summary
    }
}
