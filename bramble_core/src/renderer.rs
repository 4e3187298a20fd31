// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render session.
//!
//! A [`Renderer`] owns every piece of state that survives between slices:
//! the fiber store, the committed (*current*) root, the working root being
//! built, the queued unit of work, and the deletions found so far. Its
//! lifecycle is:
//!
//! 1. [`render`](Renderer::render) arms a cycle with a new working root.
//! 2. [`work`](Renderer::work) processes units across as many slices as the
//!    host grants, then commits.
//! 3. After a commit (or an abort) the session is idle again.
//!
//! There is no cancellation primitive. A second `render` while a cycle is in
//! flight *supersedes* it: the working tree is discarded and a new cycle
//! starts against the last committed tree.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::backend::{HostNode, HostTree};
use crate::element::{Element, Props};
use crate::fiber::{Effect, FiberId, FiberKind, FiberStore};
use crate::scheduler::SchedulerConfig;
use crate::trace::{AbortEvent, AbortReason, CycleSummaryBuilder, RenderRequestEvent, Tracer};

/// A single-threaded render session.
#[derive(Debug)]
pub struct Renderer {
    pub(crate) store: FiberStore,
    pub(crate) config: SchedulerConfig,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) wip_root: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    pub(crate) cycle: u64,
    /// Units processed in the in-flight cycle.
    pub(crate) units: u32,
    /// Slices the in-flight cycle has been given.
    pub(crate) slices: u32,
    /// Nodes created by a superseded cycle, released on the next slice.
    pub(crate) orphans: Vec<HostNode>,
    pub(crate) timings: CycleSummaryBuilder,
    pending_request: Option<RenderRequestEvent>,
    pending_abort: Option<AbortEvent>,
}

impl Renderer {
    /// Creates an idle session with no committed tree.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            store: FiberStore::new(),
            config,
            next_unit: None,
            current_root: None,
            wip_root: None,
            deletions: Vec::new(),
            cycle: 0,
            units: 0,
            slices: 0,
            orphans: Vec::new(),
            timings: CycleSummaryBuilder::new(),
            pending_request: None,
            pending_abort: None,
        }
    }

    /// Requests that `element` be rendered into `container`.
    ///
    /// Builds a working root whose only child is `element`, whose node is
    /// `container`, and whose alternate is the current root, then arms the
    /// scheduler. Nothing touches the host until [`work`](Self::work) commits.
    ///
    /// If a cycle is already in flight it is superseded.
    pub fn render(&mut self, element: Element, container: HostNode) {
        let superseded = self.wip_root.is_some();
        if superseded {
            self.pending_abort = Some(AbortEvent {
                cycle: self.cycle,
                reason: AbortReason::Superseded,
                units: self.units,
            });
            let created = self.discard_wip();
            self.orphans.extend(created);
        }

        self.cycle += 1;
        let mut props = Props::new();
        props.set_children([element]);
        let root = self.store.allocate(FiberKind::Root, Rc::new(props));
        self.store.set_node(root, Some(container));
        self.store.set_alternate(root, self.current_root);

        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.deletions.clear();
        self.units = 0;
        self.slices = 0;
        self.timings = CycleSummaryBuilder::new();
        self.pending_request = Some(RenderRequestEvent {
            cycle: self.cycle,
            superseded,
        });
    }

    /// Returns whether no cycle is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.wip_root.is_none()
    }

    /// Returns the root of the last committed tree.
    #[must_use]
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Returns the root of the tree under construction.
    #[must_use]
    pub fn wip_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Returns the fiber that the next slice will process first.
    #[must_use]
    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    /// Returns the old fibers scheduled for deletion this cycle.
    #[must_use]
    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// Returns the fiber store.
    #[must_use]
    pub fn store(&self) -> &FiberStore {
        &self.store
    }

    /// Returns the scheduler configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns the number of the latest requested cycle (0 before the first
    /// render).
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Releases leftovers from superseded cycles and reports queued events.
    pub(crate) fn drain_pending<H: HostTree + ?Sized>(&mut self, host: &mut H, tracer: &mut Tracer<'_>) {
        for node in self.orphans.drain(..) {
            host.release(node);
        }
        if let Some(e) = self.pending_abort.take() {
            tracer.abort(&e);
        }
        if let Some(e) = self.pending_request.take() {
            tracer.render_request(&e);
        }
    }

    /// Discards the in-flight cycle after a render failure.
    ///
    /// The committed tree and the host tree are left as they were; nodes
    /// created for pending placements are released.
    pub(crate) fn abort<H: HostTree + ?Sized>(
        &mut self,
        host: &mut H,
        reason: AbortReason,
        tracer: &mut Tracer<'_>,
    ) {
        tracer.abort(&AbortEvent {
            cycle: self.cycle,
            reason,
            units: self.units,
        });
        for node in self.discard_wip() {
            host.release(node);
        }
    }

    /// Frees the working tree and clears deletion marks on the old tree.
    ///
    /// Returns the nodes that were created for the working tree and never
    /// attached.
    fn discard_wip(&mut self) -> Vec<HostNode> {
        let mut created = Vec::new();
        if let Some(root) = self.wip_root.take() {
            for id in self.store.pre_order(root) {
                if self.store.effect(id) == Some(Effect::Placement)
                    && let Some(node) = self.store.node(id)
                {
                    created.push(node);
                }
            }
            self.store.release_subtree(root);
        }
        for old in self.deletions.drain(..) {
            self.store.set_effect(old, None);
        }
        self.next_unit = None;
        self.units = 0;
        self.slices = 0;
        created
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{element, text};

    #[test]
    fn new_session_is_idle() {
        let renderer = Renderer::default();
        assert!(renderer.is_idle());
        assert_eq!(renderer.current_root(), None);
        assert_eq!(renderer.cycle(), 0);
    }

    #[test]
    fn render_arms_a_root_with_the_container() {
        let mut renderer = Renderer::default();
        renderer.render(element("div", Props::new(), []), HostNode(0));

        let root = renderer.wip_root().unwrap();
        assert_eq!(renderer.next_unit(), Some(root));
        assert_eq!(renderer.store().node(root), Some(HostNode(0)));
        assert_eq!(renderer.store().kind(root), &FiberKind::Root);
        assert_eq!(renderer.store().alternate(root), None);
        assert_eq!(renderer.store().props(root).children().len(), 1);
        assert_eq!(renderer.cycle(), 1);
    }

    #[test]
    fn second_render_before_work_supersedes() {
        let mut renderer = Renderer::default();
        renderer.render(text("a"), HostNode(0));
        let first = renderer.wip_root().unwrap();
        renderer.render(text("b"), HostNode(0));
        let second = renderer.wip_root().unwrap();

        assert!(!renderer.store().is_alive(first));
        assert!(renderer.store().is_alive(second));
        assert_eq!(renderer.store().live_count(), 1);
        assert_eq!(renderer.cycle(), 2);
    }
}
