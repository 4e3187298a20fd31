// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays fiber storage with allocation and link management.

use alloc::rc::Rc;
use alloc::vec::Vec;

use super::id::{FiberId, INVALID};
use super::traverse::{Children, PreOrder};
use super::{Effect, FiberKind};
use crate::backend::HostNode;
use crate::element::Props;

/// Struct-of-arrays storage for all fibers.
///
/// Fibers are addressed by [`FiberId`] handles. Internally, each fiber
/// occupies a slot in parallel arrays. Released fibers are recycled via a free
/// list, and generation counters prevent stale handle access.
#[derive(Debug, Default)]
pub struct FiberStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) child: Vec<u32>,
    pub(crate) sibling: Vec<u32>,

    // -- Payload --
    pub(crate) kind: Vec<FiberKind>,
    pub(crate) props: Vec<Rc<Props>>,
    pub(crate) node: Vec<Option<HostNode>>,
    pub(crate) alternate: Vec<Option<FiberId>>,
    pub(crate) effect: Vec<Option<Effect>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl FiberStore {
    /// Creates an empty fiber store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Allocation API --

    /// Allocates a detached fiber and returns its handle.
    ///
    /// The fiber starts with no links, no node, no alternate, and no effect.
    pub fn allocate(&mut self, kind: FiberKind, props: Rc<Props>) -> FiberId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.child[i] = INVALID;
            self.sibling[i] = INVALID;
            self.kind[i] = kind;
            self.props[i] = props;
            self.node[i] = None;
            self.alternate[i] = None;
            self.effect[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.child.push(INVALID);
            self.sibling.push(INVALID);
            self.kind.push(kind);
            self.props.push(props);
            self.node.push(None);
            self.alternate.push(None);
            self.effect.push(None);
            self.generation.push(0);
            idx
        };

        FiberId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Releases a fiber, freeing its slot for reuse.
    ///
    /// Links of other fibers that point at this slot are not touched; callers
    /// release whole trees at once.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn release(&mut self, id: FiberId) {
        self.validate(id);
        let i = id.idx as usize;
        // Drop the payload now so components and listeners are not kept alive
        // by a dead slot.
        self.kind[i] = FiberKind::Root;
        self.props[i] = Rc::default();
        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(id.idx);
    }

    /// Releases every fiber in the subtree rooted at `id`, including `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn release_subtree(&mut self, id: FiberId) {
        let doomed: Vec<FiberId> = self.pre_order(id).collect();
        for fiber in doomed {
            self.release(fiber);
        }
    }

    /// Returns whether the given handle refers to a live fiber.
    #[must_use]
    pub fn is_alive(&self, id: FiberId) -> bool {
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live fibers.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns the number of slots ever allocated (live plus free).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.len as usize
    }

    // -- Topology API --

    /// Returns the parent of a fiber, if any.
    #[must_use]
    pub fn parent(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.handle(self.parent[id.idx as usize])
    }

    /// Returns the first child of a fiber, if any.
    #[must_use]
    pub fn child(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.handle(self.child[id.idx as usize])
    }

    /// Returns the next sibling of a fiber, if any.
    #[must_use]
    pub fn sibling(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.handle(self.sibling[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a fiber.
    #[must_use]
    pub fn children(&self, id: FiberId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.child[id.idx as usize])
    }

    /// Returns a pre-order iterator over the subtree rooted at `id`.
    #[must_use]
    pub fn pre_order(&self, id: FiberId) -> PreOrder<'_> {
        self.validate(id);
        PreOrder::new(self, id.idx)
    }

    /// Makes `child` the first child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `parent` already has a child.
    pub(crate) fn set_first_child(&mut self, parent: FiberId, child: FiberId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.child[parent.idx as usize] == INVALID,
            "fiber already has a first child"
        );
        self.child[parent.idx as usize] = child.idx;
        self.parent[child.idx as usize] = parent.idx;
    }

    /// Links `next` as the sibling following `prev`, under `prev`'s parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `prev` already has a sibling.
    pub(crate) fn set_next_sibling(&mut self, prev: FiberId, next: FiberId) {
        self.validate(prev);
        self.validate(next);
        assert!(
            self.sibling[prev.idx as usize] == INVALID,
            "fiber already has a next sibling"
        );
        self.sibling[prev.idx as usize] = next.idx;
        self.parent[next.idx as usize] = self.parent[prev.idx as usize];
    }

    // -- Payload API --

    /// Returns the kind of a fiber.
    #[must_use]
    pub fn kind(&self, id: FiberId) -> &FiberKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the props of a fiber.
    #[must_use]
    pub fn props(&self, id: FiberId) -> &Rc<Props> {
        self.validate(id);
        &self.props[id.idx as usize]
    }

    /// Returns the presentation handle of a fiber, if mounted.
    #[must_use]
    pub fn node(&self, id: FiberId) -> Option<HostNode> {
        self.validate(id);
        self.node[id.idx as usize]
    }

    /// Returns the alternate of a fiber, if any.
    #[must_use]
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.alternate[id.idx as usize]
    }

    /// Returns the pending effect of a fiber, if any.
    #[must_use]
    pub fn effect(&self, id: FiberId) -> Option<Effect> {
        self.validate(id);
        self.effect[id.idx as usize]
    }

    /// Sets the presentation handle of a fiber.
    pub fn set_node(&mut self, id: FiberId, node: Option<HostNode>) {
        self.validate(id);
        self.node[id.idx as usize] = node;
    }

    /// Sets the alternate of a fiber.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn set_alternate(&mut self, id: FiberId, alternate: Option<FiberId>) {
        self.validate(id);
        if let Some(alt) = alternate {
            self.validate(alt);
        }
        self.alternate[id.idx as usize] = alternate;
    }

    /// Sets the pending effect of a fiber.
    pub fn set_effect(&mut self, id: FiberId, effect: Option<Effect>) {
        self.validate(id);
        self.effect[id.idx as usize] = effect;
    }

    // -- Internal helpers --

    /// Converts a raw link to a handle.
    pub(crate) fn handle(&self, idx: u32) -> Option<FiberId> {
        if idx == INVALID {
            None
        } else {
            Some(FiberId {
                idx,
                generation: self.generation[idx as usize],
            })
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: FiberId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale FiberId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn host(store: &mut FiberStore, tag: &str) -> FiberId {
        store.allocate(FiberKind::Host(Rc::from(tag)), Rc::default())
    }

    #[test]
    fn allocate_and_release() {
        let mut store = FiberStore::new();
        let id = host(&mut store, "div");
        assert!(store.is_alive(id));
        assert_eq!(store.live_count(), 1);
        store.release(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = FiberStore::new();
        let id1 = host(&mut store, "div");
        store.release(id1);
        let id2 = host(&mut store, "p");
        // id2 reuses the same slot but has a different generation.
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
        assert_eq!(store.capacity(), 1);
    }

    #[test]
    fn liveness_follows_the_generation() {
        let mut store = FiberStore::new();
        let ids: Vec<_> = (0..4).map(|_| host(&mut store, "li")).collect();
        for &id in &ids {
            store.release(id);
        }
        assert!(ids.iter().all(|&id| !store.is_alive(id)), "released ids are dead");

        let fresh: Vec<_> = (0..4).map(|_| host(&mut store, "li")).collect();
        assert!(fresh.iter().all(|&id| store.is_alive(id)), "recycled ids are live");
        assert!(ids.iter().all(|&id| !store.is_alive(id)), "old ids stay dead");
        assert_eq!(store.capacity(), 4);
        assert_eq!(store.live_count(), 4);
    }

    #[test]
    fn reused_slot_starts_clean() {
        let mut store = FiberStore::new();
        let a = host(&mut store, "div");
        let b = host(&mut store, "span");
        store.set_first_child(a, b);
        store.set_node(a, Some(HostNode(9)));
        store.set_effect(a, Some(Effect::Placement));
        store.release(b);
        store.release(a);

        let c = store.allocate(FiberKind::Text, Rc::default());
        assert_eq!(store.child(c), None);
        assert_eq!(store.parent(c), None);
        assert_eq!(store.node(c), None);
        assert_eq!(store.effect(c), None);
        assert_eq!(store.kind(c), &FiberKind::Text);
    }

    #[test]
    fn links_form_ordered_children() {
        let mut store = FiberStore::new();
        let parent = host(&mut store, "ul");
        let a = host(&mut store, "li");
        let b = host(&mut store, "li");
        let c = host(&mut store, "li");

        store.set_first_child(parent, a);
        store.set_next_sibling(a, b);
        store.set_next_sibling(b, c);

        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);
        assert_eq!(store.parent(c), Some(parent));
        assert_eq!(store.sibling(c), None);
    }

    #[test]
    fn release_subtree_frees_every_descendant() {
        let mut store = FiberStore::new();
        let keep = host(&mut store, "keep");
        let root = host(&mut store, "root");
        let a = host(&mut store, "a");
        let b = host(&mut store, "b");
        store.set_first_child(root, a);
        store.set_first_child(a, b);

        store.release_subtree(root);
        assert!(!store.is_alive(root));
        assert!(!store.is_alive(a));
        assert!(!store.is_alive(b));
        assert!(store.is_alive(keep));
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    #[should_panic(expected = "fiber already has a first child")]
    fn double_first_child_panics() {
        let mut store = FiberStore::new();
        let p = host(&mut store, "p");
        let a = host(&mut store, "a");
        let b = host(&mut store, "b");
        store.set_first_child(p, a);
        store.set_first_child(p, b);
    }

    #[test]
    #[should_panic(expected = "stale FiberId")]
    fn released_handle_panics_on_props() {
        let mut store = FiberStore::new();
        let id = host(&mut store, "div");
        store.release(id);
        let _ = store.props(id);
    }

    #[test]
    #[should_panic(expected = "stale FiberId")]
    fn stale_alternate_is_rejected() {
        let mut store = FiberStore::new();
        let old = host(&mut store, "div");
        let new = host(&mut store, "div");
        store.release(old);
        store.set_alternate(new, Some(old));
    }
}
