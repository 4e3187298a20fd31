// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{FiberId, INVALID};
use super::store::FiberStore;

/// An iterator over the direct children of a fiber.
///
/// Created by [`FiberStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a FiberStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a FiberStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.sibling[idx as usize];
        self.store.handle(idx)
    }
}

/// A pre-order iterator over a subtree: node, then its children left to
/// right, each fully before the next.
///
/// Created by [`FiberStore::pre_order`]. Never leaves the subtree it started
/// at, even if the start fiber has siblings.
#[derive(Debug)]
pub struct PreOrder<'a> {
    store: &'a FiberStore,
    root: u32,
    current: u32,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(store: &'a FiberStore, root: u32) -> Self {
        Self {
            store,
            root,
            current: root,
        }
    }
}

impl Iterator for PreOrder<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = successor(self.store, idx, self.root);
        self.store.handle(idx)
    }
}

impl FiberStore {
    /// Returns the fiber to process after `id`: its child if present,
    /// otherwise the sibling of the nearest ancestor-or-self that has one.
    ///
    /// Returns `None` once the walk climbs out of the tree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn next_unit(&self, id: FiberId) -> Option<FiberId> {
        self.validate(id);
        self.handle(successor(self, id.idx, INVALID))
    }
}

/// Depth-first successor of `idx`, never climbing above `root`.
///
/// With `root == INVALID` the walk is bounded only by the top of the tree.
fn successor(store: &FiberStore, idx: u32, root: u32) -> u32 {
    let child = store.child[idx as usize];
    if child != INVALID {
        return child;
    }
    let mut cur = idx;
    while cur != INVALID && cur != root {
        let sibling = store.sibling[cur as usize];
        if sibling != INVALID {
            return sibling;
        }
        cur = store.parent[cur as usize];
    }
    INVALID
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::fiber::FiberKind;

    fn host(store: &mut FiberStore) -> FiberId {
        store.allocate(FiberKind::Host(Rc::from("div")), Rc::default())
    }

    /// root → A → (B → B1, C)
    fn sample(store: &mut FiberStore) -> [FiberId; 5] {
        let root = host(store);
        let a = host(store);
        let b = host(store);
        let b1 = host(store);
        let c = host(store);
        store.set_first_child(root, a);
        store.set_first_child(a, b);
        store.set_next_sibling(b, c);
        store.set_first_child(b, b1);
        [root, a, b, b1, c]
    }

    #[test]
    fn next_unit_visits_child_then_sibling_then_uncle() {
        let mut store = FiberStore::new();
        let [root, a, b, b1, c] = sample(&mut store);

        let mut order = vec![root];
        let mut cur = root;
        while let Some(next) = store.next_unit(cur) {
            order.push(next);
            cur = next;
        }
        assert_eq!(order, vec![root, a, b, b1, c]);
    }

    #[test]
    fn pre_order_matches_next_unit() {
        let mut store = FiberStore::new();
        let ids = sample(&mut store);
        let walked: Vec<_> = store.pre_order(ids[0]).collect();
        assert_eq!(walked, ids.to_vec());
    }

    #[test]
    fn pre_order_stays_inside_subtree() {
        let mut store = FiberStore::new();
        let [_, _, b, b1, _] = sample(&mut store);
        let walked: Vec<_> = store.pre_order(b).collect();
        assert_eq!(walked, vec![b, b1], "C is B's sibling, not a descendant");
    }
}
