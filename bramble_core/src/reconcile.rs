// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position-indexed diff of a fiber's children.
//!
//! The new element list is walked in lockstep with the old sibling chain
//! (the alternate's children). Matching happens by index and type only:
//!
//! | old at i | new at i | result                                   |
//! |----------|----------|------------------------------------------|
//! | same type| present  | new fiber, old node reused, `Update`     |
//! | other    | present  | new fiber, `Placement`; old `Deletion`   |
//! | none     | present  | new fiber, `Placement`                   |
//! | present  | none     | old fiber tagged `Deletion`              |
//!
//! There are no keys, so moving an element within a list is seen as a chain
//! of type mismatches.

use alloc::vec::Vec;

use crate::element::Element;
use crate::fiber::{Effect, FiberId, FiberKind, FiberStore};

/// Counts of the effects produced by one [`reconcile_children`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// New fibers tagged [`Effect::Placement`].
    pub placements: u32,
    /// New fibers tagged [`Effect::Update`].
    pub updates: u32,
    /// Old fibers tagged [`Effect::Deletion`].
    pub deletions: u32,
}

/// Builds the child fibers of `wip` for `elements`.
///
/// Old fibers with no counterpart are tagged [`Effect::Deletion`] and pushed
/// onto `deletions`; they are not otherwise modified.
///
/// # Panics
///
/// Panics if `wip` is stale or already has children.
pub fn reconcile_children(
    store: &mut FiberStore,
    wip: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) -> Reconciled {
    let mut counts = Reconciled::default();
    let mut old = store.alternate(wip).and_then(|alt| store.child(alt));
    let mut prev: Option<FiberId> = None;
    let mut elements = elements.iter();

    loop {
        let element = elements.next();
        if element.is_none() && old.is_none() {
            break;
        }

        let same = match (old, element) {
            (Some(o), Some(e)) => store.kind(o).matches(e.ty()),
            _ => false,
        };

        let fresh = match (element, old) {
            (Some(e), Some(o)) if same => {
                let id = store.allocate(FiberKind::from_element(e.ty()), e.shared_props().clone());
                let node = store.node(o);
                store.set_node(id, node);
                store.set_alternate(id, Some(o));
                store.set_effect(id, Some(Effect::Update));
                counts.updates += 1;
                Some(id)
            }
            (Some(e), _) => {
                let id = store.allocate(FiberKind::from_element(e.ty()), e.shared_props().clone());
                store.set_effect(id, Some(Effect::Placement));
                counts.placements += 1;
                Some(id)
            }
            (None, _) => None,
        };

        if let Some(o) = old {
            if !same {
                store.set_effect(o, Some(Effect::Deletion));
                deletions.push(o);
                counts.deletions += 1;
            }
            old = store.sibling(o);
        }

        if let Some(id) = fresh {
            match prev {
                None => store.set_first_child(wip, id),
                Some(p) => store.set_next_sibling(p, id),
            }
            prev = Some(id);
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;

    use super::*;
    use crate::element::{Props, element, text};

    /// Builds a committed parent whose children mirror `elements`.
    fn committed(store: &mut FiberStore, elements: &[Element]) -> FiberId {
        let parent = store.allocate(FiberKind::Root, Rc::default());
        let mut scratch = Vec::new();
        reconcile_children(store, parent, elements, &mut scratch);
        for child in store.children(parent).collect::<Vec<_>>() {
            store.set_effect(child, None);
        }
        parent
    }

    fn wip_for(store: &mut FiberStore, old: FiberId) -> FiberId {
        let wip = store.allocate(FiberKind::Root, Rc::default());
        store.set_alternate(wip, Some(old));
        wip
    }

    fn effects(store: &FiberStore, parent: FiberId) -> Vec<Option<Effect>> {
        store.children(parent).map(|c| store.effect(c)).collect()
    }

    #[test]
    fn first_render_places_everything() {
        let mut store = FiberStore::new();
        let wip = store.allocate(FiberKind::Root, Rc::default());
        let mut deletions = Vec::new();
        let counts = reconcile_children(
            &mut store,
            wip,
            &[element("a", Props::new(), []), text("t")],
            &mut deletions,
        );
        assert_eq!(counts.placements, 2);
        assert!(deletions.is_empty());
        assert_eq!(
            effects(&store, wip),
            vec![Some(Effect::Placement), Some(Effect::Placement)]
        );
    }

    #[test]
    fn same_types_update_and_link_alternates() {
        let mut store = FiberStore::new();
        let old_els = [element("a", Props::new(), []), text("t")];
        let old = committed(&mut store, &old_els);
        let old_kids: Vec<_> = store.children(old).collect();
        store.set_node(old_kids[0], Some(crate::backend::HostNode(7)));

        let wip = wip_for(&mut store, old);
        let mut deletions = Vec::new();
        let new_els = [element("a", Props::new().with("x", 1), []), text("u")];
        let counts = reconcile_children(&mut store, wip, &new_els, &mut deletions);

        assert_eq!(counts, Reconciled { placements: 0, updates: 2, deletions: 0 });
        let new_kids: Vec<_> = store.children(wip).collect();
        assert_eq!(store.alternate(new_kids[0]), Some(old_kids[0]));
        assert_eq!(store.alternate(new_kids[1]), Some(old_kids[1]));
        assert_eq!(store.node(new_kids[0]), Some(crate::backend::HostNode(7)));
        assert_eq!(store.parent(new_kids[1]), Some(wip));
    }

    #[test]
    fn type_change_places_and_deletes() {
        let mut store = FiberStore::new();
        let old = committed(&mut store, &[element("a", Props::new(), [])]);
        let old_a = store.child(old).unwrap();

        let wip = wip_for(&mut store, old);
        let mut deletions = Vec::new();
        let counts = reconcile_children(
            &mut store,
            wip,
            &[element("b", Props::new(), [])],
            &mut deletions,
        );

        assert_eq!(counts, Reconciled { placements: 1, updates: 0, deletions: 1 });
        assert_eq!(deletions, vec![old_a]);
        assert_eq!(store.effect(old_a), Some(Effect::Deletion));
        let new_b = store.child(wip).unwrap();
        assert_eq!(store.alternate(new_b), None);
    }

    #[test]
    fn shrinking_list_deletes_the_tail() {
        let mut store = FiberStore::new();
        let five: Vec<_> = (0..5).map(|_| element("li", Props::new(), [])).collect();
        let old = committed(&mut store, &five);
        let old_kids: Vec<_> = store.children(old).collect();

        let wip = wip_for(&mut store, old);
        let mut deletions = Vec::new();
        let counts = reconcile_children(&mut store, wip, &five[..2], &mut deletions);

        assert_eq!(counts, Reconciled { placements: 0, updates: 2, deletions: 3 });
        assert_eq!(deletions, old_kids[2..].to_vec());
        assert_eq!(store.children(wip).count(), 2);
    }

    #[test]
    fn growing_list_places_the_tail() {
        let mut store = FiberStore::new();
        let three: Vec<_> = (0..3).map(|_| element("li", Props::new(), [])).collect();
        let old = committed(&mut store, &three[..1]);

        let wip = wip_for(&mut store, old);
        let mut deletions = Vec::new();
        let counts = reconcile_children(&mut store, wip, &three, &mut deletions);

        assert_eq!(counts, Reconciled { placements: 2, updates: 1, deletions: 0 });
        assert_eq!(
            effects(&store, wip),
            vec![
                Some(Effect::Update),
                Some(Effect::Placement),
                Some(Effect::Placement)
            ]
        );
    }

    #[test]
    fn empty_to_empty_is_a_no_op() {
        let mut store = FiberStore::new();
        let old = committed(&mut store, &[]);
        let wip = wip_for(&mut store, old);
        let mut deletions = Vec::new();
        let counts = reconcile_children(&mut store, wip, &[], &mut deletions);
        assert_eq!(counts, Reconciled::default());
        assert_eq!(store.child(wip), None);
    }
}
