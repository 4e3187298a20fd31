// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber graph data model.
//!
//! A *fiber* is the mutable unit of work mirroring one element of a rendered
//! tree. Each fiber has:
//!
//! - An identity ([`FiberId`]): a generational handle that becomes stale when
//!   the fiber is released, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and next-sibling links forming an
//!   ordered tree. `parent` is only used for upward traversal; `child` and
//!   `sibling` are the forward edges.
//! - A [`FiberKind`] dispatched explicitly by the scheduler, and the props of
//!   the element it was built from.
//! - An optional presentation handle, an optional *alternate* (its
//!   counterpart in the last committed tree, a lookup only), and an optional
//!   [`Effect`] consumed by the commit phase.
//!
//! Fibers are stored in struct-of-arrays layout with index-based handles.
//! Slots are recycled through a free list; at most the committed tree and the
//! working tree are alive at once.

mod id;
mod store;
mod traverse;

use alloc::rc::Rc;

pub use id::{FiberId, INVALID};
pub use store::FiberStore;
pub use traverse::{Children, PreOrder};

use crate::element::{Component, ElementType};

/// The commit-time action recorded on a fiber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Insert a freshly created node under the nearest ancestor node.
    Placement,
    /// Synchronize an existing node from the alternate's props.
    Update,
    /// Detach this (old) fiber's nodes from the presentation tree.
    Deletion,
}

/// What a fiber renders.
#[derive(Clone, Debug, PartialEq)]
pub enum FiberKind {
    /// The root of a tree; its node is the caller's container.
    Root,
    /// A typed presentation element.
    Host(Rc<str>),
    /// A text node.
    Text,
    /// A component that renders exactly one child element.
    Component(Component),
}

impl FiberKind {
    /// Returns the fiber kind for an element type.
    #[must_use]
    pub fn from_element(ty: &ElementType) -> Self {
        match ty {
            ElementType::Host(tag) => Self::Host(tag.clone()),
            ElementType::Text => Self::Text,
            ElementType::Component(c) => Self::Component(c.clone()),
        }
    }

    /// Returns whether an element of type `ty` can reuse a fiber of this
    /// kind.
    #[must_use]
    pub fn matches(&self, ty: &ElementType) -> bool {
        match (self, ty) {
            (Self::Host(a), ElementType::Host(b)) => a == b,
            (Self::Text, ElementType::Text) => true,
            (Self::Component(a), ElementType::Component(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the payload-free tag of this kind.
    #[must_use]
    pub fn tag(&self) -> FiberKindTag {
        match self {
            Self::Root => FiberKindTag::Root,
            Self::Host(_) => FiberKindTag::Host,
            Self::Text => FiberKindTag::Text,
            Self::Component(_) => FiberKindTag::Component,
        }
    }
}

/// Payload-free discriminant of [`FiberKind`], used by trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FiberKindTag {
    /// [`FiberKind::Root`].
    Root,
    /// [`FiberKind::Host`].
    Host,
    /// [`FiberKind::Text`].
    Text,
    /// [`FiberKind::Component`].
    Component,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::text;

    #[test]
    fn kind_matches_same_element_type() {
        let host = FiberKind::Host(Rc::from("div"));
        assert!(host.matches(&ElementType::Host(Rc::from("div"))));
        assert!(!host.matches(&ElementType::Host(Rc::from("p"))));
        assert!(!host.matches(&ElementType::Text));
        assert!(FiberKind::Text.matches(text("x").ty()));
        assert!(!FiberKind::Root.matches(&ElementType::Text));
    }

    #[test]
    fn component_kind_matches_by_identity() {
        let c = Component::new("A", |_| text("a"));
        let other = Component::new("A", |_| text("a"));
        let kind = FiberKind::from_element(&ElementType::Component(c.clone()));
        assert!(kind.matches(&ElementType::Component(c)));
        assert!(!kind.matches(&ElementType::Component(other)));
        assert_eq!(kind.tag(), FiberKindTag::Component);
    }
}
