// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber identity.

use core::fmt;

/// Sentinel value indicating "no fiber" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a fiber in a [`FiberStore`](super::FiberStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a fiber is released and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl FiberId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FiberId({}@gen{})", self.idx, self.generation)
    }
}
