// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slice deadlines granted by the host.
//!
//! The host decides when the renderer may run and for how long. Each call to
//! [`Renderer::work`](crate::Renderer::work) receives a [`Deadline`] that it
//! polls after every unit of work:
//!
//! 1. The host's slice driver (e.g. `requestIdleCallback`) fires and wraps
//!    the platform deadline object.
//! 2. The renderer processes one fiber, then asks
//!    [`time_remaining`](Deadline::time_remaining).
//! 3. Once the remaining budget drops below
//!    [`SchedulerConfig::yield_threshold`](crate::scheduler::SchedulerConfig::yield_threshold)
//!    the renderer returns and the driver requests another slice.
//!
//! Headless drivers use [`Unbounded`] to run a cycle to completion, or
//! [`UnitBudget`] to cut slices after an exact number of units.

use core::cell::Cell;

use crate::time::{Duration, HostTime};

/// A bounded slice of host time.
pub trait Deadline {
    /// Returns how much of the slice is left.
    fn time_remaining(&self) -> Duration;

    /// Returns the current host time, used only for trace timestamps.
    fn now(&self) -> HostTime {
        HostTime(0)
    }
}

impl<F: Fn() -> Duration> Deadline for F {
    fn time_remaining(&self) -> Duration {
        self()
    }
}

/// A deadline that never expires.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// A deadline that expires after a fixed number of polls.
///
/// The renderer polls once per unit of work, so a budget of `k` processes
/// exactly `k` units before yielding (with the default one-tick threshold).
/// The host clock is simulated: each poll advances [`now`](Deadline::now) by
/// one tick.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<u32>,
    clock: Cell<u64>,
}

impl UnitBudget {
    /// Creates a budget of `units` polls.
    #[must_use]
    pub fn new(units: u32) -> Self {
        Self::starting_at(units, HostTime(0))
    }

    /// Creates a budget whose simulated clock starts at `now`.
    #[must_use]
    pub fn starting_at(units: u32, now: HostTime) -> Self {
        Self {
            remaining: Cell::new(units),
            clock: Cell::new(now.ticks()),
        }
    }

    /// Returns the number of polls left before expiry.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        self.clock.set(self.clock.get() + 1);
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        Duration(u64::from(left))
    }

    fn now(&self) -> HostTime {
        HostTime(self.clock.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_expires() {
        assert_eq!(Unbounded.time_remaining(), Duration::MAX);
        assert_eq!(Unbounded.now(), HostTime(0));
    }

    #[test]
    fn closures_are_deadlines() {
        let deadline = || Duration(5);
        assert_eq!(deadline.time_remaining(), Duration(5));
    }

    #[test]
    fn unit_budget_counts_down_per_poll() {
        let budget = UnitBudget::new(3);
        assert_eq!(budget.time_remaining(), Duration(2));
        assert_eq!(budget.time_remaining(), Duration(1));
        assert_eq!(budget.time_remaining(), Duration(0));
        assert_eq!(budget.time_remaining(), Duration(0));
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn unit_budget_advances_its_clock() {
        let budget = UnitBudget::starting_at(2, HostTime(100));
        assert_eq!(budget.now(), HostTime(100));
        let _ = budget.time_remaining();
        assert_eq!(budget.now(), HostTime(101));
    }
}
