// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for bramble.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomHost`]: a [`HostTree`] over live DOM nodes
//! - [`IdleLoop`]: `requestIdleCallback` slice driver whose [`IdleSlice`]
//!   is the [`Deadline`](bramble_core::timing::Deadline) for
//!   [`Renderer::work`](bramble_core::Renderer::work)
//!
//! Pair the loop with [`SchedulerConfig::web`], which yields once less than a
//! millisecond of idle time remains:
//!
//! ```rust,ignore
//! let mut renderer = Renderer::new(SchedulerConfig::web());
//! renderer.render(app(), container);
//! let idle = IdleLoop::new(move |slice| {
//!     let _ = renderer.work(&mut host, slice, &mut Tracer::none());
//! });
//! idle.start();
//! ```
//!
//! [`SchedulerConfig::web`]: bramble_core::scheduler::SchedulerConfig::web

#![no_std]

extern crate alloc;

mod host;
mod idle;

pub use bramble_core::backend::HostTree;
pub use host::DomHost;
pub use idle::{IdleLoop, IdleSlice};

use bramble_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime(idle::performance_now_us())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        // 1 tick = 1 µs = 1000 ns
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }
}
