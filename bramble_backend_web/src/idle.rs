// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestIdleCallback` slice driver.
//!
//! [`IdleLoop`] asks the browser for idle periods and hands each one to a
//! callback as an [`IdleSlice`]. The slice implements
//! [`Deadline`]: `timeRemaining()` (fractional milliseconds) is reported in
//! microsecond ticks, matching [`timebase`](crate::timebase).
//!
//! The loop re-registers itself after every callback, so a renderer driven by
//! it picks up new render requests on the next idle period without further
//! wiring.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::IdleDeadline;

use bramble_core::time::{Duration, HostTime};
use bramble_core::timing::Deadline;

// Direct global bindings instead of `web_sys::Window` methods; avoids
// fetching (and unwrapping) the Window object on every slice.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestIdleCallback")]
    fn request_idle_callback(callback: &JsValue) -> u32;

    #[wasm_bindgen(js_name = "cancelIdleCallback")]
    fn cancel_idle_callback(id: u32);
}

/// Returns `performance.now()` in microseconds.
pub(crate) fn performance_now_us() -> u64 {
    Duration::from_millis_f64(performance_now()).ticks()
}

/// One idle period granted by the browser.
pub struct IdleSlice<'a> {
    deadline: &'a IdleDeadline,
}

impl IdleSlice<'_> {
    /// Returns whether the callback ran because its timeout elapsed rather
    /// than because the browser went idle.
    #[must_use]
    pub fn did_timeout(&self) -> bool {
        self.deadline.did_timeout()
    }
}

impl Deadline for IdleSlice<'_> {
    fn time_remaining(&self) -> Duration {
        Duration::from_millis_f64(self.deadline.time_remaining())
    }

    fn now(&self) -> HostTime {
        HostTime(performance_now_us())
    }
}

impl core::fmt::Debug for IdleSlice<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdleSlice")
            .field("time_remaining", &self.time_remaining())
            .finish()
    }
}

/// A `requestIdleCallback` loop that hands each idle period to a callback.
///
/// Create with [`IdleLoop::new`], then call [`start`](Self::start) to begin
/// receiving slices. The loop re-registers itself after each slice until
/// [`stop`](Self::stop) is called or the `IdleLoop` is dropped.
pub struct IdleLoop {
    inner: Rc<IdleInner>,
}

type IdleClosure = Closure<dyn FnMut(IdleDeadline)>;

struct IdleInner {
    /// The JS closure registered with `requestIdleCallback`.
    ///
    /// Set once in `start()` and referenced from inside itself.
    closure: RefCell<Option<IdleClosure>>,

    /// The user-supplied callback that receives each slice.
    callback: RefCell<Box<dyn FnMut(&IdleSlice<'_>)>>,

    /// Number of slices delivered so far.
    slices: Cell<u64>,

    /// Whether the loop is currently running.
    running: Cell<bool>,

    /// The ID returned by the most recent `requestIdleCallback` call.
    idle_id: Cell<u32>,
}

impl IdleLoop {
    /// Creates a new `IdleLoop` that is **not yet running**.
    pub fn new(callback: impl FnMut(&IdleSlice<'_>) + 'static) -> Self {
        Self {
            inner: Rc::new(IdleInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                slices: Cell::new(0),
                running: Cell::new(false),
                idle_id: Cell::new(0),
            }),
        }
    }

    /// Starts requesting idle periods.
    ///
    /// If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        if self.inner.closure.borrow().is_none() {
            let inner = Rc::clone(&self.inner);
            let closure = Closure::wrap(Box::new(move |deadline: IdleDeadline| {
                if !inner.running.get() {
                    return;
                }
                inner.slices.set(inner.slices.get() + 1);
                inner.callback.borrow_mut()(&IdleSlice {
                    deadline: &deadline,
                });

                if inner.running.get()
                    && let Some(ref closure) = *inner.closure.borrow()
                {
                    let id = request_idle_callback(closure.as_ref().unchecked_ref());
                    inner.idle_id.set(id);
                }
            }) as Box<dyn FnMut(IdleDeadline)>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }

        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_idle_callback(closure.as_ref().unchecked_ref());
            self.inner.idle_id.set(id);
        }
    }

    /// Stops the loop, cancelling the pending request.
    ///
    /// Can be restarted by calling [`start`](Self::start) again.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_idle_callback(self.inner.idle_id.get());
    }

    /// Returns `true` if the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Returns the number of idle periods delivered so far.
    #[must_use]
    pub fn slices(&self) -> u64 {
        self.inner.slices.get()
    }
}

impl Drop for IdleLoop {
    fn drop(&mut self) {
        self.stop();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for IdleLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdleLoop")
            .field("running", &self.inner.running.get())
            .field("slices", &self.inner.slices.get())
            .finish_non_exhaustive()
    }
}
