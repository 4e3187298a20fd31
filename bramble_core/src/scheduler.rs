// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative work loop.
//!
//! The render phase is split into *units of work*, one fiber each. A slice
//! processes units until either none are left or the host's [`Deadline`]
//! reports less than [`SchedulerConfig::yield_threshold`] remaining, polling
//! after every unit. When the last unit completes the commit phase runs in
//! the same slice, synchronously.
//!
//! ```text
//!   Idle ──render()──► Rendering ──units exhausted──► Committing ──► Idle
//!                        │    ▲
//!                 yield  │    │ next slice
//!                        ▼    │
//!                      (host runs)
//! ```
//!
//! Units are visited in pre-order: a fiber's child first, otherwise its
//! sibling, otherwise the sibling of the nearest ancestor that has one.
//! Component render functions run in exactly that order.

use core::slice;

use crate::adapter::{NodeKind, create_node};
use crate::backend::HostTree;
use crate::commit::CommitSummary;
use crate::error::RenderError;
use crate::fiber::{FiberId, FiberKind};
use crate::reconcile::reconcile_children;
use crate::renderer::Renderer;
use crate::time::Duration;
use crate::timing::{Deadline, Unbounded};
use crate::trace::{AbortReason, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer, UnitOfWorkEvent, YieldEvent};

/// Configuration for the work loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// A slice ends once the deadline reports less than this much time left.
    ///
    /// Expressed in the deadline's ticks. At least one unit of work is always
    /// processed per slice, however small the budget.
    pub yield_threshold: Duration,
}

impl SchedulerConfig {
    /// Default configuration for browsers driven by `requestIdleCallback`
    /// (1 ms at microsecond tick resolution).
    #[must_use]
    pub const fn web() -> Self {
        Self {
            yield_threshold: Duration(1_000),
        }
    }

    /// Default configuration for headless drivers that count abstract ticks.
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            yield_threshold: Duration(1),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::headless()
    }
}

/// Outcome of one slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    /// No cycle was in flight; nothing was done.
    Idle,
    /// The deadline expired with units still pending.
    Yielded {
        /// Units processed in this slice.
        units: u32,
    },
    /// The cycle finished and was committed in this slice.
    Committed(CommitSummary),
}

impl Renderer {
    /// Runs one slice of the in-flight cycle.
    ///
    /// Processes at least one unit, polling `deadline` after each. If no
    /// units remain the cycle is committed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Component`] if a component fails to render. The
    /// cycle is aborted first: the working tree is discarded, the committed
    /// tree and the host tree are unchanged, and the session is idle.
    ///
    /// # Panics
    ///
    /// Panics if the commit walk finds a fiber with no ancestor node, which
    /// means the root was given no container.
    pub fn work<H, D>(
        &mut self,
        host: &mut H,
        deadline: &D,
        tracer: &mut Tracer<'_>,
    ) -> Result<WorkStatus, RenderError>
    where
        H: HostTree + ?Sized,
        D: Deadline + ?Sized,
    {
        self.drain_pending(host, tracer);
        let Some(mut unit) = self.next_unit else {
            return Ok(WorkStatus::Idle);
        };

        let cycle = self.cycle;
        let slice = self.slices;
        self.slices += 1;
        self.begin_phase(PhaseKind::Render, deadline, tracer);

        let mut processed = 0_u32;
        loop {
            let kind = self.store.kind(unit).tag();
            let next = match self.perform_unit_of_work(host, unit) {
                Ok(next) => next,
                Err(err) => {
                    self.end_phase(PhaseKind::Render, deadline, tracer);
                    self.abort(host, AbortReason::ComponentError, tracer);
                    return Err(err);
                }
            };
            self.next_unit = next;
            processed += 1;
            self.units += 1;
            tracer.unit_of_work(&UnitOfWorkEvent {
                cycle,
                fiber: unit.index(),
                kind,
                timestamp: deadline.now(),
            });

            let expired = deadline.time_remaining() < self.config.yield_threshold;
            match next {
                None => break,
                Some(_) if expired => {
                    self.end_phase(PhaseKind::Render, deadline, tracer);
                    tracer.yielded(&YieldEvent {
                        cycle,
                        slice,
                        units: processed,
                        timestamp: deadline.now(),
                    });
                    return Ok(WorkStatus::Yielded { units: processed });
                }
                Some(n) => unit = n,
            }
        }

        self.end_phase(PhaseKind::Render, deadline, tracer);
        Ok(WorkStatus::Committed(self.commit(host, deadline, tracer)))
    }

    /// Runs the in-flight cycle to completion in one call.
    ///
    /// Returns `None` if no cycle was in flight.
    ///
    /// # Errors
    ///
    /// See [`work`](Self::work).
    pub fn flush<H>(
        &mut self,
        host: &mut H,
        tracer: &mut Tracer<'_>,
    ) -> Result<Option<CommitSummary>, RenderError>
    where
        H: HostTree + ?Sized,
    {
        loop {
            match self.work(host, &Unbounded, tracer)? {
                WorkStatus::Idle => return Ok(None),
                WorkStatus::Committed(summary) => return Ok(Some(summary)),
                WorkStatus::Yielded { .. } => {}
            }
        }
    }

    /// Processes one fiber and returns the next one to process.
    ///
    /// Components are called to produce their single child; host and text
    /// fibers get a (detached) node if they lack one; then the children are
    /// reconciled.
    fn perform_unit_of_work<H: HostTree + ?Sized>(
        &mut self,
        host: &mut H,
        fiber: FiberId,
    ) -> Result<Option<FiberId>, RenderError> {
        let props = self.store.props(fiber).clone();
        match self.store.kind(fiber).clone() {
            FiberKind::Component(component) => {
                let child = component
                    .render(&props)
                    .map_err(|source| RenderError::Component {
                        name: component.name(),
                        source,
                    })?;
                reconcile_children(
                    &mut self.store,
                    fiber,
                    slice::from_ref(&child),
                    &mut self.deletions,
                );
            }
            FiberKind::Host(tag) => {
                if self.store.node(fiber).is_none() {
                    let node = create_node(host, NodeKind::Element(&tag), &props);
                    self.store.set_node(fiber, Some(node));
                }
                reconcile_children(&mut self.store, fiber, props.children(), &mut self.deletions);
            }
            FiberKind::Text => {
                if self.store.node(fiber).is_none() {
                    let node = create_node(host, NodeKind::Text, &props);
                    self.store.set_node(fiber, Some(node));
                }
            }
            FiberKind::Root => {
                reconcile_children(&mut self.store, fiber, props.children(), &mut self.deletions);
            }
        }
        Ok(self.store.next_unit(fiber))
    }

    pub(crate) fn begin_phase<D: Deadline + ?Sized>(
        &mut self,
        phase: PhaseKind,
        deadline: &D,
        tracer: &mut Tracer<'_>,
    ) {
        let timestamp = deadline.now();
        self.timings.phase_begin(phase, timestamp);
        tracer.phase_begin(&PhaseBeginEvent {
            cycle: self.cycle,
            phase,
            timestamp,
        });
    }

    pub(crate) fn end_phase<D: Deadline + ?Sized>(
        &mut self,
        phase: PhaseKind,
        deadline: &D,
        tracer: &mut Tracer<'_>,
    ) {
        let timestamp = deadline.now();
        self.timings.phase_end(phase, timestamp);
        tracer.phase_end(&PhaseEndEvent {
            cycle: self.cycle,
            phase,
            timestamp,
        });
    }
}
