// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! renderer calls at each stage of a cycle. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`CycleSummaryBuilder`] collects phase timestamps across the slices of a
//! cycle and produces a [`CycleSummary`] at commit.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`EffectRecord`] events plus the
//!   corresponding `TraceSink` method.

use crate::commit::CommitSummary;
#[cfg(feature = "trace-rich")]
use crate::fiber::Effect;
use crate::fiber::FiberKindTag;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a render cycle is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Interruptible unit-of-work processing.
    Render,
    /// Atomic effect application.
    Commit,
}

/// Why a cycle ended without committing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// A component's render function failed.
    ComponentError,
    /// A newer render request replaced the in-flight cycle.
    Superseded,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a render request arms a new cycle.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequestEvent {
    /// Cycle counter of the new cycle.
    pub cycle: u64,
    /// Whether an in-flight cycle was discarded to make room.
    pub superseded: bool,
}

/// Marks the beginning of a phase within one slice.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase within one slice.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after each fiber is processed.
#[derive(Clone, Copy, Debug)]
pub struct UnitOfWorkEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Slot index of the processed fiber.
    pub fiber: u32,
    /// Kind of the processed fiber.
    pub kind: FiberKindTag,
    /// Host time after processing.
    pub timestamp: HostTime,
}

/// Emitted when a slice ends with work still pending.
#[derive(Clone, Copy, Debug)]
pub struct YieldEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Zero-based slice number within the cycle.
    pub slice: u32,
    /// Units processed in this slice.
    pub units: u32,
    /// Host time of the yield.
    pub timestamp: HostTime,
}

/// Emitted when a cycle is discarded without committing.
#[derive(Clone, Copy, Debug)]
pub struct AbortEvent {
    /// Cycle counter of the discarded cycle.
    pub cycle: u64,
    /// Why it was discarded.
    pub reason: AbortReason,
    /// Units processed before the abort.
    pub units: u32,
}

/// Per-cycle summary produced by [`CycleSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleSummary {
    /// Cycle counter.
    pub cycle: u64,
    /// Fibers processed.
    pub units: u32,
    /// Slices the render phase spanned.
    pub slices: u32,
    /// Placements committed.
    pub placements: u32,
    /// Updates committed.
    pub updates: u32,
    /// Deletions committed.
    pub deletions: u32,
    /// Render time in ticks, summed over slices (0 if not measured).
    pub render_ticks: u64,
    /// Commit duration in ticks (0 if not measured).
    pub commit_ticks: u64,
}

/// A per-fiber effect record applied at commit.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectRecord {
    /// Slot index of the fiber.
    pub fiber: u32,
    /// Kind of the fiber.
    pub kind: FiberKindTag,
    /// The effect that was applied.
    pub effect: Effect,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a render request arms a cycle.
    fn on_render_request(&mut self, e: &RenderRequestEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after each unit of work.
    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        _ = e;
    }

    /// Called when a slice yields with work pending.
    fn on_yield(&mut self, e: &YieldEvent) {
        _ = e;
    }

    /// Called when a cycle is discarded.
    fn on_abort(&mut self, e: &AbortEvent) {
        _ = e;
    }

    /// Called with a per-cycle summary after commit.
    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        _ = s;
    }

    /// Called with the effects applied at commit (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_effects(&mut self, cycle: u64, effects: &[EffectRecord]) {
        _ = (cycle, effects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RenderRequestEvent`].
    #[inline]
    pub fn render_request(&mut self, e: &RenderRequestEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_request(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`UnitOfWorkEvent`].
    #[inline]
    pub fn unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unit_of_work(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`YieldEvent`].
    #[inline]
    pub fn yielded(&mut self, e: &YieldEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_yield(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AbortEvent`].
    #[inline]
    pub fn abort(&mut self, e: &AbortEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_abort(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CycleSummary`].
    #[inline]
    pub fn cycle_summary(&mut self, s: &CycleSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_cycle_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits applied effects (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn effects(&mut self, cycle: u64, effects: &[EffectRecord]) {
        if let Some(s) = &mut self.sink {
            s.on_effects(cycle, effects);
        }
    }

    /// Returns whether events reach a sink.
    ///
    /// Lets callers skip building rich payloads nobody will see.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// CycleSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps across the slices of a cycle and produces a
/// [`CycleSummary`].
///
/// The render phase may be entered and left once per slice; its durations
/// are summed. The commit phase happens at most once.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleSummaryBuilder {
    render_start: Option<HostTime>,
    render_ticks: u64,
    commit_start: Option<HostTime>,
    commit_ticks: u64,
}

impl CycleSummaryBuilder {
    /// Starts an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        match phase {
            PhaseKind::Render => self.render_start = Some(t),
            PhaseKind::Commit => self.commit_start = Some(t),
        }
    }

    /// Records the end of a phase, accumulating its duration.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        match phase {
            PhaseKind::Render => {
                if let Some(start) = self.render_start.take() {
                    self.render_ticks += t.saturating_duration_since(start).ticks();
                }
            }
            PhaseKind::Commit => {
                if let Some(start) = self.commit_start.take() {
                    self.commit_ticks += t.saturating_duration_since(start).ticks();
                }
            }
        }
    }

    /// Consumes the builder and produces the final [`CycleSummary`].
    #[must_use]
    pub fn finish(self, commit: &CommitSummary) -> CycleSummary {
        CycleSummary {
            cycle: commit.cycle,
            units: commit.units,
            slices: commit.slices,
            placements: commit.placements,
            updates: commit.updates,
            deletions: commit.deletions,
            render_ticks: self.render_ticks,
            commit_ticks: self.commit_ticks,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_commit() -> CommitSummary {
        CommitSummary {
            cycle: 3,
            placements: 2,
            updates: 5,
            deletions: 1,
            units: 8,
            slices: 2,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_render_request(&RenderRequestEvent {
            cycle: 1,
            superseded: false,
        });
        sink.on_cycle_summary(&CycleSummaryBuilder::new().finish(&sample_commit()));
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.yielded(&YieldEvent {
            cycle: 1,
            slice: 0,
            units: 4,
            timestamp: HostTime(10),
        });
    }

    #[test]
    fn summary_builder_sums_render_slices() {
        let mut builder = CycleSummaryBuilder::new();
        builder.phase_begin(PhaseKind::Render, HostTime(100));
        builder.phase_end(PhaseKind::Render, HostTime(140));
        builder.phase_begin(PhaseKind::Render, HostTime(500));
        builder.phase_end(PhaseKind::Render, HostTime(520));
        builder.phase_begin(PhaseKind::Commit, HostTime(520));
        builder.phase_end(PhaseKind::Commit, HostTime(530));

        let summary = builder.finish(&sample_commit());
        assert_eq!(summary.render_ticks, 60);
        assert_eq!(summary.commit_ticks, 10);
        assert_eq!(summary.cycle, 3);
        assert_eq!(summary.units, 8);
        assert_eq!(summary.slices, 2);
    }

    #[test]
    fn summary_builder_unmatched_end_is_ignored() {
        let mut builder = CycleSummaryBuilder::new();
        builder.phase_end(PhaseKind::Render, HostTime(50));
        let summary = builder.finish(&sample_commit());
        assert_eq!(summary.render_ticks, 0);
        assert_eq!(summary.commit_ticks, 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            fibers: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
                self.fibers.push(e.fiber);
            }
        }

        let mut sink = RecordingSink { fibers: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.unit_of_work(&UnitOfWorkEvent {
            cycle: 1,
            fiber: 42,
            kind: FiberKindTag::Host,
            timestamp: HostTime(0),
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.fibers, &[42]);
    }
}
